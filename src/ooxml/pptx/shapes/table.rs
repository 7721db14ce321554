/// Table shapes: DrawingML tables (`a:tbl`) inside graphic frames.
use crate::common::xml::Element;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::pptx::shapes::base::{Geometry, ShapeBase};
use crate::ooxml::pptx::shapes::graphicframe::{TABLE_GRAPHIC_DATA_URI, new_graphic_frame};
use crate::ooxml::pptx::shapes::textframe::{self, TextFrame};

/// Built-in "Medium Style 2 - Accent 1" table style applied to new tables.
pub const DEFAULT_TABLE_STYLE_ID: &str = "{5C22544A-7EE6-4342-B048-85BDC9FD1C3A}";

/// A rows × columns grid of cells, each with its own text body.
///
/// # Examples
///
/// ```
/// use litchi_pptx::ooxml::pptx::shapes::{Geometry, Table};
/// use litchi_pptx::ooxml::pptx::shapes::table::new_table;
///
/// let frame = new_table(5, "Table 4", 2, 3, Geometry::new(0, 0, 3000, 2000)).unwrap();
/// let table = Table::from_element(&frame).unwrap();
/// assert_eq!((table.row_count(), table.column_count()), (2, 3));
/// assert_eq!(table.column_widths(), &[1000, 1000, 1000]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub base: ShapeBase,
    column_widths: Vec<i64>,
    row_heights: Vec<i64>,
    cells: Vec<Vec<TableCell>>,
}

/// One cell of a table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableCell {
    pub text: String,
    /// Columns spanned (`gridSpan`), 1 for ordinary cells
    pub grid_span: u32,
    /// Rows spanned (`rowSpan`), 1 for ordinary cells
    pub row_span: u32,
    /// Continuation of a horizontal or vertical merge
    pub is_merge_continuation: bool,
}

impl Table {
    /// Parse a graphic frame holding a table.
    pub fn from_element(frame: &Element) -> Option<Self> {
        let base = ShapeBase::from_element(frame)?;
        let tbl = table_of(frame)?;

        let column_widths = tbl
            .child("tblGrid")
            .map(|grid| {
                grid.children_named("gridCol")
                    .map(|col| col.attr("w").and_then(|w| w.parse().ok()).unwrap_or(0))
                    .collect()
            })
            .unwrap_or_default();

        let mut row_heights = Vec::new();
        let mut cells = Vec::new();
        for tr in tbl.children_named("tr") {
            row_heights.push(tr.attr("h").and_then(|h| h.parse().ok()).unwrap_or(0));
            cells.push(tr.children_named("tc").map(TableCell::from_tc).collect());
        }

        Some(Self {
            base,
            column_widths,
            row_heights,
            cells,
        })
    }

    pub fn row_count(&self) -> usize {
        self.cells.len()
    }

    pub fn column_count(&self) -> usize {
        self.column_widths.len()
    }

    pub fn column_widths(&self) -> &[i64] {
        &self.column_widths
    }

    pub fn row_heights(&self) -> &[i64] {
        &self.row_heights
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&TableCell> {
        self.cells.get(row)?.get(col)
    }

    pub fn cell_text(&self, row: usize, col: usize) -> Option<&str> {
        self.cell(row, col).map(|c| c.text.as_str())
    }

    pub fn rows(&self) -> impl Iterator<Item = &[TableCell]> {
        self.cells.iter().map(Vec::as_slice)
    }
}

impl TableCell {
    fn from_tc(tc: &Element) -> Self {
        let span = |name: &str| tc.attr(name).and_then(|v| v.parse().ok()).unwrap_or(1);
        let flag = |name: &str| matches!(tc.attr(name), Some("1") | Some("true"));
        Self {
            text: tc
                .child("txBody")
                .map(|body| TextFrame::new(body).text())
                .unwrap_or_default(),
            grid_span: span("gridSpan"),
            row_span: span("rowSpan"),
            is_merge_continuation: flag("hMerge") || flag("vMerge"),
        }
    }
}

/// The `a:tbl` element of a table graphic frame.
pub fn table_of(frame: &Element) -> Option<&Element> {
    frame.child_path(&["graphic", "graphicData", "tbl"])
}

pub fn table_of_mut(frame: &mut Element) -> Option<&mut Element> {
    frame.child_path_mut(&["graphic", "graphicData", "tbl"])
}

/// Build a graphic frame holding an empty `rows` × `cols` table. Column
/// widths and row heights split the frame's extents evenly.
///
/// Fails with [`OoxmlError::InvalidDimensions`] when either count is zero.
pub fn new_table(id: u32, name: &str, rows: usize, cols: usize, geometry: Geometry) -> Result<Element> {
    if rows < 1 || cols < 1 {
        return Err(OoxmlError::InvalidDimensions { rows, cols });
    }
    let col_width = geometry.cx / cols as i64;
    let row_height = geometry.cy / rows as i64;

    let tbl_pr = Element::new("a:tblPr")
        .with_attr("firstRow", "1")
        .with_attr("bandRow", "1")
        .with_child(Element::new("a:tableStyleId").with_text(DEFAULT_TABLE_STYLE_ID));

    let mut grid = Element::new("a:tblGrid");
    for _ in 0..cols {
        grid.push(Element::new("a:gridCol").with_attr("w", col_width.to_string()));
    }

    let mut tbl = Element::new("a:tbl").with_child(tbl_pr).with_child(grid);
    for _ in 0..rows {
        let mut tr = Element::new("a:tr").with_attr("h", row_height.to_string());
        for _ in 0..cols {
            tr.push(
                Element::new("a:tc")
                    .with_child(textframe::new_tx_body("a:txBody", "", None))
                    .with_child(Element::new("a:tcPr")),
            );
        }
        tbl.push(tr);
    }

    Ok(new_graphic_frame(id, name, geometry, TABLE_GRAPHIC_DATA_URI, tbl))
}

/// Replace the text of cell (`row`, `col`). Returns false when the cell does
/// not exist.
pub fn set_cell_text(frame: &mut Element, row: usize, col: usize, text: &str) -> bool {
    let Some(tc) = table_of_mut(frame)
        .and_then(|tbl| tbl.elements_mut().filter(|e| e.local_name() == "tr").nth(row))
        .and_then(|tr| tr.elements_mut().filter(|e| e.local_name() == "tc").nth(col))
    else {
        return false;
    };
    if tc.child("txBody").is_none() {
        tc.insert_element(0, textframe::new_tx_body("a:txBody", "", None));
    }
    match tc.child_mut("txBody") {
        Some(body) => {
            textframe::set_text(body, text);
            true
        },
        None => false,
    }
}
