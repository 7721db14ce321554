/// Shape snapshots parsed from a shape tree.
///
/// Every shape element of `p:spTree` maps to one variant of the closed
/// [`Shape`] enum. Snapshots are owned copies; edits go through the package
/// by shape id.
use crate::common::xml::Element;
use crate::ooxml::pptx::format::TextFormat;
use crate::ooxml::pptx::shapes::graphicframe::{
    CHART_GRAPHIC_DATA_URI, ChartFrame, TABLE_GRAPHIC_DATA_URI,
};
use crate::ooxml::pptx::shapes::picture::Picture;
use crate::ooxml::pptx::shapes::placeholder::PlaceholderInfo;
use crate::ooxml::pptx::shapes::table::Table;
use crate::ooxml::pptx::shapes::textframe::{TextFrame, new_tx_body};

/// Position and size in EMUs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Geometry {
    /// X position (left edge)
    pub x: i64,
    /// Y position (top edge)
    pub y: i64,
    /// Width
    pub cx: i64,
    /// Height
    pub cy: i64,
}

impl Geometry {
    pub const fn new(x: i64, y: i64, cx: i64, cy: i64) -> Self {
        Self { x, y, cx, cy }
    }

    /// Read an `a:xfrm` / `p:xfrm` element. Both the offset and the extents
    /// must be present.
    pub fn from_xfrm(xfrm: &Element) -> Option<Self> {
        let off = xfrm.child("off")?;
        let ext = xfrm.child("ext")?;
        Some(Self {
            x: int_attr(off, "x")?,
            y: int_attr(off, "y")?,
            cx: int_attr(ext, "cx")?,
            cy: int_attr(ext, "cy")?,
        })
    }

    /// Build a transform element named `name`.
    pub fn to_xfrm(&self, name: &str) -> Element {
        Element::new(name)
            .with_child(
                Element::new("a:off")
                    .with_attr("x", self.x.to_string())
                    .with_attr("y", self.y.to_string()),
            )
            .with_child(
                Element::new("a:ext")
                    .with_attr("cx", self.cx.to_string())
                    .with_attr("cy", self.cy.to_string()),
            )
    }
}

fn int_attr(el: &Element, name: &str) -> Option<i64> {
    el.attr(name)?.parse().ok()
}

/// The transform element of a shape, wherever its kind keeps it.
pub fn shape_xfrm(shape: &Element) -> Option<&Element> {
    match shape.local_name() {
        "graphicFrame" => shape.child("xfrm"),
        "grpSp" => shape.child_path(&["grpSpPr", "xfrm"]),
        _ => shape.child_path(&["spPr", "xfrm"]),
    }
}

/// Non-visual drawing properties (`p:cNvPr`) of a shape element.
pub fn c_nv_pr(shape: &Element) -> Option<&Element> {
    shape
        .elements()
        .find(|e| e.local_name().starts_with("nv"))?
        .child("cNvPr")
}

/// Shape id from `p:cNvPr/@id`.
pub fn shape_id(shape: &Element) -> Option<u32> {
    c_nv_pr(shape)?.attr("id")?.parse().ok()
}

/// Properties shared by every shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeBase {
    pub id: u32,
    pub name: String,
    /// Local transform; `None` when the shape inherits its position
    pub geometry: Option<Geometry>,
    pub placeholder: Option<PlaceholderInfo>,
}

impl ShapeBase {
    pub fn from_element(shape: &Element) -> Option<Self> {
        let nv = c_nv_pr(shape)?;
        Some(Self {
            id: nv.attr("id")?.parse().ok()?,
            name: nv.attr("name").unwrap_or_default().to_string(),
            geometry: shape_xfrm(shape).and_then(Geometry::from_xfrm),
            placeholder: PlaceholderInfo::from_shape(shape),
        })
    }
}

/// A `p:sp` or `p:cxnSp` shape.
#[derive(Debug, Clone, PartialEq)]
pub struct AutoShape {
    pub base: ShapeBase,
    /// Preset geometry name (`rect`, `ellipse`, ...)
    pub preset: Option<String>,
    /// Text of the text frame, one line per paragraph
    pub text: Option<String>,
    pub is_text_box: bool,
}

impl AutoShape {
    pub fn from_element(shape: &Element) -> Option<Self> {
        Some(Self {
            base: ShapeBase::from_element(shape)?,
            preset: shape
                .child_path(&["spPr", "prstGeom"])
                .and_then(|g| g.attr("prst"))
                .map(str::to_string),
            text: TextFrame::of_shape(shape).map(|tf| tf.text()),
            is_text_box: shape
                .child_path(&["nvSpPr", "cNvSpPr"])
                .and_then(|c| c.attr("txBox"))
                .is_some_and(|v| v == "1" || v == "true"),
        })
    }
}

/// A group shape (`p:grpSp`) and its members.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupShape {
    pub base: ShapeBase,
    pub shapes: Vec<Shape>,
}

/// A shape of a slide, layout or master.
///
/// `Placeholder` holds placeholder `p:sp` shapes; pictures, tables and
/// charts that fill a placeholder keep their own variant and carry the
/// placeholder in [`ShapeBase::placeholder`].
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Placeholder(AutoShape),
    AutoShape(AutoShape),
    Picture(Picture),
    Table(Table),
    Chart(ChartFrame),
    Group(GroupShape),
}

impl Shape {
    /// Parse one child of a shape tree. Returns `None` for tree properties
    /// and for elements that are not shapes this crate models.
    pub fn from_element(el: &Element) -> Option<Self> {
        match el.local_name() {
            "sp" => {
                let shape = AutoShape::from_element(el)?;
                if shape.base.placeholder.is_some() {
                    Some(Self::Placeholder(shape))
                } else {
                    Some(Self::AutoShape(shape))
                }
            },
            "cxnSp" => AutoShape::from_element(el).map(Self::AutoShape),
            "pic" => Picture::from_element(el).map(Self::Picture),
            "graphicFrame" => {
                let uri = el
                    .child_path(&["graphic", "graphicData"])
                    .and_then(|g| g.attr("uri"))
                    .unwrap_or_default();
                match uri {
                    TABLE_GRAPHIC_DATA_URI => Table::from_element(el).map(Self::Table),
                    CHART_GRAPHIC_DATA_URI => ChartFrame::from_element(el).map(Self::Chart),
                    other => {
                        log::warn!("Skipping graphic frame with unsupported content {}", other);
                        None
                    },
                }
            },
            "grpSp" => Some(Self::Group(GroupShape {
                base: ShapeBase::from_element(el)?,
                shapes: el.elements().filter_map(Self::from_element).collect(),
            })),
            "nvGrpSpPr" | "grpSpPr" | "extLst" => None,
            other => {
                log::warn!("Skipping unsupported shape element {}", other);
                None
            },
        }
    }

    pub fn base(&self) -> &ShapeBase {
        match self {
            Self::Placeholder(s) | Self::AutoShape(s) => &s.base,
            Self::Picture(p) => &p.base,
            Self::Table(t) => &t.base,
            Self::Chart(c) => &c.base,
            Self::Group(g) => &g.base,
        }
    }

    pub fn id(&self) -> u32 {
        self.base().id
    }

    pub fn name(&self) -> &str {
        &self.base().name
    }

    pub fn geometry(&self) -> Option<Geometry> {
        self.base().geometry
    }

    pub fn placeholder(&self) -> Option<&PlaceholderInfo> {
        self.base().placeholder.as_ref()
    }

    /// Text of shapes with a text frame.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Placeholder(s) | Self::AutoShape(s) => s.text.as_deref(),
            _ => None,
        }
    }
}

/// Build a text box (`p:sp` with `txBox="1"`) holding `text`.
pub fn new_text_box(id: u32, name: &str, geometry: Geometry, text: &str, format: Option<&TextFormat>) -> Element {
    Element::new("p:sp")
        .with_child(
            Element::new("p:nvSpPr")
                .with_child(
                    Element::new("p:cNvPr")
                        .with_attr("id", id.to_string())
                        .with_attr("name", name),
                )
                .with_child(Element::new("p:cNvSpPr").with_attr("txBox", "1"))
                .with_child(Element::new("p:nvPr")),
        )
        .with_child(
            Element::new("p:spPr")
                .with_child(geometry.to_xfrm("a:xfrm"))
                .with_child(
                    Element::new("a:prstGeom")
                        .with_attr("prst", "rect")
                        .with_child(Element::new("a:avLst")),
                )
                .with_child(Element::new("a:noFill")),
        )
        .with_child(wrapped(new_tx_body("p:txBody", text, format)))
}

fn wrapped(mut tx_body: Element) -> Element {
    if let Some(body_pr) = tx_body.child_mut("bodyPr") {
        body_pr.set_attr("wrap", "square");
        body_pr.push(Element::new("a:spAutoFit"));
    }
    tx_body
}

/// Build an empty placeholder shape. Position, size and formatting are left
/// to the layout it inherits from.
pub fn new_placeholder(id: u32, name: &str, placeholder: PlaceholderInfo) -> Element {
    Element::new("p:sp")
        .with_child(
            Element::new("p:nvSpPr")
                .with_child(
                    Element::new("p:cNvPr")
                        .with_attr("id", id.to_string())
                        .with_attr("name", name),
                )
                .with_child(
                    Element::new("p:cNvSpPr")
                        .with_child(Element::new("a:spLocks").with_attr("noGrp", "1")),
                )
                .with_child(Element::new("p:nvPr").with_child(placeholder.to_element())),
        )
        .with_child(Element::new("p:spPr"))
        .with_child(new_tx_body("p:txBody", "", None))
}
