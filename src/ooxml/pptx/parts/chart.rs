/// Chart parts for PowerPoint presentations.
///
/// This module provides the chart data model, the chart XML writer and a
/// read view over existing chart parts (`/ppt/charts/chartN.xml`).
use crate::common::xml::{Element, escape_xml};
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::{content_type as ct, namespace};
use crate::ooxml::opc::part::Part;
use crate::ooxml::pptx::writer::excel_embed::column_letter;
use std::io::Write;

/// Name of the worksheet holding chart data in the embedded workbook.
pub const DATA_SHEET_NAME: &str = "Sheet1";

/// Chart type enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartType {
    /// Bar chart (horizontal bars)
    Bar,
    /// Column chart (vertical bars)
    Column,
    /// Line chart
    Line,
    /// Pie chart
    Pie,
    /// Area chart
    Area,
    /// Doughnut chart
    Doughnut,
    /// Radar chart
    Radar,
}

impl ChartType {
    /// Local name of the plot-area element for this type.
    pub fn plot_element(&self) -> &'static str {
        match self {
            Self::Bar | Self::Column => "barChart",
            Self::Line => "lineChart",
            Self::Pie => "pieChart",
            Self::Area => "areaChart",
            Self::Doughnut => "doughnutChart",
            Self::Radar => "radarChart",
        }
    }

    /// Pie-like charts have no axes and vary colours by point.
    pub fn has_axes(&self) -> bool {
        !matches!(self, Self::Pie | Self::Doughnut)
    }
}

/// One data series: a name and one value per category.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub name: String,
    pub values: Vec<f64>,
}

impl ChartSeries {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
        }
    }

    pub fn with_values(mut self, values: Vec<f64>) -> Self {
        self.values = values;
        self
    }
}

/// Categories and series backing a chart.
///
/// # Examples
///
/// ```
/// use litchi_pptx::ooxml::pptx::parts::chart::{ChartData, ChartSeries, ChartType};
///
/// let data = ChartData::new(ChartType::Column)
///     .with_categories(vec!["Q1".to_string(), "Q2".to_string()])
///     .add_series(ChartSeries::new("Sales").with_values(vec![10.0, 12.5]));
/// assert_eq!(data.row_count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub chart_type: ChartType,
    pub title: Option<String>,
    pub categories: Vec<String>,
    pub series: Vec<ChartSeries>,
}

impl ChartData {
    pub fn new(chart_type: ChartType) -> Self {
        Self {
            chart_type,
            title: None,
            categories: Vec::new(),
            series: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        self.categories = categories;
        self
    }

    pub fn add_series(mut self, series: ChartSeries) -> Self {
        self.series.push(series);
        self
    }

    /// Number of data rows in the worksheet: the longest of the category
    /// list and every series.
    pub fn row_count(&self) -> usize {
        self.series
            .iter()
            .map(|s| s.values.len())
            .chain(std::iter::once(self.categories.len()))
            .max()
            .unwrap_or(0)
    }
}

/// Serialize a chart part for `data`, linked to its embedded workbook
/// through relationship `workbook_r_id`.
pub fn chart_xml(data: &ChartData, workbook_r_id: &str) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(4096);
    write_chart_space(&mut out, data, workbook_r_id)?;
    Ok(out)
}

fn write_chart_space<W: Write>(writer: &mut W, data: &ChartData, workbook_r_id: &str) -> std::io::Result<()> {
    write!(
        writer,
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#
    )?;
    write!(
        writer,
        r#"<c:chartSpace xmlns:c="{}" xmlns:a="{}" xmlns:r="{}">"#,
        namespace::DML_CHART,
        namespace::DML_MAIN,
        namespace::OFC_RELATIONSHIPS
    )?;
    write!(writer, r#"<c:date1904 val="0"/>"#)?;
    write!(writer, r#"<c:lang val="en-US"/>"#)?;
    write!(writer, r#"<c:roundedCorners val="0"/>"#)?;

    write!(writer, "<c:chart>")?;
    if let Some(title) = &data.title {
        write_title(writer, title)?;
    }
    write!(
        writer,
        r#"<c:autoTitleDeleted val="{}"/>"#,
        if data.title.is_some() { "0" } else { "1" }
    )?;
    write_plot_area(writer, data)?;
    write_legend(writer, data.chart_type)?;
    write!(writer, r#"<c:plotVisOnly val="1"/>"#)?;
    write!(writer, r#"<c:dispBlanksAs val="gap"/>"#)?;
    write!(writer, "</c:chart>")?;

    write!(
        writer,
        r#"<c:externalData r:id="{}"><c:autoUpdate val="0"/></c:externalData>"#,
        escape_xml(workbook_r_id)
    )?;
    write!(writer, "</c:chartSpace>")?;
    Ok(())
}

fn write_title<W: Write>(writer: &mut W, title: &str) -> std::io::Result<()> {
    write!(writer, "<c:title><c:tx><c:rich>")?;
    write!(writer, "<a:bodyPr/><a:lstStyle/>")?;
    write!(writer, "<a:p><a:r><a:t>{}</a:t></a:r></a:p>", escape_xml(title))?;
    write!(writer, "</c:rich></c:tx>")?;
    write!(writer, r#"<c:overlay val="0"/>"#)?;
    write!(writer, "</c:title>")?;
    Ok(())
}

fn write_plot_area<W: Write>(writer: &mut W, data: &ChartData) -> std::io::Result<()> {
    let chart_type = data.chart_type;
    let element = chart_type.plot_element();

    write!(writer, "<c:plotArea><c:layout/>")?;
    write!(writer, "<c:{}>", element)?;
    match chart_type {
        ChartType::Bar | ChartType::Column => {
            write!(
                writer,
                r#"<c:barDir val="{}"/>"#,
                if chart_type == ChartType::Bar { "bar" } else { "col" }
            )?;
            write!(writer, r#"<c:grouping val="clustered"/>"#)?;
        },
        ChartType::Line | ChartType::Area => {
            write!(writer, r#"<c:grouping val="standard"/>"#)?;
        },
        ChartType::Radar => {
            write!(writer, r#"<c:radarStyle val="marker"/>"#)?;
        },
        ChartType::Pie | ChartType::Doughnut => {},
    }
    write!(
        writer,
        r#"<c:varyColors val="{}"/>"#,
        if chart_type.has_axes() { "0" } else { "1" }
    )?;

    for (index, series) in data.series.iter().enumerate() {
        write_series(writer, data, index, series)?;
    }

    write_data_labels_default(writer)?;
    match chart_type {
        ChartType::Bar | ChartType::Column => {
            write!(writer, r#"<c:gapWidth val="150"/>"#)?;
        },
        ChartType::Line => {
            write!(writer, r#"<c:marker val="1"/>"#)?;
        },
        ChartType::Pie => {
            write!(writer, r#"<c:firstSliceAng val="0"/>"#)?;
        },
        ChartType::Doughnut => {
            write!(writer, r#"<c:firstSliceAng val="0"/>"#)?;
            write!(writer, r#"<c:holeSize val="50"/>"#)?;
        },
        ChartType::Area | ChartType::Radar => {},
    }
    if chart_type.has_axes() {
        write!(writer, r#"<c:axId val="1"/><c:axId val="2"/>"#)?;
    }
    write!(writer, "</c:{}>", element)?;

    if chart_type.has_axes() {
        let (cat_pos, val_pos) = if chart_type == ChartType::Bar {
            ("l", "b")
        } else {
            ("b", "l")
        };
        write_category_axis(writer, cat_pos)?;
        write_value_axis(writer, val_pos)?;
    }
    write!(writer, "</c:plotArea>")?;
    Ok(())
}

fn write_series<W: Write>(
    writer: &mut W,
    data: &ChartData,
    index: usize,
    series: &ChartSeries,
) -> std::io::Result<()> {
    let column = column_letter(index + 1);
    let last_row = data.row_count() + 1;

    write!(writer, "<c:ser>")?;
    write!(writer, r#"<c:idx val="{}"/>"#, index)?;
    write!(writer, r#"<c:order val="{}"/>"#, index)?;

    write!(writer, "<c:tx><c:strRef>")?;
    write!(writer, "<c:f>{}!${}$1</c:f>", DATA_SHEET_NAME, column)?;
    write!(writer, r#"<c:strCache><c:ptCount val="1"/>"#)?;
    write!(writer, r#"<c:pt idx="0"><c:v>{}</c:v></c:pt>"#, escape_xml(&series.name))?;
    write!(writer, "</c:strCache></c:strRef></c:tx>")?;

    match data.chart_type {
        ChartType::Bar | ChartType::Column => {
            write!(writer, r#"<c:invertIfNegative val="0"/>"#)?;
        },
        ChartType::Line | ChartType::Radar => {
            write!(writer, r#"<c:marker><c:symbol val="none"/></c:marker>"#)?;
        },
        _ => {},
    }

    if !data.categories.is_empty() {
        write!(writer, "<c:cat><c:strRef>")?;
        write!(writer, "<c:f>{}!$A$2:$A${}</c:f>", DATA_SHEET_NAME, last_row)?;
        write!(writer, "<c:strCache>")?;
        write!(writer, r#"<c:ptCount val="{}"/>"#, data.categories.len())?;
        for (i, category) in data.categories.iter().enumerate() {
            write!(writer, r#"<c:pt idx="{}"><c:v>{}</c:v></c:pt>"#, i, escape_xml(category))?;
        }
        write!(writer, "</c:strCache></c:strRef></c:cat>")?;
    }

    write!(writer, "<c:val><c:numRef>")?;
    write!(
        writer,
        "<c:f>{}!${}$2:${}${}</c:f>",
        DATA_SHEET_NAME, column, column, last_row
    )?;
    write!(writer, "<c:numCache>")?;
    write!(writer, "<c:formatCode>General</c:formatCode>")?;
    write!(writer, r#"<c:ptCount val="{}"/>"#, series.values.len())?;
    for (i, value) in series.values.iter().enumerate() {
        write!(writer, r#"<c:pt idx="{}"><c:v>{}</c:v></c:pt>"#, i, value)?;
    }
    write!(writer, "</c:numCache></c:numRef></c:val>")?;

    if data.chart_type == ChartType::Line {
        write!(writer, r#"<c:smooth val="0"/>"#)?;
    }
    write!(writer, "</c:ser>")?;
    Ok(())
}

fn write_data_labels_default<W: Write>(writer: &mut W) -> std::io::Result<()> {
    write!(writer, "<c:dLbls>")?;
    write!(writer, r#"<c:showLegendKey val="0"/>"#)?;
    write!(writer, r#"<c:showVal val="0"/>"#)?;
    write!(writer, r#"<c:showCatName val="0"/>"#)?;
    write!(writer, r#"<c:showSerName val="0"/>"#)?;
    write!(writer, r#"<c:showPercent val="0"/>"#)?;
    write!(writer, r#"<c:showBubbleSize val="0"/>"#)?;
    write!(writer, "</c:dLbls>")?;
    Ok(())
}

fn write_category_axis<W: Write>(writer: &mut W, position: &str) -> std::io::Result<()> {
    write!(writer, "<c:catAx>")?;
    write!(writer, r#"<c:axId val="1"/>"#)?;
    write!(writer, r#"<c:scaling><c:orientation val="minMax"/></c:scaling>"#)?;
    write!(writer, r#"<c:delete val="0"/>"#)?;
    write!(writer, r#"<c:axPos val="{}"/>"#, position)?;
    write!(writer, r#"<c:majorTickMark val="out"/><c:minorTickMark val="none"/>"#)?;
    write!(writer, r#"<c:tickLblPos val="nextTo"/>"#)?;
    write!(writer, r#"<c:crossAx val="2"/><c:crosses val="autoZero"/>"#)?;
    write!(writer, r#"<c:auto val="1"/>"#)?;
    write!(writer, r#"<c:lblAlgn val="ctr"/>"#)?;
    write!(writer, r#"<c:lblOffset val="100"/>"#)?;
    write!(writer, r#"<c:noMultiLvlLbl val="0"/>"#)?;
    write!(writer, "</c:catAx>")?;
    Ok(())
}

fn write_value_axis<W: Write>(writer: &mut W, position: &str) -> std::io::Result<()> {
    write!(writer, "<c:valAx>")?;
    write!(writer, r#"<c:axId val="2"/>"#)?;
    write!(writer, r#"<c:scaling><c:orientation val="minMax"/></c:scaling>"#)?;
    write!(writer, r#"<c:delete val="0"/>"#)?;
    write!(writer, r#"<c:axPos val="{}"/>"#, position)?;
    write!(writer, "<c:majorGridlines/>")?;
    write!(writer, r#"<c:numFmt formatCode="General" sourceLinked="1"/>"#)?;
    write!(writer, r#"<c:majorTickMark val="out"/><c:minorTickMark val="none"/>"#)?;
    write!(writer, r#"<c:tickLblPos val="nextTo"/>"#)?;
    write!(writer, r#"<c:crossAx val="1"/><c:crosses val="autoZero"/>"#)?;
    write!(writer, r#"<c:crossBetween val="between"/>"#)?;
    write!(writer, "</c:valAx>")?;
    Ok(())
}

fn write_legend<W: Write>(writer: &mut W, chart_type: ChartType) -> std::io::Result<()> {
    write!(writer, "<c:legend>")?;
    write!(
        writer,
        r#"<c:legendPos val="{}"/>"#,
        if chart_type.has_axes() { "b" } else { "r" }
    )?;
    write!(writer, r#"<c:overlay val="0"/>"#)?;
    write!(writer, "</c:legend>")?;
    Ok(())
}

/// Chart part - contains chart data and visualization.
///
/// Corresponds to `/ppt/charts/chartN.xml` in the package.
#[derive(Debug, Clone, Copy)]
pub struct ChartPart<'a> {
    part: &'a Part,
    root: &'a Element,
}

impl<'a> ChartPart<'a> {
    pub fn from_part(part: &'a Part) -> Result<Self> {
        if part.content_type() != ct::DML_CHART {
            return Err(OoxmlError::InvalidContentType {
                expected: ct::DML_CHART.to_string(),
                got: part.content_type().to_string(),
            });
        }
        let root = part.xml().ok_or_else(|| {
            OoxmlError::InvalidFormat(format!("{} is not XML", part.partname()))
        })?;
        Ok(Self { part, root })
    }

    pub fn part(&self) -> &'a Part {
        self.part
    }

    fn plot(&self) -> Option<&'a Element> {
        let plot_area = self.root.child_path(&["chart", "plotArea"])?;
        plot_area.elements().find(|e| e.local_name().ends_with("Chart"))
    }

    /// Type of the first plot in the plot area, when it is one this crate
    /// writes.
    pub fn chart_type(&self) -> Option<ChartType> {
        let plot = self.plot()?;
        match plot.local_name() {
            "barChart" => match plot.child("barDir").and_then(|d| d.attr("val")) {
                Some("bar") => Some(ChartType::Bar),
                _ => Some(ChartType::Column),
            },
            "lineChart" => Some(ChartType::Line),
            "pieChart" => Some(ChartType::Pie),
            "areaChart" => Some(ChartType::Area),
            "doughnutChart" => Some(ChartType::Doughnut),
            "radarChart" => Some(ChartType::Radar),
            _ => None,
        }
    }

    /// Chart title text, if the chart has a rich-text title.
    pub fn title(&self) -> Option<String> {
        let rich = self.root.child_path(&["chart", "title", "tx", "rich"])?;
        Some(rich.descendants("t").iter().map(|t| t.text()).collect())
    }

    pub fn has_legend(&self) -> bool {
        self.root.child_path(&["chart", "legend"]).is_some()
    }

    /// Relationship id of the embedded workbook (`c:externalData/@r:id`).
    pub fn workbook_r_id(&self) -> Option<&'a str> {
        self.root.child("externalData")?.attr("r:id")
    }

    /// Cached series names and values.
    pub fn series(&self) -> Vec<ChartSeries> {
        let Some(plot) = self.plot() else {
            return Vec::new();
        };
        plot.children_named("ser")
            .map(|ser| ChartSeries {
                name: ser
                    .child("tx")
                    .map(|tx| cached_points(tx).join(""))
                    .unwrap_or_default(),
                values: ser
                    .child("val")
                    .map(|val| {
                        cached_points(val)
                            .iter()
                            .filter_map(|v| v.parse().ok())
                            .collect()
                    })
                    .unwrap_or_default(),
            })
            .collect()
    }

    /// Cached categories of the first series.
    pub fn categories(&self) -> Vec<String> {
        self.plot()
            .and_then(|plot| plot.child("ser"))
            .and_then(|ser| ser.child("cat"))
            .map(cached_points)
            .unwrap_or_default()
    }
}

/// Values of the `c:pt/c:v` cache entries under `el`, in document order.
fn cached_points(el: &Element) -> Vec<String> {
    el.descendants("pt")
        .iter()
        .filter_map(|pt| pt.child("v"))
        .map(|v| v.text())
        .collect()
}
