/// Graphic frames (`p:graphicFrame`): the container of tables and charts.
use crate::common::xml::Element;
use crate::ooxml::opc::constants::namespace;
use crate::ooxml::pptx::shapes::base::{Geometry, ShapeBase};

/// `a:graphicData/@uri` of a table.
pub const TABLE_GRAPHIC_DATA_URI: &str = namespace::DML_TABLE;

/// `a:graphicData/@uri` of a chart.
pub const CHART_GRAPHIC_DATA_URI: &str = namespace::DML_CHART;

/// A graphic frame showing a chart part.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartFrame {
    pub base: ShapeBase,
    /// Relationship id of the chart part (`c:chart/@r:id`)
    pub r_id: Option<String>,
}

impl ChartFrame {
    pub fn from_element(frame: &Element) -> Option<Self> {
        Some(Self {
            base: ShapeBase::from_element(frame)?,
            r_id: frame
                .child_path(&["graphic", "graphicData", "chart"])
                .and_then(|c| c.attr("r:id"))
                .map(str::to_string),
        })
    }
}

/// Build a graphic frame wrapping `content` in `a:graphicData` of type `uri`.
pub fn new_graphic_frame(id: u32, name: &str, geometry: Geometry, uri: &str, content: Element) -> Element {
    let nv = Element::new("p:nvGraphicFramePr")
        .with_child(
            Element::new("p:cNvPr")
                .with_attr("id", id.to_string())
                .with_attr("name", name),
        )
        .with_child(
            Element::new("p:cNvGraphicFramePr").with_child(
                Element::new("a:graphicFrameLocks").with_attr("noGrp", "1"),
            ),
        )
        .with_child(Element::new("p:nvPr"));

    Element::new("p:graphicFrame")
        .with_child(nv)
        .with_child(geometry.to_xfrm("p:xfrm"))
        .with_child(
            Element::new("a:graphic").with_child(
                Element::new("a:graphicData")
                    .with_attr("uri", uri)
                    .with_child(content),
            ),
        )
}

/// Build a graphic frame showing the chart related as `r_id`.
pub fn new_chart_frame(id: u32, name: &str, r_id: &str, geometry: Geometry) -> Element {
    let chart = Element::new("c:chart")
        .with_attr("xmlns:c", namespace::DML_CHART)
        .with_attr("xmlns:r", namespace::OFC_RELATIONSHIPS)
        .with_attr("r:id", r_id);
    new_graphic_frame(id, name, geometry, CHART_GRAPHIC_DATA_URI, chart)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_frame_roundtrip() {
        let geometry = Geometry::new(1, 2, 3, 4);
        let el = new_chart_frame(9, "Chart 8", "rId4", geometry);
        assert_eq!(el.child("xfrm").unwrap().name(), "p:xfrm");

        let frame = ChartFrame::from_element(&el).unwrap();
        assert_eq!(frame.base.id, 9);
        assert_eq!(frame.base.geometry, Some(geometry));
        assert_eq!(frame.r_id.as_deref(), Some("rId4"));
    }

    #[test]
    fn test_graphic_frame_locks_grouping() {
        let el = new_graphic_frame(2, "x", Geometry::default(), TABLE_GRAPHIC_DATA_URI, Element::new("a:tbl"));
        assert!(el.find("graphicFrameLocks").is_some());
        assert_eq!(
            el.child_path(&["graphic", "graphicData"]).unwrap().attr("uri"),
            Some(TABLE_GRAPHIC_DATA_URI)
        );
    }
}
