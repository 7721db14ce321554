/// Placeholder properties (`p:ph`).
///
/// Placeholders mark shapes that take their position and formatting from the
/// matching placeholder of the slide layout and slide master.
use crate::common::xml::Element;
use std::fmt;

/// Placeholder types (`ST_PlaceholderType`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceholderType {
    /// Title placeholder
    Title,
    /// Body/content placeholder
    Body,
    /// Center title placeholder
    CenterTitle,
    /// Subtitle placeholder
    SubTitle,
    /// Date and time placeholder
    DateAndTime,
    /// Slide number placeholder
    SlideNumber,
    /// Footer placeholder
    Footer,
    /// Header placeholder
    Header,
    /// Object placeholder, the type of a `p:ph` without a `type` attribute
    Object,
    Chart,
    Table,
    ClipArt,
    Diagram,
    MediaClip,
    /// Slide image placeholder (notes pages)
    SlideImage,
    Picture,
}

impl PlaceholderType {
    /// Parse the `type` attribute value. Unknown values are treated as objects.
    pub fn from_xml_value(value: &str) -> Self {
        match value {
            "title" => Self::Title,
            "body" => Self::Body,
            "ctrTitle" => Self::CenterTitle,
            "subTitle" => Self::SubTitle,
            "dt" => Self::DateAndTime,
            "sldNum" => Self::SlideNumber,
            "ftr" => Self::Footer,
            "hdr" => Self::Header,
            "obj" => Self::Object,
            "chart" => Self::Chart,
            "tbl" => Self::Table,
            "clipArt" => Self::ClipArt,
            "dgm" => Self::Diagram,
            "media" => Self::MediaClip,
            "sldImg" => Self::SlideImage,
            "pic" => Self::Picture,
            other => {
                log::warn!("Unknown placeholder type {:?}, treating as obj", other);
                Self::Object
            },
        }
    }

    pub fn xml_value(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Body => "body",
            Self::CenterTitle => "ctrTitle",
            Self::SubTitle => "subTitle",
            Self::DateAndTime => "dt",
            Self::SlideNumber => "sldNum",
            Self::Footer => "ftr",
            Self::Header => "hdr",
            Self::Object => "obj",
            Self::Chart => "chart",
            Self::Table => "tbl",
            Self::ClipArt => "clipArt",
            Self::Diagram => "dgm",
            Self::MediaClip => "media",
            Self::SlideImage => "sldImg",
            Self::Picture => "pic",
        }
    }

    /// The type a slide master uses for this placeholder. Masters only carry
    /// title, body, date, footer and slide-number placeholders.
    pub fn base_type(&self) -> Self {
        match self {
            Self::CenterTitle => Self::Title,
            Self::SubTitle
            | Self::Object
            | Self::Chart
            | Self::Table
            | Self::ClipArt
            | Self::Diagram
            | Self::MediaClip
            | Self::Picture => Self::Body,
            other => *other,
        }
    }

    /// Date, footer and slide-number placeholders are not copied onto new
    /// slides.
    pub fn is_slide_furniture(&self) -> bool {
        matches!(
            self,
            Self::DateAndTime | Self::Footer | Self::SlideNumber | Self::Header
        )
    }
}

impl fmt::Display for PlaceholderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.xml_value())
    }
}

/// Identity of a placeholder: its type and index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceholderInfo {
    pub ph_type: PlaceholderType,
    pub idx: u32,
}

impl PlaceholderInfo {
    pub fn new(ph_type: PlaceholderType, idx: u32) -> Self {
        Self { ph_type, idx }
    }

    /// Read a `p:ph` element. A missing `type` means `obj`, a missing `idx`
    /// means 0.
    pub fn from_ph(ph: &Element) -> Self {
        let ph_type = ph
            .attr("type")
            .map(PlaceholderType::from_xml_value)
            .unwrap_or(PlaceholderType::Object);
        let idx = ph
            .attr("idx")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        Self { ph_type, idx }
    }

    /// Placeholder properties of a shape element, found under its
    /// non-visual properties (`p:nvSpPr/p:nvPr/p:ph` and the like).
    pub fn from_shape(shape: &Element) -> Option<Self> {
        let nv = shape
            .elements()
            .find(|e| e.local_name().starts_with("nv"))?;
        nv.child_path(&["nvPr", "ph"]).map(Self::from_ph)
    }

    /// Build the `p:ph` element. Default attribute values are omitted.
    pub fn to_element(&self) -> Element {
        let mut ph = Element::new("p:ph");
        if self.ph_type != PlaceholderType::Object {
            ph.set_attr("type", self.ph_type.xml_value());
        }
        if self.idx != 0 {
            ph.set_attr("idx", self.idx.to_string());
        }
        ph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_type_values() {
        assert_eq!(PlaceholderType::from_xml_value("ctrTitle"), PlaceholderType::CenterTitle);
        assert_eq!(PlaceholderType::from_xml_value("sldNum"), PlaceholderType::SlideNumber);
        assert_eq!(PlaceholderType::from_xml_value("bogus"), PlaceholderType::Object);
        assert_eq!(PlaceholderType::Diagram.to_string(), "dgm");
    }

    #[test]
    fn test_base_type_mapping() {
        assert_eq!(PlaceholderType::CenterTitle.base_type(), PlaceholderType::Title);
        assert_eq!(PlaceholderType::SubTitle.base_type(), PlaceholderType::Body);
        assert_eq!(PlaceholderType::Object.base_type(), PlaceholderType::Body);
        assert_eq!(PlaceholderType::Picture.base_type(), PlaceholderType::Body);
        assert_eq!(PlaceholderType::Footer.base_type(), PlaceholderType::Footer);
        assert_eq!(PlaceholderType::Title.base_type(), PlaceholderType::Title);
    }

    #[test]
    fn test_ph_defaults() {
        let info = PlaceholderInfo::from_ph(&Element::new("p:ph"));
        assert_eq!(info, PlaceholderInfo::new(PlaceholderType::Object, 0));

        let ph = Element::new("p:ph").with_attr("type", "body").with_attr("idx", "1");
        assert_eq!(
            PlaceholderInfo::from_ph(&ph),
            PlaceholderInfo::new(PlaceholderType::Body, 1)
        );
    }

    #[test]
    fn test_from_shape() {
        let sp = Element::new("p:sp").with_child(
            Element::new("p:nvSpPr")
                .with_child(Element::new("p:cNvPr").with_attr("id", "2"))
                .with_child(Element::new("p:cNvSpPr"))
                .with_child(
                    Element::new("p:nvPr")
                        .with_child(Element::new("p:ph").with_attr("type", "title")),
                ),
        );
        assert_eq!(
            PlaceholderInfo::from_shape(&sp),
            Some(PlaceholderInfo::new(PlaceholderType::Title, 0))
        );

        let plain = Element::new("p:sp")
            .with_child(Element::new("p:nvSpPr").with_child(Element::new("p:nvPr")));
        assert_eq!(PlaceholderInfo::from_shape(&plain), None);
    }

    #[test]
    fn test_to_element_omits_defaults() {
        let ph = PlaceholderInfo::new(PlaceholderType::Object, 0).to_element();
        assert!(ph.attrs().is_empty());

        let ph = PlaceholderInfo::new(PlaceholderType::Body, 3).to_element();
        assert_eq!(ph.attr("type"), Some("body"));
        assert_eq!(ph.attr("idx"), Some("3"));
    }
}
