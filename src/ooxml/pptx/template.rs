//! Presentation template module.
//!
//! Provides minimal valid templates for creating new PowerPoint presentations.
//! These templates contain the bare minimum structure required for a valid .pptx file:
//! one slide master with title, body, date, footer and slide-number placeholders,
//! four slide layouts, a theme and the presentation-level property parts.

use crate::common::xml::{Element, Node};
use crate::ooxml::error::Result;
use chrono::{DateTime, Utc};

macro_rules! resource {
    ($path:literal) => {
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/resources/", $path))
    };
}

/// Names of the built-in slide layouts, in `sldLayoutIdLst` order.
pub const SLIDE_LAYOUT_NAMES: [&str; 4] = ["Title Slide", "Title and Content", "Title Only", "Blank"];

const SLIDE_LAYOUTS: [&str; 4] = [
    resource!("slideLayouts/slideLayout1.xml"),
    resource!("slideLayouts/slideLayout2.xml"),
    resource!("slideLayouts/slideLayout3.xml"),
    resource!("slideLayouts/slideLayout4.xml"),
];

/// Parse a resource, dropping the indentation between elements.
fn load(xml: &str) -> Result<Element> {
    let mut root = Element::parse(xml.as_bytes())?;
    strip_indentation(&mut root);
    Ok(root)
}

fn strip_indentation(el: &mut Element) {
    // Text runs keep their whitespace.
    if el.local_name() == "t" {
        return;
    }
    el.children_mut()
        .retain(|node| !matches!(node, Node::Text(t) if t.trim().is_empty()));
    for child in el.elements_mut() {
        strip_indentation(child);
    }
}

/// Creates an empty presentation with no slides, related to its master as `rId1`.
pub fn default_presentation() -> Result<Element> {
    load(resource!("presentation.xml"))
}

/// Slide master whose layouts are related as `rId1`..`rId4`.
pub fn default_slide_master() -> Result<Element> {
    load(resource!("slideMasters/slideMaster1.xml"))
}

/// All slide layouts, in [`SLIDE_LAYOUT_NAMES`] order.
pub fn default_slide_layouts() -> Result<Vec<Element>> {
    SLIDE_LAYOUTS.iter().map(|xml| load(xml)).collect()
}

pub fn default_theme() -> Result<Element> {
    load(resource!("theme/theme1.xml"))
}

pub fn default_pres_props() -> Result<Element> {
    load(resource!("presProps.xml"))
}

pub fn default_view_props() -> Result<Element> {
    load(resource!("viewProps.xml"))
}

pub fn default_table_styles() -> Result<Element> {
    load(resource!("tableStyles.xml"))
}

pub fn default_app_props() -> Result<Element> {
    load(resource!("docProps/app.xml"))
}

/// Core properties stamped with `now` as both creation and modification time.
pub fn core_props(now: DateTime<Utc>) -> Element {
    let timestamp = now.format("%Y-%m-%dT%H:%M:%SZ").to_string();
    let w3cdtf = |name: &str| {
        Element::new(name)
            .with_attr("xsi:type", "dcterms:W3CDTF")
            .with_text(timestamp.clone())
    };
    Element::new("cp:coreProperties")
        .with_attr(
            "xmlns:cp",
            "http://schemas.openxmlformats.org/package/2006/metadata/core-properties",
        )
        .with_attr("xmlns:dc", "http://purl.org/dc/elements/1.1/")
        .with_attr("xmlns:dcterms", "http://purl.org/dc/terms/")
        .with_attr("xmlns:dcmitype", "http://purl.org/dc/dcmitype/")
        .with_attr("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance")
        .with_child(Element::new("dc:title").with_text("PowerPoint Presentation"))
        .with_child(Element::new("dc:creator").with_text("litchi-pptx"))
        .with_child(Element::new("cp:lastModifiedBy").with_text("litchi-pptx"))
        .with_child(Element::new("cp:revision").with_text("1"))
        .with_child(w3cdtf("dcterms:created"))
        .with_child(w3cdtf("dcterms:modified"))
}
