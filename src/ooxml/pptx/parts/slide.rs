/// Slide parts and related types.
///
/// This module contains parts for slides, slide layouts, and slide masters.
use crate::common::xml::Element;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::{content_type as ct, namespace, relationship_type as rt};
use crate::ooxml::opc::packuri::PackURI;
use crate::ooxml::opc::part::Part;
use crate::ooxml::pptx::shapes::tree::{ShapeTree, new_sp_tree, sp_tree_of};

/// Behaviour shared by slides, layouts and masters: a named `p:cSld`
/// holding a shape tree.
pub trait BaseSlidePart<'a> {
    fn part(&self) -> &'a Part;

    fn root(&self) -> &'a Element;

    fn partname(&self) -> &'a PackURI {
        self.part().partname()
    }

    /// `p:cSld/@name`.
    fn name(&self) -> Option<&'a str> {
        self.root().child("cSld")?.attr("name")
    }

    fn shape_tree(&self) -> Option<ShapeTree<'a>> {
        sp_tree_of(self.root()).map(ShapeTree::new)
    }

    /// All text on the part, one line per paragraph, shapes in z-order.
    fn text(&self) -> String {
        let Some(tree) = self.shape_tree() else {
            return String::new();
        };
        tree.shapes()
            .iter()
            .filter_map(|s| s.text())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Target of the single relationship of `reltype`.
    fn related(&self, reltype: &str) -> Option<&'a PackURI> {
        self.part().rels().part_with_reltype(reltype).ok()
    }
}

fn view_root<'a>(part: &'a Part, expected: &str) -> Result<&'a Element> {
    if part.content_type() != expected {
        return Err(OoxmlError::InvalidContentType {
            expected: expected.to_string(),
            got: part.content_type().to_string(),
        });
    }
    part.xml()
        .ok_or_else(|| OoxmlError::InvalidFormat(format!("{} is not XML", part.partname())))
}

macro_rules! slide_view {
    ($(#[$doc:meta])* $name:ident, $content_type:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy)]
        pub struct $name<'a> {
            part: &'a Part,
            root: &'a Element,
        }

        impl<'a> $name<'a> {
            pub fn from_part(part: &'a Part) -> Result<Self> {
                let root = view_root(part, $content_type)?;
                Ok(Self { part, root })
            }
        }

        impl<'a> BaseSlidePart<'a> for $name<'a> {
            fn part(&self) -> &'a Part {
                self.part
            }

            fn root(&self) -> &'a Element {
                self.root
            }
        }
    };
}

slide_view!(
    /// A slide part.
    ///
    /// Corresponds to `/ppt/slides/slideN.xml` in the package.
    SlidePart,
    ct::PML_SLIDE
);

slide_view!(
    /// A slide layout part.
    ///
    /// Corresponds to `/ppt/slideLayouts/slideLayoutN.xml` in the package.
    SlideLayoutPart,
    ct::PML_SLIDE_LAYOUT
);

slide_view!(
    /// A slide master part.
    ///
    /// Corresponds to `/ppt/slideMasters/slideMasterN.xml` in the package.
    SlideMasterPart,
    ct::PML_SLIDE_MASTER
);

impl<'a> SlidePart<'a> {
    /// The layout this slide is based on.
    pub fn layout_partname(&self) -> Option<&'a PackURI> {
        self.related(rt::SLIDE_LAYOUT)
    }

    pub fn notes_slide_partname(&self) -> Option<&'a PackURI> {
        self.related(rt::NOTES_SLIDE)
    }
}

impl<'a> SlideLayoutPart<'a> {
    /// The master this layout inherits from.
    pub fn master_partname(&self) -> Option<&'a PackURI> {
        self.related(rt::SLIDE_MASTER)
    }
}

impl<'a> SlideMasterPart<'a> {
    /// Relationship ids of the master's layouts (`p:sldLayoutIdLst`).
    pub fn slide_layout_r_ids(&self) -> Vec<&'a str> {
        self.root
            .child("sldLayoutIdLst")
            .map(|lst| {
                lst.children_named("sldLayoutId")
                    .filter_map(|e| e.attr("r:id"))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Layout partnames in list order.
    pub fn slide_layout_partnames(&self) -> Vec<&'a PackURI> {
        self.slide_layout_r_ids()
            .into_iter()
            .filter_map(|r_id| self.part.rels().get(r_id)?.target_partname())
            .collect()
    }
}

/// Root element of a new, empty slide.
pub fn new_slide_xml() -> Element {
    Element::new("p:sld")
        .with_attr("xmlns:a", namespace::DML_MAIN)
        .with_attr("xmlns:r", namespace::OFC_RELATIONSHIPS)
        .with_attr("xmlns:p", namespace::PML_MAIN)
        .with_child(Element::new("p:cSld").with_child(new_sp_tree()))
        .with_child(
            Element::new("p:clrMapOvr").with_child(Element::new("a:masterClrMapping")),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::opc::rel::RelTarget;

    fn uri(s: &str) -> PackURI {
        PackURI::new(s).unwrap()
    }

    #[test]
    fn test_new_slide_is_empty() {
        let part = Part::new_xml(uri("/ppt/slides/slide1.xml"), ct::PML_SLIDE, new_slide_xml());
        let slide = SlidePart::from_part(&part).unwrap();
        assert_eq!(slide.name(), None);
        assert!(slide.shape_tree().unwrap().shapes().is_empty());
        assert_eq!(slide.text(), "");
        assert_eq!(slide.layout_partname(), None);
    }

    #[test]
    fn test_layout_relationship() {
        let layout = uri("/ppt/slideLayouts/slideLayout2.xml");
        let mut part = Part::new_xml(uri("/ppt/slides/slide1.xml"), ct::PML_SLIDE, new_slide_xml());
        part.rels_mut().add(rt::SLIDE_LAYOUT, RelTarget::Part(layout.clone()));
        let slide = SlidePart::from_part(&part).unwrap();
        assert_eq!(slide.layout_partname(), Some(&layout));
    }

    #[test]
    fn test_content_type_checked() {
        let part = Part::new_xml(uri("/ppt/slides/slide1.xml"), ct::PML_SLIDE, new_slide_xml());
        assert!(matches!(
            SlideLayoutPart::from_part(&part),
            Err(OoxmlError::InvalidContentType { .. })
        ));
    }

    #[test]
    fn test_master_layout_list() {
        let xml = br#"<p:sldMaster xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><p:cSld name="Office"><p:spTree/></p:cSld><p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/><p:sldLayoutId id="2147483650" r:id="rId2"/></p:sldLayoutIdLst></p:sldMaster>"#;
        let mut part = Part::load(
            uri("/ppt/slideMasters/slideMaster1.xml"),
            ct::PML_SLIDE_MASTER,
            xml.to_vec(),
        )
        .unwrap();
        part.rels_mut().load("rId1", rt::SLIDE_LAYOUT, RelTarget::Part(uri("/ppt/slideLayouts/slideLayout1.xml"))).unwrap();
        part.rels_mut().load("rId2", rt::SLIDE_LAYOUT, RelTarget::Part(uri("/ppt/slideLayouts/slideLayout2.xml"))).unwrap();

        let master = SlideMasterPart::from_part(&part).unwrap();
        assert_eq!(master.name(), Some("Office"));
        assert_eq!(master.slide_layout_r_ids(), vec!["rId1", "rId2"]);
        assert_eq!(master.slide_layout_partnames().len(), 2);
        assert_eq!(
            master.slide_layout_partnames()[1].as_str(),
            "/ppt/slideLayouts/slideLayout2.xml"
        );
    }
}
