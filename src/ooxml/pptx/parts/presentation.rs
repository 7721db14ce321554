/// Presentation part - the main part in a .pptx package.
///
/// Corresponds to `/ppt/presentation.xml` in the package.
use crate::common::xml::Element;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::content_type as ct;
use crate::ooxml::opc::packuri::PackURI;
use crate::ooxml::opc::part::Part;
use std::collections::BTreeSet;

/// Lowest id a `p:sldId` may carry.
pub const MIN_SLIDE_ID: u32 = 256;

/// Content types a presentation main part may have.
pub const PRESENTATION_CONTENT_TYPES: [&str; 4] = [
    ct::PML_PRESENTATION_MAIN,
    ct::PML_PRES_MACRO_MAIN,
    ct::PML_TEMPLATE_MAIN,
    ct::PML_SLIDESHOW_MAIN,
];

/// An entry of the slide-id list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideId {
    pub id: u32,
    /// Relationship id of the slide, from the presentation part
    pub r_id: String,
}

/// The main presentation part.
///
/// This part holds the ordered slide-id list, the slide masters and the
/// slide size.
#[derive(Debug, Clone, Copy)]
pub struct PresentationPart<'a> {
    part: &'a Part,
    root: &'a Element,
}

impl<'a> PresentationPart<'a> {
    /// Create a PresentationPart from an OPC Part.
    pub fn from_part(part: &'a Part) -> Result<Self> {
        if !PRESENTATION_CONTENT_TYPES.contains(&part.content_type()) {
            return Err(OoxmlError::InvalidContentType {
                expected: ct::PML_PRESENTATION_MAIN.to_string(),
                got: part.content_type().to_string(),
            });
        }
        let root = part.xml().ok_or_else(|| {
            OoxmlError::InvalidFormat(format!("{} is not XML", part.partname()))
        })?;
        Ok(Self { part, root })
    }

    pub fn partname(&self) -> &'a PackURI {
        self.part.partname()
    }

    /// Slide-id list in presentation order.
    pub fn slide_ids(&self) -> Vec<SlideId> {
        self.root
            .child("sldIdLst")
            .map(|lst| {
                lst.children_named("sldId")
                    .filter_map(|e| {
                        Some(SlideId {
                            id: e.attr("id")?.parse().ok()?,
                            r_id: e.attr("r:id")?.to_string(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn slide_count(&self) -> usize {
        self.slide_ids().len()
    }

    /// Slide partnames in presentation order. Entries whose relationship is
    /// missing are skipped.
    pub fn slide_partnames(&self) -> Vec<PackURI> {
        self.slide_ids()
            .iter()
            .filter_map(|sld| self.target_of(&sld.r_id))
            .collect()
    }

    /// Relationship ids of the slide masters, in order.
    pub fn slide_master_r_ids(&self) -> Vec<String> {
        self.root
            .child("sldMasterIdLst")
            .map(|lst| {
                lst.children_named("sldMasterId")
                    .filter_map(|e| e.attr("r:id").map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn slide_master_partnames(&self) -> Vec<PackURI> {
        self.slide_master_r_ids()
            .iter()
            .filter_map(|r_id| self.target_of(r_id))
            .collect()
    }

    /// Slide size in EMUs (`p:sldSz`).
    pub fn slide_size(&self) -> Option<(i64, i64)> {
        let sz = self.root.child("sldSz")?;
        Some((sz.attr("cx")?.parse().ok()?, sz.attr("cy")?.parse().ok()?))
    }

    fn target_of(&self, r_id: &str) -> Option<PackURI> {
        self.part.rels().get(r_id)?.target_partname().cloned()
    }
}

/// Highest id a `p:sldId` may carry.
pub const MAX_SLIDE_ID: u32 = 2_147_483_647;

/// Id for the next slide: one past the highest in use, at least
/// [`MIN_SLIDE_ID`]. Once the highest id reaches [`MAX_SLIDE_ID`] the lowest
/// unused id in range is handed out instead.
pub fn next_slide_id(root: &Element) -> u32 {
    let used: BTreeSet<u32> = root
        .child("sldIdLst")
        .into_iter()
        .flat_map(|lst| lst.children_named("sldId"))
        .filter_map(|e| e.attr("id")?.parse::<u32>().ok())
        .collect();
    match used.last() {
        None => MIN_SLIDE_ID,
        Some(&max) if max < MAX_SLIDE_ID => (max + 1).max(MIN_SLIDE_ID),
        Some(_) => (MIN_SLIDE_ID..=MAX_SLIDE_ID)
            .find(|id| !used.contains(id))
            .unwrap_or(MIN_SLIDE_ID),
    }
}

/// Append a `p:sldId` for the slide related as `r_id`; returns its id.
pub fn add_slide_id(root: &mut Element, r_id: &str) -> u32 {
    let id = next_slide_id(root);
    ensure_slide_id_list(root).push(
        Element::new("p:sldId")
            .with_attr("id", id.to_string())
            .with_attr("r:id", r_id),
    );
    id
}

/// Remove the `p:sldId` referring to `r_id`.
pub fn remove_slide_id(root: &mut Element, r_id: &str) -> bool {
    root.child_mut("sldIdLst")
        .map(|lst| !lst.remove_elements(|e| e.attr("r:id") == Some(r_id)).is_empty())
        .unwrap_or(false)
}

/// Move the slide at position `from` to position `to`.
pub fn move_slide_id(root: &mut Element, from: usize, to: usize) -> bool {
    let Some(lst) = root.child_mut("sldIdLst") else {
        return false;
    };
    let count = lst.children_named("sldId").count();
    if from >= count || to >= count {
        return false;
    }
    let Some(r_id) = lst
        .children_named("sldId")
        .nth(from)
        .and_then(|e| e.attr("r:id"))
        .map(str::to_string)
    else {
        return false;
    };
    let mut moved = lst.remove_elements(|e| e.attr("r:id") == Some(r_id.as_str()));
    match moved.pop() {
        Some(sld_id) => {
            lst.insert_element(to, sld_id);
            true
        },
        None => false,
    }
}

/// The slide-id list, created in schema order when absent.
fn ensure_slide_id_list(root: &mut Element) -> &mut Element {
    if root.child("sldIdLst").is_none() {
        let position = root
            .elements()
            .enumerate()
            .filter(|(_, e)| {
                matches!(
                    e.local_name(),
                    "sldMasterIdLst" | "notesMasterIdLst" | "handoutMasterIdLst"
                )
            })
            .map(|(i, _)| i + 1)
            .last()
            .unwrap_or(0);
        root.insert_element(position, Element::new("p:sldIdLst"));
    }
    root.get_or_add_child("p:sldIdLst")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::opc::constants::relationship_type as rt;
    use crate::ooxml::opc::rel::RelTarget;

    const XML: &[u8] = br#"<p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldSz cx="9144000" cy="6858000"/><p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#;

    fn part() -> Part {
        Part::load(
            PackURI::new("/ppt/presentation.xml").unwrap(),
            ct::PML_PRESENTATION_MAIN,
            XML.to_vec(),
        )
        .unwrap()
    }

    #[test]
    fn test_slide_id_list_created_in_order() {
        let mut part = part();
        let root = part.xml_mut().unwrap();
        assert_eq!(next_slide_id(root), 256);
        assert_eq!(add_slide_id(root, "rId7"), 256);
        assert_eq!(add_slide_id(root, "rId8"), 257);

        let order: Vec<&str> = root.elements().map(|e| e.local_name()).collect();
        assert_eq!(order, vec!["sldMasterIdLst", "sldIdLst", "sldSz", "notesSz"]);

        let view = PresentationPart::from_part(&part).unwrap();
        let ids = view.slide_ids();
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[1], SlideId { id: 257, r_id: "rId8".to_string() });
        assert_eq!(view.slide_size(), Some((9_144_000, 6_858_000)));
        assert_eq!(view.slide_master_r_ids(), vec!["rId1".to_string()]);
    }

    #[test]
    fn test_ids_continue_past_max() {
        let mut part = part();
        let root = part.xml_mut().unwrap();
        add_slide_id(root, "rId2");
        add_slide_id(root, "rId3");
        assert!(remove_slide_id(root, "rId2"));
        assert!(!remove_slide_id(root, "rId2"));
        assert_eq!(add_slide_id(root, "rId4"), 258);
    }

    #[test]
    fn test_ids_wrap_to_lowest_free_at_limit() {
        let mut part = part();
        let root = part.xml_mut().unwrap();
        add_slide_id(root, "rId2");
        add_slide_id(root, "rId3");
        ensure_slide_id_list(root).push(
            Element::new("p:sldId")
                .with_attr("id", MAX_SLIDE_ID.to_string())
                .with_attr("r:id", "rId4"),
        );
        assert_eq!(next_slide_id(root), 258);

        ensure_slide_id_list(root).push(
            Element::new("p:sldId")
                .with_attr("id", u32::MAX.to_string())
                .with_attr("r:id", "rId5"),
        );
        assert_eq!(add_slide_id(root, "rId6"), 258);
        assert_eq!(next_slide_id(root), 259);
    }

    #[test]
    fn test_move_slide_id() {
        let mut part = part();
        let root = part.xml_mut().unwrap();
        for r_id in ["rId2", "rId3", "rId4"] {
            add_slide_id(root, r_id);
        }
        assert!(move_slide_id(root, 2, 0));
        assert!(!move_slide_id(root, 3, 0));

        let view = PresentationPart::from_part(&part).unwrap();
        let order: Vec<String> = view.slide_ids().into_iter().map(|s| s.r_id).collect();
        assert_eq!(order, vec!["rId4", "rId2", "rId3"]);
    }

    #[test]
    fn test_slide_partnames_follow_relationships() {
        let mut part = part();
        let slide = PackURI::new("/ppt/slides/slide1.xml").unwrap();
        let r_id = part.rels_mut().add(rt::SLIDE, RelTarget::Part(slide.clone()));
        add_slide_id(part.xml_mut().unwrap(), &r_id);
        add_slide_id(part.xml_mut().unwrap(), "rId99");

        let view = PresentationPart::from_part(&part).unwrap();
        assert_eq!(view.slide_count(), 2);
        assert_eq!(view.slide_partnames(), vec![slide]);
    }

    #[test]
    fn test_rejects_other_content_types() {
        let slide = Part::load(
            PackURI::new("/ppt/slides/slide1.xml").unwrap(),
            ct::PML_SLIDE,
            b"<p:sld xmlns:p=\"urn:p\"/>".to_vec(),
        )
        .unwrap();
        assert!(matches!(
            PresentationPart::from_part(&slide),
            Err(OoxmlError::InvalidContentType { .. })
        ));
    }
}
