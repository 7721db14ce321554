/// Open Packaging Convention (OPC) objects related to package parts.
///
/// A part is the unit of content in a package: a partname, a content type,
/// the payload and the relationships that originate from it. XML payloads are
/// kept as an editable element tree; everything else stays as raw bytes.
use crate::common::xml::Element;
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::PackURI;
use crate::ooxml::opc::rel::Relationships;
use std::borrow::Cow;

/// Check whether a content type denotes XML (`+xml` or `/xml` suffix).
#[inline]
pub fn is_xml_content_type(content_type: &str) -> bool {
    content_type.ends_with("+xml") || content_type.ends_with("/xml")
}

/// Payload of a part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartContent {
    Xml(Element),
    Blob(Vec<u8>),
}

/// A part owned by a package.
#[derive(Debug, Clone)]
pub struct Part {
    partname: PackURI,
    content_type: String,
    content: PartContent,
    rels: Relationships,
}

impl Part {
    pub fn new_xml(partname: PackURI, content_type: impl Into<String>, root: Element) -> Self {
        let rels = Relationships::new(partname.clone());
        Self {
            partname,
            content_type: content_type.into(),
            content: PartContent::Xml(root),
            rels,
        }
    }

    pub fn new_blob(partname: PackURI, content_type: impl Into<String>, blob: Vec<u8>) -> Self {
        let rels = Relationships::new(partname.clone());
        Self {
            partname,
            content_type: content_type.into(),
            content: PartContent::Blob(blob),
            rels,
        }
    }

    /// Build a part from serialized bytes, parsing XML content types.
    pub fn load(partname: PackURI, content_type: &str, blob: Vec<u8>) -> Result<Self> {
        if is_xml_content_type(content_type) {
            let root = Element::parse(&blob).map_err(|e| OpcError::xml(partname.as_str(), e))?;
            Ok(Self::new_xml(partname, content_type, root))
        } else {
            Ok(Self::new_blob(partname, content_type, blob))
        }
    }

    #[inline]
    pub fn partname(&self) -> &PackURI {
        &self.partname
    }

    #[inline]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    #[inline]
    pub fn content(&self) -> &PartContent {
        &self.content
    }

    #[inline]
    pub fn rels(&self) -> &Relationships {
        &self.rels
    }

    #[inline]
    pub fn rels_mut(&mut self) -> &mut Relationships {
        &mut self.rels
    }

    pub(crate) fn set_rels(&mut self, rels: Relationships) {
        self.rels = rels;
    }

    #[inline]
    pub fn is_xml(&self) -> bool {
        matches!(self.content, PartContent::Xml(_))
    }

    /// Root element of an XML part.
    pub fn xml(&self) -> Option<&Element> {
        match &self.content {
            PartContent::Xml(root) => Some(root),
            PartContent::Blob(_) => None,
        }
    }

    pub fn xml_mut(&mut self) -> Option<&mut Element> {
        match &mut self.content {
            PartContent::Xml(root) => Some(root),
            PartContent::Blob(_) => None,
        }
    }

    /// Serialized payload.
    pub fn blob(&self) -> Cow<'_, [u8]> {
        match &self.content {
            PartContent::Xml(root) => Cow::Owned(root.to_xml_bytes()),
            PartContent::Blob(bytes) => Cow::Borrowed(bytes),
        }
    }

    pub fn set_content(&mut self, content: PartContent) {
        self.content = content;
    }

    /// Count the attributes in this part's XML that refer to `r_id` through
    /// the relationships namespace (`r:id`, `r:embed`, `r:link`, ...).
    /// Binary parts never reference their relationships.
    pub fn rel_ref_count(&self, r_id: &str) -> usize {
        let Some(root) = self.xml() else {
            return 0;
        };
        let mut count = 0;
        root.walk(&mut |el| {
            count += el
                .attrs()
                .iter()
                .filter(|(k, v)| k.starts_with("r:") && v == r_id)
                .count();
        });
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::opc::constants::content_type as ct;

    #[test]
    fn test_load_dispatches_on_content_type() {
        let slide = Part::load(
            PackURI::new("/ppt/slides/slide1.xml").unwrap(),
            ct::PML_SLIDE,
            b"<p:sld xmlns:p=\"urn:p\"/>".to_vec(),
        )
        .unwrap();
        assert!(slide.is_xml());
        assert_eq!(slide.xml().unwrap().name(), "p:sld");

        let image = Part::load(
            PackURI::new("/ppt/media/image1.png").unwrap(),
            ct::PNG,
            vec![0x89, b'P', b'N', b'G'],
        )
        .unwrap();
        assert!(!image.is_xml());
        assert_eq!(&*image.blob(), &[0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn test_load_rejects_broken_xml() {
        let err = Part::load(
            PackURI::new("/ppt/slides/slide1.xml").unwrap(),
            ct::PML_SLIDE,
            b"<p:sld><oops></p:sld>".to_vec(),
        )
        .unwrap_err();
        assert!(matches!(err, OpcError::Xml { ref partname, .. } if partname == "/ppt/slides/slide1.xml"));
    }

    #[test]
    fn test_is_xml_content_type() {
        assert!(is_xml_content_type(ct::PML_SLIDE));
        assert!(is_xml_content_type(ct::XML));
        assert!(!is_xml_content_type(ct::PNG));
        assert!(!is_xml_content_type(ct::SML_SHEET));
    }

    #[test]
    fn test_rel_ref_count() {
        let xml = br#"<p:sld xmlns:p="urn:p" xmlns:a="urn:a" xmlns:r="urn:r"><p:pic><a:blip r:embed="rId2"/></p:pic><p:pic><a:blip r:embed="rId2"/></p:pic><a:hlinkClick r:id="rId3"/></p:sld>"#;
        let part = Part::load(
            PackURI::new("/ppt/slides/slide1.xml").unwrap(),
            ct::PML_SLIDE,
            xml.to_vec(),
        )
        .unwrap();
        assert_eq!(part.rel_ref_count("rId2"), 2);
        assert_eq!(part.rel_ref_count("rId3"), 1);
        assert_eq!(part.rel_ref_count("rId1"), 0);
    }
}
