//! Content-type registry backed by `[Content_Types].xml`.
//!
//! A part's content type is found by exact partname override first, then by the
//! default registered for its extension (matched case-insensitively).

use crate::common::xml::{Element, XML_DECLARATION, escape_xml};
use crate::ooxml::opc::constants::{content_type as ct, namespace};
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::{CONTENT_TYPES_URI, PackURI};
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Extension/content-type pairs that are written as `Default` entries rather
/// than one `Override` per part.
const DEFAULT_PAIRS: &[(&str, &str)] = &[
    ("bin", ct::OFC_PACKAGE),
    ("bmp", ct::BMP),
    ("emf", ct::X_EMF),
    ("gif", ct::GIF),
    ("jpeg", ct::JPEG),
    ("jpg", ct::JPEG),
    ("png", ct::PNG),
    ("rels", ct::OPC_RELATIONSHIPS),
    ("tif", ct::TIFF),
    ("tiff", ct::TIFF),
    ("wmf", ct::X_WMF),
    ("xlsx", ct::SML_SHEET),
    ("xml", ct::XML),
];

/// Check whether an extension/content-type pair belongs in a `Default` entry.
#[inline]
pub fn is_default_content_type(ext: &str, content_type: &str) -> bool {
    DEFAULT_PAIRS
        .iter()
        .any(|(e, c)| e.eq_ignore_ascii_case(ext) && *c == content_type)
}

/// Registry of default and override content-type declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentTypeRegistry {
    /// Lower-cased extension to content type.
    defaults: BTreeMap<String, String>,
    /// Partname to content type.
    overrides: BTreeMap<PackURI, String>,
}

impl ContentTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the `rels` and `xml` defaults every package carries.
    pub fn with_standard_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_default("rels", ct::OPC_RELATIONSHIPS);
        registry.register_default("xml", ct::XML);
        registry
    }

    /// Parse `[Content_Types].xml`.
    pub fn from_xml(xml: &[u8]) -> Result<Self> {
        let root = Element::parse(xml).map_err(|e| {
            OpcError::MalformedPackage(format!("{} is not well-formed: {}", CONTENT_TYPES_URI, e))
        })?;
        if root.local_name() != "Types" {
            return Err(OpcError::MalformedPackage(format!(
                "{} root element is <{}>, expected <Types>",
                CONTENT_TYPES_URI,
                root.name()
            )));
        }

        let mut registry = Self::new();
        for entry in root.elements() {
            let content_type = entry.attr("ContentType");
            match (entry.local_name(), content_type) {
                ("Default", Some(content_type)) => {
                    if let Some(ext) = entry.attr("Extension") {
                        registry.register_default(ext, content_type);
                    }
                },
                ("Override", Some(content_type)) => {
                    if let Some(partname) = entry.attr("PartName") {
                        let partname = PackURI::new(partname).map_err(|_| {
                            OpcError::MalformedPackage(format!(
                                "invalid Override partname '{}'",
                                partname
                            ))
                        })?;
                        registry.register_override(partname, content_type);
                    }
                },
                (other, _) => {
                    log::warn!("Ignoring <{}> entry in {}", other, CONTENT_TYPES_URI);
                },
            }
        }
        Ok(registry)
    }

    /// Resolve the content type of `partname`.
    pub fn resolve(&self, partname: &PackURI) -> Result<&str> {
        if let Some(content_type) = self.overrides.get(partname) {
            return Ok(content_type);
        }
        self.default_for(partname.ext())
            .ok_or_else(|| OpcError::UnresolvedContentType(partname.to_string()))
    }

    /// Default content type for an extension, if any.
    pub fn default_for(&self, ext: &str) -> Option<&str> {
        self.defaults
            .get(&ext.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn override_for(&self, partname: &PackURI) -> Option<&str> {
        self.overrides.get(partname).map(String::as_str)
    }

    pub fn register_default(&mut self, ext: &str, content_type: &str) {
        self.defaults
            .insert(ext.to_ascii_lowercase(), content_type.to_string());
    }

    pub fn register_override(&mut self, partname: PackURI, content_type: &str) {
        self.overrides.insert(partname, content_type.to_string());
    }

    pub fn remove_override(&mut self, partname: &PackURI) -> Option<String> {
        self.overrides.remove(partname)
    }

    /// Declare the content type of a newly added part with as few entries as
    /// possible: nothing when the extension default already matches, a new
    /// `Default` for well-known binary pairs, otherwise an `Override`.
    pub fn register_part(&mut self, partname: &PackURI, content_type: &str) {
        let ext = partname.ext();
        match self.default_for(ext) {
            Some(existing) if existing == content_type => {
                self.overrides.remove(partname);
            },
            None if is_default_content_type(ext, content_type) => {
                self.register_default(ext, content_type);
                self.overrides.remove(partname);
            },
            _ => self.register_override(partname.clone(), content_type),
        }
    }

    pub fn defaults(&self) -> impl Iterator<Item = (&str, &str)> {
        self.defaults.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn overrides(&self) -> impl Iterator<Item = (&PackURI, &str)> {
        self.overrides.iter().map(|(k, v)| (k, v.as_str()))
    }

    /// Serialize as `[Content_Types].xml`: defaults sorted by extension, then
    /// overrides sorted by partname.
    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(256 + self.overrides.len() * 160);
        xml.push_str(XML_DECLARATION);
        xml.push('\n');
        let _ = write!(xml, r#"<Types xmlns="{}">"#, namespace::OPC_CONTENT_TYPES);
        for (ext, content_type) in &self.defaults {
            let _ = write!(
                xml,
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                escape_xml(ext),
                escape_xml(content_type)
            );
        }
        for (partname, content_type) in &self.overrides {
            let _ = write!(
                xml,
                r#"<Override PartName="{}" ContentType="{}"/>"#,
                escape_xml(partname.as_str()),
                escape_xml(content_type)
            );
        }
        xml.push_str("</Types>");
        xml
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri(s: &str) -> PackURI {
        PackURI::new(s).unwrap()
    }

    #[test]
    fn test_override_precedes_default() {
        let mut registry = ContentTypeRegistry::with_standard_defaults();
        registry.register_override(uri("/ppt/presentation.xml"), ct::PML_PRESENTATION_MAIN);

        assert_eq!(
            registry.resolve(&uri("/ppt/presentation.xml")).unwrap(),
            ct::PML_PRESENTATION_MAIN
        );
        assert_eq!(registry.resolve(&uri("/customXml/item1.xml")).unwrap(), ct::XML);
    }

    #[test]
    fn test_default_matches_extension_case_insensitively() {
        let mut registry = ContentTypeRegistry::new();
        registry.register_default("PNG", ct::PNG);
        assert_eq!(registry.resolve(&uri("/ppt/media/image1.png")).unwrap(), ct::PNG);
        assert_eq!(registry.resolve(&uri("/ppt/media/image2.Png")).unwrap(), ct::PNG);
    }

    #[test]
    fn test_unresolved_content_type() {
        let registry = ContentTypeRegistry::with_standard_defaults();
        let err = registry.resolve(&uri("/ppt/media/clip.xyz")).unwrap_err();
        assert!(matches!(err, OpcError::UnresolvedContentType(p) if p == "/ppt/media/clip.xyz"));
    }

    #[test]
    fn test_register_part_prefers_defaults() {
        let mut registry = ContentTypeRegistry::with_standard_defaults();
        registry.register_part(&uri("/ppt/media/image1.png"), ct::PNG);
        registry.register_part(&uri("/ppt/slides/slide1.xml"), ct::PML_SLIDE);
        registry.register_part(&uri("/customXml/item1.xml"), ct::XML);

        assert_eq!(registry.default_for("png"), Some(ct::PNG));
        assert_eq!(registry.override_for(&uri("/ppt/media/image1.png")), None);
        assert_eq!(registry.override_for(&uri("/ppt/slides/slide1.xml")), Some(ct::PML_SLIDE));
        assert_eq!(registry.override_for(&uri("/customXml/item1.xml")), None);
    }

    #[test]
    fn test_xml_roundtrip() {
        let mut registry = ContentTypeRegistry::with_standard_defaults();
        registry.register_default("jpeg", ct::JPEG);
        registry.register_override(uri("/ppt/slides/slide2.xml"), ct::PML_SLIDE);
        registry.register_override(uri("/ppt/slides/slide1.xml"), ct::PML_SLIDE);

        let xml = registry.to_xml();
        let slide1 = xml.find("slide1.xml").unwrap();
        let slide2 = xml.find("slide2.xml").unwrap();
        assert!(slide1 < slide2);

        let parsed = ContentTypeRegistry::from_xml(xml.as_bytes()).unwrap();
        assert_eq!(parsed, registry);
    }

    #[test]
    fn test_malformed_content_types() {
        assert!(matches!(
            ContentTypeRegistry::from_xml(b"<Types"),
            Err(OpcError::MalformedPackage(_))
        ));
        assert!(matches!(
            ContentTypeRegistry::from_xml(b"<Other/>"),
            Err(OpcError::MalformedPackage(_))
        ));
    }
}
