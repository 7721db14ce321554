/// Partnames: the absolute, case-sensitive names that identify parts in a package.
///
/// A partname always begins with a forward slash and uses forward slashes as
/// path separators. The package itself is addressed by the pseudo-partname `/`,
/// which is the source of the package-level relationships.
use super::error::{OpcError, Result};

/// The package pseudo-partname, representing the package itself
pub const PACKAGE_URI: &str = "/";

/// The URI for the [Content_Types].xml part
pub const CONTENT_TYPES_URI: &str = "/[Content_Types].xml";

/// A validated partname.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackURI {
    uri: String,
}

impl PackURI {
    /// Create a partname, rejecting relative paths, empty segments and a
    /// trailing slash (the root `/` excepted).
    pub fn new<S: Into<String>>(uri: S) -> Result<Self> {
        let uri = uri.into();
        if !uri.starts_with('/') {
            return Err(OpcError::InvalidPackUri(format!(
                "partname must begin with slash, got '{}'",
                uri
            )));
        }
        if uri != PACKAGE_URI && (uri.ends_with('/') || uri.contains("//")) {
            return Err(OpcError::InvalidPackUri(format!(
                "partname has an empty segment: '{}'",
                uri
            )));
        }
        Ok(PackURI { uri })
    }

    /// The package pseudo-partname `/`.
    pub fn package() -> Self {
        PackURI {
            uri: PACKAGE_URI.to_string(),
        }
    }

    /// Partname for a zip member name such as `ppt/slides/slide1.xml`.
    pub fn from_member(membername: &str) -> Result<Self> {
        Self::new(format!("/{}", membername.trim_start_matches('/')))
    }

    /// Resolve a relationship target reference (like `../slideLayouts/slideLayout1.xml`)
    /// against the directory of its source part (like `/ppt/slides`).
    pub fn from_rel_ref(base_uri: &str, relative_ref: &str) -> Result<Self> {
        let joined = if relative_ref.starts_with('/') {
            relative_ref.to_string()
        } else if base_uri.ends_with('/') {
            format!("{}{}", base_uri, relative_ref)
        } else {
            format!("{}/{}", base_uri, relative_ref)
        };
        Self::new(normalize_path(&joined))
    }

    /// Format a `%d` partname template with `n`, e.g.
    /// `/ppt/slides/slide%d.xml` with 3 gives `/ppt/slides/slide3.xml`.
    pub fn from_template(template: &str, n: u32) -> Result<Self> {
        if !template.contains("%d") {
            return Err(OpcError::InvalidPackUri(format!(
                "partname template has no %d placeholder: '{}'",
                template
            )));
        }
        Self::new(template.replacen("%d", &n.to_string(), 1))
    }

    #[inline]
    pub fn is_package(&self) -> bool {
        self.uri == PACKAGE_URI
    }

    /// Directory portion: `/ppt/slides` for `/ppt/slides/slide1.xml`, `/` for
    /// top-level parts and for the package itself.
    pub fn base_uri(&self) -> &str {
        match self.uri.rfind('/') {
            Some(0) | None => PACKAGE_URI,
            Some(pos) => &self.uri[..pos],
        }
    }

    /// `slide1.xml` for `/ppt/slides/slide1.xml`; empty for the package.
    pub fn filename(&self) -> &str {
        match self.uri.rfind('/') {
            Some(pos) => &self.uri[pos + 1..],
            None => "",
        }
    }

    /// Extension without the leading period; empty when there is none.
    pub fn ext(&self) -> &str {
        let filename = self.filename();
        match filename.rfind('.') {
            Some(pos) => &filename[pos + 1..],
            None => "",
        }
    }

    /// Numeric suffix of the filename stem for tuple partnames.
    ///
    /// `Some(21)` for `/ppt/slides/slide21.xml`, `None` for `/ppt/presentation.xml`.
    pub fn idx(&self) -> Option<u32> {
        let filename = self.filename();
        let stem = match filename.rfind('.') {
            Some(pos) => &filename[..pos],
            None => filename,
        };
        let digits = stem.bytes().rev().take_while(u8::is_ascii_digit).count();
        if digits == 0 || digits == stem.len() {
            return None;
        }
        stem[stem.len() - digits..].parse().ok()
    }

    /// Zip member name: the partname without its leading slash.
    pub fn membername(&self) -> &str {
        &self.uri[1..]
    }

    /// Reference to this partname relative to `base_uri`, as written in a
    /// `.rels` file: `../slideLayouts/slideLayout1.xml` from `/ppt/slides`.
    pub fn relative_ref(&self, base_uri: &str) -> String {
        if base_uri == PACKAGE_URI {
            return self.membername().to_string();
        }

        let from: Vec<&str> = base_uri.split('/').filter(|s| !s.is_empty()).collect();
        let to: Vec<&str> = self.uri.split('/').filter(|s| !s.is_empty()).collect();
        // The filename itself never counts as a shared directory.
        let common = from
            .iter()
            .zip(to.iter().take(to.len().saturating_sub(1)))
            .take_while(|(a, b)| a == b)
            .count();

        let mut segments: Vec<&str> = vec![".."; from.len() - common];
        segments.extend_from_slice(&to[common..]);
        segments.join("/")
    }

    /// Partname of the relationships part for this part:
    /// `/ppt/slides/_rels/slide1.xml.rels` for `/ppt/slides/slide1.xml`,
    /// `/_rels/.rels` for the package.
    pub fn rels_uri(&self) -> PackURI {
        let base = self.base_uri();
        let uri = if base == PACKAGE_URI {
            format!("/_rels/{}.rels", self.filename())
        } else {
            format!("{}/_rels/{}.rels", base, self.filename())
        };
        PackURI { uri }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.uri
    }
}

/// Collapse `.` and `..` segments of an absolute path.
fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {},
            ".." => {
                segments.pop();
            },
            other => segments.push(other),
        }
    }
    format!("/{}", segments.join("/"))
}

impl std::fmt::Display for PackURI {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.uri)
    }
}

impl AsRef<str> for PackURI {
    fn as_ref(&self) -> &str {
        &self.uri
    }
}

impl std::str::FromStr for PackURI {
    type Err = OpcError;

    fn from_str(s: &str) -> Result<Self> {
        PackURI::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri(s: &str) -> PackURI {
        PackURI::new(s).unwrap()
    }

    #[test]
    fn test_validation() {
        assert!(PackURI::new("/ppt/presentation.xml").is_ok());
        assert!(PackURI::new("ppt/presentation.xml").is_err());
        assert!(PackURI::new("/ppt//slide1.xml").is_err());
        assert!(PackURI::new("/ppt/").is_err());
        assert!(PackURI::new("/").is_ok());
    }

    #[test]
    fn test_components() {
        let slide = uri("/ppt/slides/slide21.xml");
        assert_eq!(slide.base_uri(), "/ppt/slides");
        assert_eq!(slide.filename(), "slide21.xml");
        assert_eq!(slide.ext(), "xml");
        assert_eq!(slide.idx(), Some(21));
        assert_eq!(slide.membername(), "ppt/slides/slide21.xml");

        assert_eq!(uri("/ppt/presentation.xml").idx(), None);
        assert_eq!(uri("/ppt/media/image1.PNG").ext(), "PNG");
        assert_eq!(uri("/docProps/core.xml").base_uri(), "/docProps");
        assert_eq!(PackURI::package().base_uri(), "/");
        assert_eq!(PackURI::package().filename(), "");
    }

    #[test]
    fn test_from_rel_ref() {
        let resolved = PackURI::from_rel_ref("/ppt/slides", "../slideLayouts/slideLayout1.xml");
        assert_eq!(resolved.unwrap().as_str(), "/ppt/slideLayouts/slideLayout1.xml");

        let resolved = PackURI::from_rel_ref("/", "ppt/presentation.xml").unwrap();
        assert_eq!(resolved.as_str(), "/ppt/presentation.xml");

        let resolved = PackURI::from_rel_ref("/ppt", "/ppt/media/./image1.png").unwrap();
        assert_eq!(resolved.as_str(), "/ppt/media/image1.png");
    }

    #[test]
    fn test_relative_ref() {
        let layout = uri("/ppt/slideLayouts/slideLayout1.xml");
        assert_eq!(layout.relative_ref("/ppt/slides"), "../slideLayouts/slideLayout1.xml");
        assert_eq!(layout.relative_ref("/ppt"), "slideLayouts/slideLayout1.xml");
        assert_eq!(layout.relative_ref("/"), "ppt/slideLayouts/slideLayout1.xml");
        assert_eq!(layout.relative_ref("/ppt/slideLayouts"), "slideLayout1.xml");

        let embedding = uri("/ppt/embeddings/Microsoft_Excel_Sheet1.xlsx");
        assert_eq!(
            embedding.relative_ref("/ppt/charts"),
            "../embeddings/Microsoft_Excel_Sheet1.xlsx"
        );
    }

    #[test]
    fn test_relative_ref_roundtrip() {
        let base = "/ppt/slides";
        let target = uri("/ppt/media/image3.jpeg");
        let back = PackURI::from_rel_ref(base, &target.relative_ref(base)).unwrap();
        assert_eq!(back, target);
    }

    #[test]
    fn test_rels_uri() {
        assert_eq!(
            uri("/ppt/slides/slide1.xml").rels_uri().as_str(),
            "/ppt/slides/_rels/slide1.xml.rels"
        );
        assert_eq!(PackURI::package().rels_uri().as_str(), "/_rels/.rels");
    }

    #[test]
    fn test_from_template() {
        let slide = PackURI::from_template("/ppt/slides/slide%d.xml", 3).unwrap();
        assert_eq!(slide.as_str(), "/ppt/slides/slide3.xml");
        assert!(PackURI::from_template("/ppt/slides/slide.xml", 3).is_err());
    }
}
