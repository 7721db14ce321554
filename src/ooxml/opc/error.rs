/// Error types for OPC package operations
use crate::common::xml::XmlError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OpcError {
    /// The archive is not a usable package: bad zip container, or the content
    /// types / package relationships are missing or unparsable.
    #[error("Malformed package: {0}")]
    MalformedPackage(String),

    /// A relationship points at a part that the archive does not contain.
    #[error("Relationship '{r_id}' from {source_uri} targets missing part {partname}")]
    MissingPart {
        source_uri: String,
        r_id: String,
        partname: String,
    },

    /// Removing the part would leave live relationships pointing at nothing.
    #[error("Part {partname} is still referenced by: {}", referrers.join(", "))]
    DanglingRelationship {
        partname: String,
        referrers: Vec<String>,
    },

    #[error("No content type resolves for partname: {0}")]
    UnresolvedContentType(String),

    #[error("Invalid pack URI: {0}")]
    InvalidPackUri(String),

    #[error("Part not found: {0}")]
    PartNotFound(String),

    #[error("Part already exists: {0}")]
    DuplicatePart(String),

    #[error("Relationship not found: {0}")]
    RelationshipNotFound(String),

    #[error("Invalid relationship: {0}")]
    InvalidRelationship(String),

    #[error("XML error in {partname}: {source}")]
    Xml {
        partname: String,
        #[source]
        source: XmlError,
    },

    #[error("ZIP error: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl OpcError {
    /// Wrap an XML error with the name of the part being parsed.
    pub(crate) fn xml(partname: &str, source: XmlError) -> Self {
        OpcError::Xml {
            partname: partname.to_string(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, OpcError>;
