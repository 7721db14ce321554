/// Open Packaging Conventions (OPC) implementation.
///
/// This module implements the package layer shared by all Office Open XML
/// formats:
///
/// - Partnames and relative references ([`PackURI`])
/// - Content-type registry (`[Content_Types].xml`)
/// - Relationship graph (package and per-part `.rels`)
/// - ZIP-based physical packaging with atomic saves
///
/// # Performance Features
///
/// - Uses `atoi_simd` for fast relationship id parsing
/// - Uses `quick-xml` for XML parsing
/// - Reads the archive into memory once and releases it immediately
pub mod constants;
pub mod content_types;
pub mod error;
pub mod options;
pub mod package;
pub mod packuri;
pub mod part;
pub mod phys_pkg;
pub mod pkgreader;
pub mod pkgwriter;
pub mod rel;

// Re-export commonly used types
pub use content_types::ContentTypeRegistry;
pub use error::{OpcError, Result};
pub use options::SaveOptions;
pub use package::OpcPackage;
pub use packuri::PackURI;
pub use part::{Part, PartContent};
pub use phys_pkg::Compression;
pub use rel::{RelTarget, Relationship, Relationships};
