/// Error types for OOXML operations.
use crate::common::xml::XmlError;
use thiserror::Error;

/// Result type for OOXML operations.
pub type Result<T> = std::result::Result<T, OoxmlError>;

/// Error types for OOXML operations.
#[derive(Error, Debug)]
pub enum OoxmlError {
    /// OPC package error
    #[error("OPC error: {0}")]
    Opc(#[from] crate::ooxml::opc::error::OpcError),

    /// XML parsing error
    #[error("XML error: {0}")]
    Xml(#[from] XmlError),

    /// Table requested with a zero row or column count
    #[error("Invalid table dimensions: {rows} rows x {cols} columns")]
    InvalidDimensions { rows: usize, cols: usize },

    /// Image bytes the codec cannot identify or measure
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// No shape with this id in the shape tree
    #[error("Shape {shape_id} not found in {partname}")]
    ShapeNotFound { partname: String, shape_id: u32 },

    /// The shape exists but has no placeholder properties
    #[error("Shape {0} is not a placeholder")]
    NotAPlaceholder(u32),

    /// The shape cannot hold text (a picture, chart or group)
    #[error("Shape {0} has no text frame")]
    NoTextFrame(u32),

    /// Table cell outside the grid
    #[error("Cell ({row}, {col}) is outside table {shape_id}")]
    CellOutOfRange { shape_id: u32, row: usize, col: usize },

    /// Slide position past the end of the slide list
    #[error("Slide index {index} out of range for {count} slides")]
    SlideIndexOutOfRange { index: usize, count: usize },

    /// Invalid content type
    #[error("Invalid content type: expected {expected}, got {got}")]
    InvalidContentType { expected: String, got: String },

    /// Invalid format
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
