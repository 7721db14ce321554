/// Shapes module for PowerPoint presentations.
///
/// This module provides types for working with shapes on slides, including:
/// - Text shapes with text frames
/// - Pictures (images)
/// - Tables and chart frames
/// - Placeholders
///
/// The design follows the python-pptx library structure.
pub mod base;
pub mod graphicframe;
pub mod picture;
pub mod placeholder;
pub mod table;
pub mod textframe;
pub mod tree;

pub use base::{AutoShape, Geometry, GroupShape, Shape, ShapeBase};
pub use graphicframe::ChartFrame;
pub use picture::Picture;
pub use placeholder::{PlaceholderInfo, PlaceholderType};
pub use table::{Table, TableCell};
pub use textframe::{Paragraph, TextFrame};
pub use tree::{ShapeTree, ShapeTreeMut};
