//! PowerPoint (.pptx) presentation support.
//!
//! This module edits Microsoft PowerPoint presentations in the Office Open
//! XML format (.pptx files). It is built in layers on top of [`crate::ooxml::opc`]:
//!
//! - `parts`: read-only typed views over presentation, slide, layout,
//!   master and chart parts
//! - `shapes`: the shape model of a shape tree plus builders for new shapes
//! - `inherit`: placeholder property resolution along slide → layout → master
//! - `Package`: the editing façade that keeps parts, relationships and
//!   content types consistent
//!
//! # Example
//!
//! ```rust
//! use litchi_pptx::ooxml::pptx::Package;
//! use litchi_pptx::ooxml::pptx::shapes::Geometry;
//!
//! let mut pkg = Package::new()?;
//! let layout = pkg.layout_by_name("Blank")?.expect("built-in layout");
//! let slide = pkg.add_slide(&layout)?;
//!
//! let table = pkg.add_table(&slide, 2, 2, Geometry::new(0, 0, 4_000_000, 1_000_000))?;
//! pkg.set_table_cell_text(&slide, table.base.id, 0, 0, "Region")?;
//!
//! let bytes = pkg.to_bytes()?;
//! assert!(!bytes.is_empty());
//! # Ok::<(), litchi_pptx::ooxml::OoxmlError>(())
//! ```

pub mod format;
pub mod image;
pub mod inherit;
pub mod package;
pub mod parts;
pub mod shapes;
pub mod template;
pub mod writer;

pub use format::{ImageFormat, TextFormat};
pub use inherit::{InheritanceChain, Inherited, ResolvedPlaceholder};
pub use package::Package;
pub use parts::{
    BaseSlidePart, ChartData, ChartPart, ChartSeries, ChartType, PresentationPart, SlideLayoutPart,
    SlideMasterPart, SlidePart,
};
pub use shapes::{Geometry, PlaceholderInfo, PlaceholderType, Shape};
