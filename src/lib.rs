//! Litchi PPTX - Open Packaging Conventions engine and PowerPoint editor
//!
//! This library reads, edits and writes Office Open XML presentations
//! (.pptx, .pptm, .potx, .ppsx) while keeping the package internally
//! consistent: every part resolves to a content type, every relationship
//! targets a live part, and parts nothing reaches any more are removed.
//!
//! # Features
//!
//! - **OPC engine**: content-type registry, relationship graph, partname
//!   allocation, atomic saves
//! - **Typed views**: presentation, slides, layouts, masters, charts and
//!   their shape trees
//! - **Placeholder inheritance**: resolve geometry, type, fill and font size
//!   along slide → layout → master
//! - **Editing**: add slides, text boxes, pictures (de-duplicated by
//!   content), tables and charts with embedded workbooks; remove shapes and
//!   slides with orphaned parts cleaned up
//!
//! # Example - Building a presentation
//!
//! ```no_run
//! use litchi_pptx::Package;
//! use litchi_pptx::ooxml::pptx::Geometry;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut pkg = Package::new()?;
//! let layout = pkg.layout_by_name("Title and Content")?.expect("built-in layout");
//! let slide = pkg.add_slide(&layout)?;
//! pkg.clone_layout_placeholders(&slide)?;
//!
//! let logo = std::fs::read("logo.png")?;
//! pkg.add_picture(&slide, &logo, (457_200, 457_200), None)?;
//! pkg.add_text_box(&slide, Geometry::new(0, 0, 3_000_000, 500_000), "Hello", None)?;
//!
//! pkg.save("deck.pptx")?;
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Inspecting an existing file
//!
//! ```no_run
//! use litchi_pptx::Package;
//! use litchi_pptx::ooxml::pptx::BaseSlidePart;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pkg = Package::open("presentation.pptx")?;
//! for partname in pkg.slides()? {
//!     let slide = pkg.slide(&partname)?;
//!     println!("{}: {}", partname, slide.text());
//! }
//! # Ok(())
//! # }
//! ```

/// Types shared by the package engine and the presentation layer: the owned
/// XML tree, colours and units.
pub mod common;

/// OOXML (Office Open XML) package engine and PowerPoint support
pub mod ooxml;

// Re-export commonly used types for convenience
pub use ooxml::pptx::Package;
pub use ooxml::{OoxmlError, OpcPackage, PackURI, Result};
