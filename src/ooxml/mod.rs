//! Office Open XML (OOXML) format implementation.
//!
//! The module is organized into layers:
//!
//! 1. **OPC Layer** (`opc`): package handling (ZIP container, parts,
//!    relationships, content types)
//! 2. **Errors** (`error`): the error type shared by the format layer
//! 3. **PowerPoint** (`pptx`): presentation views and editing
//!
//! # Example
//!
//! ```rust,no_run
//! use litchi_pptx::ooxml::pptx::Package;
//!
//! let pkg = Package::open("presentation.pptx")?;
//! for slide in pkg.slides()? {
//!     println!("{}", slide);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
pub mod error;
pub mod opc;
pub mod pptx;

// Re-export commonly used types from OPC layer
pub use opc::{OpcPackage, PackURI};

// Re-export error types
pub use error::{OoxmlError, Result};
