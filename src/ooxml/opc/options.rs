//! Options controlling how a package is written.

use crate::ooxml::opc::phys_pkg::Compression;

/// Options for serializing a package.
///
/// # Examples
///
/// ```
/// use litchi_pptx::ooxml::opc::{Compression, SaveOptions};
///
/// let options = SaveOptions::new()
///     .with_compression(Compression::Stored)
///     .with_verify(false);
/// assert_eq!(options.compression, Compression::Stored);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOptions {
    /// ZIP compression for every member.
    pub compression: Compression,

    /// Check that every part resolves to a content type and every internal
    /// relationship targets a live part before writing anything.
    pub verify: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            compression: Compression::Deflated,
            verify: true,
        }
    }
}

impl SaveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }
}
