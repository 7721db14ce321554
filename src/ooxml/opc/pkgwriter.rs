//! Package writer for OPC packages.
//!
//! Members are written in a fixed order: `[Content_Types].xml`, the package
//! relationships, then every part in partname order, each followed by its own
//! relationships part when it has any.

use crate::ooxml::opc::error::Result;
use crate::ooxml::opc::options::SaveOptions;
use crate::ooxml::opc::package::OpcPackage;
use crate::ooxml::opc::packuri::{CONTENT_TYPES_URI, PackURI};
use crate::ooxml::opc::phys_pkg::PhysPkgWriter;
use std::io::Write;
use std::path::Path;

/// Serializes an [`OpcPackage`] into a ZIP archive.
pub struct PackageWriter;

impl PackageWriter {
    /// Write a package to `path` atomically.
    ///
    /// The archive is written to a temporary file in the destination directory
    /// and renamed over `path` only once complete, so a failed save leaves any
    /// existing file untouched.
    pub fn write<P: AsRef<Path>>(path: P, package: &OpcPackage, options: &SaveOptions) -> Result<()> {
        let path = path.as_ref();
        let bytes = Self::to_bytes(package, options)?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;

        log::debug!("Saved {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }

    /// Write a package to a stream.
    pub fn write_to_stream<W: Write>(
        mut writer: W,
        package: &OpcPackage,
        options: &SaveOptions,
    ) -> Result<()> {
        let bytes = Self::to_bytes(package, options)?;
        writer.write_all(&bytes)?;
        Ok(())
    }

    /// Serialize a package to bytes.
    pub fn to_bytes(package: &OpcPackage, options: &SaveOptions) -> Result<Vec<u8>> {
        if options.verify {
            package.validate()?;
        }

        let mut phys = PhysPkgWriter::new(options.compression);
        phys.write(
            &PackURI::new(CONTENT_TYPES_URI)?,
            package.content_types().to_xml().as_bytes(),
        )?;

        let pkg_rels = package.rels();
        phys.write(&pkg_rels.source().rels_uri(), pkg_rels.to_xml().as_bytes())?;

        for part in package.iter_parts() {
            phys.write(part.partname(), &part.blob())?;
            if !part.rels().is_empty() {
                phys.write(&part.partname().rels_uri(), part.rels().to_xml().as_bytes())?;
            }
        }

        phys.finish()
    }
}
