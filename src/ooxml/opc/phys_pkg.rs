//! Physical (ZIP) layer of an OPC package.
//!
//! The reader drains the whole archive into memory on open, so no file handle
//! outlives deserialization. The writer produces archives with fixed entry
//! timestamps so the same package always serializes to the same bytes.

use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::{CONTENT_TYPES_URI, PackURI};
use std::collections::HashMap;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

/// Upper bound on the buffer reserved up front for one member. The size in
/// the central directory is untrusted; larger members grow while reading.
const MAX_PREALLOC: u64 = 64 * 1024 * 1024;

fn prealloc_hint(declared: u64) -> usize {
    usize::try_from(declared.min(MAX_PREALLOC)).unwrap_or(0)
}

/// Physical package reader holding every archive member in memory.
#[derive(Debug, Default)]
pub struct PhysPkgReader {
    members: HashMap<String, Vec<u8>>,
}

impl PhysPkgReader {
    /// Open an OPC package from a file path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_zip(std::io::BufReader::new(file))
    }

    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_zip(Cursor::new(data))
    }

    /// Read a package from any reader, buffering it first.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(data)
    }

    fn from_zip<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| OpcError::MalformedPackage(format!("not a ZIP archive: {}", e)))?;

        let mut members = HashMap::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            let mut data = Vec::with_capacity(prealloc_hint(file.size()));
            file.read_to_end(&mut data)?;
            members.insert(name, data);
        }
        log::debug!("Read {} archive members", members.len());
        Ok(Self { members })
    }

    /// Binary content of a part.
    pub fn blob_for(&self, partname: &PackURI) -> Option<&[u8]> {
        self.members.get(partname.membername()).map(Vec::as_slice)
    }

    /// The `[Content_Types].xml` member.
    pub fn content_types_xml(&self) -> Option<&[u8]> {
        self.members
            .get(&CONTENT_TYPES_URI[1..])
            .map(Vec::as_slice)
    }

    /// The relationships member for `source`, if it has one.
    pub fn rels_xml_for(&self, source: &PackURI) -> Option<&[u8]> {
        self.blob_for(&source.rels_uri())
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(String::as_str)
    }

    pub fn contains(&self, partname: &PackURI) -> bool {
        self.members.contains_key(partname.membername())
    }
}

/// ZIP compression used for written members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    #[default]
    Deflated,
    Stored,
}

impl From<Compression> for CompressionMethod {
    fn from(c: Compression) -> Self {
        match c {
            Compression::Deflated => CompressionMethod::Deflated,
            Compression::Stored => CompressionMethod::Stored,
        }
    }
}

/// Physical package writer over an in-memory ZIP archive.
pub struct PhysPkgWriter {
    zip: ZipWriter<Cursor<Vec<u8>>>,
    options: SimpleFileOptions,
}

impl PhysPkgWriter {
    pub fn new(compression: Compression) -> Self {
        let options = SimpleFileOptions::default()
            .compression_method(compression.into())
            .last_modified_time(DateTime::default());
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
            options,
        }
    }

    /// Write one member under the partname's membername.
    pub fn write(&mut self, partname: &PackURI, blob: &[u8]) -> Result<()> {
        self.zip.start_file(partname.membername(), self.options)?;
        self.zip.write_all(blob)?;
        Ok(())
    }

    /// Finish the archive and return its bytes.
    pub fn finish(self) -> Result<Vec<u8>> {
        Ok(self.zip.finish()?.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read_members() {
        let mut writer = PhysPkgWriter::new(Compression::Deflated);
        let slide = PackURI::new("/ppt/slides/slide1.xml").unwrap();
        writer.write(&slide, b"<p:sld/>").unwrap();
        writer
            .write(&PackURI::new(CONTENT_TYPES_URI).unwrap(), b"<Types/>")
            .unwrap();
        let bytes = writer.finish().unwrap();

        let reader = PhysPkgReader::from_bytes(bytes).unwrap();
        assert_eq!(reader.len(), 2);
        assert_eq!(reader.blob_for(&slide), Some(&b"<p:sld/>"[..]));
        assert_eq!(reader.content_types_xml(), Some(&b"<Types/>"[..]));
        assert!(reader.rels_xml_for(&slide).is_none());
    }

    #[test]
    fn test_output_is_reproducible() {
        let build = |compression| {
            let mut writer = PhysPkgWriter::new(compression);
            writer
                .write(&PackURI::new("/a.xml").unwrap(), b"<a>same bytes</a>")
                .unwrap();
            writer.finish().unwrap()
        };
        assert_eq!(build(Compression::Deflated), build(Compression::Deflated));
        assert_eq!(build(Compression::Stored), build(Compression::Stored));
    }

    #[test]
    fn test_declared_size_does_not_drive_allocation() {
        assert_eq!(prealloc_hint(0), 0);
        assert_eq!(prealloc_hint(4096), 4096);
        assert_eq!(prealloc_hint(u64::MAX), MAX_PREALLOC as usize);
        assert_eq!(prealloc_hint(MAX_PREALLOC + 1), MAX_PREALLOC as usize);
    }

    #[test]
    fn test_not_a_zip() {
        let err = PhysPkgReader::from_bytes(b"plain text".to_vec()).unwrap_err();
        assert!(matches!(err, OpcError::MalformedPackage(_)));
    }
}
