//! Deserialization of an OPC package from its physical archive.
//!
//! Parts are discovered by walking relationships outward from the package
//! root rather than by listing archive members, so only reachable parts are
//! loaded and every internal relationship is checked against the archive.

use crate::ooxml::opc::content_types::ContentTypeRegistry;
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::{CONTENT_TYPES_URI, PackURI};
use crate::ooxml::opc::part::Part;
use crate::ooxml::opc::phys_pkg::PhysPkgReader;
use crate::ooxml::opc::rel::Relationships;
use std::collections::{BTreeMap, HashSet};

/// Everything read from an archive, ready to be assembled into a package.
#[derive(Debug)]
pub struct LoadedPackage {
    pub content_types: ContentTypeRegistry,
    pub rels: Relationships,
    pub parts: BTreeMap<PackURI, Part>,
}

/// Reads the logical package out of a [`PhysPkgReader`].
pub struct PackageReader<'a> {
    phys: &'a PhysPkgReader,
}

impl<'a> PackageReader<'a> {
    pub fn new(phys: &'a PhysPkgReader) -> Self {
        Self { phys }
    }

    pub fn read(&self) -> Result<LoadedPackage> {
        let content_types = self.read_content_types()?;
        let rels = self.read_package_rels()?;

        let mut parts = BTreeMap::new();
        let mut visited: HashSet<PackURI> = HashSet::new();
        let mut pending: Vec<(PackURI, String, PackURI)> = Vec::new();
        queue_targets(&rels, &mut pending);

        while let Some((source, r_id, partname)) = pending.pop() {
            if !visited.insert(partname.clone()) {
                continue;
            }
            log::trace!("Loading {} via {} from {}", partname, r_id, source);

            let blob = self
                .phys
                .blob_for(&partname)
                .ok_or_else(|| OpcError::MissingPart {
                    source_uri: source.to_string(),
                    r_id: r_id.clone(),
                    partname: partname.to_string(),
                })?;
            let content_type = content_types.resolve(&partname)?;
            let mut part = Part::load(partname.clone(), content_type, blob.to_vec())?;

            if let Some(rels_xml) = self.phys.rels_xml_for(&partname) {
                let part_rels = Relationships::from_xml(partname.clone(), rels_xml)?;
                queue_targets(&part_rels, &mut pending);
                part.set_rels(part_rels);
            }
            parts.insert(partname, part);
        }

        log::debug!(
            "Loaded {} parts from {} archive members",
            parts.len(),
            self.phys.len()
        );

        Ok(LoadedPackage {
            content_types,
            rels,
            parts,
        })
    }

    fn read_content_types(&self) -> Result<ContentTypeRegistry> {
        let xml = self.phys.content_types_xml().ok_or_else(|| {
            OpcError::MalformedPackage(format!("missing {}", CONTENT_TYPES_URI))
        })?;
        ContentTypeRegistry::from_xml(xml)
    }

    fn read_package_rels(&self) -> Result<Relationships> {
        let package = PackURI::package();
        let xml = self.phys.rels_xml_for(&package).ok_or_else(|| {
            OpcError::MalformedPackage(format!("missing {}", package.rels_uri()))
        })?;
        Relationships::from_xml(package, xml).map_err(|e| {
            OpcError::MalformedPackage(format!("unreadable package relationships: {}", e))
        })
    }
}

/// Push the internal targets of `rels` in reverse so they pop in document order.
fn queue_targets(rels: &Relationships, pending: &mut Vec<(PackURI, String, PackURI)>) {
    for rel in rels.iter().collect::<Vec<_>>().into_iter().rev() {
        if let Some(target) = rel.target_partname() {
            pending.push((rels.source().clone(), rel.r_id().to_string(), target.clone()));
        }
    }
}
