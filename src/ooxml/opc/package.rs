/// Objects that implement reading and writing OPC packages.
///
/// [`OpcPackage`] owns the three registries of a package: the content-type
/// registry, the parts keyed by partname, and the relationship graph (the
/// package-level relationships plus each part's own). Every mutation goes
/// through the package so the three stay consistent.
use crate::ooxml::opc::constants::relationship_type;
use crate::ooxml::opc::content_types::ContentTypeRegistry;
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::options::SaveOptions;
use crate::ooxml::opc::packuri::PackURI;
use crate::ooxml::opc::part::Part;
use crate::ooxml::opc::phys_pkg::PhysPkgReader;
use crate::ooxml::opc::pkgreader::PackageReader;
use crate::ooxml::opc::pkgwriter::PackageWriter;
use crate::ooxml::opc::rel::{RelTarget, Relationship, Relationships};
use std::collections::{BTreeMap, HashSet};
use std::io::Read;
use std::path::Path;

/// An Open Packaging Convention package held in memory.
#[derive(Debug, Clone)]
pub struct OpcPackage {
    content_types: ContentTypeRegistry,

    /// Package-level relationships (source `/`)
    rels: Relationships,

    parts: BTreeMap<PackURI, Part>,
}

impl Default for OpcPackage {
    fn default() -> Self {
        Self::new()
    }
}

impl OpcPackage {
    /// Create a new empty package.
    pub fn new() -> Self {
        Self {
            content_types: ContentTypeRegistry::with_standard_defaults(),
            rels: Relationships::new(PackURI::package()),
            parts: BTreeMap::new(),
        }
    }

    /// Open a package from a file.
    ///
    /// # Example
    /// ```no_run
    /// use litchi_pptx::ooxml::opc::OpcPackage;
    ///
    /// let pkg = OpcPackage::open("deck.pptx").unwrap();
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let phys = PhysPkgReader::open(path)?;
        Self::from_phys(&phys)
    }

    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let phys = PhysPkgReader::from_bytes(data)?;
        Self::from_phys(&phys)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let phys = PhysPkgReader::from_reader(reader)?;
        Self::from_phys(&phys)
    }

    fn from_phys(phys: &PhysPkgReader) -> Result<Self> {
        let loaded = PackageReader::new(phys).read()?;
        Ok(Self {
            content_types: loaded.content_types,
            rels: loaded.rels,
            parts: loaded.parts,
        })
    }

    /// Save atomically to `path` with default options.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.save_with(path, &SaveOptions::default())
    }

    pub fn save_with<P: AsRef<Path>>(&self, path: P, options: &SaveOptions) -> Result<()> {
        PackageWriter::write(path, self, options)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        PackageWriter::to_bytes(self, &SaveOptions::default())
    }

    pub fn to_bytes_with(&self, options: &SaveOptions) -> Result<Vec<u8>> {
        PackageWriter::to_bytes(self, options)
    }

    #[inline]
    pub fn content_types(&self) -> &ContentTypeRegistry {
        &self.content_types
    }

    #[inline]
    pub fn content_types_mut(&mut self) -> &mut ContentTypeRegistry {
        &mut self.content_types
    }

    /// Package-level relationships.
    #[inline]
    pub fn rels(&self) -> &Relationships {
        &self.rels
    }

    /// Relationships originating from `source`; `/` names the package itself.
    pub fn rels_of(&self, source: &PackURI) -> Result<&Relationships> {
        if source.is_package() {
            return Ok(&self.rels);
        }
        self.get_part(source).map(Part::rels)
    }

    pub fn rels_of_mut(&mut self, source: &PackURI) -> Result<&mut Relationships> {
        if source.is_package() {
            return Ok(&mut self.rels);
        }
        self.get_part_mut(source).map(Part::rels_mut)
    }

    #[inline]
    pub fn contains_part(&self, partname: &PackURI) -> bool {
        self.parts.contains_key(partname)
    }

    pub fn get_part(&self, partname: &PackURI) -> Result<&Part> {
        self.parts
            .get(partname)
            .ok_or_else(|| OpcError::PartNotFound(partname.to_string()))
    }

    pub fn get_part_mut(&mut self, partname: &PackURI) -> Result<&mut Part> {
        self.parts
            .get_mut(partname)
            .ok_or_else(|| OpcError::PartNotFound(partname.to_string()))
    }

    /// Parts in partname order.
    pub fn iter_parts(&self) -> impl Iterator<Item = &Part> {
        self.parts.values()
    }

    pub fn partnames(&self) -> impl Iterator<Item = &PackURI> {
        self.parts.keys()
    }

    #[inline]
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    /// Target of the single package relationship of `reltype`.
    pub fn part_by_reltype(&self, reltype: &str) -> Result<&Part> {
        let partname = self.rels.part_with_reltype(reltype)?;
        self.get_part(partname)
    }

    /// The main document part (`officeDocument` relationship).
    pub fn main_document_part(&self) -> Result<&Part> {
        self.part_by_reltype(relationship_type::OFFICE_DOCUMENT)
    }

    /// Add a part and declare its content type.
    pub fn add_part(&mut self, part: Part) -> Result<()> {
        let partname = part.partname().clone();
        if partname.is_package() {
            return Err(OpcError::InvalidPackUri(
                "the package pseudo-partname cannot name a part".to_string(),
            ));
        }
        if self.parts.contains_key(&partname) {
            return Err(OpcError::DuplicatePart(partname.to_string()));
        }
        self.content_types
            .register_part(&partname, part.content_type());
        log::debug!("Added part {} ({})", partname, part.content_type());
        self.parts.insert(partname, part);
        Ok(())
    }

    /// Remove a part that nothing references any more.
    ///
    /// Fails with [`OpcError::DanglingRelationship`] while any relationship
    /// still targets the part. The part's own outgoing relationships leave with
    /// it and its content-type override is dropped.
    pub fn remove_part(&mut self, partname: &PackURI) -> Result<Part> {
        if !self.parts.contains_key(partname) {
            return Err(OpcError::PartNotFound(partname.to_string()));
        }
        let referrers: Vec<String> = self
            .referrers(partname)
            .into_iter()
            .filter(|(source, _)| source != partname)
            .map(|(source, r_id)| format!("{}#{}", source, r_id))
            .collect();
        if !referrers.is_empty() {
            return Err(OpcError::DanglingRelationship {
                partname: partname.to_string(),
                referrers,
            });
        }

        self.content_types.remove_override(partname);
        let part = self
            .parts
            .remove(partname)
            .ok_or_else(|| OpcError::PartNotFound(partname.to_string()))?;
        log::debug!("Removed part {}", partname);
        Ok(part)
    }

    /// Relate `source` to the part `target`, reusing an existing relationship
    /// of the same type to the same target. Returns the relationship id.
    pub fn relate_to(&mut self, source: &PackURI, target: &PackURI, reltype: &str) -> Result<String> {
        if !self.parts.contains_key(target) {
            return Err(OpcError::PartNotFound(target.to_string()));
        }
        Ok(self.rels_of_mut(source)?.get_or_add(reltype, target))
    }

    /// Add a new relationship from `source` to `target`, even when an
    /// equivalent one exists.
    pub fn add_relationship(&mut self, source: &PackURI, target: &PackURI, reltype: &str) -> Result<String> {
        if !self.parts.contains_key(target) {
            return Err(OpcError::PartNotFound(target.to_string()));
        }
        Ok(self
            .rels_of_mut(source)?
            .add(reltype, RelTarget::Part(target.clone())))
    }

    /// Relate `source` to an external URL, reusing a matching relationship.
    pub fn relate_to_external(&mut self, source: &PackURI, url: &str, reltype: &str) -> Result<String> {
        Ok(self.rels_of_mut(source)?.get_or_add_ext_rel(reltype, url))
    }

    /// Part targeted by relationship `r_id` of `source`.
    pub fn related_part(&self, source: &PackURI, r_id: &str) -> Result<&Part> {
        let rel = self.rels_of(source)?.get(r_id).ok_or_else(|| {
            OpcError::RelationshipNotFound(format!("{} from {}", r_id, source))
        })?;
        let target = rel.target_partname().ok_or_else(|| {
            OpcError::InvalidRelationship(format!("{} from {} is external", r_id, source))
        })?;
        self.get_part(target)
    }

    /// Target of the single relationship of `reltype` from `source`.
    pub fn part_related_by(&self, source: &PackURI, reltype: &str) -> Result<&Part> {
        let target = self.rels_of(source)?.part_with_reltype(reltype)?;
        self.get_part(target)
    }

    /// Remove relationship `r_id` of `source` unless the source part's XML
    /// still refers to it more than once. Returns whether it was removed.
    pub fn drop_rel(&mut self, source: &PackURI, r_id: &str) -> Result<bool> {
        if !source.is_package() && self.get_part(source)?.rel_ref_count(r_id) >= 2 {
            return Ok(false);
        }
        Ok(self.rels_of_mut(source)?.remove(r_id).is_some())
    }

    /// Every `(source, r_id)` pair whose relationship targets `partname`.
    pub fn referrers(&self, partname: &PackURI) -> Vec<(PackURI, String)> {
        std::iter::once(&self.rels)
            .chain(self.parts.values().map(Part::rels))
            .flat_map(|rels| {
                rels.targeting(partname)
                    .map(move |rel| (rels.source().clone(), rel.r_id().to_string()))
            })
            .collect()
    }

    /// Depth-first walk of the relationship graph from the package root.
    ///
    /// Each relationship of every reachable source is yielded exactly once,
    /// cycles included.
    pub fn iter_rels(&self) -> Vec<(&PackURI, &Relationship)> {
        let mut out = Vec::new();
        let mut visited: HashSet<&PackURI> = HashSet::new();
        let mut stack: Vec<&Relationships> = vec![&self.rels];

        while let Some(rels) = stack.pop() {
            for rel in rels.iter() {
                out.push((rels.source(), rel));
            }
            for rel in rels.iter().collect::<Vec<_>>().into_iter().rev() {
                let Some(target) = rel.target_partname() else {
                    continue;
                };
                if let Some(part) = self.parts.get(target)
                    && visited.insert(part.partname())
                {
                    stack.push(part.rels());
                }
            }
        }
        out
    }

    /// Partnames reachable from the package root.
    pub fn reachable_parts(&self) -> HashSet<PackURI> {
        let mut reachable = HashSet::new();
        let mut stack: Vec<&PackURI> = self.rels.iter().filter_map(Relationship::target_partname).collect();
        while let Some(partname) = stack.pop() {
            if !reachable.insert(partname.clone()) {
                continue;
            }
            log::trace!("Reached {}", partname);
            if let Some(part) = self.parts.get(partname) {
                stack.extend(part.rels().iter().filter_map(Relationship::target_partname));
            }
        }
        reachable
    }

    /// Remove every part no longer reachable from the package root and return
    /// their names. Reachable parts cannot reference an unreachable one, so this
    /// never leaves a dangling relationship behind.
    pub fn purge_unreachable(&mut self) -> Vec<PackURI> {
        let reachable = self.reachable_parts();
        let orphans: Vec<PackURI> = self
            .parts
            .keys()
            .filter(|partname| !reachable.contains(*partname))
            .cloned()
            .collect();
        for partname in &orphans {
            self.parts.remove(partname);
            self.content_types.remove_override(partname);
            log::debug!("Purged unreachable part {}", partname);
        }
        orphans
    }

    /// Next available partname for a `%d` template: the lowest positive
    /// integer not already used by a part.
    pub fn next_partname(&self, template: &str) -> Result<PackURI> {
        let mut n = 1u32;
        loop {
            let candidate = PackURI::from_template(template, n)?;
            if !self.parts.contains_key(&candidate) {
                return Ok(candidate);
            }
            n += 1;
        }
    }

    /// Check the package invariants: every part resolves to a content type and
    /// every internal relationship targets a live part.
    pub fn validate(&self) -> Result<()> {
        for part in self.parts.values() {
            let resolved = self.content_types.resolve(part.partname())?;
            if resolved != part.content_type() {
                log::warn!(
                    "{} is declared as {} but holds {}",
                    part.partname(),
                    resolved,
                    part.content_type()
                );
            }
        }
        for rels in std::iter::once(&self.rels).chain(self.parts.values().map(Part::rels)) {
            for rel in rels.iter() {
                if let Some(target) = rel.target_partname()
                    && !self.parts.contains_key(target)
                {
                    return Err(OpcError::MissingPart {
                        source_uri: rels.source().to_string(),
                        r_id: rel.r_id().to_string(),
                        partname: target.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::xml::Element;
    use crate::ooxml::opc::constants::{content_type as ct, relationship_type as rt};
    use proptest::prelude::*;

    fn uri(s: &str) -> PackURI {
        PackURI::new(s).unwrap()
    }

    fn xml_part(name: &str, content_type: &str) -> Part {
        Part::new_xml(uri(name), content_type, Element::new("p:root").with_attr("xmlns:p", "urn:p"))
    }

    /// presentation -> slide1 -> image1, slide1 <-> notes1
    fn sample_package() -> OpcPackage {
        let mut pkg = OpcPackage::new();
        let pres = uri("/ppt/presentation.xml");
        let slide = uri("/ppt/slides/slide1.xml");
        let notes = uri("/ppt/notesSlides/notesSlide1.xml");
        let image = uri("/ppt/media/image1.png");

        pkg.add_part(xml_part(pres.as_str(), ct::PML_PRESENTATION_MAIN)).unwrap();
        pkg.add_part(xml_part(slide.as_str(), ct::PML_SLIDE)).unwrap();
        pkg.add_part(xml_part(notes.as_str(), ct::PML_NOTES_SLIDE)).unwrap();
        pkg.add_part(Part::new_blob(image.clone(), ct::PNG, vec![1, 2, 3])).unwrap();

        pkg.relate_to(&PackURI::package(), &pres, rt::OFFICE_DOCUMENT).unwrap();
        pkg.relate_to(&pres, &slide, rt::SLIDE).unwrap();
        pkg.relate_to(&slide, &image, rt::IMAGE).unwrap();
        pkg.relate_to(&slide, &notes, rt::NOTES_SLIDE).unwrap();
        pkg.relate_to(&notes, &slide, rt::SLIDE).unwrap();
        pkg
    }

    #[test]
    fn test_next_partname_uses_lowest_free_number() {
        let cases: &[(&[u32], u32)] = &[(&[], 1), (&[1], 2), (&[1, 2], 3), (&[2, 3], 1), (&[1, 3], 2)];
        for (existing, expected) in cases {
            let mut pkg = OpcPackage::new();
            for n in *existing {
                pkg.add_part(xml_part(&format!("/ppt/slides/slide{}.xml", n), ct::PML_SLIDE))
                    .unwrap();
            }
            let next = pkg.next_partname("/ppt/slides/slide%d.xml").unwrap();
            assert_eq!(next.as_str(), format!("/ppt/slides/slide{}.xml", expected));
        }
    }

    #[test]
    fn test_add_part_rejects_duplicates() {
        let mut pkg = OpcPackage::new();
        pkg.add_part(xml_part("/ppt/slides/slide1.xml", ct::PML_SLIDE)).unwrap();
        let err = pkg
            .add_part(xml_part("/ppt/slides/slide1.xml", ct::PML_SLIDE))
            .unwrap_err();
        assert!(matches!(err, OpcError::DuplicatePart(_)));
        assert_eq!(
            pkg.content_types().resolve(&uri("/ppt/slides/slide1.xml")).unwrap(),
            ct::PML_SLIDE
        );
    }

    #[test]
    fn test_remove_part_refuses_while_referenced() {
        let mut pkg = sample_package();
        let image = uri("/ppt/media/image1.png");
        match pkg.remove_part(&image).unwrap_err() {
            OpcError::DanglingRelationship { partname, referrers } => {
                assert_eq!(partname, "/ppt/media/image1.png");
                assert_eq!(referrers, ["/ppt/slides/slide1.xml#rId1"]);
            },
            other => panic!("unexpected error: {other}"),
        }

        let slide = uri("/ppt/slides/slide1.xml");
        pkg.rels_of_mut(&slide).unwrap().remove("rId1");
        pkg.remove_part(&image).unwrap();
        assert!(!pkg.contains_part(&image));
        pkg.validate().unwrap();
    }

    #[test]
    fn test_remove_part_drops_override() {
        let mut pkg = OpcPackage::new();
        let orphan = uri("/ppt/slides/slide9.xml");
        pkg.add_part(xml_part(orphan.as_str(), ct::PML_SLIDE)).unwrap();
        pkg.remove_part(&orphan).unwrap();
        assert!(pkg.content_types().override_for(&orphan).is_none());
    }

    #[test]
    fn test_related_part_and_reltype_lookup() {
        let pkg = sample_package();
        let slide = uri("/ppt/slides/slide1.xml");
        assert_eq!(
            pkg.main_document_part().unwrap().partname().as_str(),
            "/ppt/presentation.xml"
        );
        assert_eq!(
            pkg.related_part(&slide, "rId1").unwrap().partname().as_str(),
            "/ppt/media/image1.png"
        );
        assert_eq!(
            pkg.part_related_by(&slide, rt::NOTES_SLIDE).unwrap().content_type(),
            ct::PML_NOTES_SLIDE
        );
        assert!(matches!(
            pkg.related_part(&slide, "rId99"),
            Err(OpcError::RelationshipNotFound(_))
        ));
    }

    #[test]
    fn test_relate_to_requires_live_target() {
        let mut pkg = sample_package();
        let err = pkg
            .relate_to(&uri("/ppt/slides/slide1.xml"), &uri("/ppt/media/missing.png"), rt::IMAGE)
            .unwrap_err();
        assert!(matches!(err, OpcError::PartNotFound(_)));
    }

    #[test]
    fn test_drop_rel_respects_reference_count() {
        let mut pkg = sample_package();
        let slide = uri("/ppt/slides/slide1.xml");
        {
            let root = pkg.get_part_mut(&slide).unwrap().xml_mut().unwrap();
            root.push(Element::new("a:blip").with_attr("r:embed", "rId1"));
            root.push(Element::new("a:blip").with_attr("r:embed", "rId1"));
        }
        assert!(!pkg.drop_rel(&slide, "rId1").unwrap());
        assert!(pkg.rels_of(&slide).unwrap().get("rId1").is_some());

        let removed = pkg
            .get_part_mut(&slide)
            .unwrap()
            .xml_mut()
            .unwrap()
            .remove_elements(|e| e.local_name() == "blip");
        assert_eq!(removed.len(), 2);
        assert!(pkg.drop_rel(&slide, "rId1").unwrap());
        assert!(pkg.rels_of(&slide).unwrap().get("rId1").is_none());
    }

    #[test]
    fn test_iter_rels_visits_each_edge_once_despite_cycle() {
        let pkg = sample_package();
        let rels = pkg.iter_rels();
        assert_eq!(rels.len(), 5);
        let sources: Vec<_> = rels.iter().map(|(s, r)| (s.as_str(), r.r_id())).collect();
        assert_eq!(sources[0], ("/", "rId1"));
        assert_eq!(sources[1], ("/ppt/presentation.xml", "rId1"));
    }

    #[test]
    fn test_purge_unreachable_handles_cycles() {
        let mut pkg = sample_package();
        let pres = uri("/ppt/presentation.xml");
        pkg.rels_of_mut(&pres).unwrap().remove("rId1");

        let mut purged = pkg.purge_unreachable();
        purged.sort();
        let names: Vec<_> = purged.iter().map(PackURI::as_str).collect();
        assert_eq!(
            names,
            [
                "/ppt/media/image1.png",
                "/ppt/notesSlides/notesSlide1.xml",
                "/ppt/slides/slide1.xml"
            ]
        );
        assert_eq!(pkg.part_count(), 1);
        pkg.validate().unwrap();
    }

    #[test]
    fn test_validate_reports_dangling_target() {
        let mut pkg = sample_package();
        pkg.rels_of_mut(&uri("/ppt/presentation.xml"))
            .unwrap()
            .add(rt::SLIDE, RelTarget::Part(uri("/ppt/slides/slide5.xml")));
        assert!(matches!(pkg.validate(), Err(OpcError::MissingPart { .. })));
        assert!(pkg.to_bytes().is_err());
    }

    #[test]
    fn test_roundtrip_preserves_graph() {
        let mut pkg = sample_package();
        pkg.relate_to_external(&uri("/ppt/slides/slide1.xml"), "https://example.com", rt::HYPERLINK)
            .unwrap();
        let bytes = pkg.to_bytes().unwrap();
        let reopened = OpcPackage::from_bytes(bytes.clone()).unwrap();

        let names = |p: &OpcPackage| p.partnames().cloned().collect::<Vec<_>>();
        assert_eq!(names(&reopened), names(&pkg));
        for part in pkg.iter_parts() {
            let other = reopened.get_part(part.partname()).unwrap();
            assert_eq!(other.content_type(), part.content_type());
            assert_eq!(other.rels(), part.rels());
            assert_eq!(other.content(), part.content());
        }
        assert_eq!(reopened.rels(), pkg.rels());
        assert_eq!(reopened.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn test_save_is_atomic_and_reloadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deck.pptx");
        std::fs::write(&path, b"previous contents").unwrap();

        let mut broken = sample_package();
        broken
            .rels_of_mut(&PackURI::package())
            .unwrap()
            .add(rt::CORE_PROPERTIES, RelTarget::Part(uri("/docProps/core.xml")));
        assert!(broken.save(&path).is_err());
        assert_eq!(std::fs::read(&path).unwrap(), b"previous contents");

        sample_package().save(&path).unwrap();
        let reopened = OpcPackage::open(&path).unwrap();
        assert_eq!(reopened.part_count(), 4);
    }

    proptest! {
        #[test]
        fn prop_partnames_stay_unique(ops in proptest::collection::vec(0u8..3, 1..40)) {
            let mut pkg = OpcPackage::new();
            for op in ops {
                match op {
                    0 | 1 => {
                        let name = pkg.next_partname("/ppt/slides/slide%d.xml").unwrap();
                        prop_assert!(!pkg.contains_part(&name));
                        pkg.add_part(xml_part(name.as_str(), ct::PML_SLIDE)).unwrap();
                    },
                    _ => {
                        let first = pkg.partnames().next().cloned();
                        if let Some(first) = first {
                            pkg.remove_part(&first).unwrap();
                        }
                    },
                }
                let names: Vec<_> = pkg.partnames().collect();
                let unique: HashSet<_> = names.iter().collect();
                prop_assert_eq!(names.len(), unique.len());
                for name in pkg.partnames() {
                    prop_assert!(pkg.content_types().resolve(name).is_ok());
                }
            }
        }
    }
}
