/// Relationship-related objects for OPC packages.
///
/// This module provides types for managing relationships between parts in an OPC package,
/// including internal and external relationships.
use crate::common::xml::{Element, XML_DECLARATION, escape_xml};
use crate::ooxml::opc::constants::{namespace, target_mode};
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::PackURI;
use std::fmt::Write as _;

/// Where a relationship points.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RelTarget {
    /// Another part of the same package.
    Part(PackURI),
    /// An external resource, typically a hyperlink URL. Never dereferenced.
    External(String),
}

/// A single relationship from a source part to a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Relationship ID (e.g., "rId1", "rId2")
    r_id: String,

    /// Relationship type URI
    reltype: String,

    target: RelTarget,
}

impl Relationship {
    pub fn new(r_id: impl Into<String>, reltype: impl Into<String>, target: RelTarget) -> Self {
        Self {
            r_id: r_id.into(),
            reltype: reltype.into(),
            target,
        }
    }

    #[inline]
    pub fn r_id(&self) -> &str {
        &self.r_id
    }

    #[inline]
    pub fn reltype(&self) -> &str {
        &self.reltype
    }

    #[inline]
    pub fn target(&self) -> &RelTarget {
        &self.target
    }

    #[inline]
    pub fn is_external(&self) -> bool {
        matches!(self.target, RelTarget::External(_))
    }

    /// Target partname for internal relationships.
    pub fn target_partname(&self) -> Option<&PackURI> {
        match &self.target {
            RelTarget::Part(partname) => Some(partname),
            RelTarget::External(_) => None,
        }
    }

    /// Target reference as written in a `.rels` file: relative to `base_uri`
    /// for internal targets, verbatim for external ones.
    pub fn target_ref(&self, base_uri: &str) -> String {
        match &self.target {
            RelTarget::Part(partname) => partname.relative_ref(base_uri),
            RelTarget::External(url) => url.clone(),
        }
    }
}

/// Numeric suffix of an `rIdN` identifier.
#[inline]
fn r_id_number(r_id: &str) -> Option<u32> {
    r_id.strip_prefix("rId")
        .and_then(|digits| atoi_simd::parse::<u32, false, false>(digits.as_bytes()).ok())
}

/// Relationships originating from one source (a part, or the package root).
///
/// Entries keep their load/insertion order so a loaded `.rels` file is
/// written back in the same order. Identifiers are allocated one past the
/// highest number ever seen for this source, so an id freed by
/// [`Relationships::remove`] is never handed out again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationships {
    source: PackURI,
    rels: Vec<Relationship>,
    high_water: u32,
}

impl Relationships {
    pub fn new(source: PackURI) -> Self {
        Self {
            source,
            rels: Vec::new(),
            high_water: 0,
        }
    }

    /// Partname of the source, `/` for package relationships.
    #[inline]
    pub fn source(&self) -> &PackURI {
        &self.source
    }

    /// Parse a `.rels` document belonging to `source`.
    pub fn from_xml(source: PackURI, xml: &[u8]) -> Result<Self> {
        let rels_uri = source.rels_uri();
        let root = Element::parse(xml).map_err(|e| OpcError::xml(rels_uri.as_str(), e))?;
        let mut rels = Self::new(source);

        for entry in root.children_named("Relationship") {
            let (Some(r_id), Some(reltype), Some(target_ref)) =
                (entry.attr("Id"), entry.attr("Type"), entry.attr("Target"))
            else {
                return Err(OpcError::InvalidRelationship(format!(
                    "incomplete <Relationship> in {}",
                    rels_uri
                )));
            };

            let target = if entry.attr("TargetMode") == Some(target_mode::EXTERNAL) {
                RelTarget::External(target_ref.to_string())
            } else {
                RelTarget::Part(PackURI::from_rel_ref(rels.source.base_uri(), target_ref)?)
            };
            rels.load(r_id, reltype, target)?;
        }
        Ok(rels)
    }

    /// Insert a relationship with a known id, as read from a serialized package.
    pub fn load(&mut self, r_id: &str, reltype: &str, target: RelTarget) -> Result<()> {
        if self.get(r_id).is_some() {
            return Err(OpcError::InvalidRelationship(format!(
                "duplicate relationship id '{}' from {}",
                r_id, self.source
            )));
        }
        match r_id_number(r_id) {
            Some(n) => self.high_water = self.high_water.max(n),
            None => log::warn!("Relationship id '{}' from {} is not of the form rIdN", r_id, self.source),
        }
        self.rels.push(Relationship::new(r_id, reltype, target));
        Ok(())
    }

    /// Add a relationship under a fresh id and return that id.
    pub fn add(&mut self, reltype: &str, target: RelTarget) -> String {
        let r_id = self.next_r_id();
        self.rels.push(Relationship::new(r_id.clone(), reltype, target));
        r_id
    }

    /// Return the id of an existing relationship of `reltype` to `target`,
    /// adding one if there is none.
    pub fn get_or_add(&mut self, reltype: &str, target: &PackURI) -> String {
        let existing = self.rels.iter().find(|rel| {
            rel.reltype == reltype && rel.target_partname() == Some(target)
        });
        match existing {
            Some(rel) => rel.r_id.clone(),
            None => self.add(reltype, RelTarget::Part(target.clone())),
        }
    }

    /// External counterpart of [`Relationships::get_or_add`].
    pub fn get_or_add_ext_rel(&mut self, reltype: &str, url: &str) -> String {
        let existing = self.rels.iter().find(|rel| {
            rel.reltype == reltype && matches!(&rel.target, RelTarget::External(u) if u == url)
        });
        match existing {
            Some(rel) => rel.r_id.clone(),
            None => self.add(reltype, RelTarget::External(url.to_string())),
        }
    }

    pub fn get(&self, r_id: &str) -> Option<&Relationship> {
        self.rels.iter().find(|rel| rel.r_id == r_id)
    }

    /// Relationships of the given type, in order.
    pub fn find<'a, 'b>(&'a self, reltype: &'b str) -> impl Iterator<Item = &'a Relationship> + use<'a, 'b> {
        self.rels.iter().filter(move |rel| rel.reltype == reltype)
    }

    /// Target of the single relationship of `reltype`.
    ///
    /// Returns an error if no relationship of the type is found,
    /// or if multiple relationships of the type exist.
    pub fn part_with_reltype(&self, reltype: &str) -> Result<&PackURI> {
        let mut matching = self.find(reltype).filter_map(Relationship::target_partname);
        match (matching.next(), matching.next()) {
            (Some(partname), None) => Ok(partname),
            (None, _) => Err(OpcError::RelationshipNotFound(format!(
                "no relationship of type '{}' from {}",
                reltype, self.source
            ))),
            (Some(_), Some(_)) => Err(OpcError::InvalidRelationship(format!(
                "multiple relationships of type '{}' from {}",
                reltype, self.source
            ))),
        }
    }

    /// Relationships whose internal target is `partname`.
    pub fn targeting<'a, 'b>(
        &'a self,
        partname: &'b PackURI,
    ) -> impl Iterator<Item = &'a Relationship> + use<'a, 'b> {
        self.rels
            .iter()
            .filter(move |rel| rel.target_partname() == Some(partname))
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.rels.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rels.is_empty()
    }

    /// Remove a relationship by its ID. The id stays retired.
    pub fn remove(&mut self, r_id: &str) -> Option<Relationship> {
        let pos = self.rels.iter().position(|rel| rel.r_id == r_id)?;
        Some(self.rels.remove(pos))
    }

    /// Drop every relationship to `partname`; returns how many were removed.
    pub fn remove_targeting(&mut self, partname: &PackURI) -> usize {
        let before = self.rels.len();
        self.rels.retain(|rel| rel.target_partname() != Some(partname));
        before - self.rels.len()
    }

    fn next_r_id(&mut self) -> String {
        self.high_water += 1;
        format!("rId{}", self.high_water)
    }

    /// Serialize to `.rels` XML in insertion order.
    pub fn to_xml(&self) -> String {
        let base_uri = self.source.base_uri();
        let mut xml = String::with_capacity(256 + self.rels.len() * 160);
        xml.push_str(XML_DECLARATION);
        xml.push('\n');
        let _ = write!(xml, r#"<Relationships xmlns="{}">"#, namespace::OPC_RELATIONSHIPS);

        for rel in &self.rels {
            let mode = if rel.is_external() {
                r#" TargetMode="External""#
            } else {
                ""
            };
            let _ = write!(
                xml,
                r#"<Relationship Id="{}" Type="{}" Target="{}"{}/>"#,
                escape_xml(&rel.r_id),
                escape_xml(&rel.reltype),
                escape_xml(&rel.target_ref(base_uri)),
                mode
            );
        }

        xml.push_str("</Relationships>");
        xml
    }
}
