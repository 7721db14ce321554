//! Owned, mutable XML element tree.
//!
//! Parts of a package are edited in place, so unlike the streaming readers used
//! for extraction, this tree keeps every element, attribute and text node.
//! Qualified names are kept verbatim (`p:sp`, `a:off`) and `xmlns` declarations
//! are ordinary attributes, which preserves namespace prefixes on write-back.

use super::escape::{escape_attr, escape_xml, resolve_entity, unescape_xml};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::fmt::Write as _;
use thiserror::Error;

/// Standard declaration written in front of every serialized part.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Errors raised while parsing XML.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum XmlError {
    #[error("XML syntax error at byte {position}: {message}")]
    Syntax { position: u64, message: String },

    #[error("Invalid UTF-8 in XML: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("XML document has no root element")]
    NoRoot,

    #[error("Unexpected closing tag at byte {0}")]
    UnbalancedEnd(u64),
}

pub type Result<T> = std::result::Result<T, XmlError>;

/// A child node of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An XML element with its attributes and children.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    /// Create an empty element with a qualified name such as `p:sp`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder form of [`Element::set_attr`].
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Builder form of [`Element::push`].
    pub fn with_child(mut self, child: Element) -> Self {
        self.push(child);
        self
    }

    /// Builder form of [`Element::push_text`].
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.push_text(text);
        self
    }

    /// Qualified name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name without its namespace prefix.
    #[inline]
    pub fn local_name(&self) -> &str {
        local_part(&self.name)
    }

    pub fn attrs(&self) -> &[(String, String)] {
        &self.attrs
    }

    /// Look up an attribute by its qualified name (`r:embed`, `type`).
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Look up an attribute by local name, ignoring any prefix.
    pub fn attr_local(&self, local: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| local_part(k) == local)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing an existing value in place so attribute
    /// order stays stable.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let pos = self.attrs.iter().position(|(k, _)| k == name)?;
        Some(self.attrs.remove(pos).1)
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<Node> {
        &mut self.children
    }

    /// Child elements, skipping text nodes.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// First child element with the given local name.
    pub fn child(&self, local: &str) -> Option<&Element> {
        self.elements().find(|e| e.local_name() == local)
    }

    pub fn child_mut(&mut self, local: &str) -> Option<&mut Element> {
        self.elements_mut().find(|e| e.local_name() == local)
    }

    /// Follow a path of local names through first-match children.
    pub fn child_path(&self, path: &[&str]) -> Option<&Element> {
        path.iter().try_fold(self, |el, local| el.child(local))
    }

    pub fn child_path_mut(&mut self, path: &[&str]) -> Option<&mut Element> {
        let mut current = self;
        for local in path {
            current = current.child_mut(local)?;
        }
        Some(current)
    }

    /// All child elements with the given local name.
    pub fn children_named<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements().filter(move |e| e.local_name() == local)
    }

    /// Return the named child, appending a new element when absent.
    pub fn get_or_add_child(&mut self, name: &str) -> &mut Element {
        let local = local_part(name);
        let pos = self
            .children
            .iter()
            .position(|n| matches!(n, Node::Element(e) if e.local_name() == local));
        let idx = match pos {
            Some(idx) => idx,
            None => {
                self.children.push(Node::Element(Element::new(name)));
                self.children.len() - 1
            },
        };
        match &mut self.children[idx] {
            Node::Element(e) => e,
            Node::Text(_) => unreachable!("index points at an element node"),
        }
    }

    /// First descendant (depth-first, document order) with the given local name.
    pub fn find(&self, local: &str) -> Option<&Element> {
        for child in self.elements() {
            if child.local_name() == local {
                return Some(child);
            }
            if let Some(found) = child.find(local) {
                return Some(found);
            }
        }
        None
    }

    pub fn find_mut(&mut self, local: &str) -> Option<&mut Element> {
        for child in self.elements_mut() {
            if child.local_name() == local {
                return Some(child);
            }
            if let Some(found) = child.find_mut(local) {
                return Some(found);
            }
        }
        None
    }

    /// All descendants with the given local name, in document order.
    pub fn descendants<'a>(&'a self, local: &str) -> Vec<&'a Element> {
        let mut out = Vec::new();
        self.collect_descendants(local, &mut out);
        out
    }

    fn collect_descendants<'a>(&'a self, local: &str, out: &mut Vec<&'a Element>) {
        for child in self.elements() {
            if child.local_name() == local {
                out.push(child);
            }
            child.collect_descendants(local, out);
        }
    }

    /// Visit every element of the subtree, this one included.
    pub fn walk<F: FnMut(&Element)>(&self, f: &mut F) {
        f(self);
        for child in self.elements() {
            child.walk(f);
        }
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    pub fn push_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text.is_empty() {
            return;
        }
        match self.children.last_mut() {
            Some(Node::Text(existing)) => existing.push_str(&text),
            _ => self.children.push(Node::Text(text)),
        }
    }

    /// Insert a child element before the `index`-th child element.
    pub fn insert_element(&mut self, index: usize, child: Element) {
        let node_pos = self
            .children
            .iter()
            .enumerate()
            .filter(|(_, n)| matches!(n, Node::Element(_)))
            .nth(index)
            .map(|(i, _)| i)
            .unwrap_or(self.children.len());
        self.children.insert(node_pos, Node::Element(child));
    }

    /// Remove child elements matching `pred`; returns the removed elements.
    pub fn remove_elements<F: FnMut(&Element) -> bool>(&mut self, mut pred: F) -> Vec<Element> {
        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.children.len());
        for node in self.children.drain(..) {
            match node {
                Node::Element(e) if pred(&e) => removed.push(e),
                other => kept.push(other),
            }
        }
        self.children = kept;
        removed
    }

    /// Remove every child node.
    pub fn clear_children(&mut self) {
        self.children.clear();
    }

    /// Concatenated text of direct text children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|n| match n {
                Node::Text(t) => Some(t.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }

    /// Replace all children with a single text node.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children.clear();
        self.push_text(text);
    }

    /// Parse a complete XML document into its root element.
    pub fn parse(xml: &[u8]) -> Result<Element> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(false);

        let mut buf = Vec::new();
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let event = reader
                .read_event_into(&mut buf)
                .map_err(|e| XmlError::Syntax {
                    position: reader.buffer_position() as u64,
                    message: e.to_string(),
                })?;
            match event {
                Event::Start(ref e) => stack.push(element_from_start(e)?),
                Event::Empty(ref e) => {
                    let el = element_from_start(e)?;
                    attach(&mut stack, &mut root, el);
                },
                Event::End(_) => {
                    let el = stack
                        .pop()
                        .ok_or(XmlError::UnbalancedEnd(reader.buffer_position() as u64))?;
                    attach(&mut stack, &mut root, el);
                },
                Event::Text(ref t) => {
                    if let Some(top) = stack.last_mut() {
                        let raw = std::str::from_utf8(t)?;
                        top.push_text(unescape_xml(raw));
                    }
                },
                Event::CData(ref t) => {
                    if let Some(top) = stack.last_mut() {
                        top.push_text(std::str::from_utf8(t)?);
                    }
                },
                Event::GeneralRef(ref r) => {
                    if let Some(top) = stack.last_mut() {
                        let name = std::str::from_utf8(r)?;
                        match resolve_entity(name) {
                            Some(c) => top.push_text(c.to_string()),
                            None => top.push_text(format!("&{};", name)),
                        }
                    }
                },
                Event::Eof => break,
                // Declarations, comments, processing instructions and doctypes
                // are not part of the edited model.
                _ => {},
            }
            buf.clear();
        }

        if !stack.is_empty() {
            return Err(XmlError::Syntax {
                position: reader.buffer_position() as u64,
                message: format!("unclosed element <{}>", stack[stack.len() - 1].name),
            });
        }
        root.ok_or(XmlError::NoRoot)
    }

    /// Serialize as a standalone document with the XML declaration.
    pub fn to_xml_string(&self) -> String {
        let mut out = String::with_capacity(1024);
        out.push_str(XML_DECLARATION);
        out.push('\n');
        self.write_into(&mut out);
        out
    }

    pub fn to_xml_bytes(&self) -> Vec<u8> {
        self.to_xml_string().into_bytes()
    }

    /// Serialize this element (no declaration) into `out`.
    pub fn write_into(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (k, v) in &self.attrs {
            let _ = write!(out, r#" {}="{}""#, k, escape_attr(v));
        }
        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for child in &self.children {
            match child {
                Node::Element(e) => e.write_into(out),
                Node::Text(t) => out.push_str(&escape_xml(t)),
            }
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut out = String::new();
        self.write_into(&mut out);
        f.write_str(&out)
    }
}

/// Strip a namespace prefix from a qualified name.
#[inline]
pub fn local_part(qname: &str) -> &str {
    match qname.rfind(':') {
        Some(pos) => &qname[pos + 1..],
        None => qname,
    }
}

fn element_from_start(e: &BytesStart<'_>) -> Result<Element> {
    let name = std::str::from_utf8(e.name().as_ref())?.to_string();
    let mut el = Element::new(name);
    for attr in e.attributes() {
        let attr = attr.map_err(|err| XmlError::Syntax {
            position: 0,
            message: err.to_string(),
        })?;
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = std::str::from_utf8(&attr.value)?;
        el.attrs.push((key.to_string(), unescape_xml(value)));
    }
    Ok(el)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, el: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(el)),
        None => {
            if root.is_none() {
                *root = Some(el);
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1"/></p:nvSpPr><p:txBody><a:p><a:r><a:t>R&amp;D &#x2013; Q1</a:t></a:r></a:p></p:txBody></p:sp></p:spTree></p:cSld></p:sld>"#;

    #[test]
    fn test_parse_preserves_prefixes() {
        let root = Element::parse(SAMPLE.as_bytes()).unwrap();
        assert_eq!(root.name(), "p:sld");
        assert_eq!(root.local_name(), "sld");
        assert_eq!(
            root.attr("xmlns:a"),
            Some("http://schemas.openxmlformats.org/drawingml/2006/main")
        );
        let c_nv_pr = root.find("cNvPr").unwrap();
        assert_eq!(c_nv_pr.name(), "p:cNvPr");
        assert_eq!(c_nv_pr.attr("name"), Some("Title 1"));
    }

    #[test]
    fn test_entities_resolved_in_text() {
        let root = Element::parse(SAMPLE.as_bytes()).unwrap();
        assert_eq!(root.find("t").unwrap().text(), "R&D \u{2013} Q1");
    }

    #[test]
    fn test_serialize_roundtrip() {
        let root = Element::parse(SAMPLE.as_bytes()).unwrap();
        let again = Element::parse(&root.to_xml_bytes()).unwrap();
        assert_eq!(root, again);
        assert!(root.to_xml_string().contains("R&amp;D"));
    }

    #[test]
    fn test_attribute_escaping() {
        let el = Element::new("a:t").with_attr("name", "\"quoted\" & <raw>");
        let parsed = Element::parse(el.to_string().as_bytes()).unwrap();
        assert_eq!(parsed.attr("name"), Some("\"quoted\" & <raw>"));
    }

    #[test]
    fn test_attribute_whitespace_survives_roundtrip() {
        let root = Element::parse(b"<a descr=\"x&#xA;y&#x9;z&#xD;\"/>").unwrap();
        assert_eq!(root.attr("descr"), Some("x\ny\tz\r"));

        let xml = root.to_xml_string();
        assert!(xml.contains(r#"descr="x&#xA;y&#x9;z&#xD;""#));
        let again = Element::parse(xml.as_bytes()).unwrap();
        assert_eq!(again.attr("descr"), Some("x\ny\tz\r"));
    }

    #[test]
    fn test_carriage_return_in_text_is_referenced() {
        let el = Element::new("a:t").with_text("first\r\nsecond");
        let xml = el.to_string();
        assert!(xml.contains("first&#xD;\nsecond"));
        let parsed = Element::parse(xml.as_bytes()).unwrap();
        assert_eq!(parsed.text(), "first\r\nsecond");
    }

    #[test]
    fn test_mutation_helpers() {
        let mut root = Element::new("p:spTree");
        root.push(Element::new("p:sp").with_attr("id", "1"));
        root.push(Element::new("p:pic").with_attr("id", "2"));
        root.insert_element(1, Element::new("p:sp").with_attr("id", "3"));

        let ids: Vec<_> = root.elements().filter_map(|e| e.attr("id")).collect();
        assert_eq!(ids, ["1", "3", "2"]);

        let removed = root.remove_elements(|e| e.local_name() == "sp");
        assert_eq!(removed.len(), 2);
        assert_eq!(root.elements().count(), 1);

        root.get_or_add_child("p:extLst").set_attr("x", "1");
        root.get_or_add_child("p:extLst").set_attr("y", "2");
        assert_eq!(root.children_named("extLst").count(), 1);
    }

    #[test]
    fn test_find_mut_and_set_text() {
        let mut root = Element::parse(SAMPLE.as_bytes()).unwrap();
        root.find_mut("t").unwrap().set_text("Agenda");
        assert_eq!(root.find("t").unwrap().text(), "Agenda");
        assert_eq!(
            root.child_path(&["cSld", "spTree", "sp", "txBody"]).map(|e| e.name()),
            Some("p:txBody")
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(Element::parse(b"").is_err());
        assert!(Element::parse(b"<a><b></a>").is_err());
        assert!(Element::parse(b"<a>").is_err());
    }
}
