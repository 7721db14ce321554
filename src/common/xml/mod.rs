//! XML utilities shared by the package engine and the document views.

pub mod element;
pub mod escape;

pub use element::{Element, Node, XML_DECLARATION, XmlError, local_part};
pub use escape::{escape_attr, escape_xml, unescape_xml};
