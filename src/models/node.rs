//! Document tree model
//!
//! SEMD payloads arrive as CDA XML with no fixed schema per document type.
//! This module parses them into a generic tagged-union tree that the
//! extraction walkers traverse: elements carry their attributes and an
//! ordered child list, repeated siblings are simply repeated entries.
//! Namespace prefixes are stripped to local names and attribute/text values
//! are unescaped on the way in.

use crate::error::{OncoCubeError, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use rustc_hash::FxHashMap;

/// A node of a parsed document tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A nested element
    Element(Element),
    /// A text fragment between elements
    Text(String),
}

/// A parsed XML element: local name, attributes and ordered children
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    /// Local (namespace-stripped) element name
    pub name: String,
    /// Attribute map, keyed by local attribute name
    pub attributes: FxHashMap<String, String>,
    /// Children in document order
    pub children: Vec<Node>,
}

impl Element {
    /// Parse an XML payload into its root element.
    ///
    /// Fails with `OncoCubeError::Xml` on lexically broken input and with
    /// `OncoCubeError::Malformed` when no root element is present.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event()? {
                Event::Start(start) => {
                    stack.push(Self::from_start(&start)?);
                }
                Event::Empty(start) => {
                    let element = Self::from_start(&start)?;
                    Self::attach(&mut stack, &mut root, element);
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| OncoCubeError::Malformed("unbalanced end tag".into()))?;
                    Self::attach(&mut stack, &mut root, element);
                }
                Event::Text(text) => {
                    let value = text.unescape()?;
                    let trimmed = value.trim();
                    if !trimmed.is_empty() {
                        if let Some(parent) = stack.last_mut() {
                            parent.children.push(Node::Text(trimmed.to_string()));
                        }
                    }
                }
                Event::CData(data) => {
                    let value = String::from_utf8_lossy(&data.into_inner()).into_owned();
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(Node::Text(value));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(OncoCubeError::Malformed("unclosed element".into()));
        }
        root.ok_or_else(|| OncoCubeError::Malformed("no root element".into()))
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Self> {
        let name = String::from_utf8_lossy(start.name().local_name().as_ref()).into_owned();
        let mut attributes = FxHashMap::default();
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            attributes.insert(key, value);
        }
        Ok(Self {
            name,
            attributes,
            children: Vec::new(),
        })
    }

    fn attach(stack: &mut Vec<Element>, root: &mut Option<Element>, element: Element) {
        if let Some(parent) = stack.last_mut() {
            parent.children.push(Node::Element(element));
        } else if root.is_none() {
            *root = Some(element);
        }
        // trailing siblings of the document element are dropped
    }

    /// Look up an attribute by local name
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Iterate over child elements (text children skipped)
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// First child element with the given local name
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|element| element.name == name)
    }

    /// All child elements with the given local name (repeated siblings)
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.elements().filter(move |element| element.name == name)
    }

    /// Walk a chain of first-child lookups
    #[must_use]
    pub fn path(&self, names: &[&str]) -> Option<&Element> {
        let mut current = self;
        for name in names {
            current = current.child(name)?;
        }
        Some(current)
    }

    /// Concatenated direct text content
    #[must_use]
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) => Some(text.as_str()),
                Node::Element(_) => None,
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}
