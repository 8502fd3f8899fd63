//! Parse XML text into a read-only node arena using quick-xml.
//!
//! Every element becomes a [`Node`] stored in a flat arena owned by the
//! [`Document`]. Nodes refer to their parent and children by [`NodeId`], so
//! walking up the tree never implies ownership. Index 0 is a synthetic root
//! named [`DOCUMENT_NAME`] that parents all top-level elements.

use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;
use tracing::debug;

/// Reserved tag name of the synthetic node sitting above all top-level elements.
pub const DOCUMENT_NAME: &str = "[document]";

#[derive(Debug, Error)]
pub enum XmlError {
    #[error("xml: {0}")]
    Xml(String),
    #[error("unbalanced document: {0}")]
    Unbalanced(String),
    #[error("invalid document: {0}")]
    Invalid(String),
}

/// Index of a node inside its owning [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// The synthetic document root.
    pub const DOCUMENT: NodeId = NodeId(0);

    /// Position of the node in the arena. Arena order equals document order.
    pub const fn index(self) -> usize {
        self.0
    }
}

/// One element of the parsed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attributes: Vec<(String, String)>,
    text: String,
}

impl Node {
    fn new(name: String, parent: Option<NodeId>, attributes: Vec<(String, String)>) -> Self {
        Node {
            name,
            parent,
            children: Vec::new(),
            attributes,
            text: String::new(),
        }
    }

    /// Tag name exactly as written in the source (prefix included).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent node, `None` only for the synthetic document root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Direct child elements in document order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Attributes in source order with entity references resolved.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.attributes
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn has_attributes(&self) -> bool {
        !self.attributes.is_empty()
    }

    /// Look up a single attribute value.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Character data of a leaf element (text and CDATA concatenated, not
    /// trimmed). Elements with child elements have no text.
    pub fn text(&self) -> Option<&str> {
        if self.has_children() {
            None
        } else {
            Some(&self.text)
        }
    }

    pub fn is_document(&self) -> bool {
        self.parent.is_none()
    }
}

/// Parsed XML document backed by a node arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    /// Parse `xml` into a document. Declarations, comments, processing
    /// instructions and whitespace outside of elements are discarded.
    ///
    /// Input without an element, or with non-whitespace text or CDATA
    /// outside of every element, is rejected with [`XmlError::Invalid`].
    pub fn parse(xml: &str) -> Result<Self, XmlError> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(false);
        let mut nodes = vec![Node::new(DOCUMENT_NAME.to_string(), None, Vec::new())];
        let mut stack = vec![NodeId::DOCUMENT];

        loop {
            let position = reader.buffer_position();
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    let id = open_element(&mut nodes, &stack, &e)?;
                    stack.push(id);
                }
                Ok(Event::Empty(e)) => {
                    open_element(&mut nodes, &stack, &e)?;
                }
                Ok(Event::End(e)) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    close_element(&nodes, &mut stack, &name, position)?;
                }
                Ok(Event::Text(e)) => {
                    let text = e
                        .unescape()
                        .map_err(|err| XmlError::Xml(format!("at byte {position}: {err}")))?;
                    if stack.len() > 1 {
                        append_text(&mut nodes, &stack, &text);
                    } else if !text.trim().is_empty() {
                        return Err(XmlError::Invalid(format!(
                            "text outside of any element at byte {position}"
                        )));
                    }
                }
                Ok(Event::CData(e)) => {
                    if stack.len() == 1 {
                        return Err(XmlError::Invalid(format!(
                            "CDATA outside of any element at byte {position}"
                        )));
                    }
                    let text = String::from_utf8_lossy(&e);
                    append_text(&mut nodes, &stack, &text);
                }
                Ok(Event::Eof) => break,
                Err(err) => {
                    return Err(XmlError::Xml(format!(
                        "at byte {}: {err}",
                        reader.buffer_position()
                    )))
                }
                _ => {}
            }
        }

        if let Some(open) = stack.get(1) {
            return Err(XmlError::Unbalanced(format!(
                "element <{}> is never closed",
                nodes[open.index()].name
            )));
        }

        if nodes.len() == 1 {
            return Err(XmlError::Invalid("document has no root element".into()));
        }

        debug!(elements = nodes.len() - 1, "parsed xml document");
        Ok(Document { nodes })
    }

    /// The synthetic root above all top-level elements.
    pub fn root(&self) -> NodeId {
        NodeId::DOCUMENT
    }

    /// Resolve a node id produced by this document.
    ///
    /// # Panics
    ///
    /// Panics when `id` belongs to a different document with more nodes.
    /// Use [`Document::get`] for ids of unknown origin.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(Node::parent)
    }

    /// Elements directly below the synthetic root.
    pub fn top_level(&self) -> &[NodeId] {
        self.node(NodeId::DOCUMENT).children()
    }

    /// Number of real elements (the synthetic root is not counted).
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All real elements in document order, at any depth.
    pub fn elements(&self) -> impl Iterator<Item = NodeId> + '_ {
        (1..self.nodes.len()).map(NodeId)
    }

    /// All elements named `name` in document order, at any depth.
    pub fn elements_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = NodeId> + 'a {
        self.elements()
            .filter(move |id| self.node(*id).name == name)
    }

    /// Ancestors of `id`, innermost first, ending with the synthetic root.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            document: self,
            next: self.parent(id),
        }
    }

    /// Tag names from the synthetic root down to, not including, `id`.
    pub fn ancestor_names(&self, id: NodeId) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .ancestors(id)
            .map(|ancestor| self.node(ancestor).name())
            .collect();
        names.reverse();
        names
    }
}

/// Iterator over the ancestors of a node, innermost first.
#[derive(Debug, Clone)]
pub struct Ancestors<'a> {
    document: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.document.parent(current);
        Some(current)
    }
}

fn open_element(
    nodes: &mut Vec<Node>,
    stack: &[NodeId],
    event: &BytesStart<'_>,
) -> Result<NodeId, XmlError> {
    let name = String::from_utf8_lossy(event.name().as_ref()).into_owned();
    if name.is_empty() {
        return Err(XmlError::Invalid("element with an empty tag name".into()));
    }
    let attributes = collect_attributes(event)?;
    let parent = *stack
        .last()
        .ok_or_else(|| XmlError::Invalid("element outside of the document".into()))?;
    let id = NodeId(nodes.len());
    nodes.push(Node::new(name, Some(parent), attributes));
    nodes[parent.index()].children.push(id);
    Ok(id)
}

fn close_element(
    nodes: &[Node],
    stack: &mut Vec<NodeId>,
    name: &str,
    position: usize,
) -> Result<(), XmlError> {
    if stack.len() < 2 {
        return Err(XmlError::Unbalanced(format!(
            "unexpected </{name}> at byte {position}"
        )));
    }
    let open = stack[stack.len() - 1];
    let expected = &nodes[open.index()].name;
    if expected != name {
        return Err(XmlError::Unbalanced(format!(
            "expected </{expected}>, found </{name}> at byte {position}"
        )));
    }
    stack.pop();
    Ok(())
}

fn append_text(nodes: &mut [Node], stack: &[NodeId], text: &str) {
    if let Some(top) = stack.last() {
        nodes[top.index()].text.push_str(text);
    }
}

fn collect_attributes(event: &BytesStart<'_>) -> Result<Vec<(String, String)>, XmlError> {
    let mut attributes = Vec::new();
    for attr in event.attributes() {
        let attr = attr.map_err(|err| XmlError::Xml(err.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value: Cow<'_, str> = attr
            .unescape_value()
            .map_err(|err| XmlError::Xml(err.to_string()))?;
        attributes.push((key, value.into_owned()));
    }
    Ok(attributes)
}
