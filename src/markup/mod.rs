//! Generic markup tree loader.
//!
//! Parses catalogue/system XML into an arena of untyped nodes: element name,
//! attributes, ordered children. No domain semantics live here; element and
//! attribute names are stored verbatim and the domain layers above match on
//! local names.

mod parser;

use crate::error::Result;

/// Unique identifier for a node in a parsed document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

/// Markup attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// Node payload: an element or a run of character data.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    Element { name: String, attrs: Vec<Attribute> },
    Text(String),
}

#[derive(Debug)]
struct Node {
    data: NodeData,
    children: Vec<NodeId>,
}

/// A parsed markup document.
///
/// All nodes live in a flat arena indexed by [`NodeId`], so cross-document
/// references held elsewhere are plain lookups rather than borrows into a
/// recursive tree.
#[derive(Debug)]
pub struct Document {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl Document {
    /// Parse markup text into a document.
    ///
    /// Fails with [`Error::MalformedMarkup`](crate::Error::MalformedMarkup)
    /// on unbalanced or syntactically invalid input, reporting the byte
    /// offset of the failure.
    pub fn parse(text: &str) -> Result<Document> {
        parser::parse_document(text)
    }

    /// The document's root element.
    ///
    /// A successfully parsed document always has one.
    pub fn root(&self) -> NodeId {
        self.root.unwrap_or(NodeId(0))
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            data,
            children: Vec::new(),
        });
        id
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent.0 as usize].children.push(child);
    }

    /// Append text to the last text child, or create a new text node.
    fn append_text(&mut self, parent: NodeId, text: &str) {
        let last = self.node(parent).children.last().copied();
        if let Some(last) = last
            && let NodeData::Text(existing) = &mut self.nodes[last.0 as usize].data
        {
            existing.push_str(text);
            return;
        }
        let node = self.push(NodeData::Text(text.to_string()));
        self.append_child(parent, node);
    }

    /// Check if the node is an element.
    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.node(id).data, NodeData::Element { .. })
    }

    /// Element name, exactly as authored.
    pub fn name(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).data {
            NodeData::Element { name, .. } => Some(name),
            NodeData::Text(_) => None,
        }
    }

    /// Element name with any namespace prefix stripped
    /// (e.g. `bs:selectionEntry` -> `selectionEntry`).
    pub fn local_name(&self, id: NodeId) -> Option<&str> {
        self.name(id).map(|name| {
            name.rfind(':')
                .map(|i| &name[i + 1..])
                .unwrap_or(name)
        })
    }

    /// Look up an attribute value by name.
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.node(id).data {
            NodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|a| a.name == name)
                .map(|a| a.value.as_str()),
            NodeData::Text(_) => None,
        }
    }

    /// Ordered children of a node.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Ordered element children of a node, skipping text.
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|&c| self.is_element(c))
    }

    /// First element child with the given local name.
    pub fn child_element(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.element_children(id)
            .find(|&c| self.local_name(c) == Some(name))
    }

    /// Content of a text node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).data {
            NodeData::Text(text) => Some(text),
            NodeData::Element { .. } => None,
        }
    }

    /// Concatenated direct text content of an element.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            if let Some(text) = self.text(child) {
                out.push_str(text);
            }
        }
        out
    }

    /// Iterate over all element descendants of a node, depth-first in
    /// document order. The start node itself is not yielded.
    pub fn descendant_elements(&self, id: NodeId) -> DescendantElements<'_> {
        let mut stack: Vec<NodeId> = self.children(id).to_vec();
        stack.reverse();
        DescendantElements { doc: self, stack }
    }

    /// Total number of nodes in the arena.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

/// Iterator over element descendants in document order.
pub struct DescendantElements<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for DescendantElements<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.stack.pop() {
            for &child in self.doc.children(id).iter().rev() {
                self.stack.push(child);
            }
            if self.doc.is_element(id) {
                return Some(id);
            }
        }
        None
    }
}
