//! Arena-backed document model.
//!
//! A `Document` stores every node (the document root, elements, attributes and
//! text) in a single vector and refers to them by `NodeId`. Attributes hang off
//! their element but are not among its children. Documents handed out by the
//! parser are never mutated in place: a structural edit clones the arena and
//! only appends nodes, so an id that was valid before the edit is still valid
//! in the edited copy.

use std::collections::HashSet;

/// Index of a node inside a `Document` arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }

    pub(crate) fn from_index(index: usize) -> Self {
        Self(index)
    }
}

/// What a node is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The root of the tree; parent of the document element.
    Document,
    /// An element, carrying its local name.
    Element(String),
    /// A run of character data.
    Text(String),
    /// An attribute of the parent element, by local name.
    Attribute { name: String, value: String },
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attributes: Vec<NodeId>,
    depth: usize,
}

/// A parsed, navigable document.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeData>,
    /// Set once nodes have been added after parsing; arena order then no
    /// longer matches document order.
    edited: bool,
}

impl Document {
    /// Creates a document holding only its root node.
    pub(crate) fn new() -> Self {
        Self {
            nodes: vec![NodeData {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
                attributes: Vec::new(),
                depth: 0,
            }],
            edited: false,
        }
    }

    /// Marks a freshly built document as being in document order.
    pub(crate) fn sealed(mut self) -> Self {
        self.edited = false;
        self
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.document_element().is_none()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        node.0 < self.nodes.len()
    }

    /// The outermost element, if the document has one.
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(self.root())
            .iter()
            .copied()
            .find(|child| self.is_element(*child))
    }

    pub fn kind(&self, node: NodeId) -> Option<&NodeKind> {
        self.nodes.get(node.0).map(|data| &data.kind)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0).and_then(|data| data.parent)
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.0)
            .map(|data| data.children.as_slice())
            .unwrap_or(&[])
    }

    /// Local name of an element or attribute node.
    pub fn name(&self, node: NodeId) -> Option<&str> {
        match self.kind(node) {
            Some(NodeKind::Element(name)) => Some(name),
            Some(NodeKind::Attribute { name, .. }) => Some(name),
            _ => None,
        }
    }

    /// Attribute nodes of an element, in source order.
    pub fn attributes(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.0)
            .map(|data| data.attributes.as_slice())
            .unwrap_or(&[])
    }

    /// Value of the attribute `name` on an element.
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.attributes(node)
            .iter()
            .find_map(|attribute| match self.kind(*attribute) {
                Some(NodeKind::Attribute { name: found, value }) if found == name => Some(value.as_str()),
                _ => None,
            })
    }

    /// Character data of a text node.
    pub fn text(&self, node: NodeId) -> Option<&str> {
        match self.kind(node) {
            Some(NodeKind::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub fn is_element(&self, node: NodeId) -> bool {
        matches!(self.kind(node), Some(NodeKind::Element(_)))
    }

    pub fn is_text(&self, node: NodeId) -> bool {
        matches!(self.kind(node), Some(NodeKind::Text(_)))
    }

    pub fn is_attribute(&self, node: NodeId) -> bool {
        matches!(self.kind(node), Some(NodeKind::Attribute { .. }))
    }

    /// Nesting depth; the document element is at depth 0.
    pub fn depth(&self, node: NodeId) -> usize {
        self.nodes.get(node.0).map(|data| data.depth).unwrap_or(0)
    }

    /// Concatenation of all text below (or at) the node.
    pub fn string_value(&self, node: NodeId) -> String {
        match self.kind(node) {
            Some(NodeKind::Text(text)) => return text.clone(),
            Some(NodeKind::Attribute { value, .. }) => return value.clone(),
            _ => {}
        }

        let mut value = String::new();
        for descendant in self.descendants(node) {
            if let Some(text) = self.text(descendant) {
                value.push_str(text);
            }
        }
        value
    }

    /// Whitespace-normalized text of a node.
    ///
    /// For a text node this is its own content; for an element it is the
    /// content of its direct text children. Leading and trailing whitespace is
    /// dropped and inner runs collapse to one space. Returns `None` when the
    /// node carries no text at all.
    pub fn normalized_text(&self, node: NodeId) -> Option<String> {
        match self.kind(node)? {
            NodeKind::Text(text) => Some(collapse_whitespace(text)),
            NodeKind::Attribute { value, .. } => Some(collapse_whitespace(value)),
            NodeKind::Element(_) => {
                let mut raw = String::new();
                let mut found = false;
                for child in self.children(node) {
                    if let Some(text) = self.text(*child) {
                        raw.push_str(text);
                        found = true;
                    }
                }
                found.then(|| collapse_whitespace(&raw))
            }
            NodeKind::Document => None,
        }
    }

    /// All nodes below `node` in document order, excluding `node` itself.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut pending: Vec<NodeId> = self.children(node).iter().rev().copied().collect();
        while let Some(next) = pending.pop() {
            result.push(next);
            pending.extend(self.children(next).iter().rev().copied());
        }
        result
    }

    /// Ancestors of `node`, nearest first, ending with the document root.
    pub fn ancestors(&self, node: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut current = self.parent(node);
        while let Some(parent) = current {
            result.push(parent);
            current = self.parent(parent);
        }
        result
    }

    /// Sorts and de-duplicates node ids into document order.
    pub fn sort_in_document_order(&self, nodes: &mut Vec<NodeId>) {
        if self.edited {
            nodes.sort_by_cached_key(|node| self.order_key(*node));
        } else {
            nodes.sort();
        }

        let mut seen = HashSet::new();
        nodes.retain(|node| seen.insert(*node));
    }

    /// Child positions from the root down to `node`; comparing these keys
    /// lexicographically yields document order. Attributes sort before the
    /// children of their element.
    fn order_key(&self, node: NodeId) -> Vec<usize> {
        let mut key = Vec::new();
        let mut current = node;
        while let Some(parent) = self.parent(current) {
            let attributes = self.attributes(parent);
            let position = attributes
                .iter()
                .position(|attribute| *attribute == current)
                .or_else(|| {
                    self.children(parent)
                        .iter()
                        .position(|child| *child == current)
                        .map(|position| attributes.len() + position)
                })
                .unwrap_or(0);
            key.push(position);
            current = parent;
        }
        key.reverse();
        key
    }

    /// Appends a new node as the last child of `parent`.
    pub(crate) fn append_child(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let position = self.children(parent).len();
        self.insert_child(parent, position, kind)
    }

    /// Inserts a new node among `parent`'s children at `position`.
    pub(crate) fn insert_child(&mut self, parent: NodeId, position: usize, kind: NodeKind) -> NodeId {
        let depth = match self.kind(parent) {
            Some(NodeKind::Document) | None => 0,
            _ => self.depth(parent) + 1,
        };

        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: Some(parent),
            children: Vec::new(),
            attributes: Vec::new(),
            depth,
        });

        if let Some(data) = self.nodes.get_mut(parent.0) {
            let position = position.min(data.children.len());
            data.children.insert(position, id);
        }

        self.edited = true;
        id
    }

    /// Adds an attribute to `element`. Attributes of one element must be added
    /// before any of its children to keep arena order in document order.
    pub(crate) fn add_attribute(&mut self, element: NodeId, name: &str, value: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind: NodeKind::Attribute {
                name: name.to_string(),
                value: value.to_string(),
            },
            parent: Some(element),
            children: Vec::new(),
            attributes: Vec::new(),
            depth: self.depth(element) + 1,
        });

        if let Some(data) = self.nodes.get_mut(element.0) {
            data.attributes.push(id);
        }

        self.edited = true;
        id
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
