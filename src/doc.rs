//! Document and node handles.
//!
//! A [`DocumentHandle`] binds a parsed document to the coordinate and location
//! it was fetched from, and owns the query evaluator used for every query
//! against it. A [`NodeHandle`] names one node inside a specific document
//! version; after a structural edit produces a new version, handles into the
//! old version must be explicitly [re-anchored](NodeHandle::reanchor).

use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::cache::CacheKey;
use crate::error::{Error, Result};
use crate::model::{Coordinate, Location};
use crate::query::QueryEvaluator;
use crate::xml::{self, Document, NodeId};

/// A parsed descriptor together with where it came from.
#[derive(Debug)]
pub struct DocumentHandle {
    coordinate: Coordinate,
    location: Location,
    document: Arc<Document>,
    evaluator: OnceLock<QueryEvaluator>,
}

impl DocumentHandle {
    pub fn new(coordinate: Coordinate, location: Location, document: Document) -> Self {
        Self {
            coordinate,
            location,
            document: Arc::new(document),
            evaluator: OnceLock::new(),
        }
    }

    pub fn coordinate(&self) -> &Coordinate {
        &self.coordinate
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn document(&self) -> &Arc<Document> {
        &self.document
    }

    pub fn cache_key(&self) -> CacheKey {
        CacheKey::new(self.coordinate.clone(), self.location.clone())
    }

    /// The evaluator shared by all queries on this document, built on first
    /// use.
    pub fn evaluator(&self) -> &QueryEvaluator {
        self.evaluator.get_or_init(QueryEvaluator::new)
    }

    /// Handle to the document root, the context for absolute queries.
    pub fn root(&self) -> NodeHandle {
        NodeHandle {
            document: Arc::clone(&self.document),
            node: self.document.root(),
        }
    }

    /// Evaluates `path` from the document root.
    pub fn select(&self, path: &str) -> Result<Vec<NodeHandle>> {
        let found = self
            .evaluator()
            .select(path, &self.document, self.document.root())?;

        Ok(found
            .into_iter()
            .map(|node| NodeHandle {
                document: Arc::clone(&self.document),
                node,
            })
            .collect())
    }
}

impl fmt::Display for DocumentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.coordinate, self.location)
    }
}

/// A node within one version of a document.
#[derive(Debug, Clone)]
pub struct NodeHandle {
    document: Arc<Document>,
    node: NodeId,
}

impl NodeHandle {
    /// Binds `node` to `document`, failing if the document has no such node.
    pub fn new(document: Arc<Document>, node: NodeId) -> Result<Self> {
        if !document.contains(node) {
            return Err(Error::StaleNode { index: node.index() });
        }
        Ok(Self { document, node })
    }

    pub fn document(&self) -> &Arc<Document> {
        &self.document
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn index(&self) -> usize {
        self.node.index()
    }

    /// Element name, if this is an element.
    pub fn name(&self) -> Option<&str> {
        self.document.name(self.node)
    }

    /// Whitespace-normalized text of the node.
    pub fn text(&self) -> Option<String> {
        self.document.normalized_text(self.node)
    }

    /// Produces a handle for this node's index inside `other`'s document.
    ///
    /// Used after a structural edit: `other` points into the edited copy and
    /// this handle still points into the version it was taken from.
    pub fn reanchor(&self, other: &NodeHandle) -> Result<NodeHandle> {
        Self::new(Arc::clone(&other.document), self.node)
    }

    /// Whether both handles navigate the same document version.
    pub fn same_document(&self, other: &NodeHandle) -> bool {
        Arc::ptr_eq(&self.document, &other.document)
    }

    /// Evaluates `path` with this node as context, using `evaluator` for
    /// compilation.
    pub fn select(&self, evaluator: &QueryEvaluator, path: &str) -> Result<Vec<NodeHandle>> {
        let found = evaluator.select(path, &self.document, self.node)?;
        Ok(found
            .into_iter()
            .map(|node| NodeHandle {
                document: Arc::clone(&self.document),
                node,
            })
            .collect())
    }

    pub fn to_text(&self) -> String {
        xml::to_text(&self.document, self.node)
    }
}

impl PartialEq for NodeHandle {
    fn eq(&self, other: &Self) -> bool {
        self.same_document(other) && self.node == other.node
    }
}

impl Eq for NodeHandle {}
