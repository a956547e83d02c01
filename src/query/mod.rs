//! Path query language.
//!
//! A small XPath 1.0 subset covering what descriptor resolution needs:
//! absolute and relative location paths, the child, descendant, parent,
//! ancestor and self axes (with their `-or-self` variants), attribute steps
//! written `@name` or `attribute::name`, `text()`, `node()` and `*` tests,
//! positional predicates, and predicates built from `=`, `!=`, `and`, `or`
//! and `not()`. Paths can be joined with `|`.
//!
//! ```
//! use pom_view::query::CompiledQuery;
//! use pom_view::xml::parse;
//!
//! let document = parse("inline", b"<project><groupId>org.foo</groupId></project>").unwrap();
//! let query = CompiledQuery::compile("/project/groupId/text()").unwrap();
//! let found = query.select(&document, document.root()).unwrap();
//! assert_eq!(document.text(found[0]), Some("org.foo"));
//! ```

mod eval;
mod parser;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};
use crate::xml::{Document, NodeId};

/// A parsed path expression, ready to run against any document.
#[derive(Debug)]
pub struct CompiledQuery {
    source: String,
    expression: parser::Union,
}

impl CompiledQuery {
    /// Parses `path`, failing with [`Error::QuerySyntax`] when it is malformed.
    pub fn compile(path: &str) -> Result<Self> {
        Ok(Self {
            source: path.to_string(),
            expression: parser::parse(path)?,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Runs the query with `context` as the context node.
    ///
    /// Fails with [`Error::QueryEvaluation`] when `context` does not belong to
    /// `document`.
    pub fn select(&self, document: &Document, context: NodeId) -> Result<Vec<NodeId>> {
        if !document.contains(context) {
            return Err(Error::QueryEvaluation {
                path: self.source.clone(),
                message: format!(
                    "context node {} is outside a document of {} nodes",
                    context.index(),
                    document.len()
                ),
            });
        }

        Ok(eval::select(document, &self.expression, context))
    }

    pub fn select_first(&self, document: &Document, context: NodeId) -> Result<Option<NodeId>> {
        Ok(self.select(document, context)?.into_iter().next())
    }
}

/// Renders `value` as a string literal for use inside a predicate.
///
/// Double quotes are preferred; a value containing `"` is single-quoted. The
/// language has no escapes, so a value holding both quote characters cannot
/// be written and yields `None`.
pub fn quote_literal(value: &str) -> Option<String> {
    if !value.contains('"') {
        Some(format!("\"{}\"", value))
    } else if !value.contains('\'') {
        Some(format!("'{}'", value))
    } else {
        None
    }
}

/// Compiled expressions an evaluator keeps before evicting the least recently
/// used one.
pub const DEFAULT_QUERY_CAPACITY: usize = 256;

#[derive(Debug)]
struct Slot {
    query: Arc<CompiledQuery>,
    last_used: u64,
}

#[derive(Debug, Default)]
struct Compiled {
    slots: HashMap<String, Slot>,
    clock: u64,
}

impl Compiled {
    fn touch(&mut self, path: &str) -> Option<Arc<CompiledQuery>> {
        self.clock += 1;
        let clock = self.clock;
        self.slots.get_mut(path).map(|slot| {
            slot.last_used = clock;
            Arc::clone(&slot.query)
        })
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .slots
            .iter()
            .min_by_key(|(_, slot)| slot.last_used)
            .map(|(path, _)| path.clone());
        if let Some(path) = oldest {
            log::trace!("evicting compiled query {}", path);
            self.slots.remove(&path);
        }
    }
}

/// Compiles path expressions once and reuses them.
///
/// One evaluator is attached to every document handle. Many paths carry
/// per-call literals (coordinates, property names, profile ids), so the map is
/// bounded and drops the least recently used expression once full. It is only
/// locked while looking up or storing a compiled query, never while a query
/// runs.
#[derive(Debug)]
pub struct QueryEvaluator {
    compiled: Mutex<Compiled>,
    capacity: usize,
}

impl Default for QueryEvaluator {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_QUERY_CAPACITY)
    }
}

impl QueryEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// An evaluator holding at most `capacity` compiled expressions (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            compiled: Mutex::new(Compiled::default()),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn compile(&self, path: &str) -> Result<Arc<CompiledQuery>> {
        if let Some(query) = self.lock()?.touch(path) {
            return Ok(query);
        }

        let query = Arc::new(CompiledQuery::compile(path)?);

        let mut compiled = self.lock()?;
        if let Some(existing) = compiled.touch(path) {
            return Ok(existing);
        }
        while compiled.slots.len() >= self.capacity {
            compiled.evict_oldest();
        }
        let last_used = compiled.clock;
        compiled.slots.insert(
            path.to_string(),
            Slot {
                query: Arc::clone(&query),
                last_used,
            },
        );
        Ok(query)
    }

    pub fn select(&self, path: &str, document: &Document, context: NodeId) -> Result<Vec<NodeId>> {
        self.compile(path)?.select(document, context)
    }

    /// Number of compiled expressions currently held.
    pub fn compiled_count(&self) -> usize {
        self.compiled.lock().map(|compiled| compiled.slots.len()).unwrap_or(0)
    }

    /// Whether `path` is currently held in compiled form.
    pub fn is_compiled(&self, path: &str) -> bool {
        self.compiled
            .lock()
            .map(|compiled| compiled.slots.contains_key(path))
            .unwrap_or(false)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Compiled>> {
        self.compiled.lock().map_err(|_| Error::LockPoisoned {
            context: "query evaluator".to_string(),
        })
    }
}
