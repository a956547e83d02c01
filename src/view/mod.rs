//! # Multi-document views
//!
//! An [`XmlView`] answers path queries against an ordered stack of documents:
//! index 0 is the descriptor itself and each following entry is the next
//! ancestor. Queries walk the stack from the front and honour an inheritance
//! [`Depth`]. Three query modes are available:
//!
//! - **single node** ([`XmlView::resolve_node`]): the first match in stack
//!   order;
//! - **first list** ([`XmlView::resolve_first_list`]): every match from the
//!   first document that has any ("inherit until someone defines it");
//! - **aggregated list** ([`XmlView::resolve_aggregated_list`]): all matches
//!   from every document within depth, self before ancestors.
//!
//! Paths under a local-only prefix never inherit: the depth is clamped to
//! [`Depth::LOCAL`] before the scan begins. When the stack yields nothing (or,
//! for aggregation, always) the attached [`Mixin`]s whose scope matches the
//! path are consulted in attachment order.

pub mod interpolate;
pub mod mixin;

use std::sync::{Arc, OnceLock};

use log::error;

use crate::doc::{DocumentHandle, NodeHandle};
use crate::error::Result;
use crate::query::{self, QueryEvaluator};

pub use interpolate::{InterpolationError, Interpolator, ValueSource};
pub use mixin::{Mixin, MixinScope};

const TEXT_STEP: &str = "/text()";

/// How far up the ancestry a query may look.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Depth {
    /// Every document in the stack.
    Unlimited,
    /// The descriptor plus this many ancestors.
    Limited(usize),
}

impl Depth {
    /// Only the descriptor itself.
    pub const LOCAL: Depth = Depth::Limited(0);

    /// Maps the numeric convention where any negative value means unlimited.
    pub fn from_max(max: i32) -> Self {
        match usize::try_from(max) {
            Ok(limit) => Depth::Limited(limit),
            Err(_) => Depth::Unlimited,
        }
    }

    /// Whether the stack entry at `index` is within reach.
    pub fn admits(self, index: usize) -> bool {
        match self {
            Depth::Unlimited => true,
            Depth::Limited(limit) => index <= limit,
        }
    }
}

/// A stack of documents queried as one.
#[derive(Debug)]
pub struct XmlView {
    stack: Vec<Arc<DocumentHandle>>,
    local_only: Vec<String>,
    aliases: Vec<(String, String)>,
    mixins: Vec<Mixin>,
    interpolator: OnceLock<Interpolator>,
}

impl XmlView {
    /// Creates a view over `stack`; paths starting with any of `local_only`
    /// never consult ancestors.
    pub fn new(stack: Vec<Arc<DocumentHandle>>, local_only: &[&str]) -> Self {
        Self {
            stack,
            local_only: local_only.iter().map(|prefix| prefix.to_string()).collect(),
            aliases: Vec::new(),
            mixins: Vec::new(),
            interpolator: OnceLock::new(),
        }
    }

    /// Registers a legacy expression prefix, e.g. `pom.` for `project.`.
    pub fn with_alias(mut self, alias: &str, canonical: &str) -> Self {
        self.aliases.push((alias.to_string(), canonical.to_string()));
        self
    }

    pub fn stack(&self) -> &[Arc<DocumentHandle>] {
        &self.stack
    }

    pub fn head(&self) -> Option<&Arc<DocumentHandle>> {
        self.stack.first()
    }

    pub fn mixins(&self) -> &[Mixin] {
        &self.mixins
    }

    /// Attaches a mixin. Only done while a view is being assembled, before it
    /// is shared.
    pub fn add_mixin(&mut self, mixin: Mixin) {
        self.mixins.push(mixin);
    }

    pub fn is_local_only(&self, path: &str) -> bool {
        self.local_only.iter().any(|prefix| path.starts_with(prefix.as_str()))
    }

    /// The depth a query on `path` actually runs with.
    pub fn effective_depth(&self, path: &str, requested: Depth) -> Depth {
        if self.is_local_only(path) {
            Depth::LOCAL
        } else {
            requested
        }
    }

    fn reachable(&self, depth: Depth) -> impl Iterator<Item = &Arc<DocumentHandle>> {
        self.stack
            .iter()
            .enumerate()
            .take_while(move |(index, _)| depth.admits(*index))
            .map(|(_, handle)| handle)
    }

    fn matching_mixins<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a Mixin> + 'a {
        self.mixins.iter().filter(move |mixin| mixin.matches(path))
    }

    /// First node matching `path`, in stack order, then in mixins.
    pub fn resolve_node(&self, path: &str, depth: Depth) -> Result<Option<NodeHandle>> {
        let depth = self.effective_depth(path, depth);

        for handle in self.reachable(depth) {
            if let Some(found) = handle.select(path)?.into_iter().next() {
                return Ok(Some(found));
            }
        }

        for mixin in self.matching_mixins(path) {
            if let Some(found) = mixin.view().resolve_node(path, depth)? {
                return Ok(Some(found));
            }
        }

        Ok(None)
    }

    /// All matches from the first document (or mixin) that has any.
    pub fn resolve_first_list(&self, path: &str, depth: Depth) -> Result<Option<Vec<NodeHandle>>> {
        let depth = self.effective_depth(path, depth);

        for handle in self.reachable(depth) {
            let found = handle.select(path)?;
            if !found.is_empty() {
                return Ok(Some(found));
            }
        }

        for mixin in self.matching_mixins(path) {
            if let Some(found) = mixin.view().resolve_first_list(path, depth)? {
                return Ok(Some(found));
            }
        }

        Ok(None)
    }

    /// Matches from every reachable document followed by every matching
    /// mixin.
    pub fn resolve_aggregated_list(&self, path: &str, depth: Depth) -> Result<Vec<NodeHandle>> {
        let depth = self.effective_depth(path, depth);
        let mut result = Vec::new();

        for handle in self.reachable(depth) {
            result.extend(handle.select(path)?);
        }

        for mixin in self.matching_mixins(path) {
            result.extend(mixin.view().resolve_aggregated_list(path, depth)?);
        }

        Ok(result)
    }

    fn select_from(&self, node: &NodeHandle, path: &str) -> Result<Vec<NodeHandle>> {
        match self.head() {
            Some(head) => node.select(head.evaluator(), path),
            None => node.select(&QueryEvaluator::new(), path),
        }
    }

    /// First match of `path` evaluated with `node` as the context node.
    pub fn resolve_from(&self, node: &NodeHandle, path: &str) -> Result<Option<NodeHandle>> {
        Ok(self.select_from(node, path)?.into_iter().next())
    }

    /// All matches of `path` evaluated with `node` as the context node.
    pub fn resolve_list_from(&self, node: &NodeHandle, path: &str) -> Result<Vec<NodeHandle>> {
        self.select_from(node, path)
    }

    /// Normalized, interpolated text of `node`.
    pub fn node_value(&self, node: &NodeHandle) -> Option<String> {
        node.text().map(|text| self.resolve_expressions(&text, &[]))
    }

    /// Interpolated value of the first node matching `path`.
    pub fn resolve_value(&self, path: &str, depth: Depth) -> Result<Option<String>> {
        let node = self.resolve_node(&with_text_step(path), depth)?;
        Ok(node.and_then(|node| self.node_value(&node)))
    }

    /// Interpolated values of all nodes matching `path`, aggregated.
    pub fn resolve_values(&self, path: &str, depth: Depth) -> Result<Vec<String>> {
        let nodes = self.resolve_aggregated_list(&with_text_step(path), depth)?;
        Ok(nodes.iter().filter_map(|node| self.node_value(node)).collect())
    }

    pub fn resolve_value_from(&self, node: &NodeHandle, path: &str) -> Result<Option<String>> {
        let found = self.resolve_from(node, &with_text_step(path))?;
        Ok(found.and_then(|found| self.node_value(&found)))
    }

    pub fn resolve_values_from(&self, node: &NodeHandle, path: &str) -> Result<Vec<String>> {
        let nodes = self.resolve_list_from(node, &with_text_step(path))?;
        Ok(nodes.iter().filter_map(|node| self.node_value(node)).collect())
    }

    fn interpolator(&self) -> Option<&Interpolator> {
        if self.interpolator.get().is_none() {
            match Interpolator::new() {
                Ok(interpolator) => {
                    let _ = self.interpolator.set(interpolator);
                }
                Err(e) => {
                    error!("Cannot build expression interpolator: {}", e);
                    return None;
                }
            }
        }
        self.interpolator.get()
    }

    /// Whether `text` contains a `${...}` expression.
    pub fn contains_expression(&self, text: &str) -> bool {
        self.interpolator()
            .map(|interpolator| interpolator.contains_expression(text))
            .unwrap_or(false)
    }

    /// Substitutes `${...}` expressions in `text`, looking names up in this
    /// view. Properties of the given profiles are consulted last. Returns
    /// `text` unchanged when any expression cannot be resolved.
    pub fn resolve_expressions(&self, text: &str, profiles: &[String]) -> String {
        let Some(interpolator) = self.interpolator() else {
            return text.to_string();
        };

        if !interpolator.contains_expression(text) {
            return text.to_string();
        }

        let source = ViewValueSource { view: self, profiles };
        interpolator.resolve(text, &source)
    }

    /// Raw value of an expression name: a project path, then a property,
    /// then a property of each active profile.
    pub fn lookup_expression(&self, name: &str, profiles: &[String]) -> Result<Option<String>> {
        let mut expression = name.to_string();
        for (alias, canonical) in &self.aliases {
            if let Some(rest) = name.strip_prefix(alias.as_str()) {
                expression = format!("{}{}", canonical, rest);
                break;
            }
        }

        let mut path = expression.replace('.', "/");
        if !path.starts_with('/') {
            path.insert(0, '/');
        }
        if !path.starts_with("/project") {
            path = format!("/project{}", path);
        }

        if let Some(value) = self.raw_value(&path)? {
            return Ok(Some(value));
        }

        if let Some(value) = self.raw_value(&format!("//properties/{}", expression))? {
            return Ok(Some(value));
        }

        for profile in profiles {
            let Some(id) = query::quote_literal(profile) else {
                continue;
            };
            let path = format!("//profile[id/text()={}]/properties/{}", id, expression);
            if let Some(value) = self.raw_value(&path)? {
                return Ok(Some(value));
            }
        }

        Ok(None)
    }

    fn raw_value(&self, path: &str) -> Result<Option<String>> {
        let node = self.resolve_node(&with_text_step(path), Depth::Unlimited)?;
        Ok(node.and_then(|node| node.text()))
    }

    pub fn to_text(&self, node: &NodeHandle) -> String {
        node.to_text()
    }

    /// Human-readable outline of the stack and, recursively, the mixins.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        self.describe_into(&mut out, 0);
        out
    }

    fn describe_into(&self, out: &mut String, level: usize) {
        let pad = "  ".repeat(level);
        for (index, handle) in self.stack.iter().enumerate() {
            out.push_str(&format!("{}[{}] {}\n", pad, index, handle));
        }
        for mixin in &self.mixins {
            out.push_str(&format!("{}mixin ({}):\n", pad, mixin.scope()));
            mixin.view().describe_into(out, level + 1);
        }
    }
}

struct ViewValueSource<'a> {
    view: &'a XmlView,
    profiles: &'a [String],
}

impl ValueSource for ViewValueSource<'_> {
    fn lookup(&self, name: &str) -> Result<Option<String>> {
        self.view.lookup_expression(name, self.profiles)
    }
}

/// Appends a `text()` step unless the path already selects text or ends on an
/// attribute.
fn with_text_step(path: &str) -> String {
    let last_step = path.rsplit('/').next().unwrap_or(path);
    if path.ends_with(TEXT_STEP) || last_step.starts_with('@') || last_step.starts_with("attribute::") {
        path.to_string()
    } else {
        format!("{}{}", path, TEXT_STEP)
    }
}
