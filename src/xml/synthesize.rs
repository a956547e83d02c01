//! Structural synthesis of new elements below an existing node.
//!
//! Used to materialize implied plugin dependencies. The shared document is
//! never touched: the arena is cloned, the new nodes are appended, and the
//! returned handle points into the edited copy. Every node id that was valid
//! in the original stays valid in the copy, which is what makes
//! [`NodeHandle::reanchor`] safe afterwards.

use std::sync::{Arc, OnceLock};

use regex::Regex;

use super::cached_regex;
use super::document::{Document, NodeId, NodeKind};
use crate::doc::NodeHandle;
use crate::error::{Error, Result};

const INDENT: &str = "  ";

static ELEMENT_NAME: OnceLock<Regex> = OnceLock::new();

/// Creates `relative_path` below `below`, reusing intermediate elements that
/// already exist and always creating the final segment, then appends the
/// `leaves` as `<name>value</name>` children of the new element.
pub fn synthesize(below: &NodeHandle, relative_path: &str, leaves: &[(&str, &str)]) -> Result<NodeHandle> {
    let anchor = below.node();
    if !below.document().is_element(anchor) {
        return Err(Error::Synthesis {
            message: format!("node {} is not an element", anchor.index()),
        });
    }

    let valid_name = cached_regex(&ELEMENT_NAME, r"^[A-Za-z_][A-Za-z0-9_.\-]*$")?;
    let segments: Vec<&str> = relative_path
        .split('/')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect();

    let (last, intermediates) = segments.split_last().ok_or_else(|| Error::Synthesis {
        message: format!("'{}' names no element to create", relative_path),
    })?;

    for name in segments.iter().chain(leaves.iter().map(|(name, _)| name)) {
        if !valid_name.is_match(name) {
            return Err(Error::Synthesis {
                message: format!("'{}' is not a valid element name", name),
            });
        }
    }

    let mut document = Document::clone(below.document());

    let mut cursor = anchor;
    let mut reuse = true;
    for segment in intermediates {
        let existing = if reuse {
            document
                .children(cursor)
                .iter()
                .copied()
                .find(|child| document.name(*child) == Some(*segment))
        } else {
            None
        };

        cursor = match existing {
            Some(element) => element,
            None => {
                reuse = false;
                append_element(&mut document, cursor, segment)
            }
        };
    }

    let created = append_element(&mut document, cursor, last);
    for (name, value) in leaves {
        let leaf = append_element(&mut document, created, name);
        document.append_child(leaf, NodeKind::Text(value.to_string()));
    }

    NodeHandle::new(Arc::new(document), created)
}

/// Appends an element as the last element child of `parent`, keeping the
/// surrounding indentation consistent with the parent's depth.
fn append_element(document: &mut Document, parent: NodeId, name: &str) -> NodeId {
    let child_indent = format!("\n{}", INDENT.repeat(document.depth(parent) + 1));

    let trailing_whitespace = document
        .children(parent)
        .last()
        .and_then(|last| document.text(*last))
        .map(|text| text.trim().is_empty())
        .unwrap_or(false);

    if trailing_whitespace {
        let position = document.children(parent).len() - 1;
        document.insert_child(parent, position, NodeKind::Text(child_indent));
        document.insert_child(parent, position + 1, NodeKind::Element(name.to_string()))
    } else {
        let closing_indent = format!("\n{}", INDENT.repeat(document.depth(parent)));
        document.append_child(parent, NodeKind::Text(child_indent));
        let element = document.append_child(parent, NodeKind::Element(name.to_string()));
        document.append_child(parent, NodeKind::Text(closing_indent));
        element
    }
}
