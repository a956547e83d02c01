//! Tolerant parsing of raw descriptor bytes.
//!
//! Real-world descriptors are not always well-formed: some lack the XML
//! declaration and some use named character entities that are never declared
//! (`&oslash;` in author names is a classic). Before handing the text to `xot`
//! the raw document is repaired so that those files still parse.

use std::sync::OnceLock;

use regex::{Captures, Regex};
use xot::Xot;

use super::cached_regex;
use super::document::{Document, NodeId, NodeKind};
use crate::error::{Error, Result};

const DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

static ENTITY: OnceLock<Regex> = OnceLock::new();
static LEGAL: OnceLock<Regex> = OnceLock::new();

/// Entity references that survive repair untouched.
const LEGAL_ENTITIES: &str = r"^(amp|apos|lt|gt|quot|#[0-9]+|#x[0-9a-fA-F]+)$";

/// Parses raw bytes into a navigable document.
///
/// `origin` names the source in error messages.
pub fn parse(origin: &str, bytes: &[u8]) -> Result<Document> {
    let text = std::str::from_utf8(bytes).map_err(|e| Error::XmlParse {
        origin: origin.to_string(),
        message: format!("invalid UTF-8: {}", e),
    })?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let repaired = repair(text)?;

    let mut xot = Xot::new();
    let root = xot.parse(&repaired).map_err(|e| Error::XmlParse {
        origin: origin.to_string(),
        message: format!("{:?}", e),
    })?;

    let mut document = Document::new();
    let document_root = document.root();
    copy_children(&xot, root, &mut document, document_root);

    if document.document_element().is_none() {
        return Err(Error::XmlParse {
            origin: origin.to_string(),
            message: "document has no root element".to_string(),
        });
    }

    Ok(document.sealed())
}

/// Ensures a declaration line is present and neutralizes undeclared entity
/// references by turning them into comments.
pub(crate) fn repair(text: &str) -> Result<String> {
    let entity = cached_regex(&ENTITY, r"&([^;]+);")?;
    let legal = cached_regex(&LEGAL, LEGAL_ENTITIES)?;

    let mut repaired = String::with_capacity(text.len() + DECLARATION.len() + 2);
    let mut lines = text.lines();

    let first = lines.next().unwrap_or_default().trim();
    if !first.starts_with("<?xml") {
        repaired.push_str(DECLARATION);
        repaired.push_str("\n\n");
    }

    for line in std::iter::once(first).chain(lines) {
        let fixed = entity.replace_all(line, |caps: &Captures| {
            let name = &caps[1];
            if legal.is_match(name) {
                caps[0].to_string()
            } else {
                format!("<!-- {} -->", name)
            }
        });
        repaired.push_str(&fixed);
        repaired.push('\n');
    }

    Ok(repaired)
}

fn copy_children(xot: &Xot, from: xot::Node, document: &mut Document, to: NodeId) {
    for child in xot.children(from) {
        if let Some(element) = xot.element(child) {
            let name = xot.local_name_str(element.name()).to_string();
            let id = document.append_child(to, NodeKind::Element(name));
            let attributes = xot.attributes(child);
            for (attribute, value) in attributes.iter() {
                document.add_attribute(id, xot.local_name_str(attribute), value);
            }
            copy_children(xot, child, document, id);
        } else if let Some(text) = xot.text_str(child) {
            document.append_child(to, NodeKind::Text(text.to_string()));
        }
    }
}
