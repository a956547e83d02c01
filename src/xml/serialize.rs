//! Rendering of node subtrees back to text.

use super::document::{Document, NodeId, NodeKind};

const INDENT: &str = "  ";

/// Serializes the subtree rooted at `node`, indented to its nesting depth.
///
/// Text and attribute values are escaped and elements without children are
/// self-closed. Whitespace text nodes inside the subtree are written as-is, so
/// a parsed fragment keeps its original layout. An attribute node renders as
/// `name="value"`.
pub fn to_text(document: &Document, node: NodeId) -> String {
    if document.is_attribute(node) {
        let mut out = String::new();
        write_node(document, node, &mut out);
        return out;
    }
    let mut out = INDENT.repeat(document.depth(node));
    write_node(document, node, &mut out);
    out
}

fn write_node(document: &Document, node: NodeId, out: &mut String) {
    match document.kind(node) {
        Some(NodeKind::Document) => {
            for child in document.children(node) {
                write_node(document, *child, out);
            }
        }
        Some(NodeKind::Element(name)) => {
            let children = document.children(node);
            out.push('<');
            out.push_str(name);
            for attribute in document.attributes(node) {
                out.push(' ');
                write_node(document, *attribute, out);
            }
            if children.is_empty() {
                out.push_str("/>");
                return;
            }

            out.push('>');
            for child in children {
                write_node(document, *child, out);
            }
            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
        Some(NodeKind::Attribute { name, value }) => {
            out.push_str(name);
            out.push_str("=\"");
            escape_into(value, true, out);
            out.push('"');
        }
        Some(NodeKind::Text(text)) => escape_into(text, false, out),
        None => {}
    }
}

fn escape_into(text: &str, quoted: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if quoted => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}
