//! Document infrastructure: the arena document model, tolerant parsing,
//! subtree serialization and structural synthesis.

pub mod document;
pub mod parse;
pub mod serialize;
pub mod synthesize;

use std::sync::OnceLock;

use regex::Regex;

use crate::error::Result;

pub use document::{Document, NodeId, NodeKind};
pub use parse::parse;
pub use serialize::to_text;
pub use synthesize::synthesize;

/// Compiles `pattern` into `cell` on first use and returns the shared regex.
pub(crate) fn cached_regex(cell: &'static OnceLock<Regex>, pattern: &str) -> Result<&'static Regex> {
    if let Some(regex) = cell.get() {
        return Ok(regex);
    }
    let regex = Regex::new(pattern)?;
    Ok(cell.get_or_init(|| regex))
}
