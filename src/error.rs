//! # Error Handling
//!
//! This module defines the centralized error type for `pom-view`. It uses the
//! `thiserror` library to describe every failure the resolution engine can
//! surface, with enough context (paths, coordinates, ancestry depth) to make
//! the message useful on its own.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum covering all failure modes.
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! The failure modes fall into a few groups:
//!
//! - Query errors: a malformed path expression, or a failure while evaluating
//!   one against a parsed document. Both are fatal for the call that raised
//!   them; a broken query is a programming error, not a data condition.
//! - Resolution errors: an ancestor or imported BOM could not be fetched or
//!   parsed. These carry the coordinate and the depth in the ancestry stack.
//! - Document errors: parsing and structural synthesis.
//! - Identity errors: invalid coordinates and locations, cycles.
//! - Wrapped library errors: I/O, YAML, regex and URL parsing.
//!
//! Interpolation failures are deliberately absent: they are recovered inside
//! the view and never reach callers (see `view::interpolate`).

use thiserror::Error;

/// Main error type for pom-view operations
#[derive(Error, Debug)]
pub enum Error {
    /// A path expression could not be compiled.
    #[error("Query syntax error in '{path}': {message}")]
    QuerySyntax { path: String, message: String },

    /// A compiled path expression failed while navigating a document.
    #[error("Query evaluation error in '{path}': {message}")]
    QueryEvaluation { path: String, message: String },

    /// A node handle was re-anchored into a document that does not contain
    /// its index.
    #[error("Stale node reference: index {index} does not exist in the target document")]
    StaleNode { index: usize },

    /// No candidate location holds the requested descriptor.
    #[error("Cannot resolve {coordinate}, {depth} levels deep in the ancestry stack of: {root}")]
    Unresolvable {
        coordinate: String,
        depth: usize,
        root: String,
    },

    /// Fetching or parsing a descriptor in the ancestry stack failed.
    #[error("Failed to retrieve {coordinate}, {depth} levels deep in the ancestry stack of: {root}. Reason: {source}")]
    Retrieval {
        coordinate: String,
        depth: usize,
        root: String,
        source: Box<Error>,
    },

    /// The fetch collaborator failed to read from a location.
    #[error("Transfer error for {location}: {message}")]
    Transfer { location: String, message: String },

    /// A document could not be parsed.
    #[error("Cannot parse {origin}: {message}")]
    XmlParse { origin: String, message: String },

    /// A structural edit could not be applied.
    #[error("Document synthesis error: {message}")]
    Synthesis { message: String },

    /// A coordinate is malformed or incomplete.
    #[error("Invalid coordinate: {message}")]
    InvalidCoordinate { message: String },

    /// A location could not be interpreted.
    #[error("Invalid location {location}: {message}")]
    InvalidLocation { location: String, message: String },

    /// A descriptor view needs at least one document.
    #[error("Cannot create a descriptor view with an empty document stack")]
    EmptyStack,

    /// A parent chain or BOM import chain revisits a coordinate.
    #[error("Cycle detected: {cycle}")]
    CycleDetected { cycle: String },

    /// The YAML configuration could not be interpreted.
    #[error("Configuration parsing error: {message}")]
    ConfigParse { message: String },

    /// An error indicating that a mutex or other lock has been poisoned.
    #[error("Lock poisoned: {context}")]
    LockPoisoned { context: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
