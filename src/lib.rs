//! # Descriptor View Library
//!
//! This library resolves Maven project descriptors (POMs) together with their
//! ancestry into a single queryable view. A descriptor rarely stands alone: it
//! inherits values from its parent chain, imports managed dependencies from
//! BOMs, and refers to values through `${...}` expressions. `pom-view`
//! assembles all of that so callers can ask "what is this dependency's
//! version?" and get the answer the build would see.
//!
//! ## Quick Example
//!
//! ```
//! use std::sync::Arc;
//! use pom_view::cache::DocumentCache;
//! use pom_view::fetch::MemoryFetcher;
//! use pom_view::model::{Coordinate, Location};
//! use pom_view::reader::PomReader;
//!
//! let location = Location::new("mem://repo/").unwrap();
//! let fetcher = MemoryFetcher::new();
//!
//! let parent: Coordinate = "org.foo:parent:1".parse().unwrap();
//! fetcher.insert(&location, &parent, r#"<project>
//!   <groupId>org.foo</groupId><artifactId>parent</artifactId><version>1</version>
//!   <properties><lib.version>2.5</lib.version></properties>
//! </project>"#).unwrap();
//!
//! let child: Coordinate = "org.foo:child:1".parse().unwrap();
//! fetcher.insert(&location, &child, r#"<project>
//!   <parent><groupId>org.foo</groupId><artifactId>parent</artifactId><version>1</version></parent>
//!   <artifactId>child</artifactId>
//!   <dependencies>
//!     <dependency><groupId>lib</groupId><artifactId>core</artifactId><version>${lib.version}</version></dependency>
//!   </dependencies>
//! </project>"#).unwrap();
//!
//! let reader = PomReader::new(Arc::new(fetcher), DocumentCache::new());
//! let view = reader.read(&child, &[location]).unwrap();
//!
//! // groupId and version are inherited, artifactId is the child's own.
//! assert_eq!(view.coordinate().unwrap(), child);
//!
//! let dependencies = view.direct_dependencies().unwrap();
//! assert_eq!(dependencies[0].version().unwrap().as_deref(), Some("2.5"));
//! ```
//!
//! ## Core Concepts
//!
//! - **Documents (`xml`, `doc`)**: Descriptors are parsed into an arena
//!   [`xml::Document`]. Node identifiers stay valid across structural edits,
//!   which produce a new document version rather than mutating a shared one.
//! - **Queries (`query`)**: A compact path language (a subset of XPath 1.0
//!   covering elements, text, unions, predicates and the usual axes),
//!   compiled once per document and cached.
//! - **Views (`view`)**: [`view::XmlView`] answers queries over a stack of
//!   documents, honouring inheritance depth, local-only paths and mixins, and
//!   interpolates `${...}` expressions.
//! - **Descriptor views (`pom`)**: [`pom::PomView`] knows the descriptor
//!   layout and wraps dependencies, plugins, extensions and the parent
//!   reference as typed element views with management fallback.
//! - **Reading (`reader`, `fetch`, `cache`)**: [`reader::PomReader`] builds the
//!   ancestry stack through an [`fetch::ArtifactFetcher`], shares parsed
//!   documents through the [`cache::DocumentCache`], and imports BOMs.
//! - **Policies (`defaults`, `config`)**: default plugin versions and implied
//!   plugin dependencies, optionally extended from a YAML configuration.

pub mod cache;
pub mod config;
pub mod defaults;
pub mod doc;
pub mod error;
pub mod fetch;
pub mod model;
pub mod pom;
pub mod query;
pub mod reader;
pub mod view;
pub mod xml;

#[cfg(test)]
mod view_proptest;
