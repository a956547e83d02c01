//! Shared test utilities for integration and E2E tests.
//!
//! This module provides the descriptor fixtures under `tests/testdata/poms`
//! and helpers that turn them into views or into an on-disk repository.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let view = load_poms(&["pom-with-parent.xml", "simple-parent-pom.xml"]);
//!     // ... test code
//! }
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use assert_fs::prelude::*;
use assert_fs::TempDir;

use pom_view::defaults::{StandardPluginDefaults, StandardPluginImplications};
use pom_view::doc::DocumentHandle;
use pom_view::model::{Coordinate, Location};
use pom_view::pom::PomView;
use pom_view::view::XmlView;
use pom_view::xml;

/// Re-export commonly used test dependencies for convenience.
#[allow(unused_imports)]
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    pub use super::{fixture, load_docs, load_handle, load_poms, pom_locations, RepoFixture};
}

/// Coordinate every fixture-backed document is registered under.
#[allow(dead_code)]
pub fn fixture_reference() -> Coordinate {
    Coordinate::new("not.used", "project-ref", "1.0")
}

/// Path of a fixture file.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("testdata")
        .join("poms")
        .join(name)
}

/// Contents of a fixture file.
pub fn fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name))
        .unwrap_or_else(|e| panic!("cannot read fixture {}: {}", name, e))
}

/// A parsed fixture as a document handle.
pub fn load_handle(name: &str) -> Arc<DocumentHandle> {
    let document = xml::parse(name, fixture(name).as_bytes())
        .unwrap_or_else(|e| panic!("cannot parse fixture {}: {}", name, e));
    Arc::new(DocumentHandle::new(
        fixture_reference(),
        Location::new("http://localhost:8080/").unwrap(),
        document,
    ))
}

/// A descriptor view over the named fixtures, first one first.
#[allow(dead_code)]
pub fn load_poms(names: &[&str]) -> PomView {
    PomView::new(
        fixture_reference(),
        names.iter().map(|name| load_handle(name)).collect(),
        Arc::new(StandardPluginDefaults::maven_3_0_4()),
        Arc::new(StandardPluginImplications::standard()),
    )
    .unwrap()
}

/// A generic view over the named fixtures.
#[allow(dead_code)]
pub fn load_docs(local_only: &[&str], names: &[&str]) -> XmlView {
    XmlView::new(names.iter().map(|name| load_handle(name)).collect(), local_only)
}

/// Locations for a list of repository fixtures.
#[allow(dead_code)]
pub fn pom_locations(repos: &[&RepoFixture]) -> Vec<Location> {
    repos.iter().map(|repo| repo.location()).collect()
}

/// A temporary directory in repository layout.
#[allow(dead_code)]
pub struct RepoFixture {
    pub root: TempDir,
}

#[allow(dead_code)]
impl RepoFixture {
    pub fn new() -> Self {
        Self {
            root: TempDir::new().unwrap(),
        }
    }

    /// Places fixture `name` as the descriptor of `coordinate`.
    pub fn install(&self, coordinate: &str, name: &str) -> &Self {
        self.install_text(coordinate, &fixture(name))
    }

    /// Places `text` as the descriptor of `coordinate`.
    pub fn install_text(&self, coordinate: &str, text: &str) -> &Self {
        let coordinate: Coordinate = coordinate.parse().unwrap();
        self.root
            .child(coordinate.repository_path().unwrap())
            .write_str(text)
            .unwrap();
        self
    }

    pub fn location(&self) -> Location {
        Location::from_directory(self.root.path()).unwrap()
    }

    pub fn path(&self) -> &std::path::Path {
        self.root.path()
    }
}
