//! Integration tests for resolving descriptors out of on-disk repositories.

mod common;

use std::sync::Arc;

use common::prelude::*;
use pom_view::cache::{CacheKey, DocumentCache};
use pom_view::error::Error;
use pom_view::fetch::FilesystemFetcher;
use pom_view::model::{Coordinate, DependencyScope};
use pom_view::reader::PomReader;
use pom_view::view::MixinScope;

fn reader() -> PomReader {
    PomReader::new(Arc::new(FilesystemFetcher::new()), DocumentCache::new())
}

fn parent_repo() -> RepoFixture {
    let repo = RepoFixture::new();
    repo.install("org.foo:parent:1.0.0.0", "simple-parent-pom.xml")
        .install("org.foo:child:1.0.0.0", "pom-with-parent.xml");
    repo
}

fn bom_repo() -> RepoFixture {
    let repo = RepoFixture::new();
    repo.install("org.test:simple-bom:1", "simple-bom.xml")
        .install("org.test:bom-user:1", "pom-with-bom.xml")
        .install("org.test:bom-child:1", "pom-with-bom-child.xml");
    repo
}

#[test]
fn test_read_child_with_parent() {
    let repo = parent_repo();
    let view = reader()
        .read(&"org.foo:child:1.0.0.0".parse().unwrap(), &pom_locations(&[&repo]))
        .unwrap();

    let stack = view.view().stack();
    assert_eq!(stack.len(), 2);
    assert_eq!(stack[1].coordinate(), &Coordinate::new("org.foo", "parent", "1.0.0.0"));

    let dependencies = view.direct_dependencies().unwrap();
    assert_eq!(dependencies[0].version().unwrap().as_deref(), Some("4.11"));
}

#[test]
fn test_parent_found_in_second_repository() {
    let first = RepoFixture::new();
    first.install("org.foo:child:1.0.0.0", "pom-with-parent.xml");
    let second = RepoFixture::new();
    second.install("org.foo:parent:1.0.0.0", "simple-parent-pom.xml");

    let view = reader()
        .read(&"org.foo:child:1.0.0.0".parse().unwrap(), &pom_locations(&[&first, &second]))
        .unwrap();

    assert_eq!(view.view().stack().len(), 2);
    assert_eq!(view.view().stack()[1].location(), &second.location());
}

#[test]
fn test_parents_are_cached_between_reads() {
    let repo = parent_repo();
    let reader = reader();
    let locations = pom_locations(&[&repo]);
    let parent_key = CacheKey::new(Coordinate::new("org.foo", "parent", "1.0.0.0"), repo.location());

    reader.read(&"org.foo:child:1.0.0.0".parse().unwrap(), &locations).unwrap();
    assert!(reader.cache().contains(&parent_key).unwrap());
    assert_eq!(reader.cache().len().unwrap(), 1);

    std::fs::remove_file(repo.path().join("org/foo/parent/1.0.0.0/parent-1.0.0.0.pom")).unwrap();
    let view = reader.read(&"org.foo:child:1.0.0.0".parse().unwrap(), &locations).unwrap();
    assert_eq!(view.view().stack().len(), 2);
}

#[test]
fn test_missing_parent_reports_depth() {
    let repo = RepoFixture::new();
    repo.install("org.foo:child:1.0.0.0", "pom-with-parent.xml");

    let error = reader()
        .read(&"org.foo:child:1.0.0.0".parse().unwrap(), &pom_locations(&[&repo]))
        .unwrap_err();

    match &error {
        Error::Unresolvable { coordinate, depth, .. } => {
            assert_eq!(coordinate, "org.foo:parent:1.0.0.0");
            assert_eq!(*depth, 1);
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(error.to_string().starts_with("Cannot resolve org.foo:parent:1.0.0.0, 1 levels deep"));
}

#[test]
fn test_malformed_descriptor_is_a_retrieval_failure() {
    let repo = RepoFixture::new();
    repo.install_text("org.foo:broken:1", "<project><artifactId>");

    let error = reader()
        .read(&"org.foo:broken:1".parse().unwrap(), &pom_locations(&[&repo]))
        .unwrap_err();
    assert!(error.to_string().starts_with("Failed to retrieve org.foo:broken:1, 0 levels deep"));
}

#[test]
fn test_bom_import_is_attached() {
    let repo = bom_repo();
    let view = reader()
        .read(&"org.test:bom-user:1".parse().unwrap(), &pom_locations(&[&repo]))
        .unwrap();

    let mixins = view.view().mixins();
    assert_eq!(mixins.len(), 1);
    assert_eq!(mixins[0].scope(), &MixinScope::DependencyManagement);

    let dependencies = view.direct_dependencies().unwrap();
    assert_eq!(dependencies[0].version().unwrap().as_deref(), Some("1.0"));
    assert_eq!(dependencies[0].scope().unwrap(), DependencyScope::Test);
}

#[test]
fn test_bom_import_declared_by_parent() {
    let repo = bom_repo();
    let view = reader()
        .read(&"org.test:bom-child:1".parse().unwrap(), &pom_locations(&[&repo]))
        .unwrap();

    assert_eq!(view.view().stack().len(), 2);
    assert_eq!(view.view().mixins().len(), 1);

    let dependencies = view.direct_dependencies().unwrap();
    assert_eq!(dependencies.len(), 1);
    assert_eq!(dependencies[0].version().unwrap().as_deref(), Some("1.0"));
}

#[test]
fn test_missing_bom_fails_resolution() {
    let repo = RepoFixture::new();
    repo.install("org.test:bom-user:1", "pom-with-bom.xml");

    let error = reader()
        .read(&"org.test:bom-user:1".parse().unwrap(), &pom_locations(&[&repo]))
        .unwrap_err();
    assert!(error.to_string().contains("Cannot resolve org.test:simple-bom:1"));
}
