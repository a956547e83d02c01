//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `pom-view` command-line tool. Each subcommand is defined in its own file.
//!
//! ## Structure
//!
//! Each command module contains:
//! - An `Args` struct that defines the command-specific arguments, with the
//!   shared [`TargetArgs`] flattened in.
//! - An `execute` function that takes the parsed `Args`, loads the view with
//!   [`load_view`] and prints the result.

pub mod deps;
pub mod eval;
pub mod plugins;
pub mod show;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::Args;

use pom_view::config::{self, ResolverConfig};
use pom_view::doc::DocumentHandle;
use pom_view::fetch::{FilesystemFetcher, Transfer};
use pom_view::model::{Coordinate, Location};
use pom_view::pom::PomView;
use pom_view::reader::{project_coordinate, PomReader};
use pom_view::xml;

/// Which descriptor to resolve and where to look for it.
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Repository root directory, in repository layout. Repeat to search
    /// several; earlier roots win.
    #[arg(long = "repo", value_name = "DIR", required = true)]
    pub repos: Vec<PathBuf>,

    /// Coordinate of the descriptor to resolve (group:artifact:version).
    #[arg(short, long, value_name = "GAV", required_unless_present = "file", conflicts_with = "file")]
    pub coordinate: Option<String>,

    /// Resolve a descriptor file instead of a coordinate. Its parents are
    /// still looked up in the repositories.
    #[arg(short, long, value_name = "POM")]
    pub file: Option<PathBuf>,

    /// Path to a YAML resolver configuration.
    /// Can also be set with the `POM_VIEW_CONFIG` environment variable.
    #[arg(long, value_name = "FILE", env = "POM_VIEW_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Loads the configuration named by `args`, or the built-in one.
pub fn load_config(args: &TargetArgs) -> Result<ResolverConfig> {
    match &args.config {
        Some(path) => config::from_file(path)
            .map_err(|e| anyhow!("Failed to load config from {}: {}", path.display(), e)),
        None => Ok(ResolverConfig::default()),
    }
}

/// Builds the view `args` asks for.
pub fn load_view(args: &TargetArgs) -> Result<PomView> {
    let config = load_config(args)?;
    let reader = PomReader::with_policies(
        Arc::new(FilesystemFetcher::new()),
        config.document_cache(),
        Arc::new(config.plugin_defaults()?),
        Arc::new(config.plugin_implications()?),
    );

    let locations = args
        .repos
        .iter()
        .map(|repo| Location::from_directory(repo))
        .collect::<pom_view::error::Result<Vec<_>>>()?;

    if let Some(file) = &args.file {
        return load_file(&reader, file, &locations);
    }

    let text = args
        .coordinate
        .as_deref()
        .ok_or_else(|| anyhow!("Either --coordinate or --file is required"))?;
    let coordinate: Coordinate = text.parse()?;
    if coordinate.version().is_none() {
        return Err(anyhow!("Coordinate {} needs a version", coordinate));
    }

    Ok(reader.read(&coordinate, &locations)?)
}

fn load_file(reader: &PomReader, file: &Path, locations: &[Location]) -> Result<PomView> {
    let bytes = std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;

    let directory = file
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let location = Location::from_directory(&directory)?;

    // The descriptor names its own coordinate; parse once to learn it.
    let scratch = DocumentHandle::new(
        Coordinate::unversioned("unknown", "unknown"),
        location.clone(),
        xml::parse(&file.display().to_string(), &bytes)?,
    );
    let coordinate = project_coordinate(&scratch)?;

    Ok(reader.read_transfer(&coordinate, Transfer::new(location, bytes), locations)?)
}

/// Text for an optional value in listings.
pub fn or_unknown(value: Option<String>) -> String {
    value.unwrap_or_else(|| "?".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_pom(root: &std::path::Path, group: &str, artifact: &str, version: &str, body: &str) {
        let dir = root
            .join(group.replace('.', "/"))
            .join(artifact)
            .join(version);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(format!("{}-{}.pom", artifact, version)), body).unwrap();
    }

    fn target(repo: &std::path::Path) -> TargetArgs {
        TargetArgs {
            repos: vec![repo.to_path_buf()],
            coordinate: None,
            file: None,
            config: None,
        }
    }

    #[test]
    fn test_load_view_by_coordinate() {
        let repo = TempDir::new().unwrap();
        write_pom(
            repo.path(),
            "org.foo",
            "bar",
            "1",
            "<project><groupId>org.foo</groupId><artifactId>bar</artifactId><version>1</version></project>",
        );

        let mut args = target(repo.path());
        args.coordinate = Some("org.foo:bar:1".to_string());
        let view = load_view(&args).unwrap();
        assert_eq!(view.coordinate().unwrap(), Coordinate::new("org.foo", "bar", "1"));
    }

    #[test]
    fn test_load_view_from_file() {
        let repo = TempDir::new().unwrap();
        write_pom(
            repo.path(),
            "org.foo",
            "parent",
            "1",
            "<project><groupId>org.foo</groupId><artifactId>parent</artifactId><version>1</version></project>",
        );
        let work = TempDir::new().unwrap();
        let file = work.path().join("pom.xml");
        std::fs::write(
            &file,
            "<project><parent><groupId>org.foo</groupId><artifactId>parent</artifactId><version>1</version></parent><artifactId>app</artifactId></project>",
        )
        .unwrap();

        let mut args = target(repo.path());
        args.file = Some(file);
        let view = load_view(&args).unwrap();
        assert_eq!(view.view().stack().len(), 2);
        assert_eq!(view.coordinate().unwrap(), Coordinate::new("org.foo", "app", "1"));
    }

    #[test]
    fn test_load_view_missing_descriptor() {
        let repo = TempDir::new().unwrap();
        let mut args = target(repo.path());
        args.coordinate = Some("org.foo:missing:1".to_string());
        let error = load_view(&args).unwrap_err();
        assert!(error.to_string().contains("Cannot resolve org.foo:missing:1"));
    }

    #[test]
    fn test_load_view_rejects_unversioned_coordinate() {
        let repo = TempDir::new().unwrap();
        let mut args = target(repo.path());
        args.coordinate = Some("org.foo:bar".to_string());
        assert!(load_view(&args).is_err());
    }

    #[test]
    fn test_load_config_missing_file() {
        let repo = TempDir::new().unwrap();
        let mut args = target(repo.path());
        args.config = Some(PathBuf::from("/nonexistent/pom-view.yaml"));
        let error = load_config(&args).unwrap_err();
        assert!(error.to_string().contains("Failed to load config"));
    }
}
