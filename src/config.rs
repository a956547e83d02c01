//! # Resolver Configuration
//!
//! This module defines the YAML configuration accepted by the `pom-view`
//! binary (and by library users who prefer a file over code). It tunes the
//! document cache and layers extra entries on top of the standard plugin
//! policies.
//!
//! ```yaml
//! cache:
//!   idle-timeout-secs: 300
//!   capacity: 512
//! plugin-defaults:
//!   group-id: org.apache.maven.plugins
//!   versions:
//!     - plugin: org.apache.maven.plugins:maven-compiler-plugin
//!       version: "3.1"
//! plugin-implications:
//!   - plugin: org.apache.maven.plugins:maven-surefire-plugin
//!     implies:
//!       - org.apache.maven.surefire:surefire-junit4
//! ```
//!
//! Every section is optional. An empty document is a valid configuration and
//! yields the built-in behaviour.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::{DocumentCache, DEFAULT_CAPACITY, DEFAULT_IDLE_TIMEOUT};
use crate::defaults::{StandardPluginDefaults, StandardPluginImplications};
use crate::error::{Error, Result};
use crate::model::Coordinate;

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ResolverConfig {
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub plugin_defaults: PluginDefaultsSettings,
    #[serde(default)]
    pub plugin_implications: Vec<ImplicationEntry>,
}

/// Document cache tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct CacheSettings {
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            idle_timeout_secs: default_idle_timeout_secs(),
            capacity: default_capacity(),
        }
    }
}

fn default_idle_timeout_secs() -> u64 {
    DEFAULT_IDLE_TIMEOUT.as_secs()
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

/// Overrides for the plugin defaults policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PluginDefaultsSettings {
    /// Group id assumed for plugins that declare none.
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub versions: Vec<VersionEntry>,
}

/// A default version for one plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VersionEntry {
    /// `group:artifact` of the plugin.
    pub plugin: String,
    pub version: String,
}

/// Artifacts one plugin implies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImplicationEntry {
    /// `group:artifact` of the plugin.
    pub plugin: String,
    /// `group:artifact` references of the implied artifacts.
    pub implies: Vec<String>,
}

impl ResolverConfig {
    /// A cache sized and timed as configured.
    pub fn document_cache(&self) -> DocumentCache {
        DocumentCache::with_settings(
            Duration::from_secs(self.cache.idle_timeout_secs),
            self.cache.capacity,
        )
    }

    /// The standard plugin defaults with the configured entries applied.
    pub fn plugin_defaults(&self) -> Result<StandardPluginDefaults> {
        let mut defaults = StandardPluginDefaults::maven_3_0_4();
        if let Some(group_id) = &self.plugin_defaults.group_id {
            defaults.set_group_id(group_id);
        }
        for entry in &self.plugin_defaults.versions {
            defaults.set_version(reference(&entry.plugin)?, &entry.version);
        }
        Ok(defaults)
    }

    /// The standard plugin implications with the configured entries added.
    pub fn plugin_implications(&self) -> Result<StandardPluginImplications> {
        let mut implications = StandardPluginImplications::standard();
        for entry in &self.plugin_implications {
            let implied = entry
                .implies
                .iter()
                .map(|text| reference(text))
                .collect::<Result<Vec<_>>>()?;
            implications.add(reference(&entry.plugin)?, implied);
        }
        Ok(implications)
    }
}

fn reference(text: &str) -> Result<Coordinate> {
    let coordinate: Coordinate = text.parse().map_err(|e| Error::ConfigParse {
        message: format!("invalid plugin reference '{}': {}", text, e),
    })?;
    Ok(coordinate.without_version())
}

/// Parses a configuration document.
pub fn parse(yaml_content: &str) -> Result<ResolverConfig> {
    if yaml_content.trim().is_empty() {
        return Ok(ResolverConfig::default());
    }

    let config: ResolverConfig = serde_yaml::from_str(yaml_content).map_err(|e| Error::ConfigParse {
        message: e.to_string(),
    })?;

    if config.cache.capacity == 0 {
        return Err(Error::ConfigParse {
            message: "cache capacity must be at least 1".to_string(),
        });
    }

    Ok(config)
}

/// Reads and parses a configuration file.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<ResolverConfig> {
    let content = std::fs::read_to_string(path).map_err(Error::Io)?;
    parse(&content)
}
