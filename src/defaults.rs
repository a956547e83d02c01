//! Plugin default values and plugin implications.
//!
//! Both policies are plain objects handed to the reader and the descriptor
//! view. The standard tables reproduce what a stock Maven 3.0.4 installation
//! assumes; configuration can layer more entries on top (see `config`).

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::model::Coordinate;

/// Group id assumed for plugins declared without one.
pub const MAVEN_PLUGINS_GROUP_ID: &str = "org.apache.maven.plugins";

/// Fallback group ids and versions for plugins that omit them.
pub trait PluginDefaults: Send + Sync + fmt::Debug {
    fn default_group_id(&self, artifact_id: &str) -> String;

    fn default_version(&self, group_id: &str, artifact_id: &str) -> Option<String>;
}

/// Artifacts a plugin pulls in without declaring them.
pub trait PluginImplications: Send + Sync + fmt::Debug {
    /// Group/artifact references implied by `plugin`; its version is ignored.
    fn implied_coordinates(&self, plugin: &Coordinate) -> BTreeSet<Coordinate>;
}

/// Table-driven [`PluginDefaults`].
#[derive(Debug, Clone)]
pub struct StandardPluginDefaults {
    group_id: String,
    versions: HashMap<Coordinate, String>,
}

impl StandardPluginDefaults {
    /// Defaults with no versions and the given default group id.
    pub fn empty(group_id: &str) -> Self {
        Self {
            group_id: group_id.to_string(),
            versions: HashMap::new(),
        }
    }

    /// Lifecycle plugin versions bound by Maven 3.0.4.
    pub fn maven_3_0_4() -> Self {
        const VERSIONS: &[(&str, &str)] = &[
            ("maven-antrun-plugin", "1.3"),
            ("maven-assembly-plugin", "2.2-beta-5"),
            ("maven-clean-plugin", "2.4.1"),
            ("maven-compiler-plugin", "2.3.2"),
            ("maven-dependency-plugin", "2.1"),
            ("maven-deploy-plugin", "2.7"),
            ("maven-ear-plugin", "2.6"),
            ("maven-ejb-plugin", "2.3"),
            ("maven-install-plugin", "2.3.1"),
            ("maven-jar-plugin", "2.3.2"),
            ("maven-plugin-plugin", "2.9"),
            ("maven-rar-plugin", "2.2"),
            ("maven-release-plugin", "2.0"),
            ("maven-resources-plugin", "2.5"),
            ("maven-site-plugin", "3.0"),
            ("maven-surefire-plugin", "2.10"),
            ("maven-war-plugin", "2.1.1"),
        ];

        let mut defaults = Self::empty(MAVEN_PLUGINS_GROUP_ID);
        for (artifact_id, version) in VERSIONS {
            defaults.set_version(Coordinate::unversioned(MAVEN_PLUGINS_GROUP_ID, artifact_id), version);
        }
        defaults
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn set_group_id(&mut self, group_id: &str) {
        self.group_id = group_id.to_string();
    }

    /// Sets (or replaces) the default version of `plugin`.
    pub fn set_version(&mut self, plugin: Coordinate, version: &str) {
        self.versions.insert(plugin.without_version(), version.to_string());
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}

impl Default for StandardPluginDefaults {
    fn default() -> Self {
        Self::maven_3_0_4()
    }
}

impl PluginDefaults for StandardPluginDefaults {
    fn default_group_id(&self, _artifact_id: &str) -> String {
        self.group_id.clone()
    }

    fn default_version(&self, group_id: &str, artifact_id: &str) -> Option<String> {
        self.versions
            .get(&Coordinate::unversioned(group_id, artifact_id))
            .cloned()
    }
}

/// Table-driven [`PluginImplications`].
#[derive(Debug, Clone, Default)]
pub struct StandardPluginImplications {
    implied: HashMap<Coordinate, BTreeSet<Coordinate>>,
}

impl StandardPluginImplications {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Surefire and its test-framework providers.
    pub fn standard() -> Self {
        const SUREFIRE_GROUP_ID: &str = "org.apache.maven.surefire";
        const PROVIDERS: &[&str] = &[
            "surefire-junit3",
            "surefire-junit4",
            "surefire-junit47",
            "surefire-testng",
            "surefire-testng-utils",
        ];

        let mut implications = Self::empty();
        implications.add(
            Coordinate::unversioned(MAVEN_PLUGINS_GROUP_ID, "maven-surefire-plugin"),
            PROVIDERS
                .iter()
                .map(|provider| Coordinate::unversioned(SUREFIRE_GROUP_ID, provider)),
        );
        implications
    }

    /// Adds artifacts implied by `plugin`, merging with any already known.
    pub fn add(&mut self, plugin: Coordinate, implied: impl IntoIterator<Item = Coordinate>) {
        self.implied
            .entry(plugin.without_version())
            .or_default()
            .extend(implied.into_iter().map(|coordinate| coordinate.without_version()));
    }

    pub fn len(&self) -> usize {
        self.implied.len()
    }

    pub fn is_empty(&self) -> bool {
        self.implied.is_empty()
    }
}

impl PluginImplications for StandardPluginImplications {
    fn implied_coordinates(&self, plugin: &Coordinate) -> BTreeSet<Coordinate> {
        self.implied
            .get(&plugin.without_version())
            .cloned()
            .unwrap_or_default()
    }
}
