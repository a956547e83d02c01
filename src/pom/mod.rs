//! # Descriptor views
//!
//! [`PomView`] specializes the generic [`XmlView`] for project descriptors. It
//! knows where dependencies, plugins, extensions and the parent reference
//! live, wraps them as typed element views, and carries the plugin policies
//! those element views fall back on.
//!
//! Every list query joins the top-level section with the same section inside
//! any profile, so profile-scoped declarations come back together with the
//! top-level ones, in document order.

pub mod element;

use std::sync::Arc;

use crate::defaults::{PluginDefaults, PluginImplications};
use crate::doc::{DocumentHandle, NodeHandle};
use crate::error::{Error, Result};
use crate::model::Coordinate;
use crate::view::{Depth, Mixin, XmlView};

pub use element::{
    DependencyView, ElementView, ExtensionView, ParentView, PluginDependencyView, PluginView, ReferenceView,
};

/// Paths that describe the descriptor itself and therefore never inherit.
pub const LOCAL_ONLY_PATHS: &[&str] = &["/project/parent", "/project/artifactId"];

const DIRECT_DEPENDENCIES: &str =
    "/project/dependencies/dependency|/project/profiles/profile/dependencies/dependency";

const MANAGED_DEPENDENCIES: &str = "/project/dependencyManagement/dependencies/dependency|\
     /project/profiles/profile/dependencyManagement/dependencies/dependency";

const BOMS: &str = "/project/dependencyManagement/dependencies/dependency[type/text()=\"pom\" and scope/text()=\"import\"]|\
     /project/profiles/profile/dependencyManagement/dependencies/dependency[type/text()=\"pom\" and scope/text()=\"import\"]";

const BUILD_PLUGINS: &str = "/project/build/plugins/plugin|/project/profiles/profile/build/plugins/plugin";

const MANAGED_PLUGINS: &str = "/project/build/pluginManagement/plugins/plugin|\
     /project/profiles/profile/build/pluginManagement/plugins/plugin";

const BUILD_EXTENSIONS: &str =
    "/project/build/extensions/extension|/project/profiles/profile/build/extensions/extension";

/// A resolved project descriptor: the descriptor, its ancestors and any
/// imported BOMs, queried as one.
#[derive(Debug)]
pub struct PomView {
    view: XmlView,
    reference: Coordinate,
    plugin_defaults: Arc<dyn PluginDefaults>,
    plugin_implications: Arc<dyn PluginImplications>,
}

impl PomView {
    /// Builds a view over `stack` (the descriptor first, then its ancestors).
    ///
    /// Fails with [`Error::EmptyStack`] when `stack` is empty.
    pub fn new(
        reference: Coordinate,
        stack: Vec<Arc<DocumentHandle>>,
        plugin_defaults: Arc<dyn PluginDefaults>,
        plugin_implications: Arc<dyn PluginImplications>,
    ) -> Result<Self> {
        if stack.is_empty() {
            return Err(Error::EmptyStack);
        }

        Ok(Self {
            view: XmlView::new(stack, LOCAL_ONLY_PATHS).with_alias("pom.", "project."),
            reference,
            plugin_defaults,
            plugin_implications,
        })
    }

    /// The coordinate this view was requested for.
    pub fn reference(&self) -> &Coordinate {
        &self.reference
    }

    pub fn view(&self) -> &XmlView {
        &self.view
    }

    pub fn into_view(self) -> XmlView {
        self.view
    }

    pub fn plugin_defaults(&self) -> &Arc<dyn PluginDefaults> {
        &self.plugin_defaults
    }

    pub fn plugin_implications(&self) -> &Arc<dyn PluginImplications> {
        &self.plugin_implications
    }

    /// Attaches a mixin while the view is being assembled.
    pub fn attach_mixin(&mut self, mixin: Mixin) {
        self.view.add_mixin(mixin);
    }

    pub fn group_id(&self) -> Result<Option<String>> {
        match self.view.resolve_value("/project/groupId", Depth::Unlimited)? {
            Some(group_id) => Ok(Some(group_id)),
            None => self.view.resolve_value("/project/parent/groupId", Depth::LOCAL),
        }
    }

    pub fn artifact_id(&self) -> Result<Option<String>> {
        self.view.resolve_value("/project/artifactId", Depth::LOCAL)
    }

    pub fn version(&self) -> Result<Option<String>> {
        match self.view.resolve_value("/project/version", Depth::Unlimited)? {
            Some(version) => Ok(Some(version)),
            None => self.view.resolve_value("/project/parent/version", Depth::LOCAL),
        }
    }

    /// The descriptor's own coordinate as declared (or inherited).
    pub fn coordinate(&self) -> Result<Coordinate> {
        let group_id = self.group_id()?;
        let artifact_id = self.artifact_id()?;
        let version = self.version()?;

        match (group_id, artifact_id, version) {
            (Some(group_id), Some(artifact_id), Some(version)) => {
                Ok(Coordinate::new(&group_id, &artifact_id, &version))
            }
            (group_id, artifact_id, version) => Err(Error::InvalidCoordinate {
                message: format!(
                    "descriptor for {} is incomplete (groupId: {}, artifactId: {}, version: {})",
                    self.reference,
                    group_id.as_deref().unwrap_or("missing"),
                    artifact_id.as_deref().unwrap_or("missing"),
                    version.as_deref().unwrap_or("missing"),
                ),
            }),
        }
    }

    /// Id of the profile `node` is declared in, if any.
    pub fn profile_id_for(&self, node: &NodeHandle) -> Result<Option<String>> {
        self.view.resolve_value_from(node, "ancestor::profile/id/text()")
    }

    /// Substitutes `${...}` expressions; `pom.` is accepted as an alias of
    /// `project.`.
    pub fn resolve_expressions(&self, text: &str, profiles: &[String]) -> String {
        self.view.resolve_expressions(text, profiles)
    }

    pub fn direct_dependencies(&self) -> Result<Vec<DependencyView<'_>>> {
        self.dependencies_matching(DIRECT_DEPENDENCIES)
    }

    pub fn managed_dependencies(&self) -> Result<Vec<DependencyView<'_>>> {
        self.dependencies_matching(MANAGED_DEPENDENCIES)
    }

    /// Managed dependencies that import a bill of materials.
    pub fn boms(&self) -> Result<Vec<DependencyView<'_>>> {
        self.dependencies_matching(BOMS)
    }

    /// Dependency-shaped elements anywhere, e.g. `artifactItem`s in plugin
    /// configuration.
    pub fn dependencies_matching(&self, path: &str) -> Result<Vec<DependencyView<'_>>> {
        let nodes = self.view.resolve_aggregated_list(path, Depth::Unlimited)?;
        Ok(nodes.into_iter().map(|node| self.as_dependency(node)).collect())
    }

    /// The parent reference; never inherited.
    pub fn parent(&self) -> Result<Option<ParentView<'_>>> {
        let node = self.view.resolve_node("/project/parent", Depth::LOCAL)?;
        Ok(node.map(|node| ParentView::new(self, node)))
    }

    pub fn build_plugins(&self) -> Result<Vec<PluginView<'_>>> {
        self.plugins_matching(BUILD_PLUGINS)
    }

    pub fn managed_plugins(&self) -> Result<Vec<PluginView<'_>>> {
        self.plugins_matching(MANAGED_PLUGINS)
    }

    pub fn plugins_matching(&self, path: &str) -> Result<Vec<PluginView<'_>>> {
        let nodes = self.view.resolve_aggregated_list(path, Depth::Unlimited)?;
        Ok(nodes.into_iter().map(|node| self.as_plugin(node)).collect())
    }

    pub fn build_extensions(&self) -> Result<Vec<ExtensionView<'_>>> {
        let nodes = self.view.resolve_aggregated_list(BUILD_EXTENSIONS, Depth::Unlimited)?;
        Ok(nodes.into_iter().map(|node| ExtensionView::new(self, node)).collect())
    }

    /// Every element matching `path` as a reference that must carry a
    /// version.
    pub fn project_version_refs(&self, path: &str) -> Result<Vec<ReferenceView<'_>>> {
        let nodes = self.view.resolve_aggregated_list(path, Depth::Unlimited)?;
        Ok(nodes.into_iter().map(|node| ReferenceView::new(self, node, true)).collect())
    }

    /// Every element matching `path` as a reference, versioned or not.
    pub fn project_refs(&self, path: &str) -> Result<Vec<ReferenceView<'_>>> {
        let nodes = self.view.resolve_aggregated_list(path, Depth::Unlimited)?;
        Ok(nodes.into_iter().map(|node| ReferenceView::new(self, node, false)).collect())
    }

    pub fn as_dependency(&self, node: NodeHandle) -> DependencyView<'_> {
        DependencyView::new(self, node)
    }

    pub fn as_plugin(&self, node: NodeHandle) -> PluginView<'_> {
        PluginView::new(self, node)
    }
}
