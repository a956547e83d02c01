//! Typed views over single descriptor elements.
//!
//! An element view pairs a node with the [`PomView`] it came from. Values
//! missing on the element itself are looked up on its *management element*:
//! the matching entry of the corresponding management section, searched in
//! the element's own profile first and at top level second. The management
//! element is located at most once per view.

use std::sync::OnceLock;

use crate::doc::NodeHandle;
use crate::error::{Error, Result};
use crate::model::{Coordinate, DependencyScope};
use crate::query::quote_literal;
use crate::view::Depth;
use crate::xml::synthesize;

use super::PomView;

const DEPENDENCY_MANAGEMENT: &str = "dependencyManagement/dependencies/dependency";
const PLUGIN_MANAGEMENT: &str = "build/pluginManagement/plugins/plugin";

const DEFAULT_RELATIVE_PATH: &str = "../pom.xml";
const DEFAULT_TYPE: &str = "jar";

/// State shared by every element view.
#[derive(Debug)]
pub struct ElementView<'a> {
    pom: &'a PomView,
    element: NodeHandle,
    management_fragment: Option<&'static str>,
    management: OnceLock<Option<NodeHandle>>,
}

impl<'a> ElementView<'a> {
    pub fn new(pom: &'a PomView, element: NodeHandle, management_fragment: Option<&'static str>) -> Self {
        Self {
            pom,
            element,
            management_fragment,
            management: OnceLock::new(),
        }
    }

    pub fn pom(&self) -> &'a PomView {
        self.pom
    }

    pub fn element(&self) -> &NodeHandle {
        &self.element
    }

    fn set_element(&mut self, element: NodeHandle) {
        self.element = element;
    }

    pub fn profile_id(&self) -> Result<Option<String>> {
        self.pom.profile_id_for(&self.element)
    }

    pub fn to_text(&self) -> String {
        self.pom.view().to_text(&self.element)
    }

    /// Interpolated value of `path` below the element itself.
    pub fn value(&self, path: &str) -> Result<Option<String>> {
        self.pom.view().resolve_value_from(&self.element, path)
    }

    /// The matching entry in the management section, if any.
    ///
    /// `qualifier` builds the predicate that identifies the entry; it is
    /// only called the first time.
    pub fn management_element<F>(&self, qualifier: F) -> Result<Option<NodeHandle>>
    where
        F: FnOnce() -> Result<Option<String>>,
    {
        if let Some(found) = self.management.get() {
            return Ok(found.clone());
        }

        let found = self.find_management(qualifier)?;
        let _ = self.management.set(found);
        Ok(self.management.get().cloned().flatten())
    }

    fn find_management<F>(&self, qualifier: F) -> Result<Option<NodeHandle>>
    where
        F: FnOnce() -> Result<Option<String>>,
    {
        let Some(fragment) = self.management_fragment else {
            return Ok(None);
        };
        let Some(qualifier) = qualifier()? else {
            return Ok(None);
        };

        let mut paths = Vec::with_capacity(2);
        if let Some(profile) = self.profile_id()?.as_deref().and_then(quote_literal) {
            paths.push(format!(
                "/project/profiles/profile[id/text()={}]/{}[{}]",
                profile, fragment, qualifier
            ));
        }
        paths.push(format!("/project/{}[{}]", fragment, qualifier));

        for path in paths {
            if let Some(found) = self.pom.view().resolve_node(&path, Depth::Unlimited)? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    /// Local value of `path`, or the management element's value.
    pub fn value_with_management<F>(&self, path: &str, qualifier: F) -> Result<Option<String>>
    where
        F: FnOnce() -> Result<Option<String>>,
    {
        if let Some(value) = self.value(path)? {
            return Ok(Some(value));
        }

        match self.management_element(qualifier)? {
            Some(management) => self.pom.view().resolve_value_from(&management, path),
            None => Ok(None),
        }
    }

    /// Nodes matching `path` below the element, or below the management
    /// element when the element itself has none.
    pub fn first_nodes_with_management<F>(&self, path: &str, qualifier: F) -> Result<Vec<NodeHandle>>
    where
        F: FnOnce() -> Result<Option<String>>,
    {
        let nodes = self.pom.view().resolve_list_from(&self.element, path)?;
        if !nodes.is_empty() {
            return Ok(nodes);
        }

        match self.management_element(qualifier)? {
            Some(management) => self.pom.view().resolve_list_from(&management, path),
            None => Ok(Vec::new()),
        }
    }

    fn has_ancestor(&self, name: &str) -> Result<bool> {
        let found = self
            .pom
            .view()
            .resolve_from(&self.element, &format!("ancestor::{}", name))?;
        Ok(found.is_some())
    }
}

/// `name/text()=<literal>`, or `None` when `value` cannot be quoted.
fn text_equals(name: &str, value: &str) -> Option<String> {
    quote_literal(value).map(|literal| format!("{}/text()={}", name, literal))
}

fn coordinate_of(group_id: Option<String>, artifact_id: Option<String>, version: Option<String>) -> Result<Coordinate> {
    match (group_id, artifact_id) {
        (Some(group_id), Some(artifact_id)) => Ok(match version {
            Some(version) => Coordinate::new(&group_id, &artifact_id, &version),
            None => Coordinate::unversioned(&group_id, &artifact_id),
        }),
        (group_id, artifact_id) => Err(Error::InvalidCoordinate {
            message: format!(
                "element lacks {}",
                if group_id.is_none() && artifact_id.is_none() {
                    "groupId and artifactId"
                } else if group_id.is_none() {
                    "groupId"
                } else {
                    "artifactId"
                }
            ),
        }),
    }
}

/// A `<dependency>` or dependency-shaped element.
#[derive(Debug)]
pub struct DependencyView<'a> {
    element: ElementView<'a>,
}

impl<'a> DependencyView<'a> {
    pub(crate) fn new(pom: &'a PomView, node: NodeHandle) -> Self {
        Self {
            element: ElementView::new(pom, node, Some(DEPENDENCY_MANAGEMENT)),
        }
    }

    pub fn element(&self) -> &ElementView<'a> {
        &self.element
    }

    pub fn node(&self) -> &NodeHandle {
        self.element.element()
    }

    fn qualifier(&self) -> Result<Option<String>> {
        let group_id = self.group_id()?;
        let artifact_id = self.artifact_id()?;
        let (Some(group_id), Some(artifact_id)) = (group_id, artifact_id) else {
            return Ok(None);
        };
        Ok(text_equals("groupId", &group_id)
            .zip(text_equals("artifactId", &artifact_id))
            .map(|(group_test, artifact_test)| format!("{} and {}", group_test, artifact_test)))
    }

    fn managed_value(&self, name: &str) -> Result<Option<String>> {
        self.element.value_with_management(name, || self.qualifier())
    }

    pub fn group_id(&self) -> Result<Option<String>> {
        self.element.value("groupId")
    }

    pub fn artifact_id(&self) -> Result<Option<String>> {
        self.element.value("artifactId")
    }

    pub fn version(&self) -> Result<Option<String>> {
        self.managed_value("version")
    }

    /// Artifact type; `jar` when not declared anywhere.
    pub fn kind(&self) -> Result<String> {
        Ok(self
            .managed_value("type")?
            .unwrap_or_else(|| DEFAULT_TYPE.to_string()))
    }

    pub fn classifier(&self) -> Result<Option<String>> {
        self.managed_value("classifier")
    }

    pub fn scope(&self) -> Result<DependencyScope> {
        Ok(DependencyScope::from_text(self.managed_value("scope")?.as_deref()))
    }

    pub fn optional(&self) -> Result<bool> {
        Ok(self
            .managed_value("optional")?
            .map(|value| value.eq_ignore_ascii_case("true"))
            .unwrap_or(false))
    }

    /// Excluded group/artifact references.
    pub fn exclusions(&self) -> Result<Vec<Coordinate>> {
        let nodes = self
            .element
            .first_nodes_with_management("exclusions/exclusion", || self.qualifier())?;

        let view = self.element.pom().view();
        let mut exclusions = Vec::with_capacity(nodes.len());
        for node in nodes {
            let group_id = view.resolve_value_from(&node, "groupId")?;
            let artifact_id = view.resolve_value_from(&node, "artifactId")?;
            if let (Some(group_id), Some(artifact_id)) = (group_id, artifact_id) {
                exclusions.push(Coordinate::unversioned(&group_id, &artifact_id));
            }
        }
        Ok(exclusions)
    }

    /// Whether this element sits inside a dependency management section.
    pub fn is_managed(&self) -> Result<bool> {
        self.element.has_ancestor("dependencyManagement")
    }

    pub fn is_bom(&self) -> Result<bool> {
        Ok(self.kind()? == "pom" && self.scope()? == DependencyScope::Import)
    }

    pub fn coordinate(&self) -> Result<Coordinate> {
        coordinate_of(self.group_id()?, self.artifact_id()?, self.version()?)
    }

    pub fn profile_id(&self) -> Result<Option<String>> {
        self.element.profile_id()
    }

    pub fn to_text(&self) -> String {
        self.element.to_text()
    }
}

/// A dependency on a plugin's own classpath.
#[derive(Debug)]
pub struct PluginDependencyView<'a> {
    dependency: DependencyView<'a>,
    plugin: Coordinate,
}

impl<'a> PluginDependencyView<'a> {
    pub(crate) fn new(pom: &'a PomView, node: NodeHandle, plugin: Coordinate) -> Self {
        Self {
            dependency: DependencyView::new(pom, node),
            plugin,
        }
    }

    /// Coordinate of the plugin this dependency belongs to.
    pub fn plugin(&self) -> &Coordinate {
        &self.plugin
    }

    pub fn dependency(&self) -> &DependencyView<'a> {
        &self.dependency
    }

    pub fn node(&self) -> &NodeHandle {
        self.dependency.node()
    }

    pub fn group_id(&self) -> Result<Option<String>> {
        self.dependency.group_id()
    }

    pub fn artifact_id(&self) -> Result<Option<String>> {
        self.dependency.artifact_id()
    }

    pub fn version(&self) -> Result<Option<String>> {
        self.dependency.version()
    }

    /// Always `toolchain`, whatever the document says.
    pub fn scope(&self) -> DependencyScope {
        DependencyScope::Toolchain
    }

    pub fn coordinate(&self) -> Result<Coordinate> {
        self.dependency.coordinate()
    }

    pub fn to_text(&self) -> String {
        self.dependency.to_text()
    }
}

/// A `<plugin>` element.
#[derive(Debug)]
pub struct PluginView<'a> {
    element: ElementView<'a>,
    group_id: OnceLock<String>,
    version: OnceLock<Option<String>>,
    dependencies: OnceLock<Vec<PluginDependencyView<'a>>>,
}

impl<'a> PluginView<'a> {
    pub(crate) fn new(pom: &'a PomView, node: NodeHandle) -> Self {
        Self {
            element: ElementView::new(pom, node, Some(PLUGIN_MANAGEMENT)),
            group_id: OnceLock::new(),
            version: OnceLock::new(),
            dependencies: OnceLock::new(),
        }
    }

    pub fn element(&self) -> &ElementView<'a> {
        &self.element
    }

    pub fn node(&self) -> &NodeHandle {
        self.element.element()
    }

    pub fn artifact_id(&self) -> Result<Option<String>> {
        self.element.value("artifactId")
    }

    /// Declared group id, else the defaults policy's group for the artifact.
    pub fn group_id(&self) -> Result<String> {
        if let Some(group_id) = self.group_id.get() {
            return Ok(group_id.clone());
        }

        let group_id = match self.element.value("groupId")? {
            Some(group_id) => group_id,
            None => {
                let artifact_id = self.artifact_id()?.unwrap_or_default();
                self.element.pom().plugin_defaults().default_group_id(&artifact_id)
            }
        };

        let _ = self.group_id.set(group_id);
        Ok(self.group_id.get().cloned().unwrap_or_default())
    }

    /// Declared version, else the managed version, else the defaults
    /// policy's version.
    pub fn version(&self) -> Result<Option<String>> {
        if let Some(version) = self.version.get() {
            return Ok(version.clone());
        }

        let version = match self
            .element
            .value_with_management("version", || self.qualifier())?
        {
            Some(version) => Some(version),
            None => {
                let group_id = self.group_id()?;
                let artifact_id = self.artifact_id()?.unwrap_or_default();
                self.element
                    .pom()
                    .plugin_defaults()
                    .default_version(&group_id, &artifact_id)
            }
        };

        let _ = self.version.set(version);
        Ok(self.version.get().cloned().flatten())
    }

    /// Predicate identifying this plugin in plugin management. The group id
    /// test is only included when it differs from the default group, so
    /// plugins declared without a group id still match.
    fn qualifier(&self) -> Result<Option<String>> {
        let Some(artifact_id) = self.artifact_id()? else {
            return Ok(None);
        };
        let group_id = self.group_id()?;
        let default_group_id = self
            .element
            .pom()
            .plugin_defaults()
            .default_group_id(&artifact_id);

        let Some(artifact_test) = text_equals("artifactId", &artifact_id) else {
            return Ok(None);
        };
        if group_id == default_group_id {
            Ok(Some(artifact_test))
        } else {
            Ok(text_equals("groupId", &group_id).map(|group_test| format!("{} and {}", group_test, artifact_test)))
        }
    }

    /// Whether this element sits inside a plugin management section.
    pub fn is_managed(&self) -> Result<bool> {
        self.element.has_ancestor("pluginManagement")
    }

    pub fn coordinate(&self) -> Result<Coordinate> {
        coordinate_of(Some(self.group_id()?), self.artifact_id()?, self.version()?)
    }

    /// Dependencies declared on the plugin, or on its managed counterpart.
    pub fn local_dependencies(&self) -> Result<&[PluginDependencyView<'a>]> {
        if let Some(dependencies) = self.dependencies.get() {
            return Ok(dependencies);
        }

        let plugin = self.coordinate()?;
        let pom = self.element.pom();
        let nodes = self
            .element
            .first_nodes_with_management("dependencies/dependency", || self.qualifier())?;
        let dependencies = nodes
            .into_iter()
            .map(|node| PluginDependencyView::new(pom, node, plugin.clone()))
            .collect();

        let _ = self.dependencies.set(dependencies);
        Ok(self.dependencies.get().map(Vec::as_slice).unwrap_or_default())
    }

    /// Materializes the dependencies the implications policy attaches to
    /// this plugin.
    ///
    /// Each implied artifact becomes a new `dependencies/dependency` element
    /// below the plugin, carrying the plugin's version. The plugin element is
    /// re-anchored into the edited document after every addition, so later
    /// queries on this view see the synthesized dependencies.
    pub fn implied_dependencies(&mut self) -> Result<Vec<PluginDependencyView<'a>>> {
        let pom = self.element.pom();
        let plugin = self.coordinate()?;
        let implied = pom.plugin_implications().implied_coordinates(&plugin);
        if implied.is_empty() {
            return Ok(Vec::new());
        }

        let version = self.version()?;
        let mut created = Vec::with_capacity(implied.len());
        for reference in implied {
            let mut leaves = vec![
                ("groupId", reference.group_id()),
                ("artifactId", reference.artifact_id()),
            ];
            if let Some(version) = version.as_deref() {
                leaves.push(("version", version));
            }

            let node = synthesize(self.element.element(), "dependencies/dependency", &leaves)?;
            let reanchored = self.element.element().reanchor(&node)?;
            self.element.set_element(reanchored);
            created.push(PluginDependencyView::new(pom, node, plugin.clone()));
        }

        self.dependencies = OnceLock::new();
        Ok(created)
    }

    pub fn profile_id(&self) -> Result<Option<String>> {
        self.element.profile_id()
    }

    pub fn to_text(&self) -> String {
        self.element.to_text()
    }
}

/// The `<parent>` reference of a descriptor.
#[derive(Debug)]
pub struct ParentView<'a> {
    element: ElementView<'a>,
}

impl<'a> ParentView<'a> {
    pub(crate) fn new(pom: &'a PomView, node: NodeHandle) -> Self {
        Self {
            element: ElementView::new(pom, node, None),
        }
    }

    pub fn group_id(&self) -> Result<Option<String>> {
        self.element.value("groupId")
    }

    pub fn artifact_id(&self) -> Result<Option<String>> {
        self.element.value("artifactId")
    }

    pub fn version(&self) -> Result<Option<String>> {
        self.element.value("version")
    }

    /// Declared relative path; `../pom.xml` when absent.
    pub fn relative_path(&self) -> Result<String> {
        Ok(self
            .element
            .value("relativePath")?
            .unwrap_or_else(|| DEFAULT_RELATIVE_PATH.to_string()))
    }

    pub fn coordinate(&self) -> Result<Coordinate> {
        let version = self.version()?.ok_or_else(|| Error::InvalidCoordinate {
            message: "parent reference lacks a version".to_string(),
        })?;
        coordinate_of(self.group_id()?, self.artifact_id()?, Some(version))
    }

    pub fn to_text(&self) -> String {
        self.element.to_text()
    }
}

/// A build `<extension>`.
#[derive(Debug)]
pub struct ExtensionView<'a> {
    element: ElementView<'a>,
}

impl<'a> ExtensionView<'a> {
    pub(crate) fn new(pom: &'a PomView, node: NodeHandle) -> Self {
        Self {
            element: ElementView::new(pom, node, None),
        }
    }

    pub fn group_id(&self) -> Result<Option<String>> {
        self.element.value("groupId")
    }

    pub fn artifact_id(&self) -> Result<Option<String>> {
        self.element.value("artifactId")
    }

    pub fn version(&self) -> Result<Option<String>> {
        self.element.value("version")
    }

    pub fn coordinate(&self) -> Result<Coordinate> {
        coordinate_of(self.group_id()?, self.artifact_id()?, self.version()?)
    }

    pub fn profile_id(&self) -> Result<Option<String>> {
        self.element.profile_id()
    }

    pub fn to_text(&self) -> String {
        self.element.to_text()
    }
}

/// A plain `groupId`/`artifactId`/`version` reference found at an arbitrary
/// path, such as an `artifactItem` or an exclusion.
#[derive(Debug)]
pub struct ReferenceView<'a> {
    element: ElementView<'a>,
    require_version: bool,
}

impl<'a> ReferenceView<'a> {
    pub(crate) fn new(pom: &'a PomView, node: NodeHandle, require_version: bool) -> Self {
        Self {
            element: ElementView::new(pom, node, None),
            require_version,
        }
    }

    pub fn node(&self) -> &NodeHandle {
        self.element.element()
    }

    pub fn group_id(&self) -> Result<Option<String>> {
        self.element.value("groupId")
    }

    pub fn artifact_id(&self) -> Result<Option<String>> {
        self.element.value("artifactId")
    }

    pub fn version(&self) -> Result<Option<String>> {
        self.element.value("version")
    }

    /// Whether the element declares a `<version>` of its own.
    pub fn is_versioned(&self) -> Result<bool> {
        let found = self.element.pom().view().resolve_from(self.node(), "version")?;
        Ok(found.is_some())
    }

    /// Versioned coordinate when a version is present, else an unversioned
    /// one. References listed as versioned fail without a version.
    pub fn coordinate(&self) -> Result<Coordinate> {
        let version = self.version()?;
        if version.is_none() && self.require_version {
            return Err(Error::InvalidCoordinate {
                message: "reference lacks a version".to_string(),
            });
        }
        coordinate_of(self.group_id()?, self.artifact_id()?, version)
    }

    pub fn profile_id(&self) -> Result<Option<String>> {
        self.element.profile_id()
    }

    pub fn to_text(&self) -> String {
        self.element.to_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::{StandardPluginDefaults, StandardPluginImplications};
    use crate::doc::DocumentHandle;
    use crate::model::Location;
    use crate::xml::parse;
    use std::sync::Arc;

    fn pom(xml: &str) -> PomView {
        let handle = Arc::new(DocumentHandle::new(
            Coordinate::new("org.test", "test", "1"),
            Location::new("file:///repo/").unwrap(),
            parse("inline", xml.as_bytes()).unwrap(),
        ));
        PomView::new(
            Coordinate::new("org.test", "test", "1"),
            vec![handle],
            Arc::new(StandardPluginDefaults::maven_3_0_4()),
            Arc::new(StandardPluginImplications::standard()),
        )
        .unwrap()
    }

    #[test]
    fn test_dependency_defaults() {
        let view = pom("<project><dependencies><dependency><groupId>g</groupId><artifactId>a</artifactId></dependency></dependencies></project>");
        let dependencies = view.direct_dependencies().unwrap();
        let dependency = &dependencies[0];

        assert_eq!(dependency.kind().unwrap(), "jar");
        assert_eq!(dependency.scope().unwrap(), DependencyScope::Compile);
        assert!(!dependency.optional().unwrap());
        assert_eq!(dependency.classifier().unwrap(), None);
        assert!(!dependency.is_managed().unwrap());
        assert!(!dependency.is_bom().unwrap());
        assert_eq!(dependency.coordinate().unwrap(), Coordinate::unversioned("g", "a"));
    }

    #[test]
    fn test_dependency_management_fallback() {
        let view = pom(r#"<project>
  <dependencyManagement><dependencies>
    <dependency><groupId>g</groupId><artifactId>a</artifactId><version>2.0</version><classifier>tests</classifier>
      <exclusions><exclusion><groupId>x</groupId><artifactId>y</artifactId></exclusion></exclusions>
    </dependency>
  </dependencies></dependencyManagement>
  <dependencies><dependency><groupId>g</groupId><artifactId>a</artifactId><optional>true</optional></dependency></dependencies>
</project>"#);

        let dependencies = view.direct_dependencies().unwrap();
        let dependency = &dependencies[0];
        assert_eq!(dependency.version().unwrap().as_deref(), Some("2.0"));
        assert_eq!(dependency.classifier().unwrap().as_deref(), Some("tests"));
        assert!(dependency.optional().unwrap());
        assert_eq!(dependency.exclusions().unwrap(), vec![Coordinate::unversioned("x", "y")]);

        let managed = view.managed_dependencies().unwrap();
        assert!(managed[0].is_managed().unwrap());
    }

    #[test]
    fn test_profile_management_is_preferred() {
        let view = pom(r#"<project>
  <dependencyManagement><dependencies>
    <dependency><groupId>g</groupId><artifactId>a</artifactId><version>top</version></dependency>
  </dependencies></dependencyManagement>
  <profiles><profile><id>p</id>
    <dependencyManagement><dependencies>
      <dependency><groupId>g</groupId><artifactId>a</artifactId><version>profiled</version></dependency>
    </dependencies></dependencyManagement>
    <dependencies><dependency><groupId>g</groupId><artifactId>a</artifactId></dependency></dependencies>
  </profile></profiles>
  <dependencies><dependency><groupId>g</groupId><artifactId>a</artifactId></dependency></dependencies>
</project>"#);

        let dependencies = view.direct_dependencies().unwrap();
        assert_eq!(dependencies.len(), 2);
        assert_eq!(dependencies[0].profile_id().unwrap().as_deref(), Some("p"));
        assert_eq!(dependencies[0].version().unwrap().as_deref(), Some("profiled"));
        assert_eq!(dependencies[1].version().unwrap().as_deref(), Some("top"));
    }

    #[test]
    fn test_element_without_fragment_never_consults_management() {
        let view = pom(r#"<project>
  <dependencyManagement><dependencies>
    <dependency><groupId>g</groupId><artifactId>a</artifactId><version>2.0</version></dependency>
  </dependencies></dependencyManagement>
  <dependencies><dependency><groupId>g</groupId><artifactId>a</artifactId></dependency></dependencies>
</project>"#);

        let node = view
            .view()
            .resolve_node("/project/dependencies/dependency", Depth::LOCAL)
            .unwrap()
            .unwrap();
        let element = ElementView::new(&view, node, None);
        assert_eq!(
            element
                .value_with_management("version", || Ok(Some("artifactId/text()=\"a\"".to_string())))
                .unwrap(),
            None
        );
    }

    #[test]
    fn test_plugin_defaults_and_management() {
        let view = pom(r#"<project><build>
  <pluginManagement><plugins>
    <plugin><groupId>org.other</groupId><artifactId>custom-plugin</artifactId><version>7</version></plugin>
  </plugins></pluginManagement>
  <plugins>
    <plugin><artifactId>maven-compiler-plugin</artifactId></plugin>
    <plugin><groupId>org.other</groupId><artifactId>custom-plugin</artifactId></plugin>
    <plugin><groupId>org.other</groupId><artifactId>unknown-plugin</artifactId></plugin>
  </plugins>
</build></project>"#);

        let plugins = view.build_plugins().unwrap();
        assert_eq!(plugins.len(), 3);

        assert_eq!(plugins[0].group_id().unwrap(), "org.apache.maven.plugins");
        assert_eq!(plugins[0].version().unwrap().as_deref(), Some("2.3.2"));

        assert_eq!(plugins[1].version().unwrap().as_deref(), Some("7"));
        assert_eq!(plugins[2].version().unwrap(), None);
        assert!(!plugins[0].is_managed().unwrap());
        assert!(view.managed_plugins().unwrap()[0].is_managed().unwrap());
    }

    #[test]
    fn test_plugin_local_dependencies_from_management() {
        let view = pom(r#"<project><build>
  <pluginManagement><plugins>
    <plugin><artifactId>maven-jar-plugin</artifactId><dependencies><dependency><groupId>d</groupId><artifactId>e</artifactId><version>1</version></dependency></dependencies></plugin>
  </plugins></pluginManagement>
  <plugins><plugin><artifactId>maven-jar-plugin</artifactId></plugin></plugins>
</build></project>"#);

        let plugins = view.build_plugins().unwrap();
        let dependencies = plugins[0].local_dependencies().unwrap();
        assert_eq!(dependencies.len(), 1);
        assert_eq!(dependencies[0].scope(), DependencyScope::Toolchain);
        assert_eq!(dependencies[0].coordinate().unwrap(), Coordinate::new("d", "e", "1"));
        assert_eq!(
            dependencies[0].plugin(),
            &Coordinate::new("org.apache.maven.plugins", "maven-jar-plugin", "2.3.2")
        );
    }

    #[test]
    fn test_implied_dependencies_for_surefire() {
        let view = pom("<project><build><plugins><plugin><artifactId>maven-surefire-plugin</artifactId><version>2.12</version></plugin></plugins></build></project>");
        let mut plugins = view.build_plugins().unwrap();
        let plugin = &mut plugins[0];

        let implied = plugin.implied_dependencies().unwrap();
        assert_eq!(implied.len(), 5);
        for dependency in &implied {
            assert_eq!(dependency.group_id().unwrap().as_deref(), Some("org.apache.maven.surefire"));
            assert_eq!(dependency.version().unwrap().as_deref(), Some("2.12"));
            assert_eq!(dependency.scope(), DependencyScope::Toolchain);
        }

        let text = plugin.to_text();
        assert_eq!(text.matches("<dependency>").count(), 5);
        assert_eq!(text.matches("<dependencies>").count(), 1);
        assert_eq!(plugin.local_dependencies().unwrap().len(), 5);
    }

    #[test]
    fn test_no_implications_for_other_plugins() {
        let view = pom("<project><build><plugins><plugin><artifactId>maven-jar-plugin</artifactId></plugin></plugins></build></project>");
        let mut plugins = view.build_plugins().unwrap();
        assert!(plugins[0].implied_dependencies().unwrap().is_empty());
    }

    #[test]
    fn test_parent_view() {
        let view = pom("<project><parent><groupId>g</groupId><artifactId>p</artifactId><version>1</version></parent></project>");
        let parent = view.parent().unwrap().unwrap();
        assert_eq!(parent.relative_path().unwrap(), "../pom.xml");
        assert_eq!(parent.coordinate().unwrap(), Coordinate::new("g", "p", "1"));

        let view = pom("<project><parent><groupId>g</groupId><artifactId>p</artifactId><relativePath>../up/pom.xml</relativePath></parent></project>");
        let parent = view.parent().unwrap().unwrap();
        assert_eq!(parent.relative_path().unwrap(), "../up/pom.xml");
        assert!(parent.coordinate().is_err());
    }

    #[test]
    fn test_quoted_coordinates_still_find_management() {
        let view = pom(r#"<project>
  <dependencyManagement><dependencies>
    <dependency><groupId>odd"group</groupId><artifactId>a</artifactId><version>3.0</version></dependency>
  </dependencies></dependencyManagement>
  <profiles><profile><id>say "hi"</id>
    <dependencies><dependency><groupId>odd"group</groupId><artifactId>a</artifactId></dependency></dependencies>
  </profile></profiles>
  <dependencies>
    <dependency><groupId>odd"group</groupId><artifactId>a</artifactId></dependency>
    <dependency><groupId>both"and'</groupId><artifactId>a</artifactId></dependency>
  </dependencies>
</project>"#);

        let dependencies = view.direct_dependencies().unwrap();
        assert_eq!(dependencies.len(), 3);
        assert_eq!(dependencies[0].profile_id().unwrap().as_deref(), Some("say \"hi\""));
        assert_eq!(dependencies[0].version().unwrap().as_deref(), Some("3.0"));
        assert_eq!(dependencies[1].version().unwrap().as_deref(), Some("3.0"));
        assert_eq!(dependencies[2].version().unwrap(), None);
    }

    #[test]
    fn test_plugin_with_quoted_artifact_id() {
        let view = pom(r#"<project><build><plugins><plugin><groupId>g</groupId><artifactId>a"b</artifactId></plugin></plugins></build></project>"#);
        let plugins = view.build_plugins().unwrap();
        assert_eq!(plugins[0].version().unwrap(), None);
    }

    #[test]
    fn test_reference_views_over_arbitrary_paths() {
        let view = pom(r#"<project><build><plugins><plugin><artifactId>maven-dependency-plugin</artifactId>
  <configuration><artifactItems>
    <artifactItem><groupId>org.a</groupId><artifactId>one</artifactId><version>1.2</version></artifactItem>
    <artifactItem><groupId>org.b</groupId><artifactId>two</artifactId></artifactItem>
  </artifactItems></configuration>
</plugin></plugins></build></project>"#);

        let refs = view.project_refs("//artifactItem").unwrap();
        assert_eq!(refs.len(), 2);
        assert!(refs[0].is_versioned().unwrap());
        assert!(!refs[1].is_versioned().unwrap());
        assert_eq!(refs[0].coordinate().unwrap(), Coordinate::new("org.a", "one", "1.2"));
        assert_eq!(refs[1].coordinate().unwrap(), Coordinate::unversioned("org.b", "two"));

        let versioned = view.project_version_refs("//artifactItem").unwrap();
        assert_eq!(versioned[0].coordinate().unwrap(), Coordinate::new("org.a", "one", "1.2"));
        assert!(matches!(
            versioned[1].coordinate().unwrap_err(),
            Error::InvalidCoordinate { .. }
        ));

        assert!(view.project_refs("//exclusion").unwrap().is_empty());
    }
}
