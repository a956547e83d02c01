//! # Ancestry-Chain Reader
//!
//! [`PomReader`] turns a coordinate into a [`PomView`]. It fetches the
//! descriptor, follows `/project/parent` references until a descriptor has no
//! parent, and then imports every BOM the assembled view manages, attaching
//! each as a dependency-management mixin.
//!
//! ## Caching
//!
//! Documents are looked up in the shared [`DocumentCache`] before anything is
//! fetched. Ancestors are always cached since many descriptors share them; the
//! starting descriptor is cached only when the caller asks for it. BOMs are
//! read with caching forced on.
//!
//! ## Failure
//!
//! A descriptor that no location holds fails the read with
//! [`Error::Unresolvable`]; a fetch or parse failure is wrapped in
//! [`Error::Retrieval`]. Both report how deep in the ancestry stack the
//! problem occurred. A parent chain or BOM import chain that revisits a
//! coordinate fails with [`Error::CycleDetected`].

use std::sync::Arc;

use log::debug;
use rayon::prelude::*;

use crate::cache::DocumentCache;
use crate::defaults::{PluginDefaults, PluginImplications, StandardPluginDefaults, StandardPluginImplications};
use crate::doc::DocumentHandle;
use crate::error::{Error, Result};
use crate::fetch::{ArtifactFetcher, Transfer};
use crate::model::{Coordinate, Location};
use crate::pom::PomView;
use crate::view::{Mixin, MixinScope};
use crate::xml;

/// Builds descriptor views from fetched documents.
pub struct PomReader {
    fetcher: Arc<dyn ArtifactFetcher>,
    cache: DocumentCache,
    plugin_defaults: Arc<dyn PluginDefaults>,
    plugin_implications: Arc<dyn PluginImplications>,
}

impl PomReader {
    /// Creates a reader with the standard plugin policies.
    pub fn new(fetcher: Arc<dyn ArtifactFetcher>, cache: DocumentCache) -> Self {
        Self::with_policies(
            fetcher,
            cache,
            Arc::new(StandardPluginDefaults::maven_3_0_4()),
            Arc::new(StandardPluginImplications::standard()),
        )
    }

    pub fn with_policies(
        fetcher: Arc<dyn ArtifactFetcher>,
        cache: DocumentCache,
        plugin_defaults: Arc<dyn PluginDefaults>,
        plugin_implications: Arc<dyn PluginImplications>,
    ) -> Self {
        Self {
            fetcher,
            cache,
            plugin_defaults,
            plugin_implications,
        }
    }

    pub fn cache(&self) -> &DocumentCache {
        &self.cache
    }

    pub fn plugin_defaults(&self) -> &Arc<dyn PluginDefaults> {
        &self.plugin_defaults
    }

    pub fn plugin_implications(&self) -> &Arc<dyn PluginImplications> {
        &self.plugin_implications
    }

    /// Reads `coordinate` and its ancestry from `locations`, without caching
    /// the starting descriptor.
    pub fn read(&self, coordinate: &Coordinate, locations: &[Location]) -> Result<PomView> {
        self.read_cached(coordinate, locations, false)
    }

    /// Reads `coordinate` and its ancestry; `cache_start` also caches the
    /// starting descriptor.
    pub fn read_cached(&self, coordinate: &Coordinate, locations: &[Location], cache_start: bool) -> Result<PomView> {
        self.read_chain(coordinate, locations, cache_start, &[])
    }

    /// Builds a view from descriptor bytes the caller already holds. Parents
    /// are fetched from `locations` as usual.
    pub fn read_transfer(&self, coordinate: &Coordinate, transfer: Transfer, locations: &[Location]) -> Result<PomView> {
        let cached = self
            .cache
            .first_cached(coordinate, std::slice::from_ref(&transfer.location))?;

        let start = match cached {
            Some(handle) => handle,
            None => self
                .handle_from(coordinate, transfer, false)
                .map_err(|e| retrieval(coordinate, 0, coordinate, e))?,
        };

        let stack = self.complete_stack(coordinate, start, locations)?;
        self.assemble(coordinate, stack, locations, &[])
    }

    fn read_chain(
        &self,
        coordinate: &Coordinate,
        locations: &[Location],
        cache_start: bool,
        imports: &[Coordinate],
    ) -> Result<PomView> {
        let start = self.document(coordinate, locations, cache_start, 0, coordinate)?;
        let stack = self.complete_stack(coordinate, start, locations)?;
        self.assemble(coordinate, stack, locations, imports)
    }

    /// Follows parent references from `start` until a descriptor declares none.
    fn complete_stack(
        &self,
        root: &Coordinate,
        start: Arc<DocumentHandle>,
        locations: &[Location],
    ) -> Result<Vec<Arc<DocumentHandle>>> {
        let mut visited = vec![start.coordinate().clone()];
        let mut next = parent_coordinate(&start)?;
        let mut stack = vec![start];

        while let Some(parent) = next {
            if visited.contains(&parent) {
                return Err(cycle(&visited, &parent));
            }

            let handle = self.document(&parent, locations, true, stack.len(), root)?;
            next = parent_coordinate(&handle)?;
            visited.push(parent);
            stack.push(handle);
        }

        Ok(stack)
    }

    /// Wraps the stack in a view and attaches its imported BOMs.
    fn assemble(
        &self,
        reference: &Coordinate,
        stack: Vec<Arc<DocumentHandle>>,
        locations: &[Location],
        imports: &[Coordinate],
    ) -> Result<PomView> {
        let mut view = PomView::new(
            reference.clone(),
            stack,
            Arc::clone(&self.plugin_defaults),
            Arc::clone(&self.plugin_implications),
        )?;

        let boms = bom_coordinates(&view)?;
        if !boms.is_empty() {
            let mut path = imports.to_vec();
            path.push(reference.clone());

            for bom in &boms {
                debug!("Found BOM {} for {}", bom, reference);
                if path.contains(bom) {
                    return Err(cycle(&path, bom));
                }
            }

            let imported: Vec<Result<PomView>> = boms
                .par_iter()
                .map(|bom| self.read_chain(bom, locations, true, &path))
                .collect();

            for bom_view in imported {
                view.attach_mixin(Mixin::new(
                    MixinScope::DependencyManagement,
                    Arc::new(bom_view?.into_view()),
                ));
            }
        }

        debug!("{} consists of:\n{}", reference, view.view().describe());
        Ok(view)
    }

    /// Finds `coordinate` in the cache or fetches and parses it.
    fn document(
        &self,
        coordinate: &Coordinate,
        locations: &[Location],
        cache: bool,
        depth: usize,
        root: &Coordinate,
    ) -> Result<Arc<DocumentHandle>> {
        if let Some(handle) = self.cache.first_cached(coordinate, locations)? {
            return Ok(handle);
        }

        let transfer = self
            .fetcher
            .retrieve_first(locations, coordinate)
            .map_err(|e| retrieval(coordinate, depth, root, e))?;

        let Some(transfer) = transfer else {
            return Err(Error::Unresolvable {
                coordinate: coordinate.to_string(),
                depth,
                root: root.to_string(),
            });
        };

        debug!("Fetched {} from {}", coordinate, transfer.location);
        self.handle_from(coordinate, transfer, cache)
            .map_err(|e| retrieval(coordinate, depth, root, e))
    }

    fn handle_from(&self, coordinate: &Coordinate, transfer: Transfer, cache: bool) -> Result<Arc<DocumentHandle>> {
        let origin = format!("{} @ {}", coordinate, transfer.location);
        let document = xml::parse(&origin, &transfer.bytes)?;
        let handle = Arc::new(DocumentHandle::new(coordinate.clone(), transfer.location, document));

        if cache {
            self.cache.intern(handle)
        } else {
            Ok(handle)
        }
    }
}

/// The parent reference declared by `handle`, if all three parts are present.
pub fn parent_coordinate(handle: &DocumentHandle) -> Result<Option<Coordinate>> {
    let group_id = first_text(handle, "/project/parent/groupId/text()")?;
    let artifact_id = first_text(handle, "/project/parent/artifactId/text()")?;
    let version = first_text(handle, "/project/parent/version/text()")?;

    Ok(match (group_id, artifact_id, version) {
        (Some(group_id), Some(artifact_id), Some(version)) => {
            Some(Coordinate::new(&group_id, &artifact_id, &version))
        }
        _ => None,
    })
}

/// The coordinate `handle` declares for itself, taking group id and version
/// from the parent reference when they are omitted.
pub fn project_coordinate(handle: &DocumentHandle) -> Result<Coordinate> {
    let group_id = match first_text(handle, "/project/groupId/text()")? {
        Some(group_id) => Some(group_id),
        None => first_text(handle, "/project/parent/groupId/text()")?,
    };
    let artifact_id = first_text(handle, "/project/artifactId/text()")?;
    let version = match first_text(handle, "/project/version/text()")? {
        Some(version) => Some(version),
        None => first_text(handle, "/project/parent/version/text()")?,
    };

    match (group_id, artifact_id, version) {
        (Some(group_id), Some(artifact_id), Some(version)) => Ok(Coordinate::new(&group_id, &artifact_id, &version)),
        _ => Err(Error::InvalidCoordinate {
            message: format!("{} does not declare a complete coordinate", handle.location()),
        }),
    }
}

fn first_text(handle: &DocumentHandle, path: &str) -> Result<Option<String>> {
    Ok(handle
        .select(path)?
        .into_iter()
        .next()
        .and_then(|node| node.text())
        .filter(|text| !text.is_empty()))
}

/// Coordinates of the BOMs `view` imports, in declaration order and without
/// repeats.
fn bom_coordinates(view: &PomView) -> Result<Vec<Coordinate>> {
    let mut boms: Vec<Coordinate> = Vec::new();
    for dependency in view.managed_dependencies()? {
        if !dependency.is_bom()? {
            continue;
        }
        let coordinate = dependency.coordinate()?;
        if !boms.contains(&coordinate) {
            boms.push(coordinate);
        }
    }
    Ok(boms)
}

fn retrieval(coordinate: &Coordinate, depth: usize, root: &Coordinate, source: Error) -> Error {
    Error::Retrieval {
        coordinate: coordinate.to_string(),
        depth,
        root: root.to_string(),
        source: Box::new(source),
    }
}

fn cycle(path: &[Coordinate], repeated: &Coordinate) -> Error {
    let mut names: Vec<String> = path.iter().map(|coordinate| coordinate.to_string()).collect();
    names.push(repeated.to_string());
    Error::CycleDetected {
        cycle: names.join(" -> "),
    }
}
