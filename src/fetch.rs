//! # Descriptor Retrieval
//!
//! The reader never touches storage directly. It asks an [`ArtifactFetcher`]
//! for the raw bytes of a descriptor, trying an ordered list of candidate
//! [`Location`]s and taking the first one that has it.
//!
//! Two implementations ship with the crate:
//!
//! - **`FilesystemFetcher`**: reads `file://` repository roots laid out the
//!   usual way (`group/as/path/artifact/version/artifact-version.pom`).
//! - **`MemoryFetcher`**: serves descriptors registered in memory. It counts
//!   retrievals, which is what the reader and cache tests rely on.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use log::{debug, warn};

use crate::error::{Error, Result};
use crate::model::{Coordinate, Location};

/// Raw descriptor bytes and where they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub location: Location,
    pub bytes: Vec<u8>,
}

impl Transfer {
    pub fn new(location: Location, bytes: Vec<u8>) -> Self {
        Self { location, bytes }
    }
}

/// Trait for descriptor retrieval - allows swapping storage in tests
pub trait ArtifactFetcher: Send + Sync {
    /// Returns the descriptor of `coordinate` from the first of `locations`
    /// that holds it, or `None` when none does.
    ///
    /// An error means a location could not be read at all, as opposed to not
    /// having the descriptor.
    fn retrieve_first(&self, locations: &[Location], coordinate: &Coordinate) -> Result<Option<Transfer>>;
}

/// Reads descriptors from local repository directories.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilesystemFetcher;

impl FilesystemFetcher {
    pub fn new() -> Self {
        Self
    }

    fn retrieve_from(&self, location: &Location, relative: &str) -> Result<Option<Vec<u8>>> {
        let url = location.url();
        if url.scheme() != "file" {
            warn!("Skipping {}: only file locations are supported", location);
            return Ok(None);
        }

        let root = url.to_file_path().map_err(|_| Error::InvalidLocation {
            location: location.to_string(),
            message: "not a local path".to_string(),
        })?;
        let path = root.join(relative);

        match std::fs::read(&path) {
            Ok(bytes) => {
                debug!("Read {} ({} bytes)", path.display(), bytes.len());
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Transfer {
                location: location.to_string(),
                message: format!("{}: {}", path.display(), e),
            }),
        }
    }
}

impl ArtifactFetcher for FilesystemFetcher {
    fn retrieve_first(&self, locations: &[Location], coordinate: &Coordinate) -> Result<Option<Transfer>> {
        let relative = coordinate.repository_path()?;
        for location in locations {
            if let Some(bytes) = self.retrieve_from(location, &relative)? {
                return Ok(Some(Transfer::new(location.clone(), bytes)));
            }
        }
        debug!("{} not found in {} location(s)", coordinate, locations.len());
        Ok(None)
    }
}

/// Serves descriptors registered in memory, keyed by location and
/// coordinate.
#[derive(Debug, Clone, Default)]
pub struct MemoryFetcher {
    documents: Arc<Mutex<HashMap<(Location, Coordinate), Vec<u8>>>>,
    retrievals: Arc<AtomicUsize>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the descriptor text of `coordinate` at `location`.
    pub fn insert(&self, location: &Location, coordinate: &Coordinate, text: &str) -> Result<()> {
        self.documents
            .lock()
            .map_err(|_| Error::LockPoisoned {
                context: "memory fetcher".to_string(),
            })?
            .insert((location.clone(), coordinate.clone()), text.as_bytes().to_vec());
        Ok(())
    }

    /// Number of successful retrievals served so far.
    pub fn retrievals(&self) -> usize {
        self.retrievals.load(Ordering::SeqCst)
    }
}

impl ArtifactFetcher for MemoryFetcher {
    fn retrieve_first(&self, locations: &[Location], coordinate: &Coordinate) -> Result<Option<Transfer>> {
        let documents = self.documents.lock().map_err(|_| Error::LockPoisoned {
            context: "memory fetcher".to_string(),
        })?;

        for location in locations {
            if let Some(bytes) = documents.get(&(location.clone(), coordinate.clone())) {
                self.retrievals.fetch_add(1, Ordering::SeqCst);
                return Ok(Some(Transfer::new(location.clone(), bytes.clone())));
            }
        }
        Ok(None)
    }
}
