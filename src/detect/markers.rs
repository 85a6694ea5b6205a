//! Marker persistence.
//!
//! The driver deletes every marker of a resource before storing the markers
//! of a new pass over it, so a store never holds two generations for the
//! same resource.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

use super::types::Marker;

/// Default location of the JSON store, relative to the project root.
pub const DEFAULT_MARKERS_PATH: &str = ".bootcheck/markers.json";

pub trait MarkerStore {
    /// Markers of one resource, in report order.
    fn markers(&self, resource: &str) -> Vec<Marker>;

    fn all_markers(&self) -> Vec<Marker>;

    fn delete_markers(&mut self, resource: &str) -> Result<()>;

    fn create_markers(&mut self, markers: Vec<Marker>) -> Result<()>;

    /// Delete every marker.
    fn clear(&mut self) -> Result<()>;

    /// Persist pending changes.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Store that keeps markers in memory only.
#[derive(Debug, Default, Clone)]
pub struct InMemoryMarkerStore {
    by_resource: BTreeMap<String, Vec<Marker>>,
}

impl InMemoryMarkerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.by_resource.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MarkerStore for InMemoryMarkerStore {
    fn markers(&self, resource: &str) -> Vec<Marker> {
        self.by_resource.get(resource).cloned().unwrap_or_default()
    }

    fn all_markers(&self) -> Vec<Marker> {
        self.by_resource.values().flatten().cloned().collect()
    }

    fn delete_markers(&mut self, resource: &str) -> Result<()> {
        self.by_resource.remove(resource);
        Ok(())
    }

    fn create_markers(&mut self, markers: Vec<Marker>) -> Result<()> {
        for marker in markers {
            self.by_resource
                .entry(marker.resource.clone())
                .or_default()
                .push(marker);
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.by_resource.clear();
        Ok(())
    }
}

/// Store backed by a JSON file, written on [`MarkerStore::flush`].
#[derive(Debug)]
pub struct JsonMarkerStore {
    path: PathBuf,
    inner: InMemoryMarkerStore,
    dirty: bool,
}

impl JsonMarkerStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut inner = InMemoryMarkerStore::new();
        if path.is_file() {
            let text = fs::read_to_string(&path).map_err(|source| Error::Read {
                path: path.clone(),
                source,
            })?;
            if !text.trim().is_empty() {
                let markers: Vec<Marker> =
                    serde_json::from_str(&text).map_err(|source| Error::MarkerStore {
                        path: path.clone(),
                        source,
                    })?;
                inner.create_markers(markers)?;
            }
        }
        tracing::debug!(path = %path.display(), markers = inner.len(), "opened marker store");
        Ok(Self {
            path,
            inner,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MarkerStore for JsonMarkerStore {
    fn markers(&self, resource: &str) -> Vec<Marker> {
        self.inner.markers(resource)
    }

    fn all_markers(&self) -> Vec<Marker> {
        self.inner.all_markers()
    }

    fn delete_markers(&mut self, resource: &str) -> Result<()> {
        self.dirty = true;
        self.inner.delete_markers(resource)
    }

    fn create_markers(&mut self, markers: Vec<Marker>) -> Result<()> {
        self.dirty = true;
        self.inner.create_markers(markers)
    }

    fn clear(&mut self) -> Result<()> {
        self.dirty = true;
        self.inner.clear()
    }

    fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        let write_error = |source| Error::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(write_error)?;
        }
        let json = serde_json::to_string_pretty(&self.inner.all_markers()).map_err(|source| {
            Error::MarkerStore {
                path: self.path.clone(),
                source,
            }
        })?;
        fs::write(&self.path, json).map_err(write_error)?;
        self.dirty = false;
        Ok(())
    }
}
