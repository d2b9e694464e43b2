//! In-memory layer registry.
//!
//! The layer list is read once and kept as a map; lookups of unknown ids
//! are not errors, they yield `None` and a warning.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use super::descriptor::{LayerDescriptor, LayerKind, DEFAULT_LAYER_ID};

/// Errors loading a layer list.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to read layer list {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid layer list: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate layer id '{0}'")]
    DuplicateId(String),
}

#[derive(Debug, Deserialize)]
struct LayerList {
    layers: Vec<LayerDescriptor>,
}

/// Layer descriptors keyed by id, in list order.
#[derive(Debug, Clone, Default)]
pub struct LayerRegistry {
    layers: HashMap<String, LayerDescriptor>,
    order: Vec<String>,
}

impl LayerRegistry {
    /// Builds a registry from descriptors, rejecting duplicate ids.
    pub fn new(descriptors: Vec<LayerDescriptor>) -> Result<Self, RegistryError> {
        let mut registry = Self::default();
        for descriptor in descriptors {
            if registry.layers.contains_key(&descriptor.id) {
                return Err(RegistryError::DuplicateId(descriptor.id));
            }
            registry.order.push(descriptor.id.clone());
            registry.layers.insert(descriptor.id.clone(), descriptor);
        }
        Ok(registry)
    }

    /// Parses a `{"layers": [...]}` document.
    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        let list: LayerList = serde_json::from_str(json)?;
        Self::new(list.layers)
    }

    /// Reads and parses a layer list file.
    pub fn load_from(path: &Path) -> Result<Self, RegistryError> {
        let json = fs::read_to_string(path).map_err(|source| RegistryError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let registry = Self::from_json(&json)?;
        info!(path = %path.display(), layers = registry.len(), "loaded layer list");
        Ok(registry)
    }

    /// Looks up a layer, warning when the id is unknown.
    pub fn get(&self, id: &str) -> Option<&LayerDescriptor> {
        let found = self.layers.get(id);
        if found.is_none() {
            warn!(layer = id, "layer not found in registry");
        }
        found
    }

    /// Looks up `id`, or the default layer when `id` is `None`.
    ///
    /// A missing default layer is silent since most lists do not define one.
    pub fn resolve(&self, id: Option<&str>) -> Option<&LayerDescriptor> {
        match id {
            Some(id) => self.get(id),
            None => self.layers.get(DEFAULT_LAYER_ID),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.layers.contains_key(id)
    }

    /// Descriptors in list order.
    pub fn iter(&self) -> impl Iterator<Item = &LayerDescriptor> {
        self.order.iter().filter_map(|id| self.layers.get(id))
    }

    /// Descriptors of one kind, in list order.
    pub fn of_kind(&self, kind: LayerKind) -> impl Iterator<Item = &LayerDescriptor> {
        self.iter().filter(move |layer| layer.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}
