//! Layers
//!
//! Descriptors from the published layer list, the registry that holds
//! them, and the store of runtime state for the layers currently active.

mod descriptor;
mod registry;
mod state;

pub use descriptor::{
    vector_layer_id, DisplayMode, LayerDescriptor, LayerKind, LayerPaths, LocationCodeSpec,
    LocationCodeType, UrlType, DEFAULT_LAYER_ID,
};
pub use registry::{LayerRegistry, RegistryError};
pub use state::{
    LayerRuntimeState, LayerStateStore, StateError, StyleDefaults, DEFAULT_MAX_SELECTABLE_RASTER,
    DEFAULT_OPACITY, DEFAULT_PALETTE,
};
