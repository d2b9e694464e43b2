//! Default values and constants for all configuration settings.
//!
//! Contains all `DEFAULT_*` constants and the `ConfigFile::default()`
//! implementation. Domain defaults are taken from the modules that own
//! them so the two cannot drift apart.

use super::settings::*;
use crate::layer::{DisplayMode, LocationCodeType, UrlType};
use crate::style::Colormap;

// =============================================================================
// Layer defaults
// =============================================================================

pub use crate::layer::DEFAULT_MAX_SELECTABLE_RASTER;

// =============================================================================
// Location code defaults
// =============================================================================

pub use crate::content::{DEFAULT_RESERVED_ID_PREFIX, DEFAULT_SPEC_PREFIX};
pub use crate::coord::DEFAULT_GRID_MINUTES;

/// Largest accepted grid cell size in minutes.
pub const MAX_GRID_MINUTES: u32 = 60;

// =============================================================================
// Detail panel defaults
// =============================================================================

pub use crate::content::{
    DEFAULT_BASEDIR, DEFAULT_BASE_URL, DEFAULT_DOCUMENT_EXTENSION, DEFAULT_FALLBACK_IMAGE,
    DEFAULT_ID_BASEDIR, DEFAULT_ID_BASE_URL, DEFAULT_IMAGE_EXTENSION, DEFAULT_TIMEOUT_IMAGE,
};

/// Default probe timeout in milliseconds.
pub const DEFAULT_LOAD_TIMEOUT_MS: u64 = 5000;

// =============================================================================
// Vector defaults
// =============================================================================

pub use crate::layer::{DEFAULT_OPACITY, DEFAULT_PALETTE};
pub use crate::spatial::DEFAULT_DETECTION_RADIUS_M;
pub use crate::style::{DEFAULT_FEATURE_SAMPLE_SIZE, DEFAULT_MAX_PRESET_CATEGORIES};

// =============================================================================
// Logging defaults
// =============================================================================

/// Default log file name inside the config directory.
pub const DEFAULT_LOG_FILE_NAME: &str = "mapprobe.log";

// =============================================================================
// ConfigFile::default()
// =============================================================================

impl Default for ConfigFile {
    fn default() -> Self {
        let config_dir = super::file::config_directory();

        Self {
            layers: LayerSettings {
                registry: None,
                max_selectable_raster: DEFAULT_MAX_SELECTABLE_RASTER,
            },
            location_codes: LocationCodeSettings {
                default_type: LocationCodeType::WorldGrid,
                grid_minutes: DEFAULT_GRID_MINUTES,
                reserved_grid_prefix: DEFAULT_RESERVED_ID_PREFIX.to_string(),
                spec_prefix: DEFAULT_SPEC_PREFIX.to_string(),
            },
            detail_panel: DetailPanelSettings {
                display_mode: DisplayMode::Image,
                url_type: UrlType::Raw,
                url_base: None,
                basedir: DEFAULT_BASEDIR.to_string(),
                base_url: DEFAULT_BASE_URL.to_string(),
                id_basedir: DEFAULT_ID_BASEDIR.to_string(),
                id_base_url: DEFAULT_ID_BASE_URL.to_string(),
                fallback_image: DEFAULT_FALLBACK_IMAGE.to_string(),
                timeout_image: DEFAULT_TIMEOUT_IMAGE.to_string(),
                image_extension: DEFAULT_IMAGE_EXTENSION.to_string(),
                document_extension: DEFAULT_DOCUMENT_EXTENSION.to_string(),
                load_timeout_ms: DEFAULT_LOAD_TIMEOUT_MS,
            },
            vector: VectorSettings {
                feature_sample_size: DEFAULT_FEATURE_SAMPLE_SIZE,
                max_preset_categories: DEFAULT_MAX_PRESET_CATEGORIES,
                point_detection_radius_m: DEFAULT_DETECTION_RADIUS_M,
                default_colormap: Colormap::Viridis,
                default_opacity: DEFAULT_OPACITY,
                default_palette: DEFAULT_PALETTE.to_string(),
            },
            logging: LoggingSettings {
                file: config_dir.join(DEFAULT_LOG_FILE_NAME),
            },
        }
    }
}
