//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! These are pure data types with no parsing or serialization logic.

use std::path::PathBuf;

use crate::layer::{DisplayMode, LocationCodeType, UrlType};
use crate::style::Colormap;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// Layer list and selection limits
    pub layers: LayerSettings,
    /// Location code schemes
    pub location_codes: LocationCodeSettings,
    /// Per-location content lookup
    pub detail_panel: DetailPanelSettings,
    /// Vector layer styling and hit testing
    pub vector: VectorSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// Layer configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSettings {
    /// Layer list JSON file. Without one, no layers are known.
    pub registry: Option<PathBuf>,
    /// Raster layers that may be active at once.
    pub max_selectable_raster: usize,
}

/// Location code configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationCodeSettings {
    /// Code scheme used when the current layer names none.
    pub default_type: LocationCodeType,
    /// World grid cell size in minutes (1-60).
    pub grid_minutes: u32,
    /// Ids with this prefix are ignored in favour of computed codes.
    pub reserved_grid_prefix: String,
    /// Keys with this prefix always use path-style document URLs.
    pub spec_prefix: String,
}

/// Detail panel content configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailPanelSettings {
    pub display_mode: DisplayMode,
    pub url_type: UrlType,
    /// Base of `arg`-style document URLs. Defaults to `base_url`.
    pub url_base: Option<String>,
    pub basedir: String,
    pub base_url: String,
    pub id_basedir: String,
    pub id_base_url: String,
    pub fallback_image: String,
    pub timeout_image: String,
    pub image_extension: String,
    pub document_extension: String,
    /// Time allowed for one content probe.
    pub load_timeout_ms: u64,
}

/// Vector layer configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorSettings {
    /// Leading features inspected by type detection.
    pub feature_sample_size: usize,
    /// Category count above which colors are generated instead of preset.
    pub max_preset_categories: usize,
    /// Hit radius for point features in meters.
    pub point_detection_radius_m: f64,
    pub default_colormap: Colormap,
    pub default_opacity: f64,
    pub default_palette: String,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Log file path
    pub file: PathBuf,
}
