//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! This module contains the `to_config_string()` function that produces
//! the commented INI representation written to `config.ini`.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let registry = config
        .layers
        .registry
        .as_ref()
        .map(|p| path_to_string(p))
        .unwrap_or_default();
    let url_base = config.detail_panel.url_base.as_deref().unwrap_or("");
    let panel = &config.detail_panel;
    let vector = &config.vector;

    format!(
        r#"[layers]
; Layer list (JSON). Without one no layers are known.
; Example: registry = ~/maps/layers.json
registry = {}
; Raster layers that may be active at once; the oldest is dropped (default: 2)
max_selectable_raster = {}

[location_codes]
; Code scheme used when the current layer names none:
;   meshCode  - Japanese standard 3rd-order mesh code (Japan only)
;   worldGrid - Global grid key, cell size set by grid_minutes
;   none      - No location code
default_type = {}
; World grid cell size in minutes, 1 to 60 (default: 10)
grid_minutes = {}
; Location ids starting with this prefix are ignored in favour of computed codes
reserved_grid_prefix = {}
; Keys starting with this prefix always use path-style document URLs
spec_prefix = {}

[detail_panel]
; How content is shown:
;   image    - One image per tab
;   embedded - One HTML document per tab
display_mode = {}
; Document URL style (embedded mode):
;   raw - {{base_url}}{{key}}_{{tab}}.{{document_extension}}
;   arg - {{urlbase}}&arg={{key}}&p={{tab}}
urltype = {}
; Base of arg-style URLs. If empty, base_url is used.
urlbase = {}
; Image directory for computed location codes
basedir = {}
; Document directory for computed location codes
base_url = {}
; Image directory for explicit location ids
id_basedir = {}
; Document directory for explicit location ids
id_base_url = {}
; Shown when no layer has content for a tab
fallback_image = {}
; Shown when a content check timed out
timeout_image = {}
image_extension = {}
document_extension = {}
; Time allowed for one content check in milliseconds (default: 5000)
load_timeout_ms = {}

[vector]
; Leading features inspected when detecting a property's type (default: 20)
feature_sample_size = {}
; Category count above which colors are generated instead of preset (default: 12)
max_preset_categories = {}
; Hit radius for point features in meters (default: 100)
point_detection_radius_m = {}
; Colormap for numeric properties (e.g., viridis, jet, RdYlBu, Spectral)
default_colormap = {}
; Layer opacity, 0.0 to 1.0 (default: 0.7)
default_opacity = {}
; Category palette: colorful, pastel, dark
default_palette = {}

[logging]
; Log file path
file = {}
"#,
        registry,
        config.layers.max_selectable_raster,
        config.location_codes.default_type,
        config.location_codes.grid_minutes,
        config.location_codes.reserved_grid_prefix,
        config.location_codes.spec_prefix,
        panel.display_mode,
        panel.url_type.as_str(),
        url_base,
        panel.basedir,
        panel.base_url,
        panel.id_basedir,
        panel.id_base_url,
        panel.fallback_image,
        panel.timeout_image,
        panel.image_extension,
        panel.document_extension,
        panel.load_timeout_ms,
        vector.feature_sample_size,
        vector.max_preset_categories,
        vector.point_detection_radius_m,
        vector.default_colormap,
        vector.default_opacity,
        vector.default_palette,
        path_to_string(&config.logging.file),
    )
}

/// Convert path to string, collapsing home dir to ~.
fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}
