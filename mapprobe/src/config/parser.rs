//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This module contains the `parse_ini()` function and its helpers.
//! It is the single place where INI key names are mapped to struct fields.

use std::path::PathBuf;
use std::str::FromStr;

use ini::{Ini, Properties};

use super::defaults::MAX_GRID_MINUTES;
use super::file::ConfigFileError;
use super::settings::ConfigFile;
use crate::style::{Colormap, PresetPalette};

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [layers] section
    if let Some(section) = ini.section(Some("layers")) {
        if let Some(v) = non_empty(section, "registry") {
            config.layers.registry = Some(expand_tilde(v));
        }
        if let Some(v) = section.get("max_selectable_raster") {
            config.layers.max_selectable_raster = parse_positive(
                "layers",
                "max_selectable_raster",
                v,
                "must be a positive integer",
            )?;
        }
    }

    // [location_codes] section
    if let Some(section) = ini.section(Some("location_codes")) {
        if let Some(v) = section.get("default_type") {
            config.location_codes.default_type = parse_value(
                "location_codes",
                "default_type",
                v,
                "must be one of: meshCode, worldGrid, none",
            )?;
        }
        if let Some(v) = section.get("grid_minutes") {
            let minutes: u32 = parse_value(
                "location_codes",
                "grid_minutes",
                v,
                "must be an integer from 1 to 60",
            )?;
            if minutes == 0 || minutes > MAX_GRID_MINUTES {
                return Err(invalid(
                    "location_codes",
                    "grid_minutes",
                    v,
                    "must be an integer from 1 to 60",
                ));
            }
            config.location_codes.grid_minutes = minutes;
        }
        if let Some(v) = section.get("reserved_grid_prefix") {
            config.location_codes.reserved_grid_prefix = v.trim().to_string();
        }
        if let Some(v) = section.get("spec_prefix") {
            config.location_codes.spec_prefix = v.trim().to_string();
        }
    }

    // [detail_panel] section
    if let Some(section) = ini.section(Some("detail_panel")) {
        let panel = &mut config.detail_panel;
        if let Some(v) = section.get("display_mode") {
            panel.display_mode = parse_value(
                "detail_panel",
                "display_mode",
                v,
                "must be 'image' or 'embedded'",
            )?;
        }
        if let Some(v) = section.get("urltype") {
            panel.url_type = parse_value("detail_panel", "urltype", v, "must be 'raw' or 'arg'")?;
        }
        if let Some(v) = non_empty(section, "urlbase") {
            panel.url_base = Some(v.to_string());
        }
        for (key, field) in [
            ("basedir", &mut panel.basedir),
            ("base_url", &mut panel.base_url),
            ("id_basedir", &mut panel.id_basedir),
            ("id_base_url", &mut panel.id_base_url),
            ("fallback_image", &mut panel.fallback_image),
            ("timeout_image", &mut panel.timeout_image),
        ] {
            if let Some(v) = non_empty(section, key) {
                *field = v.to_string();
            }
        }
        for (key, field) in [
            ("image_extension", &mut panel.image_extension),
            ("document_extension", &mut panel.document_extension),
        ] {
            if let Some(v) = non_empty(section, key) {
                *field = v.trim_start_matches('.').to_string();
            }
        }
        if let Some(v) = section.get("load_timeout_ms") {
            panel.load_timeout_ms = parse_positive(
                "detail_panel",
                "load_timeout_ms",
                v,
                "must be a positive integer (milliseconds)",
            )?;
        }
    }

    // [vector] section
    if let Some(section) = ini.section(Some("vector")) {
        if let Some(v) = section.get("feature_sample_size") {
            config.vector.feature_sample_size = parse_positive(
                "vector",
                "feature_sample_size",
                v,
                "must be a positive integer",
            )?;
        }
        if let Some(v) = section.get("max_preset_categories") {
            config.vector.max_preset_categories = parse_value(
                "vector",
                "max_preset_categories",
                v,
                "must be a non-negative integer",
            )?;
        }
        if let Some(v) = section.get("point_detection_radius_m") {
            let radius: f64 = parse_value(
                "vector",
                "point_detection_radius_m",
                v,
                "must be a positive number (meters)",
            )?;
            if !radius.is_finite() || radius <= 0.0 {
                return Err(invalid(
                    "vector",
                    "point_detection_radius_m",
                    v,
                    "must be a positive number (meters)",
                ));
            }
            config.vector.point_detection_radius_m = radius;
        }
        if let Some(v) = section.get("default_colormap") {
            config.vector.default_colormap = v.trim().parse::<Colormap>().map_err(|e| {
                invalid("vector", "default_colormap", v, &e.to_string())
            })?;
        }
        if let Some(v) = section.get("default_opacity") {
            let opacity: f64 = parse_value(
                "vector",
                "default_opacity",
                v,
                "must be a number from 0.0 to 1.0",
            )?;
            if !(0.0..=1.0).contains(&opacity) {
                return Err(invalid(
                    "vector",
                    "default_opacity",
                    v,
                    "must be a number from 0.0 to 1.0",
                ));
            }
            config.vector.default_opacity = opacity;
        }
        if let Some(v) = section.get("default_palette") {
            let v = v.trim();
            let palette = v.parse::<PresetPalette>().map_err(|_| {
                invalid(
                    "vector",
                    "default_palette",
                    v,
                    "must be one of: colorful, pastel, dark",
                )
            })?;
            config.vector.default_palette = palette.name().to_string();
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = non_empty(section, "file") {
            config.logging.file = expand_tilde(v);
        }
    }

    Ok(config)
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_value<T: FromStr>(
    section: &str,
    key: &str,
    value: &str,
    reason: &str,
) -> Result<T, ConfigFileError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(section, key, value, reason))
}

fn parse_positive<T>(section: &str, key: &str, value: &str, reason: &str) -> Result<T, ConfigFileError>
where
    T: FromStr + PartialOrd + Default,
{
    let parsed: T = parse_value(section, key, value, reason)?;
    if parsed <= T::default() {
        return Err(invalid(section, key, value, reason));
    }
    Ok(parsed)
}

/// A trimmed value, `None` when missing or blank.
fn non_empty<'a>(section: &'a Properties, key: &str) -> Option<&'a str> {
    section.get(key).map(str::trim).filter(|v| !v.is_empty())
}

/// Expand ~ to home directory in paths.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::*;
    use crate::layer::{DisplayMode, LocationCodeType, UrlType};
    use tempfile::TempDir;

    fn load(content: &str) -> Result<ConfigFile, ConfigFileError> {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");
        std::fs::write(&config_path, content).unwrap();
        ConfigFile::load_from(&config_path)
    }

    #[test]
    fn test_partial_config() {
        let config = load(
            r#"
[location_codes]
default_type = meshCode

[detail_panel]
display_mode = iframe
urltype = arg
urlbase = https://example.org/view?site=1
basedir = /srv/img/
load_timeout_ms = 2500
"#,
        )
        .unwrap();

        // Specified values
        assert_eq!(config.location_codes.default_type, LocationCodeType::MeshCode);
        assert_eq!(config.detail_panel.display_mode, DisplayMode::Embedded);
        assert_eq!(config.detail_panel.url_type, UrlType::Arg);
        assert_eq!(
            config.detail_panel.url_base.as_deref(),
            Some("https://example.org/view?site=1")
        );
        assert_eq!(config.detail_panel.basedir, "/srv/img/");
        assert_eq!(config.detail_panel.load_timeout_ms, 2500);

        // Default values
        assert_eq!(config.detail_panel.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.location_codes.grid_minutes, DEFAULT_GRID_MINUTES);
        assert_eq!(config.vector.feature_sample_size, DEFAULT_FEATURE_SAMPLE_SIZE);
    }

    #[test]
    fn test_invalid_code_type() {
        let err = load("[location_codes]\ndefault_type = postcode\n").unwrap_err();
        assert!(err.to_string().contains("default_type"));
        assert!(err.to_string().contains("meshCode"));
    }

    #[test]
    fn test_grid_minutes_bounds() {
        assert!(load("[location_codes]\ngrid_minutes = 0\n").is_err());
        assert!(load("[location_codes]\ngrid_minutes = 61\n").is_err());
        let config = load("[location_codes]\ngrid_minutes = 30\n").unwrap();
        assert_eq!(config.location_codes.grid_minutes, 30);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = load("[detail_panel]\nload_timeout_ms = 0\n").unwrap_err();
        match err {
            ConfigFileError::InvalidValue { section, key, .. } => {
                assert_eq!(section, "detail_panel");
                assert_eq!(key, "load_timeout_ms");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_vector_section() {
        let config = load(
            r#"
[vector]
feature_sample_size = 50
max_preset_categories = 8
point_detection_radius_m = 250.5
default_colormap = rdylbu
default_opacity = 0.5
default_palette = Pastel
"#,
        )
        .unwrap();
        assert_eq!(config.vector.feature_sample_size, 50);
        assert_eq!(config.vector.max_preset_categories, 8);
        assert_eq!(config.vector.point_detection_radius_m, 250.5);
        assert_eq!(config.vector.default_colormap, Colormap::RdYlBu);
        assert_eq!(config.vector.default_opacity, 0.5);
        assert_eq!(config.vector.default_palette, "pastel");
    }

    #[test]
    fn test_invalid_vector_values() {
        assert!(load("[vector]\ndefault_colormap = rainbow\n").is_err());
        assert!(load("[vector]\ndefault_opacity = 1.5\n").is_err());
        assert!(load("[vector]\ndefault_palette = neon\n").is_err());
        assert!(load("[vector]\npoint_detection_radius_m = -1\n").is_err());
        assert!(load("[vector]\nfeature_sample_size = 0\n").is_err());
    }

    #[test]
    fn test_extensions_drop_leading_dot() {
        let config = load("[detail_panel]\nimage_extension = .jpg\n").unwrap();
        assert_eq!(config.detail_panel.image_extension, "jpg");
    }

    #[test]
    fn test_blank_values_keep_defaults() {
        let config = load("[layers]\nregistry =\n\n[detail_panel]\nurlbase =\n").unwrap();
        assert!(config.layers.registry.is_none());
        assert!(config.detail_panel.url_base.is_none());
    }

    #[test]
    fn test_expand_tilde() {
        let path = expand_tilde("~/test/path");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(path, home.join("test/path"));
        }

        // Non-tilde paths should be unchanged
        let path = expand_tilde("/absolute/path");
        assert_eq!(path, PathBuf::from("/absolute/path"));
    }
}
