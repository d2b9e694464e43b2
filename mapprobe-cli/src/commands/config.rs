//! Configuration management CLI commands.
//!
//! Provides `config path`, `config list` and `config init` for locating,
//! viewing and creating the configuration file.

use std::path::{Path, PathBuf};

use clap::Subcommand;

use mapprobe::config::{config_file_path, ConfigFile};

use crate::error::CliError;
use crate::runner::load_config;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the configuration file path
    Path,

    /// List all configuration settings
    List,

    /// Write a configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Run a config subcommand.
///
/// `config_path` is the `--config` override, if any.
pub fn run(command: ConfigCommands, config_path: Option<&Path>) -> Result<(), CliError> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(config_file_path);

    match command {
        ConfigCommands::Path => {
            println!("{}", path.display());
            Ok(())
        }
        ConfigCommands::List => run_list(&path),
        ConfigCommands::Init { force } => run_init(&path, force),
    }
}

/// List all configuration settings.
fn run_list(path: &Path) -> Result<(), CliError> {
    let config = load_config(Some(path))?;

    println!("Configuration Settings");
    println!("======================");
    if !path.exists() {
        println!("(no file at {}, showing defaults)", path.display());
    }
    println!();

    let mut current_section = "";
    for (section, key, value) in settings(&config) {
        // Print section header when section changes
        if section != current_section {
            if !current_section.is_empty() {
                println!();
            }
            println!("[{}]", section);
            current_section = section;
        }

        if value.is_empty() {
            println!("  {} = (not set)", key);
        } else {
            println!("  {} = {}", key, value);
        }
    }

    Ok(())
}

/// Create the config file with defaults.
fn run_init(path: &Path, force: bool) -> Result<(), CliError> {
    if path.exists() && !force {
        println!("Configuration already exists at {}", path.display());
        println!("Use --force to overwrite it with defaults.");
        return Ok(());
    }

    ConfigFile::default().save_to(path)?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

/// Every setting as `(section, key, value)`, in file order.
fn settings(config: &ConfigFile) -> Vec<(&'static str, &'static str, String)> {
    let path = |p: &Option<PathBuf>| {
        p.as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default()
    };
    let panel = &config.detail_panel;
    let vector = &config.vector;

    vec![
        ("layers", "registry", path(&config.layers.registry)),
        (
            "layers",
            "max_selectable_raster",
            config.layers.max_selectable_raster.to_string(),
        ),
        (
            "location_codes",
            "default_type",
            config.location_codes.default_type.to_string(),
        ),
        (
            "location_codes",
            "grid_minutes",
            config.location_codes.grid_minutes.to_string(),
        ),
        (
            "location_codes",
            "reserved_grid_prefix",
            config.location_codes.reserved_grid_prefix.clone(),
        ),
        (
            "location_codes",
            "spec_prefix",
            config.location_codes.spec_prefix.clone(),
        ),
        ("detail_panel", "display_mode", panel.display_mode.to_string()),
        ("detail_panel", "urltype", panel.url_type.as_str().to_string()),
        (
            "detail_panel",
            "urlbase",
            panel.url_base.clone().unwrap_or_default(),
        ),
        ("detail_panel", "basedir", panel.basedir.clone()),
        ("detail_panel", "base_url", panel.base_url.clone()),
        ("detail_panel", "id_basedir", panel.id_basedir.clone()),
        ("detail_panel", "id_base_url", panel.id_base_url.clone()),
        ("detail_panel", "fallback_image", panel.fallback_image.clone()),
        ("detail_panel", "timeout_image", panel.timeout_image.clone()),
        ("detail_panel", "image_extension", panel.image_extension.clone()),
        (
            "detail_panel",
            "document_extension",
            panel.document_extension.clone(),
        ),
        (
            "detail_panel",
            "load_timeout_ms",
            panel.load_timeout_ms.to_string(),
        ),
        (
            "vector",
            "feature_sample_size",
            vector.feature_sample_size.to_string(),
        ),
        (
            "vector",
            "max_preset_categories",
            vector.max_preset_categories.to_string(),
        ),
        (
            "vector",
            "point_detection_radius_m",
            vector.point_detection_radius_m.to_string(),
        ),
        ("vector", "default_colormap", vector.default_colormap.to_string()),
        ("vector", "default_opacity", vector.default_opacity.to_string()),
        ("vector", "default_palette", vector.default_palette.clone()),
        ("logging", "file", config.logging.file.display().to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_settings_cover_every_section() {
        let rows = settings(&ConfigFile::default());
        let sections: Vec<&str> = rows.iter().map(|(s, _, _)| *s).collect();
        for section in ["layers", "location_codes", "detail_panel", "vector", "logging"] {
            assert!(sections.contains(&section), "missing section {}", section);
        }
        let registry = rows.iter().find(|(_, k, _)| *k == "registry").unwrap();
        assert!(registry.2.is_empty(), "registry is unset by default");
    }

    #[test]
    fn test_init_writes_and_keeps_existing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.ini");

        run_init(&path, false).unwrap();
        assert!(path.exists());

        std::fs::write(&path, "[location_codes]\ngrid_minutes = 30\n").unwrap();
        run_init(&path, false).unwrap();
        assert_eq!(
            ConfigFile::load_from(&path).unwrap().location_codes.grid_minutes,
            30,
            "existing file must be kept without --force"
        );

        run_init(&path, true).unwrap();
        assert_eq!(ConfigFile::load_from(&path).unwrap(), ConfigFile::default());
    }
}
