//! Reading and writing `~/.mapprobe/config.ini`.
//!
//! A missing file is not an error: every key has a default, so loading a
//! path that does not exist yields [`ConfigFile::default`].

use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;
use tracing::debug;

use super::settings::ConfigFile;

/// Directory under the home directory holding config and log files.
const CONFIG_DIR_NAME: &str = ".mapprobe";
const CONFIG_FILE_NAME: &str = "config.ini";

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: ini::Error,
    },

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A key holds a value outside what its setting accepts.
    #[error("invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },
}

impl ConfigFile {
    /// Loads `~/.mapprobe/config.ini`.
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|source| ConfigFileError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        super::parser::parse_ini(&ini)
    }

    /// Writes the commented INI form, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        let write_error = |source| ConfigFileError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }
        std::fs::write(path, super::writer::to_config_string(self)).map_err(write_error)
    }
}

/// `~/.mapprobe`, or `./.mapprobe` without a home directory.
pub(super) fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

/// `~/.mapprobe/config.ini`.
pub fn config_file_path() -> PathBuf {
    config_directory().join(CONFIG_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::*;
    use crate::layer::{DisplayMode, LocationCodeType, UrlType};
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = ConfigFile::default();

        assert!(config.layers.registry.is_none());
        assert_eq!(config.layers.max_selectable_raster, DEFAULT_MAX_SELECTABLE_RASTER);
        assert_eq!(config.location_codes.default_type, LocationCodeType::WorldGrid);
        assert_eq!(config.location_codes.reserved_grid_prefix, "odn_");
        assert_eq!(config.detail_panel.display_mode, DisplayMode::Image);
        assert_eq!(config.detail_panel.url_type, UrlType::Raw);
        assert_eq!(config.detail_panel.load_timeout_ms, DEFAULT_LOAD_TIMEOUT_MS);
        assert!(config.logging.file.ends_with(DEFAULT_LOG_FILE_NAME));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = ConfigFile::load_from(&temp_dir.path().join("absent.ini")).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/dir/config.ini");

        ConfigFile::default().save_to(&path).unwrap();
        assert_eq!(ConfigFile::load_from(&path).unwrap(), ConfigFile::default());
    }

    #[test]
    fn test_save_into_a_file_fails_with_path() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let path = blocker.join("config.ini");

        match ConfigFile::default().save_to(&path) {
            Err(ConfigFileError::Write { path: failed, .. }) => {
                assert!(failed.ends_with("blocker/config.ini"))
            }
            other => panic!("expected a write error, got {:?}", other),
        }
    }

    #[test]
    fn test_config_file_path() {
        assert!(config_file_path().ends_with(".mapprobe/config.ini"));
    }
}
