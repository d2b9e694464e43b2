//! CLI runner for common setup.
//!
//! Encapsulates config loading and logging initialization so command
//! handlers start from a ready [`ConfigFile`].

use std::path::Path;

use tracing::info;

use mapprobe::config::ConfigFile;
use mapprobe::layer::LayerRegistry;
use mapprobe::logging::{init_logging, LoggingGuard};

use crate::error::CliError;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
}

impl CliRunner {
    /// Load config and initialize logging.
    ///
    /// `config_path` overrides `~/.mapprobe/config.ini`. With `verbose`,
    /// log events are mirrored to stderr.
    pub fn new(config_path: Option<&Path>, verbose: bool) -> Result<Self, CliError> {
        let config = load_config(config_path)?;

        let logging_guard = init_logging(&config.logging.file, verbose)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Layer list from `path`, or the one named in the config.
    pub fn registry(&self, path: Option<&Path>) -> Result<LayerRegistry, CliError> {
        let registry = match path {
            Some(path) => LayerRegistry::load_from(path)?,
            None => self.config.load_registry()?,
        };
        Ok(registry)
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("mapprobe v{}", mapprobe::VERSION);
        info!(
            command,
            log_file = %self.logging_guard.path().display(),
            "mapprobe CLI started"
        );
    }
}

/// Load the config from `path`, or from the default location.
pub fn load_config(path: Option<&Path>) -> Result<ConfigFile, CliError> {
    let config = match path {
        Some(path) => ConfigFile::load_from(path)?,
        None => ConfigFile::load()?,
    };
    Ok(config)
}
