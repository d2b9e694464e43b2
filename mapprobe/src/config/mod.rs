//! User configuration for mapprobe.
//!
//! Configuration lives in `~/.mapprobe/config.ini` and is split into one
//! section per concern. Missing files and keys fall back to the defaults in
//! [`defaults`], and the loaded [`ConfigFile`] converts into the runtime
//! types ([`StyleDefaults`](crate::layer::StyleDefaults),
//! [`ContentSettings`](crate::content::ContentSettings),
//! [`SpatialLocator`](crate::spatial::SpatialLocator)) via `From`.
//!
//! # Example
//!
//! ```no_run
//! use mapprobe::config::ConfigFile;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigFile::load()?;
//! let context = config.query_context(config.load_registry()?);
//! println!("{} layers", context.registry().len());
//! # Ok(())
//! # }
//! ```

mod convert;
pub mod defaults;
mod file;
mod parser;
mod settings;
mod writer;

pub use file::{config_file_path, ConfigFileError};
pub use settings::{
    ConfigFile, DetailPanelSettings, LayerSettings, LocationCodeSettings, LoggingSettings,
    VectorSettings,
};
