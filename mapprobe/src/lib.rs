//! mapprobe - Point queries over layered map data
//!
//! Given a coordinate, this library computes location codes (Japanese mesh
//! codes and a global grid key), reads and styles the values of the active
//! layers at that point, finds the vector features under it and resolves
//! per-location content for up to three tabs, with stale lookups cancelled
//! as soon as a newer query starts.
//!
//! # High-Level API
//!
//! For most use cases, [`query::QuerySession`] is the entry point:
//!
//! ```ignore
//! use mapprobe::config::ConfigFile;
//! use mapprobe::content::DefaultProbe;
//! use mapprobe::query::{QueryInput, QuerySession};
//!
//! let config = ConfigFile::load()?;
//! let context = config.query_context(config.load_registry()?);
//! let mut session = QuerySession::new(context, DefaultProbe::new(".")?);
//!
//! let outcome = session.query(QueryInput::from_text("35.6812, 139.7671")?).await?;
//! ```

pub mod config;
pub mod content;
pub mod coord;
pub mod layer;
pub mod logging;
pub mod query;
pub mod spatial;
pub mod style;

/// Version of the mapprobe library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty(), "Version should not be empty");
    }

    #[test]
    fn test_coord_module_exists() {
        use crate::coord::{mesh_code, MeshOrder};
        assert!(mesh_code(35.6812, 139.7671, MeshOrder::Third).is_some());
    }
}
