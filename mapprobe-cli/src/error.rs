//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::path::PathBuf;
use std::process;

use mapprobe::config::ConfigFileError;
use mapprobe::content::ProbeError;
use mapprobe::coord::CoordError;
use mapprobe::layer::RegistryError;
use mapprobe::query::QueryError;

/// Exit code for failures at runtime.
pub const EXIT_FAILURE: i32 = 1;
/// Exit code for malformed arguments or input data.
pub const EXIT_USAGE: i32 = 2;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(ConfigFileError),
    /// Layer list could not be loaded
    Registry(RegistryError),
    /// Malformed argument
    InvalidInput(String),
    /// Failed to read an input file
    FileRead { path: PathBuf, error: std::io::Error },
    /// Input file is not usable GeoJSON
    GeoJson { path: PathBuf, message: String },
    /// Query failed
    Query(QueryError),
    /// Content probe could not be created
    Probe(ProbeError),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidInput(_) | CliError::GeoJson { .. } => EXIT_USAGE,
            CliError::Query(QueryError::InvalidInput(_)) => EXIT_USAGE,
            _ => EXIT_FAILURE,
        }
    }

    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        // Print additional help for specific errors
        match self {
            CliError::Config(ConfigFileError::InvalidValue { .. }) => {
                eprintln!();
                eprintln!("Fix the value in the config file, or remove the key to use its default.");
                eprintln!("Run 'mapprobe config path' to locate the file.");
            }
            CliError::Registry(RegistryError::Read { .. }) => {
                eprintln!();
                eprintln!("Pass a layer list with --layers, or set [layers] registry in the config file.");
            }
            _ => {}
        }

        process::exit(self.exit_code())
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::Registry(e) => write!(f, "Failed to load layers: {}", e),
            CliError::InvalidInput(msg) => write!(f, "{}", msg),
            CliError::FileRead { path, error } => {
                write!(f, "Failed to read file '{}': {}", path.display(), error)
            }
            CliError::GeoJson { path, message } => {
                write!(f, "Invalid GeoJSON in '{}': {}", path.display(), message)
            }
            CliError::Query(e) => write!(f, "Query failed: {}", e),
            CliError::Probe(e) => write!(f, "Failed to create content probe: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Registry(e) => Some(e),
            CliError::FileRead { error, .. } => Some(error),
            CliError::Query(e) => Some(e),
            CliError::Probe(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e)
    }
}

impl From<RegistryError> for CliError {
    fn from(e: RegistryError) -> Self {
        CliError::Registry(e)
    }
}

impl From<QueryError> for CliError {
    fn from(e: QueryError) -> Self {
        CliError::Query(e)
    }
}

impl From<ProbeError> for CliError {
    fn from(e: ProbeError) -> Self {
        CliError::Probe(e)
    }
}

impl From<CoordError> for CliError {
    fn from(e: CoordError) -> Self {
        CliError::InvalidInput(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::InvalidInput("bad".into()).exit_code(), EXIT_USAGE);
        assert_eq!(
            CliError::Query(QueryError::InvalidInput(CoordError::InvalidLatitude(91.0))).exit_code(),
            EXIT_USAGE
        );
        assert_eq!(CliError::LoggingInit("x".into()).exit_code(), EXIT_FAILURE);
    }

    #[test]
    fn test_coord_error_becomes_invalid_input() {
        let err: CliError = CoordError::InvalidLongitude(200.0).into();
        assert!(matches!(err, CliError::InvalidInput(_)));
        assert!(err.to_string().contains("200"), "message should name the value: {}", err);
    }
}
