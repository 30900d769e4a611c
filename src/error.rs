//! Error types for testsieve
//!
//! Domain errors (`SelectorError`, `SizeParseError`) live next to the code
//! that raises them; `AppError` wraps them for the configuration and CLI
//! layers while preserving the source chain.

use crate::selectors::SelectorError;
use crate::units::SizeParseError;
use thiserror::Error;

/// Main error type for the application
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read configuration file {path}")]
    ConfigFileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse TOML configuration {path}")]
    ConfigParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration in {path}: {source}")]
    ConfigValidationFailed {
        path: String,
        #[source]
        source: Box<AppError>,
    },

    #[error(transparent)]
    Selector(#[from] SelectorError),

    #[error(transparent)]
    Size(#[from] SizeParseError),

    #[error("Failed to read test list {path}")]
    InputRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write output")]
    Output(#[source] std::io::Error),
}

/// Convenience type alias for Results
pub type AppResult<T> = Result<T, AppError>;
