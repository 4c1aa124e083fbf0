use std::path::Path;

use thiserror::Error;

/// Error types for the remote-mpris application.
///
/// Covers configuration loading, parsing and filesystem access. Bus and
/// session failures live in [`crate::services::mpris::MprisError`].
#[derive(Error, Debug)]
pub enum RemoteMprisError {
    /// Configuration validation error
    #[error("configuration validation failed for '{component}': {details}")]
    ConfigValidation {
        /// Component that failed validation
        component: String,
        /// Validation error details
        details: String,
    },

    /// I/O operation error
    #[error("I/O error on '{path}': {details}")]
    IoError {
        /// Path where I/O error occurred
        path: std::path::PathBuf,
        /// I/O error details
        details: String,
    },

    /// Standard I/O operation error (for compatibility)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error with location context
    #[error("failed to parse TOML at '{location}': {details}")]
    TomlParseError {
        /// Location of TOML being parsed (file path or "string")
        location: String,
        /// Parse error details
        details: String,
    },

    /// Serializing a value for output failed
    #[error("failed to serialize {what}: {details}")]
    Serialization {
        /// What was being serialized
        what: String,
        /// Serializer error details
        details: String,
    },
}

/// A specialized `Result` type for remote-mpris operations.
pub type Result<T> = std::result::Result<T, RemoteMprisError>;

impl RemoteMprisError {
    /// Creates a TOML parsing error with optional file path context.
    ///
    /// # Arguments
    ///
    /// * `error` - The underlying parsing error
    /// * `path` - Optional path to the file that failed to parse
    pub fn toml_parse(error: impl std::fmt::Display, path: Option<&Path>) -> Self {
        let location = match path {
            Some(p) => {
                let clean_path = p.canonicalize().unwrap_or_else(|_| p.to_path_buf());
                clean_path.to_string_lossy().to_string()
            }
            None => "string".to_string(),
        };

        RemoteMprisError::TomlParseError {
            location,
            details: error.to_string(),
        }
    }

    /// Creates an I/O error carrying the path it happened on.
    pub fn io(error: impl std::fmt::Display, path: &Path) -> Self {
        RemoteMprisError::IoError {
            path: path.to_path_buf(),
            details: error.to_string(),
        }
    }
}
