//! Error types for configuration, result-tree loading and string table decoding.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for compilation entry points.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised for caller-side misconfiguration.
///
/// These are fatal: `compile` returns them before any building starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid config field '{field}': {reason}")]
    Invalid { field: String, reason: String },
}

impl ConfigError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Top-level error of the compiler and the result-tree reader.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid result tree: {0}")]
    ResultParse(#[from] serde_json::Error),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Error returned when a string table entry cannot be turned back into text.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("string table index {index} out of range (table has {len} entries)")]
    OutOfRange { index: usize, len: usize },

    #[error("compressed entry is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("compressed entry is not a valid zlib stream: {0}")]
    Inflate(#[from] std::io::Error),

    #[error("decoded entry is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
