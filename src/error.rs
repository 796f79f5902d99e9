//! Error types for issn-probe
//!
//! Run-level failures only. Per-target fetch failures are values
//! (`fetch::FailureKind`) and never surface here.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for issn-probe operations
pub type ProbeResult<T> = Result<T, ProbeError>;

/// All run-level errors that can occur in issn-probe
#[derive(Error, Debug)]
pub enum ProbeError {
    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Invalid configuration value {key}: {reason}")]
    ConfigValue { key: String, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Input errors
    #[error("Input is missing required column: {0}")]
    MissingColumn(String),

    #[error("Duplicate target identifier: {0}")]
    DuplicateTarget(String),

    #[error("Invalid ISSN {issn}: {reason}")]
    InvalidIssn { issn: String, reason: String },

    // Cache errors
    #[error("Cache entry for {id} is unreadable: {reason}")]
    CacheRead { id: String, reason: String },

    #[error("Failed to write cache entry for {id}: {source}")]
    CacheWrite {
        id: String,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    // Serialization errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl ProbeError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a configuration value error
    pub fn config_value(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigValue {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::ConfigInvalid { .. } | Self::ConfigValue { .. } => {
                Some("Run: issn-probe config show")
            }
            Self::MissingColumn(_) => Some("Input CSV needs oai_url, set_spec and issn columns"),
            Self::CacheRead { .. } => Some("Run: issn-probe cache clear"),
            _ => None,
        }
    }
}
