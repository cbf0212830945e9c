//! Error types

use std::path::PathBuf;

use thiserror::Error;

/// Configuration could not be loaded
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {name}: expected true/false, 1/0, yes/no, on/off or enabled/disabled")]
    InvalidFlag { name: String, value: String },
}

/// Signal store failures
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("signal store I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize signal record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to lock signal store at {path}: {source}")]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure reported by a legacy adapter
#[derive(Debug, Error)]
#[error("legacy engine failed: {0}")]
pub struct LegacyError(pub String);

impl LegacyError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
