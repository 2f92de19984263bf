//! Error types for the fallible edges of the matcher
//!
//! Matching itself never fails: normalization, hierarchy construction and
//! resolution are total. Errors only arise when reading reference snapshots
//! or configuration from outside the process.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KatoError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON reference snapshot: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid YAML document: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid matcher configuration: {0}")]
    InvalidConfig(String),
}

impl KatoError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, KatoError>;
