use std::path::PathBuf;

use lectern_model::ModelError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage error for key {key:?}: {message}")]
    Storage { key: String, message: String },
}

impl TrackerError {
    pub(crate) fn storage(key: &str, message: impl Into<String>) -> Self {
        TrackerError::Storage {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to read catalog {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid catalog json: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid course record: {0}")]
    Model(#[from] ModelError),
}

pub type Result<T> = std::result::Result<T, TrackerError>;
