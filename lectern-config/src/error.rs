use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("config file {path} does not exist")]
    MissingConfig { path: PathBuf },
    #[error("failed to load tracker settings: {0}")]
    Settings(#[source] anyhow::Error),
    #[error("invalid LECTERN_FLUSH_INTERVAL '{value}'")]
    InvalidFlushInterval {
        value: String,
        #[source]
        source: humantime::DurationError,
    },
    #[error("failed to open data directory {path}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: lectern_core::TrackerError,
    },
    #[error(transparent)]
    EnvFile(#[from] dotenvy::Error),
}
