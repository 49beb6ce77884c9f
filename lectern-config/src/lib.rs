//! Configuration loading and logging setup for Lectern
//!
//! ```no_run
//! use lectern_config::{ConfigLoader, logging};
//!
//! logging::init_tracing(logging::DEFAULT_FILTER)?;
//! let config = ConfigLoader::new().load()?;
//! let _store = config.open_store()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![allow(missing_docs)]

pub mod error;
pub mod file;
pub mod loader;
pub mod logging;

pub use error::ConfigLoadError;
pub use loader::{
    ConfigLoader, ConfigLoaderOptions, ConfigSource, ConfiguredStore,
    EnvOverrides, TrackerConfig,
};
