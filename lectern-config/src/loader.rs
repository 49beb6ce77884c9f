//! Tracker configuration loading
//!
//! Settings are resolved from the first source that is present:
//!
//! 1. an explicit path passed to [`ConfigLoader::with_config_path`],
//! 2. `$LECTERN_CONFIG_PATH` (TOML or JSON file),
//! 3. `$LECTERN_CONFIG_JSON` (inline JSON),
//! 4. `lectern.toml`, `lectern.json`, `config/lectern.toml` or
//!    `config/lectern.json` under the base directory,
//! 5. built-in defaults.
//!
//! `$LECTERN_FLUSH_INTERVAL` ("500ms", "2s") then overrides the flush
//! interval, and `$LECTERN_DATA_DIR` selects where enrollments are stored.
//! A `.env` file is loaded first when present.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::Context;
use lectern_core::{
    EnrollmentStore, FileStore, KeyValueStore, MemoryStore, SystemClock,
    TrackerSettings,
};
use tracing::{debug, info, warn};

use crate::error::ConfigLoadError;
use crate::file::{find_default_file, load_settings_file, parse_settings_json};

pub const CONFIG_PATH_VAR: &str = "LECTERN_CONFIG_PATH";
pub const CONFIG_JSON_VAR: &str = "LECTERN_CONFIG_JSON";
pub const FLUSH_INTERVAL_VAR: &str = "LECTERN_FLUSH_INTERVAL";
pub const DATA_DIR_VAR: &str = "LECTERN_DATA_DIR";

/// Source that produced the tracker settings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConfigSource {
    #[default]
    Default,
    Explicit(PathBuf),
    EnvPath(PathBuf),
    EnvInline,
    File(PathBuf),
}

/// Environment values consulted by the loader.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub config_path: Option<PathBuf>,
    pub config_json: Option<String>,
    pub flush_interval: Option<String>,
    pub data_dir: Option<PathBuf>,
}

impl EnvOverrides {
    pub fn gather() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read =
            |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        Self {
            config_path: read(CONFIG_PATH_VAR).map(PathBuf::from),
            config_json: read(CONFIG_JSON_VAR),
            flush_interval: read(FLUSH_INTERVAL_VAR),
            data_dir: read(DATA_DIR_VAR).map(PathBuf::from),
        }
    }
}

/// Enrollment store over the configured backend.
pub type ConfiguredStore = EnrollmentStore<Box<dyn KeyValueStore>>;

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    pub settings: TrackerSettings,
    /// Directory for the on-disk store. `None` keeps enrollments in memory.
    pub data_dir: Option<PathBuf>,
    pub source: ConfigSource,
    pub env_file_loaded: bool,
}

impl TrackerConfig {
    /// Storage backend selected by `data_dir`.
    pub fn storage(&self) -> Result<Box<dyn KeyValueStore>, ConfigLoadError> {
        match &self.data_dir {
            Some(dir) => {
                let store = FileStore::new(dir).map_err(|source| {
                    ConfigLoadError::DataDir {
                        path: dir.clone(),
                        source,
                    }
                })?;
                Ok(Box::new(store))
            }
            None => {
                warn!(
                    "no {DATA_DIR_VAR} configured, \
                     enrollments will not survive restarts"
                );
                Ok(Box::new(MemoryStore::new()))
            }
        }
    }

    /// Load the enrollment store against the configured backend.
    pub fn open_store(&self) -> Result<ConfiguredStore, ConfigLoadError> {
        Ok(EnrollmentStore::load(
            self.storage()?,
            SystemClock,
            &self.settings,
        ))
    }
}

#[derive(Debug, Default, Clone)]
pub struct ConfigLoaderOptions {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
    pub base_dir: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ConfigLoaderOptions) -> Self {
        Self { options }
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.env_file = Some(path.into());
        self
    }

    /// Directory searched for default config files. Defaults to the
    /// working directory.
    pub fn with_base_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.base_dir = Some(path.into());
        self
    }

    /// Load `.env`, then resolve against the process environment.
    pub fn load(&self) -> Result<TrackerConfig, ConfigLoadError> {
        let loaded = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| ()),
            None => dotenvy::dotenv().map(|_| ()),
        };
        let env_file_loaded = match loaded {
            Ok(()) => true,
            Err(dotenvy::Error::Io(_)) => false,
            Err(err) => return Err(err.into()),
        };

        let mut config = self.resolve(&EnvOverrides::gather())?;
        config.env_file_loaded = env_file_loaded;
        if env_file_loaded {
            info!("loaded .env file");
        }
        Ok(config)
    }

    /// Resolve against the given environment values without touching the
    /// process environment.
    pub fn resolve(
        &self,
        env: &EnvOverrides,
    ) -> Result<TrackerConfig, ConfigLoadError> {
        let (mut settings, source) = self.resolve_settings(env)?;

        if let Some(raw) = &env.flush_interval {
            let interval = humantime::parse_duration(raw).map_err(|source| {
                ConfigLoadError::InvalidFlushInterval {
                    value: raw.clone(),
                    source,
                }
            })?;
            settings.flush_interval_ms =
                u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        }

        let settings = settings.sanitized();
        debug!(
            ?source,
            ?settings,
            data_dir = ?env.data_dir,
            "resolved tracker config"
        );

        Ok(TrackerConfig {
            settings,
            data_dir: env.data_dir.clone(),
            source,
            env_file_loaded: false,
        })
    }

    fn resolve_settings(
        &self,
        env: &EnvOverrides,
    ) -> Result<(TrackerSettings, ConfigSource), ConfigLoadError> {
        if let Some(path) = &self.options.config_path {
            if !path.exists() {
                return Err(ConfigLoadError::MissingConfig {
                    path: path.clone(),
                });
            }
            let settings =
                load_settings_file(path).map_err(ConfigLoadError::Settings)?;
            return Ok((settings, ConfigSource::Explicit(path.clone())));
        }

        if let Some(path) = &env.config_path {
            let settings =
                load_settings_file(path).map_err(ConfigLoadError::Settings)?;
            return Ok((settings, ConfigSource::EnvPath(path.clone())));
        }

        if let Some(raw) = &env.config_json {
            let settings = parse_settings_json(raw)
                .with_context(|| format!("failed to parse {CONFIG_JSON_VAR}"))
                .map_err(ConfigLoadError::Settings)?;
            return Ok((settings, ConfigSource::EnvInline));
        }

        let base = self.options.base_dir.as_deref().unwrap_or(Path::new("."));
        if let Some(path) = find_default_file(base) {
            let settings =
                load_settings_file(&path).map_err(ConfigLoadError::Settings)?;
            return Ok((settings, ConfigSource::File(path)));
        }

        Ok((TrackerSettings::default(), ConfigSource::Default))
    }
}
