//! Settings file parsing
//!
//! Files ending in `.json` are read as JSON, `.toml`/`.tml` as TOML, and
//! anything else is tried as TOML first, then JSON.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use lectern_core::TrackerSettings;

const DEFAULT_CANDIDATES: &[&str] = &[
    "lectern.toml",
    "lectern.json",
    "config/lectern.toml",
    "config/lectern.json",
];

pub fn load_settings_file(path: &Path) -> anyhow::Result<TrackerSettings> {
    let contents = fs::read_to_string(path).with_context(|| {
        format!("failed to read tracker config from {}", path.display())
    })?;

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => parse_settings_json(&contents).with_context(|| {
            format!("invalid tracker config {}", path.display())
        }),
        Some("toml") | Some("tml") => {
            toml::from_str(&contents).map_err(|err| {
                anyhow!("invalid tracker config {}: {}", path.display(), err)
            })
        }
        _ => parse_settings_str(&contents, &path.display().to_string()),
    }
}

pub fn parse_settings_str(
    contents: &str,
    origin: &str,
) -> anyhow::Result<TrackerSettings> {
    toml::from_str(contents).or_else(|toml_err| {
        serde_json::from_str(contents).map_err(|json_err| {
            anyhow!(
                "failed to parse tracker config {}: \
                 toml error: {}; json error: {}",
                origin,
                toml_err,
                json_err
            )
        })
    })
}

pub fn parse_settings_json(raw: &str) -> anyhow::Result<TrackerSettings> {
    serde_json::from_str(raw)
        .map_err(|err| anyhow!("invalid tracker config json: {err}"))
}

/// First default location that exists, relative to `base`.
pub fn find_default_file(base: &Path) -> Option<PathBuf> {
    DEFAULT_CANDIDATES
        .iter()
        .map(|candidate| base.join(candidate))
        .find(|path| path.exists())
}
