use std::collections::HashMap;
use std::fs;

use lectern_config::{ConfigLoadError, ConfigLoader, ConfigSource, EnvOverrides};
use lectern_core::TrackerSettings;
use lectern_core::model::CourseId;

fn env(vars: &[(&str, &str)]) -> EnvOverrides {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    EnvOverrides::from_lookup(|key| vars.get(key).cloned())
}

#[test]
fn defaults_without_any_source() {
    let dir = tempfile::tempdir().unwrap();
    let config = ConfigLoader::new()
        .with_base_dir(dir.path())
        .resolve(&env(&[]))
        .unwrap();

    assert_eq!(config.source, ConfigSource::Default);
    assert_eq!(config.settings, TrackerSettings::default());
    assert_eq!(config.data_dir, None);
}

#[test]
fn explicit_path_wins_over_environment() {
    let dir = tempfile::tempdir().unwrap();
    let explicit = dir.path().join("tracker.toml");
    fs::write(
        &explicit,
        "flush_interval_ms = 750\nstorage_key = \"learner-2\"\n",
    )
    .unwrap();
    let from_env = dir.path().join("env.json");
    fs::write(&from_env, r#"{"flush_interval_ms": 10}"#).unwrap();

    let config = ConfigLoader::new()
        .with_base_dir(dir.path())
        .with_config_path(&explicit)
        .resolve(&env(&[
            ("LECTERN_CONFIG_PATH", from_env.to_str().unwrap()),
            ("LECTERN_CONFIG_JSON", r#"{"flush_interval_ms": 20}"#),
        ]))
        .unwrap();

    assert_eq!(config.source, ConfigSource::Explicit(explicit));
    assert_eq!(config.settings.flush_interval_ms, 750);
    assert_eq!(config.settings.storage_key, "learner-2");
}

#[test]
fn missing_explicit_path_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ConfigLoader::new()
        .with_config_path(dir.path().join("absent.toml"))
        .resolve(&env(&[]))
        .unwrap_err();
    assert!(matches!(err, ConfigLoadError::MissingConfig { .. }));
}

#[test]
fn env_path_then_inline_json_then_default_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("config")).unwrap();
    let default_file = dir.path().join("config/lectern.json");
    fs::write(&default_file, r#"{"completion_ratio": 0.8}"#).unwrap();
    let env_file = dir.path().join("from-env.json");
    fs::write(&env_file, r#"{"completion_ratio": 0.95}"#).unwrap();
    let loader = ConfigLoader::new().with_base_dir(dir.path());

    let config = loader
        .resolve(&env(&[
            ("LECTERN_CONFIG_PATH", env_file.to_str().unwrap()),
            ("LECTERN_CONFIG_JSON", r#"{"completion_ratio": 0.5}"#),
        ]))
        .unwrap();
    assert_eq!(config.source, ConfigSource::EnvPath(env_file));
    assert_eq!(config.settings.completion_ratio, 0.95);

    let inline = r#"{"completion_ratio": 0.5}"#;
    let config = loader
        .resolve(&env(&[("LECTERN_CONFIG_JSON", inline)]))
        .unwrap();
    assert_eq!(config.source, ConfigSource::EnvInline);
    assert_eq!(config.settings.completion_ratio, 0.5);

    let config = loader
        .resolve(&env(&[("LECTERN_CONFIG_JSON", "   ")]))
        .unwrap();
    assert_eq!(config.source, ConfigSource::File(default_file));
    assert_eq!(config.settings.completion_ratio, 0.8);
}

#[test]
fn flush_interval_accepts_human_durations() {
    let dir = tempfile::tempdir().unwrap();
    let loader = ConfigLoader::new().with_base_dir(dir.path());

    let config = loader
        .resolve(&env(&[("LECTERN_FLUSH_INTERVAL", "500ms")]))
        .unwrap();
    assert_eq!(config.settings.flush_interval_ms, 500);

    let config = loader
        .resolve(&env(&[("LECTERN_FLUSH_INTERVAL", "2s")]))
        .unwrap();
    assert_eq!(config.settings.flush_interval_ms, 2_000);

    let err = loader
        .resolve(&env(&[("LECTERN_FLUSH_INTERVAL", "soonish")]))
        .unwrap_err();
    assert!(matches!(err, ConfigLoadError::InvalidFlushInterval { .. }));
}

#[test]
fn invalid_values_are_sanitized() {
    let dir = tempfile::tempdir().unwrap();
    let config = ConfigLoader::new()
        .with_base_dir(dir.path())
        .resolve(&env(&[(
            "LECTERN_CONFIG_JSON",
            r#"{"completion_ratio": 1.5, "storage_key": " "}"#,
        )]))
        .unwrap();

    assert_eq!(config.settings.completion_ratio, 0.9);
    assert_eq!(config.settings.storage_key, "enrolledCourses");
}

#[test]
fn malformed_inline_json_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let err = ConfigLoader::new()
        .with_base_dir(dir.path())
        .resolve(&env(&[("LECTERN_CONFIG_JSON", "{not json")]))
        .unwrap_err();

    assert!(matches!(err, ConfigLoadError::Settings(_)));
    assert!(err.to_string().contains("LECTERN_CONFIG_JSON"));
}

#[test]
fn data_dir_selects_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("data");
    let config = ConfigLoader::new()
        .with_base_dir(dir.path())
        .resolve(&env(&[("LECTERN_DATA_DIR", data_dir.to_str().unwrap())]))
        .unwrap();
    assert_eq!(config.data_dir.as_deref(), Some(data_dir.as_path()));

    let mut store = config.open_store().unwrap();
    store.enroll(&CourseId::from("derm-1"), 5).unwrap();
    drop(store);

    assert!(data_dir.join("enrolledCourses.json").exists());
    let reopened = config.open_store().unwrap();
    assert!(reopened.is_enrolled("derm-1"));
}
