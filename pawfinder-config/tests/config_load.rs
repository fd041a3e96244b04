use pawfinder_config::{LocationProviderKind, LogFormatSetting, PawfinderConfigLoader, RatingBackend};
use serial_test::serial;
use std::{fs, path::PathBuf};
use tempfile::TempDir;

/// Helper to write a YAML file in a temp dir and return its path.
fn write_yaml(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, yaml).expect("write yaml");
    p
}

const FILE_YAML: &str = r#"
version: "0.1"
gemini:
  api_key: "${PAWFINDER_TEST_GEMINI_KEY}"
  model: "gemini-2.5-flash"
  timeout_secs: 45
ratings:
  backend: sqlite
  path: "/tmp/pawfinder-test/ratings.db"
location:
  provider: ip
logging:
  format: json
  emit_stderr: true
  filter: "pawfinder=debug"
"#;

#[test]
#[serial]
fn test_config_load() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(&tmp, "pawfinder.yaml", FILE_YAML);

    temp_env::with_var("PAWFINDER_TEST_GEMINI_KEY", Some("file-key"), || {
        let config = PawfinderConfigLoader::new()
            .with_file(&p)
            .load()
            .expect("load system config");

        assert_eq!(config.version.as_deref(), Some("0.1"));
        assert_eq!(config.gemini.api_key.as_deref(), Some("file-key"));
        assert_eq!(config.gemini.timeout_secs, 45);
        assert_eq!(config.ratings.backend, RatingBackend::Sqlite);
        assert_eq!(
            config.ratings.resolved_path(),
            PathBuf::from("/tmp/pawfinder-test/ratings.db")
        );
        assert_eq!(config.location.provider, LocationProviderKind::Ip);
        assert_eq!(config.logging.format, LogFormatSetting::Json);
        assert!(config.logging.emit_stderr);
        assert_eq!(config.logging.filter, "pawfinder=debug");
    });
}

#[test]
#[serial]
fn environment_overrides_file_values() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(&tmp, "pawfinder.yaml", FILE_YAML);

    temp_env::with_vars(
        [
            ("PAWFINDER_TEST_GEMINI_KEY", Some("file-key")),
            ("PAWFINDER__GEMINI__MODEL", Some("gemini-2.5-pro")),
            ("PAWFINDER__RATINGS__BACKEND", Some("memory")),
        ],
        || {
            let config = PawfinderConfigLoader::new()
                .with_file(&p)
                .load()
                .expect("load with env overrides");

            assert_eq!(config.gemini.model, "gemini-2.5-pro");
            assert_eq!(config.ratings.backend, RatingBackend::Memory);
            assert_eq!(config.gemini.api_key.as_deref(), Some("file-key"));
        },
    );
}

#[test]
#[serial]
fn missing_optional_file_falls_back_to_defaults() {
    let tmp = TempDir::new().unwrap();
    let absent = tmp.path().join("nope.yaml");

    let config = PawfinderConfigLoader::new()
        .with_optional_file(&absent)
        .load()
        .expect("optional file may be absent");

    assert!(config.version.is_none());
    assert_eq!(config.gemini.model, "gemini-2.5-flash");
    assert_eq!(config.location.provider, LocationProviderKind::None);
}

#[test]
#[serial]
fn missing_required_file_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let absent = tmp.path().join("nope.yaml");

    assert!(PawfinderConfigLoader::new().with_file(&absent).load().is_err());
}
