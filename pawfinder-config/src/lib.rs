//! Loader for Pawfinder configuration with YAML + environment overlays.
//!
//! Sources are merged in this order, later ones winning:
//!
//! 1. an optional or required YAML/TOML/JSON file (`pawfinder.yaml` by default)
//! 2. inline YAML snippets (used by tests and the CLI)
//! 3. `PAWFINDER__`-prefixed environment variables, e.g.
//!    `PAWFINDER__GEMINI__API_KEY`
//!
//! After merging, `${VAR}` placeholders inside string values are expanded from
//! the process environment. Every section has defaults, so an empty document
//! is a valid configuration.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/";

#[derive(Debug, Default, Deserialize)]
pub struct PawfinderConfig {
    pub version: Option<String>,
    #[serde(default)]
    pub gemini: GeminiSettings,
    #[serde(default)]
    pub ratings: RatingSettings,
    #[serde(default)]
    pub location: LocationSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Connection details for the Gemini `generateContent` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiSettings {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_gemini_model")]
    pub model: String,
    #[serde(default = "default_gemini_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_gemini_model(),
            endpoint: default_gemini_endpoint(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RatingBackend {
    Memory,
    #[default]
    Sqlite,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RatingSettings {
    #[serde(default)]
    pub backend: RatingBackend,
    #[serde(default = "default_ratings_path")]
    pub path: String,
}

impl Default for RatingSettings {
    fn default() -> Self {
        Self {
            backend: RatingBackend::default(),
            path: default_ratings_path(),
        }
    }
}

impl RatingSettings {
    /// The database path with `~` expanded.
    pub fn resolved_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.path).into_owned())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationProviderKind {
    #[default]
    None,
    Fixed,
    Ip,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationSettings {
    #[serde(default)]
    pub provider: LocationProviderKind,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormatSetting {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default)]
    pub format: LogFormatSetting,
    #[serde(default)]
    pub emit_stderr: bool,
    #[serde(default = "default_log_filter")]
    pub filter: String,
    #[serde(default)]
    pub dir: Option<String>,
}

impl LoggingSettings {
    /// The log directory with `~` expanded, if one is configured.
    pub fn resolved_dir(&self) -> Option<PathBuf> {
        self.dir
            .as_deref()
            .map(|d| PathBuf::from(shellexpand::tilde(d).into_owned()))
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            format: LogFormatSetting::default(),
            emit_stderr: false,
            filter: default_log_filter(),
            dir: None,
        }
    }
}

fn default_gemini_model() -> String {
    DEFAULT_GEMINI_MODEL.into()
}
fn default_gemini_endpoint() -> String {
    DEFAULT_GEMINI_ENDPOINT.into()
}
fn default_timeout_secs() -> u64 {
    60
}
fn default_connect_timeout_secs() -> u64 {
    10
}
fn default_log_filter() -> String {
    "info".into()
}
fn default_ratings_path() -> String {
    dirs::data_local_dir()
        .map(|d| d.join("pawfinder").join("ratings.db"))
        .unwrap_or_else(|| PathBuf::from("ratings.db"))
        .to_string_lossy()
        .into_owned()
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct PawfinderConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
    env_prefix: &'static str,
}

impl Default for PawfinderConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl PawfinderConfigLoader {
    /// Start empty; `PAWFINDER__` env overrides are layered last in [`load`](Self::load).
    ///
    /// ```
    /// use pawfinder_config::PawfinderConfigLoader;
    ///
    /// let config = PawfinderConfigLoader::new()
    ///     .with_yaml_str("version: '1'")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.version.as_deref(), Some("1"));
    /// assert_eq!(config.gemini.model, "gemini-2.5-flash");
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
            env_prefix: "PAWFINDER",
        }
    }

    /// Attach a YAML/TOML/JSON file that must exist; format is inferred by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that may be absent, so env-only deployments still load.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    ///
    /// ```
    /// use pawfinder_config::{LocationProviderKind, PawfinderConfigLoader, RatingBackend};
    ///
    /// let cfg = PawfinderConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// ratings:
    ///   backend: memory
    /// location:
    ///   provider: fixed
    ///   latitude: 51.5072
    ///   longitude: -0.1276
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.ratings.backend, RatingBackend::Memory);
    /// assert_eq!(cfg.location.provider, LocationProviderKind::Fixed);
    /// assert_eq!(cfg.location.latitude, Some(51.5072));
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly typed config.
    ///
    /// `${VAR}` placeholders are expanded before the typed structs are built.
    ///
    /// ```
    /// use pawfinder_config::PawfinderConfigLoader;
    ///
    /// unsafe { std::env::set_var("DOCTEST_GEMINI_KEY", "injected-from-env"); }
    ///
    /// let config = PawfinderConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// gemini:
    ///   api_key: "${DOCTEST_GEMINI_KEY}"
    ///   timeout_secs: 30
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.gemini.api_key.as_deref(), Some("injected-from-env"));
    /// assert_eq!(config.gemini.timeout_secs, 30);
    /// assert_eq!(config.gemini.connect_timeout_secs, 10);
    ///
    /// unsafe { std::env::remove_var("DOCTEST_GEMINI_KEY"); }
    /// ```
    pub fn load(self) -> Result<PawfinderConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix(self.env_prefix)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: PawfinderConfig =
            serde_json::from_value(v).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        Ok(typed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use serial_test::serial;

    #[test]
    fn expands_simple_string() {
        temp_env::with_var("PAW_FOO", Some("bar"), || {
            let mut v = json!("prefix-${PAW_FOO}-suffix");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("prefix-bar-suffix"));
        });
    }

    #[test]
    fn expands_in_array_and_object() {
        temp_env::with_vars(
            [("PAW_CITY", Some("Hobart")), ("PAW_STATE", Some("TAS"))],
            || {
                let mut v = json!([
                    "hello-$PAW_CITY",
                    { "loc": "${PAW_CITY}-${PAW_STATE}" },
                    42,
                    true,
                    null
                ]);
                expand_env_in_value(&mut v);
                assert_eq!(
                    v,
                    json!(["hello-Hobart", { "loc": "Hobart-TAS" }, 42, true, null])
                );
            },
        );
    }

    #[test]
    fn expands_recursively_across_env_values() {
        temp_env::with_vars(
            [
                ("PAW_BAZ", Some("qux")),
                ("PAW_BAR", Some("mid-${PAW_BAZ}")),
                ("PAW_TOP", Some("start-${PAW_BAR}-end")),
            ],
            || {
                let mut v = json!("X=${PAW_TOP}");
                expand_env_in_value(&mut v);
                assert_eq!(v, json!("X=start-mid-qux-end"));
            },
        );
    }

    #[test]
    fn stops_on_cycles() {
        temp_env::with_vars([("PAW_A", Some("${PAW_B}")), ("PAW_B", Some("${PAW_A}"))], || {
            let mut v = json!("x=${PAW_A}-y");
            expand_env_in_value(&mut v);
            let s = v.as_str().unwrap();
            assert!(s.starts_with("x=") && s.ends_with("-y"));
            assert!(s.contains("${"));
        });
    }

    #[test]
    fn unknown_vars_are_left_as_is() {
        let mut v = json!("hi-${PAW_DOES_NOT_EXIST}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("hi-${PAW_DOES_NOT_EXIST}"));
    }

    #[test]
    #[serial]
    fn empty_document_yields_defaults() {
        let cfg = PawfinderConfigLoader::new().with_yaml_str("{}").load().unwrap();
        assert!(cfg.gemini.api_key.is_none());
        assert_eq!(cfg.gemini.endpoint, DEFAULT_GEMINI_ENDPOINT);
        assert_eq!(cfg.ratings.backend, RatingBackend::Sqlite);
        assert!(cfg.ratings.path.ends_with("ratings.db"));
        assert_eq!(cfg.location.provider, LocationProviderKind::None);
        assert_eq!(cfg.logging.format, LogFormatSetting::Text);
        assert_eq!(cfg.logging.filter, "info");
    }

    #[test]
    fn tilde_in_ratings_path_is_expanded() {
        let settings = RatingSettings {
            backend: RatingBackend::Sqlite,
            path: "~/ratings.db".into(),
        };
        assert!(!settings.resolved_path().to_string_lossy().starts_with('~'));
    }

    #[test]
    fn log_dir_is_optional_and_expanded() {
        assert!(LoggingSettings::default().resolved_dir().is_none());
        let settings = LoggingSettings {
            dir: Some("~/logs".into()),
            ..Default::default()
        };
        let dir = settings.resolved_dir().unwrap();
        assert!(dir.ends_with("logs"));
        assert!(!dir.to_string_lossy().starts_with('~'));
    }
}
