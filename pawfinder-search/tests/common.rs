use std::sync::OnceLock;

use pawfinder_common::observability::{LogConfig, LogFormat};

static INIT_PATH: OnceLock<std::path::PathBuf> = OnceLock::new();

pub fn init_test_tracing() {
    let _ = INIT_PATH.get_or_init(|| {
        let config = LogConfig {
            app_name: "pawfinder-tests",
            emit_stderr: true,
            format: if std::env::var("PAWFINDER_LOG_FORMAT")
                .map(|raw| raw.trim().eq_ignore_ascii_case("json"))
                .unwrap_or(false)
            {
                LogFormat::Json
            } else {
                LogFormat::Text
            },
            log_dir: Some(std::env::temp_dir().join("pawfinder-tests")),
            default_filter: "debug".to_string(),
        };

        pawfinder_common::observability::init_logging(config).unwrap_or_default()
    });
}
