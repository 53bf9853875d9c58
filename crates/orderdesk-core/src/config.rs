use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://X/test";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub ui: UiConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

impl Config {
    pub fn from_toml_str(text: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })
    }

    /// A missing file is not an error; defaults apply.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.display().to_string(),
                    source,
                })
            }
        };
        Self::from_toml_str(&text, &path.display().to_string())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SourceConfig {
    pub base_url: String,
    pub orders_path: String,
    pub submit_path: String,
    pub use_fixture: bool,
    /// `None` or `0` disables polling.
    pub poll_interval_secs: Option<u64>,
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            orders_path: "/orders".to_string(),
            submit_path: "/add-order".to_string(),
            use_fixture: true,
            poll_interval_secs: Some(30),
            timeout_secs: 10,
        }
    }
}

impl SourceConfig {
    pub fn orders_url(&self) -> String {
        join_url(&self.base_url, &self.orders_path)
    }

    pub fn submit_url(&self) -> String {
        join_url(&self.base_url, &self.submit_path)
    }

    pub fn poll_interval(&self) -> Option<Duration> {
        if self.use_fixture {
            return None;
        }
        self.poll_interval_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

fn join_url(base: &str, path: &str) -> String {
    if path.is_empty() {
        return base.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum UiTheme {
    #[default]
    Classic,
    Contrast,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct UiConfig {
    pub theme: UiTheme,
    pub show_logs: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: UiTheme::Classic,
            show_logs: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_file_overrides_only_named_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[source]\nbase_url = \"http://localhost:8080/api/\"\nuse_fixture = false\n\n[ui]\ntheme = \"contrast\""
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.source.orders_url(), "http://localhost:8080/api/orders");
        assert_eq!(config.source.timeout_secs, 10);
        assert_eq!(config.source.poll_interval(), Some(Duration::from_secs(30)));
        assert_eq!(config.ui.theme, UiTheme::Contrast);
    }

    #[test]
    fn fixture_mode_never_polls() {
        let source = SourceConfig::default();
        assert!(source.use_fixture);
        assert_eq!(source.poll_interval(), None);
    }

    #[test]
    fn zero_interval_disables_polling() {
        let source = SourceConfig {
            use_fixture: false,
            poll_interval_secs: Some(0),
            ..SourceConfig::default()
        };
        assert_eq!(source.poll_interval(), None);
    }

    #[test]
    fn malformed_toml_is_reported() {
        let err = Config::from_toml_str("[source\nbase_url = 1", "inline").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
