use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::models::SummaryField;

/// Environment variable that overrides `api.base_url`.
pub const API_URL_ENV: &str = "MITI_API_URL";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub summary: SummaryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            token: None,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

impl ApiConfig {
    /// Request timeout; `timeout_secs = 0` disables it.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SummaryConfig {
    #[serde(default = "default_field")]
    pub field: String,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// Curated descriptions keyed by value name; merged over the built-in ones.
    #[serde(default)]
    pub descriptions: BTreeMap<String, String>,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            field: default_field(),
            top_n: default_top_n(),
            descriptions: BTreeMap::new(),
        }
    }
}

fn default_field() -> String {
    "material".to_string()
}
fn default_top_n() -> usize {
    3
}

impl Config {
    /// Defaults used when no config file exists.
    pub fn minimal() -> Self {
        Self::default()
    }

    /// Apply environment overrides. `lookup` is normally `std::env::var`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(API_URL_ENV).filter(|u| !u.trim().is_empty()) {
            debug!(base_url = %url, "{} overrides api.base_url", API_URL_ENV);
            self.api.base_url = url.trim().to_string();
        }
    }

    pub fn summary_field(&self) -> Result<SummaryField> {
        self.summary.field.parse()
    }

    fn validate(&self) -> Result<()> {
        let base = self.api.base_url.as_str();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            anyhow::bail!("api.base_url must start with http:// or https://, got '{}'", base);
        }

        if self.summary.top_n == 0 {
            anyhow::bail!("summary.top_n must be >= 1");
        }

        self.summary_field()?;
        Ok(())
    }
}

/// Load the configuration file, apply `MITI_API_URL`, and validate.
///
/// A missing file is not an error: [`Config::minimal`] is used instead.
pub fn load_config(path: &Path) -> Result<Config> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

pub fn load_config_with_env<F>(path: &Path, lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content).with_context(|| "Failed to parse config file")?
    } else {
        debug!(path = %path.display(), "config file not found, using defaults");
        Config::minimal()
    };

    config.apply_env(lookup);
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let cfg = load_config_with_env(&tmp.path().join("absent.toml"), no_env).unwrap();
        assert_eq!(cfg.api.base_url, "http://localhost:8080");
        assert_eq!(cfg.api.timeout(), Some(Duration::from_secs(30)));
        assert_eq!(cfg.summary.top_n, 3);
        assert_eq!(cfg.summary_field().unwrap(), SummaryField::Material);
    }

    #[test]
    fn test_parse_full_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("mtb.toml");
        fs::write(
            &path,
            r#"[api]
base_url = "https://api.mititibeb.example"
timeout_secs = 0
token = "secret"

[summary]
field = "category"
top_n = 5

[summary.descriptions]
Oak = "Sturdy and timeless."
"#,
        )
        .unwrap();

        let cfg = load_config_with_env(&path, no_env).unwrap();
        assert_eq!(cfg.api.base_url, "https://api.mititibeb.example");
        assert_eq!(cfg.api.timeout(), None);
        assert_eq!(cfg.api.token.as_deref(), Some("secret"));
        assert_eq!(cfg.summary_field().unwrap(), SummaryField::Category);
        assert_eq!(cfg.summary.top_n, 5);
        assert_eq!(
            cfg.summary.descriptions.get("Oak").map(String::as_str),
            Some("Sturdy and timeless.")
        );
    }

    #[test]
    fn test_env_overrides_base_url() {
        let tmp = TempDir::new().unwrap();
        let cfg = load_config_with_env(&tmp.path().join("absent.toml"), |key| {
            (key == API_URL_ENV).then(|| "http://10.0.0.5:9000 ".to_string())
        })
        .unwrap();
        assert_eq!(cfg.api.base_url, "http://10.0.0.5:9000");
    }

    #[test]
    fn test_rejects_zero_top_n() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("mtb.toml");
        fs::write(&path, "[summary]\ntop_n = 0\n").unwrap();
        let err = load_config_with_env(&path, no_env).unwrap_err();
        assert!(err.to_string().contains("top_n"));
    }

    #[test]
    fn test_rejects_unknown_field_and_bad_url() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("mtb.toml");
        fs::write(&path, "[summary]\nfield = \"colour\"\n").unwrap();
        assert!(load_config_with_env(&path, no_env).is_err());

        fs::write(&path, "[api]\nbase_url = \"localhost:8080\"\n").unwrap();
        assert!(load_config_with_env(&path, no_env).is_err());
    }

    #[test]
    fn test_malformed_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("mtb.toml");
        fs::write(&path, "[api\nbase_url = ").unwrap();
        assert!(load_config_with_env(&path, no_env).is_err());
    }
}
