// src/config/app.rs
//! Service configuration (TOML): rate limiting, search API access, analytics defaults.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use super::resolve_env_placeholder;

pub const DEFAULT_APP_CONFIG_PATH: &str = "config/analyzer.toml";
pub const ENV_APP_CONFIG_PATH: &str = "ANALYZER_CONFIG_PATH";
pub const ENV_NEWSAPI_KEY: &str = "NEWSAPI_KEY";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub newsapi: NewsApiConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Max requests per client within one window.
    #[serde(default = "default_rate_limit")]
    pub rate_limit: u32,
    #[serde(default = "default_rate_limit_window_secs")]
    pub rate_limit_window_secs: u64,
}

fn default_rate_limit() -> u32 {
    10
}
fn default_rate_limit_window_secs() -> u64 {
    60
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            rate_limit: default_rate_limit(),
            rate_limit_window_secs: default_rate_limit_window_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewsApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// "ENV" means: read from NEWSAPI_KEY
    #[serde(default = "default_api_key")]
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://newsapi.org/v2/everything".to_string()
}
fn default_api_key() -> String {
    "ENV".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}

impl Default for NewsApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: default_api_key(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl NewsApiConfig {
    /// The usable key; empty when the placeholder cannot be resolved.
    pub fn resolved_api_key(&self) -> String {
        resolve_env_placeholder(&self.api_key, ENV_NEWSAPI_KEY).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct AnalyticsConfig {
    #[serde(default = "default_top_topics")]
    pub default_top_topics: usize,
    #[serde(default = "default_related")]
    pub default_related: usize,
}

fn default_top_topics() -> usize {
    5
}
fn default_related() -> usize {
    3
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            default_top_topics: default_top_topics(),
            default_related: default_related(),
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: AppConfig = toml::from_str(s).context("parsing analyzer config toml")?;
        Ok(cfg.sanitized())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading analyzer config from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Load using env var + fallbacks:
    /// 1) $ANALYZER_CONFIG_PATH (must exist)
    /// 2) config/analyzer.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_APP_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_APP_CONFIG_PATH} points to non-existent path"));
            }
            return Self::load_from(&pb);
        }
        let default = PathBuf::from(DEFAULT_APP_CONFIG_PATH);
        if default.exists() {
            return Self::load_from(&default);
        }
        Ok(Self::default())
    }

    fn sanitized(mut self) -> Self {
        // A zero window would never reset a client.
        if self.server.rate_limit_window_secs == 0 {
            self.server.rate_limit_window_secs = default_rate_limit_window_secs();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let cfg = AppConfig::from_toml_str(
            r#"
[server]
rate_limit = 3

[analytics]
default_related = 7
"#,
        )
        .unwrap();
        assert_eq!(cfg.server.rate_limit, 3);
        assert_eq!(cfg.server.rate_limit_window_secs, 60);
        assert_eq!(cfg.analytics.default_top_topics, 5);
        assert_eq!(cfg.analytics.default_related, 7);
        assert_eq!(cfg.newsapi.base_url, "https://newsapi.org/v2/everything");
    }

    #[test]
    fn zero_window_is_replaced() {
        let cfg = AppConfig::from_toml_str("[server]\nrate_limit_window_secs = 0\n").unwrap();
        assert_eq!(cfg.server.rate_limit_window_secs, 60);
    }

    #[test]
    fn literal_api_key_is_kept() {
        let cfg = AppConfig::from_toml_str("[newsapi]\napi_key = \"abc\"\n").unwrap();
        assert_eq!(cfg.newsapi.resolved_api_key(), "abc");
    }
}
