// src/config.rs
//! Process configuration: optional TOML file, then environment overrides.
//!
//! Lookup order for the file:
//! 1) `$AGGREGATOR_CONFIG_PATH` (must exist)
//! 2) `config/aggregator.toml`
//! 3) built-in defaults
//!
//! Credentials normally come from the environment (`.env` is loaded by the
//! binary via dotenvy). Both the upper-case names and the legacy
//! `WeatherApiKey` / `NewsApiKey` names are accepted.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ENV_CONFIG_PATH: &str = "AGGREGATOR_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/aggregator.toml";

const ENV_WEATHER_KEY: [&str; 2] = ["WEATHER_API_KEY", "WeatherApiKey"];
const ENV_NEWS_KEY: [&str; 2] = ["NEWS_API_KEY", "NewsApiKey"];
const ENV_CACHE_TTL: &str = "AGGREGATOR_CACHE_TTL_SECS";
const ENV_HTTP_TIMEOUT: &str = "AGGREGATOR_HTTP_TIMEOUT_SECS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("AGGREGATOR_CONFIG_PATH points to non-existent path {}", .0.display())]
    MissingFile(PathBuf),
    #[error("reading config from {}: {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing config {}: {}", .path.display(), .source)]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("{var} must be a non-negative integer, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },
    #[error("http timeout must be at least 1 second")]
    ZeroTimeout,
}

/// Upstream credential. Never printed by `Debug`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey(<redacted>, len={})", self.0.len())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub base_url: String,
    pub city: String,
    pub units: String,
    pub api_key: Option<ApiKey>,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openweathermap.org/data/2.5/weather".into(),
            city: "London".into(),
            units: "metric".into(),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    pub base_url: String,
    pub country: String,
    pub api_key: Option<ApiKey>,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://newsapi.org/v2/top-headlines".into(),
            country: "us".into(),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    pub base_url: String,
    pub query: String,
    pub sort: String,
    pub order: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.github.com/search/repositories".into(),
            query: "language:csharp".into(),
            sort: "stars".into(),
            order: "desc".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// TTL applied uniformly to every adapter's cache entries.
    pub cache_ttl_secs: u64,
    pub http_timeout_secs: u64,
    pub user_agent: String,
    pub weather: WeatherConfig,
    pub news: NewsConfig,
    pub github: GitHubConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 2 * 60 * 60,
            http_timeout_secs: 10,
            user_agent: "ApiAggregationService".into(),
            weather: WeatherConfig::default(),
            news: NewsConfig::default(),
            github: GitHubConfig::default(),
        }
    }
}

impl AppConfig {
    /// File (if any) + env overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut cfg = match env::var(ENV_CONFIG_PATH) {
            Ok(p) => {
                let path = PathBuf::from(p);
                if !path.exists() {
                    return Err(ConfigError::MissingFile(path));
                }
                Self::load_from_file(&path)?
            }
            Err(_) => {
                let path = Path::new(DEFAULT_CONFIG_PATH);
                if path.exists() {
                    Self::load_from_file(path)?
                } else {
                    Self::default()
                }
            }
        };
        cfg.apply_env_overrides()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a TOML file. Missing keys fall back to defaults.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut cfg: AppConfig = toml::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        cfg.drop_blank_keys();
        Ok(cfg)
    }

    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(k) = env_first(&ENV_WEATHER_KEY) {
            self.weather.api_key = Some(ApiKey::new(k));
        }
        if let Some(k) = env_first(&ENV_NEWS_KEY) {
            self.news.api_key = Some(ApiKey::new(k));
        }
        if let Some(v) = env_u64(ENV_CACHE_TTL)? {
            self.cache_ttl_secs = v;
        }
        if let Some(v) = env_u64(ENV_HTTP_TIMEOUT)? {
            self.http_timeout_secs = v;
        }
        Ok(())
    }

    /// A zero timeout would fail every upstream call; TTL 0 is allowed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Safe diagnostics: only presence and length of credentials.
    pub fn log_summary(&self) {
        tracing::info!(
            cache_ttl_secs = self.cache_ttl_secs,
            http_timeout_secs = self.http_timeout_secs,
            weather_city = %self.weather.city,
            weather_key_len = self.weather.api_key.as_ref().map_or(0, |k| k.expose().len()),
            news_country = %self.news.country,
            news_key_len = self.news.api_key.as_ref().map_or(0, |k| k.expose().len()),
            github_query = %self.github.query,
            "aggregator config loaded"
        );
    }

    fn drop_blank_keys(&mut self) {
        if self.weather.api_key.as_ref().is_some_and(ApiKey::is_blank) {
            self.weather.api_key = None;
        }
        if self.news.api_key.as_ref().is_some_and(ApiKey::is_blank) {
            self.news.api_key = None;
        }
    }
}

fn env_first(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|n| env::var(n).ok())
        .find(|v| !v.trim().is_empty())
}

fn env_u64(var: &'static str) -> Result<Option<u64>, ConfigError> {
    match env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber { var, value: raw }),
        Err(_) => Ok(None),
    }
}
