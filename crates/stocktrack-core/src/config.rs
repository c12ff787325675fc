//! Runtime configuration.
//!
//! Defaults match the tracker's documented behavior (1h price/info cache,
//! 5m news cache, five articles per ticker). Every value can be overridden
//! through a `STOCKTRACK_*` environment variable:
//!
//! | Variable | Default |
//! |----------|---------|
//! | `STOCKTRACK_PROVIDER_BASE_URL` | `https://query1.finance.yahoo.com` |
//! | `STOCKTRACK_TIMEOUT_MS` | `10000` |
//! | `STOCKTRACK_USER_AGENT` | `Mozilla/5.0 (compatible; stocktrack/0.1)` |
//! | `STOCKTRACK_PRICES_TTL_SECS` | `3600` |
//! | `STOCKTRACK_INFO_TTL_SECS` | `3600` |
//! | `STOCKTRACK_NEWS_TTL_SECS` | `300` |
//! | `STOCKTRACK_NEWS_LIMIT` | `5` |
//! | `STOCKTRACK_COOKIE` | unset |

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; stocktrack/0.1)";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_PRICES_TTL: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_INFO_TTL: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_NEWS_TTL: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_NEWS_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub user_agent: String,
    pub prices_ttl: Duration,
    pub info_ttl: Duration,
    pub news_ttl: Duration,
    pub news_limit: usize,
    /// Optional session cookie forwarded to the provider.
    pub cookie: Option<String>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            base_url: String::from(DEFAULT_BASE_URL),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            user_agent: String::from(DEFAULT_USER_AGENT),
            prices_ttl: DEFAULT_PRICES_TTL,
            info_ttl: DEFAULT_INFO_TTL,
            news_ttl: DEFAULT_NEWS_TTL,
            news_limit: DEFAULT_NEWS_LIMIT,
            cookie: None,
        }
    }
}

impl TrackerConfig {
    /// Read overrides from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read overrides from a dotenv-style file, ignoring the process environment.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let to_error = |message: String| ConfigError::EnvFile {
            path: path.display().to_string(),
            message,
        };

        let mut values = HashMap::new();
        for item in dotenvy::from_path_iter(path).map_err(|e| to_error(e.to_string()))? {
            let (key, value) = item.map_err(|e| to_error(e.to_string()))?;
            values.insert(key, value);
        }

        Self::from_lookup(|key| values.get(key).cloned())
    }

    /// Build a config from an arbitrary key lookup. Blank values are ignored.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get("STOCKTRACK_PROVIDER_BASE_URL") {
            let url = url.trim().trim_end_matches('/').to_owned();
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidValue {
                    key: "STOCKTRACK_PROVIDER_BASE_URL",
                    value: url,
                    reason: "expected an http(s) URL",
                });
            }
            config.base_url = url;
        }
        if let Some(value) = get("STOCKTRACK_TIMEOUT_MS") {
            config.timeout_ms = parse_positive("STOCKTRACK_TIMEOUT_MS", &value)?;
        }
        if let Some(value) = get("STOCKTRACK_USER_AGENT") {
            config.user_agent = value.trim().to_owned();
        }
        if let Some(value) = get("STOCKTRACK_PRICES_TTL_SECS") {
            config.prices_ttl = parse_secs("STOCKTRACK_PRICES_TTL_SECS", &value)?;
        }
        if let Some(value) = get("STOCKTRACK_INFO_TTL_SECS") {
            config.info_ttl = parse_secs("STOCKTRACK_INFO_TTL_SECS", &value)?;
        }
        if let Some(value) = get("STOCKTRACK_NEWS_TTL_SECS") {
            config.news_ttl = parse_secs("STOCKTRACK_NEWS_TTL_SECS", &value)?;
        }
        if let Some(value) = get("STOCKTRACK_NEWS_LIMIT") {
            config.news_limit = parse_positive("STOCKTRACK_NEWS_LIMIT", &value)? as usize;
        }
        config.cookie = get("STOCKTRACK_COOKIE");

        Ok(config)
    }
}

fn parse_positive(key: &'static str, value: &str) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(parsed) if parsed > 0 => Ok(parsed),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_owned(),
            reason: "expected a positive integer",
        }),
    }
}

/// TTLs may be zero, which disables caching for that call.
fn parse_secs(key: &'static str, value: &str) -> Result<Duration, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| ConfigError::InvalidValue {
            key,
            value: value.to_owned(),
            reason: "expected a whole number of seconds",
        })
}
