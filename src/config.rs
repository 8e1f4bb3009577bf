use std::{path::PathBuf, time::Duration};

use anyhow::Context;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn from_str_lossy(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("production") {
            Environment::Production
        } else {
            Environment::Development
        }
    }

    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub max_requests: usize,
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(15 * 60),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub public_dir: PathBuf,
    pub views_dir: PathBuf,
    pub rate_limit: RateLimitConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let defaults = RateLimitConfig::default();
        let rate_limit = RateLimitConfig {
            max_requests: parse_var("RATE_LIMIT_MAX")?.unwrap_or(defaults.max_requests),
            window: parse_var::<u64>("RATE_LIMIT_WINDOW_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.window),
        };
        Ok(Self {
            database_url,
            db_max_connections: parse_var("DB_MAX_CONNECTIONS")?.unwrap_or(10),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parse_var("PORT")?.unwrap_or(3000),
            environment: std::env::var("APP_ENV")
                .map(|v| Environment::from_str_lossy(&v))
                .unwrap_or(Environment::Development),
            public_dir: std::env::var("PUBLIC_DIR")
                .unwrap_or_else(|_| "public".into())
                .into(),
            views_dir: std::env::var("VIEWS_DIR")
                .unwrap_or_else(|_| "views".into())
                .into(),
            rate_limit,
        })
    }

    pub fn landing_page(&self) -> PathBuf {
        self.views_dir.join("index.html")
    }
}

/// Reads an optional variable; a present but malformed value is an error.
fn parse_var<T>(key: &str) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("invalid {key} value: {raw:?}")),
        Err(_) => Ok(None),
    }
}
