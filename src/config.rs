//! # Configuration Module
//!
//! Runtime settings read from the environment (and a `.env` file, loaded by
//! the binary before anything else).

use anyhow::{bail, Context, Result};
use std::env;
use std::str::FromStr;

// Constants for configuration defaults
pub const DEFAULT_PAGE_SIZE: i64 = 12;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Output format of the log subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" | "" => Ok(LogFormat::Plain),
            "json" => Ok(LogFormat::Json),
            other => bail!("Unknown LOG_FORMAT '{}', expected plain or json", other),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// PostgreSQL connection string; only needed by the store commands
    pub database_url: Option<String>,
    /// Number of recipes per search page
    pub page_size: i64,
    /// Log output format
    pub log_format: LogFormat,
    /// Size of the database connection pool
    pub max_connections: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            page_size: DEFAULT_PAGE_SIZE,
            log_format: LogFormat::Plain,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl AppConfig {
    /// Read the configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read the configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let page_size = parse_var(&lookup, "RECIPE_PAGE_SIZE")?.unwrap_or(defaults.page_size);
        if page_size <= 0 {
            bail!("RECIPE_PAGE_SIZE must be positive, got {}", page_size);
        }

        let max_connections =
            parse_var(&lookup, "DB_MAX_CONNECTIONS")?.unwrap_or(defaults.max_connections);
        if max_connections == 0 {
            bail!("DB_MAX_CONNECTIONS must be at least 1");
        }

        Ok(Self {
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            page_size,
            log_format: parse_var(&lookup, "LOG_FORMAT")?.unwrap_or(defaults.log_format),
            max_connections,
        })
    }

    /// The database URL, for commands that cannot run without one
    pub fn require_database_url(&self) -> Result<&str> {
        self.database_url
            .as_deref()
            .context("DATABASE_URL must be set")
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("Invalid {} '{}': {}", key, raw, e)),
        None => Ok(None),
    }
}
