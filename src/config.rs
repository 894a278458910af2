//! Runtime configuration read from environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `STORAGE_MODE` | `in_memory` (`postgres` also accepted) |
//! | `DATABASE_URL` | required when `STORAGE_MODE=postgres` |
//! | `DATABASE_POOL_SIZE` | `10` |
//! | `HOST` | `0.0.0.0` |
//! | `PORT` | `8000` |
//! | `PROCESSING_DELAY_MS` | `5000` |
//!
//! Blank values are treated as unset.

use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Backing store for tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageMode {
    /// Process-local storage; contents are lost on restart.
    #[default]
    InMemory,
    /// `PostgreSQL` storage.
    Postgres,
}

impl FromStr for StorageMode {
    type Err = ConfigurationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "in_memory" | "inmemory" | "memory" => Ok(Self::InMemory),
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            _ => Err(ConfigurationError::InvalidStorageMode(value.to_owned())),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// `STORAGE_MODE` holds an unknown value.
    #[error("invalid STORAGE_MODE: {0}")]
    InvalidStorageMode(String),

    /// `DATABASE_URL` is missing while `STORAGE_MODE=postgres`.
    #[error("DATABASE_URL is required when STORAGE_MODE=postgres")]
    MissingDatabaseUrl,

    /// A numeric variable could not be parsed or is out of range.
    #[error("invalid {key}: {value}")]
    InvalidNumber {
        /// Variable name.
        key: &'static str,
        /// Offending value.
        value: String,
    },
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Selected backing store.
    pub storage_mode: StorageMode,
    /// `PostgreSQL` connection URL.
    pub database_url: Option<String>,
    /// Maximum number of pooled database connections.
    pub database_pool_size: u32,
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Duration of the simulated work performed by a background run.
    pub processing_delay: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_mode: StorageMode::default(),
            database_url: None,
            database_pool_size: Self::DEFAULT_POOL_SIZE,
            host: Self::DEFAULT_HOST.to_owned(),
            port: Self::DEFAULT_PORT,
            processing_delay: Duration::from_millis(Self::DEFAULT_PROCESSING_DELAY_MS),
        }
    }
}

impl AppConfig {
    /// Default connection pool size.
    pub const DEFAULT_POOL_SIZE: u32 = 10;
    /// Default bind host.
    pub const DEFAULT_HOST: &'static str = "0.0.0.0";
    /// Default bind port.
    pub const DEFAULT_PORT: u16 = 8000;
    /// Default simulated work duration in milliseconds.
    pub const DEFAULT_PROCESSING_DELAY_MS: u64 = 5_000;

    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] when a variable holds an invalid value
    /// or `DATABASE_URL` is missing in postgres mode.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads the configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// See [`Self::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        let storage_mode = read("STORAGE_MODE")
            .map(|value| value.parse())
            .transpose()?
            .unwrap_or(defaults.storage_mode);
        let database_url = read("DATABASE_URL");
        let database_pool_size = parse_number(read("DATABASE_POOL_SIZE"), "DATABASE_POOL_SIZE")?
            .unwrap_or(defaults.database_pool_size);
        if database_pool_size == 0 {
            return Err(ConfigurationError::InvalidNumber {
                key: "DATABASE_POOL_SIZE",
                value: "0".to_owned(),
            });
        }
        let host = read("HOST").unwrap_or(defaults.host);
        let port = parse_number(read("PORT"), "PORT")?.unwrap_or(defaults.port);
        let processing_delay = parse_number(read("PROCESSING_DELAY_MS"), "PROCESSING_DELAY_MS")?
            .map_or(defaults.processing_delay, Duration::from_millis);

        let config = Self {
            storage_mode,
            database_url,
            database_pool_size,
            host,
            port,
            processing_delay,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field requirements.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::MissingDatabaseUrl`] when postgres mode
    /// has no database URL.
    pub const fn validate(&self) -> Result<(), ConfigurationError> {
        if matches!(self.storage_mode, StorageMode::Postgres) && self.database_url.is_none() {
            return Err(ConfigurationError::MissingDatabaseUrl);
        }
        Ok(())
    }

    /// Returns the `host:port` pair to bind.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_number<T: FromStr>(
    raw: Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigurationError> {
    raw.map(|value| {
        value
            .parse()
            .map_err(|_| ConfigurationError::InvalidNumber { key, value })
    })
    .transpose()
}
