//! Runtime configuration read from environment variables.
//!
//! | variable | default |
//! |---|---|
//! | `HOST` | `0.0.0.0` |
//! | `PORT` | `3000` |
//! | `STORAGE_MODE` | `in_memory` (or `postgres`) |
//! | `DATABASE_URL` | required for `postgres` |
//! | `DATABASE_POOL_SIZE` | `10` |
//! | `CORS_ORIGIN` | any origin |
//! | `LOG_FORMAT` | `pretty` (or `json`) |
//! | `RUST_LOG` | [`DEFAULT_LOG_FILTER`] |

use std::env;
use std::net::{AddrParseError, SocketAddr};
use std::str::FromStr;
use thiserror::Error;

/// Log filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "taskhub=debug,tower_http=debug";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_POOL_SIZE: u32 = 10;

/// Errors raised while reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// `STORAGE_MODE` holds an unknown value.
    #[error("invalid storage mode: '{0}', expected 'in_memory' or 'postgres'")]
    InvalidStorageMode(String),
    /// `LOG_FORMAT` holds an unknown value.
    #[error("invalid log format: '{0}', expected 'pretty' or 'json'")]
    InvalidLogFormat(String),
    /// `DATABASE_URL` is missing while `STORAGE_MODE=postgres`.
    #[error("DATABASE_URL is required when STORAGE_MODE=postgres")]
    MissingDatabaseUrl,
    /// A numeric variable could not be parsed or is out of range.
    #[error("invalid value for {name}: '{value}'")]
    InvalidNumber {
        /// Variable name.
        name: &'static str,
        /// Rejected value.
        value: String,
    },
}

/// Storage backend selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageMode {
    /// Process-local map; contents are lost on restart.
    #[default]
    InMemory,
    /// `PostgreSQL` through a diesel connection pool.
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

/// Formatter used by the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable multi-field lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigurationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(ConfigurationError::InvalidLogFormat(value.to_owned())),
        }
    }
}

/// Storage settings resolved from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    /// Use [`crate::task::adapters::memory::InMemoryTaskRepository`].
    InMemory,
    /// Use [`crate::task::adapters::postgres::PostgresTaskRepository`].
    Postgres {
        /// Connection URL.
        database_url: String,
        /// Maximum number of pooled connections.
        pool_size: u32,
    },
}

/// Complete application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Host to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Storage backend.
    pub storage: StorageConfig,
    /// Allowed CORS origin; any origin when `None`.
    pub cors_origin: Option<String>,
    /// Log output format.
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] when a variable holds an invalid value
    /// or `DATABASE_URL` is missing for `PostgreSQL` storage.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads configuration through `lookup`, which returns the value of a
    /// variable or `None` when it is unset.
    ///
    /// Empty and whitespace-only values are treated as unset.
    ///
    /// # Errors
    ///
    /// See [`AppConfig::from_env`].
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigurationError> {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let host = read("HOST").unwrap_or_else(|| DEFAULT_HOST.to_owned());
        let port = parse_number(read("PORT"), "PORT", DEFAULT_PORT)?;
        let storage_mode = read("STORAGE_MODE")
            .map(|value| value.parse::<StorageMode>())
            .transpose()?
            .unwrap_or_default();
        let storage = match storage_mode {
            StorageMode::InMemory => StorageConfig::InMemory,
            StorageMode::Postgres => {
                let database_url =
                    read("DATABASE_URL").ok_or(ConfigurationError::MissingDatabaseUrl)?;
                let raw_pool_size = read("DATABASE_POOL_SIZE");
                let pool_size =
                    parse_number(raw_pool_size.clone(), "DATABASE_POOL_SIZE", DEFAULT_POOL_SIZE)?;
                if pool_size == 0 {
                    return Err(ConfigurationError::InvalidNumber {
                        name: "DATABASE_POOL_SIZE",
                        value: raw_pool_size.unwrap_or_default(),
                    });
                }
                StorageConfig::Postgres {
                    database_url,
                    pool_size,
                }
            }
        };
        let log_format = read("LOG_FORMAT")
            .map(|value| value.parse::<LogFormat>())
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            host,
            port,
            storage,
            cors_origin: read("CORS_ORIGIN"),
            log_format,
        })
    }

    /// Returns the socket address to bind.
    ///
    /// # Errors
    ///
    /// Returns [`AddrParseError`] when `host` is not an IP address.
    pub fn bind_address(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

fn parse_number<T: FromStr>(
    raw: Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigurationError> {
    raw.map_or(Ok(default), |value| {
        value
            .parse()
            .map_err(|_| ConfigurationError::InvalidNumber { name, value })
    })
}
