//! Process configuration, read from environment variables.
//!
//! | variable               | default          |
//! |------------------------|------------------|
//! | `TABLE_NAME`           | `products`       |
//! | `BATCH_WRITE_ITEM_MAX` | `25`             |
//! | `REGION`               | `us-east-1`      |
//! | `DATABASE_URL`         | unset (in-memory)|
//! | `LISTEN_ADDR`          | `0.0.0.0:8080`   |
//!
//! Empty values are treated as unset.

use std::net::SocketAddr;

use thiserror::Error;

pub const DEFAULT_TABLE_NAME: &str = "products";
pub const DEFAULT_BATCH_WRITE_ITEM_MAX: usize = 25;
pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a positive integer, got `{value}`")]
    InvalidBatchSize { var: &'static str, value: String },

    #[error("{var} must be a plain identifier (letters, digits, `_`), got `{value}`")]
    InvalidTableName { var: &'static str, value: String },

    #[error("{var} must be a socket address, got `{value}`")]
    InvalidListenAddr { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub table_name: String,
    pub batch_write_max: usize,
    pub region: String,
    /// Postgres connection string; the in-memory store is used when absent.
    pub database_url: Option<String>,
    pub listen_addr: SocketAddr,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|value| !value.trim().is_empty());

        let table_name = get("TABLE_NAME").unwrap_or_else(|| DEFAULT_TABLE_NAME.to_string());
        if !is_identifier(&table_name) {
            return Err(ConfigError::InvalidTableName {
                var: "TABLE_NAME",
                value: table_name,
            });
        }

        let batch_write_max = match get("BATCH_WRITE_ITEM_MAX") {
            None => DEFAULT_BATCH_WRITE_ITEM_MAX,
            Some(value) => match value.trim().parse::<usize>() {
                Ok(n) if n >= 1 => n,
                _ => {
                    return Err(ConfigError::InvalidBatchSize {
                        var: "BATCH_WRITE_ITEM_MAX",
                        value,
                    });
                }
            },
        };

        let listen_addr = get("LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr = listen_addr
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidListenAddr {
                var: "LISTEN_ADDR",
                value: listen_addr.clone(),
            })?;

        Ok(Self {
            table_name,
            batch_write_max,
            region: get("REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
            database_url: get("DATABASE_URL"),
            listen_addr,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            table_name: DEFAULT_TABLE_NAME.to_string(),
            batch_write_max: DEFAULT_BATCH_WRITE_ITEM_MAX,
            region: DEFAULT_REGION.to_string(),
            database_url: None,
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
        }
    }
}

fn is_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
