//! Configuration for the collaboration server.
//!
//! Defaults can be overridden via a few environment variables:
//!
//! - `COLLAB_BIND_ADDR`              (default: "127.0.0.1")
//! - `COLLAB_PORT`                   (default: "8000")
//! - `COLLAB_MAX_CLIENTS`            (default: "1024")
//! - `COLLAB_ACTIVITY_LOG_CAPACITY`  (default: "1000")

use std::env;
use std::fmt::Display;
use std::str::FromStr;

use collab_core::DEFAULT_ACTIVITY_CAPACITY;
use thiserror::Error;
use tokio::sync::Semaphore;

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// IP address / interface to bind to (e.g. "0.0.0.0" or "127.0.0.1").
    pub bind_addr: String,

    /// TCP port to listen on.
    pub port: u16,

    /// Maximum number of simultaneously connected clients.
    pub max_clients: usize,

    /// How many activity-log entries are kept before the oldest is evicted.
    pub activity_log_capacity: usize,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind_addr: "127.0.0.1".to_string(),
            port: 8000,
            max_clients: 1024,
            activity_log_capacity: DEFAULT_ACTIVITY_CAPACITY,
        }
    }
}

impl Config {
    /// Construct a `Config` from environment variables, falling back
    /// to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Config::from_env`], reading values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let max_clients = read_or_default(&lookup, "COLLAB_MAX_CLIENTS", defaults.max_clients)?;
        // One semaphore permit per connection.
        if max_clients == 0 || max_clients > Semaphore::MAX_PERMITS {
            return Err(ConfigError::Invalid {
                key: "COLLAB_MAX_CLIENTS",
                value: max_clients.to_string(),
                reason: format!("must be between 1 and {}", Semaphore::MAX_PERMITS),
            });
        }

        Ok(Config {
            bind_addr: lookup("COLLAB_BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: read_or_default(&lookup, "COLLAB_PORT", defaults.port)?,
            max_clients,
            activity_log_capacity: read_or_default(
                &lookup,
                "COLLAB_ACTIVITY_LOG_CAPACITY",
                defaults.activity_log_capacity,
            )?,
        })
    }

    /// Convenience: `addr:port` socket string.
    pub fn socket_addr_string(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

fn read_or_default<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(val) => val.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
            key,
            value: val.clone(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
