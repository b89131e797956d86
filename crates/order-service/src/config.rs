//! Order Service configuration.
//!
//! Configuration is loaded from environment variables. Every field has a
//! default, so an empty environment yields a working demo service on
//! port 5000.

use crate::services::inventory::InventoryMode;
use std::collections::HashMap;
use std::env;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use thiserror::Error;

/// Default HTTP bind address, 0.0.0.0:5000.
pub const DEFAULT_BIND_ADDRESS: SocketAddr =
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 5000));

/// Default probability that a simulated dependency call fails.
pub const DEFAULT_DEPENDENCY_FAILURE_RATE: f64 = 0.1;

/// Default graceful shutdown drain period in seconds.
pub const DEFAULT_DRAIN_SECONDS: u64 = 0;

/// Order Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (default: "0.0.0.0:5000").
    pub bind_address: SocketAddr,

    /// How a successful order commits its inventory decrement.
    pub inventory_mode: InventoryMode,

    /// Probability in `[0, 1]` that a dependency call fails.
    pub dependency_failure_rate: f64,

    /// Seconds to keep serving in-flight requests after a shutdown signal.
    pub drain_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS,
            inventory_mode: InventoryMode::default(),
            dependency_failure_rate: DEFAULT_DEPENDENCY_FAILURE_RATE,
            drain_seconds: DEFAULT_DRAIN_SECONDS,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid bind address: {0}")]
    InvalidBindAddress(String),

    #[error("Invalid inventory mode: {0}")]
    InvalidInventoryMode(String),

    #[error("Invalid dependency failure rate: {0}")]
    InvalidFailureRate(String),

    #[error("Invalid drain period: {0}")]
    InvalidDrainSeconds(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let bind_address = match vars.get("BIND_ADDRESS") {
            Some(value) => value.parse::<SocketAddr>().map_err(|e| {
                ConfigError::InvalidBindAddress(format!(
                    "BIND_ADDRESS must be host:port, got '{}': {}",
                    value, e
                ))
            })?,
            None => DEFAULT_BIND_ADDRESS,
        };

        let inventory_mode = match vars.get("INVENTORY_MODE") {
            Some(value) => value.parse::<InventoryMode>().map_err(|_| {
                ConfigError::InvalidInventoryMode(format!(
                    "INVENTORY_MODE must be 'atomic' or 'unsynchronized', got '{}'",
                    value
                ))
            })?,
            None => InventoryMode::default(),
        };

        let dependency_failure_rate =
            if let Some(value_str) = vars.get("DEPENDENCY_FAILURE_RATE") {
                let value: f64 = value_str.parse().map_err(|e| {
                    ConfigError::InvalidFailureRate(format!(
                        "DEPENDENCY_FAILURE_RATE must be a number, got '{}': {}",
                        value_str, e
                    ))
                })?;

                if !(0.0..=1.0).contains(&value) {
                    return Err(ConfigError::InvalidFailureRate(format!(
                        "DEPENDENCY_FAILURE_RATE must be between 0 and 1, got {}",
                        value
                    )));
                }

                value
            } else {
                DEFAULT_DEPENDENCY_FAILURE_RATE
            };

        let drain_seconds = if let Some(value_str) = vars.get("DRAIN_SECONDS") {
            value_str.parse().map_err(|e| {
                ConfigError::InvalidDrainSeconds(format!(
                    "DRAIN_SECONDS must be a non-negative integer, got '{}': {}",
                    value_str, e
                ))
            })?
        } else {
            DEFAULT_DRAIN_SECONDS
        };

        Ok(Config {
            bind_address,
            inventory_mode,
            dependency_failure_rate,
            drain_seconds,
        })
    }
}
