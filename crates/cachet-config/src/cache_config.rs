//! Cache facade configuration structures.

use cachet_core::{CacheError, CacheResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the cache facade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache server host.
    pub host: String,
    /// Cache server port.
    pub port: u16,
    /// Optional password for AUTH.
    pub password: Option<String>,
    /// Logical database index.
    pub database: u32,
    /// Enable the cache (can be disabled for local development).
    pub enabled: bool,
    /// Handshake timeout in milliseconds.
    pub connect_timeout_ms: u64,
    /// Per-operation timeout in milliseconds.
    pub op_timeout_ms: u64,
    /// Reconnect backoff configuration.
    #[serde(default)]
    pub reconnect: ReconnectConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 6379,
            password: None,
            database: 0,
            enabled: true,
            connect_timeout_ms: 5_000,
            op_timeout_ms: 5_000,
            reconnect: ReconnectConfig::default(),
        }
    }
}

impl CacheConfig {
    /// Returns the connection URL for the configured endpoint.
    #[must_use]
    pub fn url(&self) -> String {
        match &self.password {
            Some(password) => format!(
                "redis://:{}@{}:{}/{}",
                password, self.host, self.port, self.database
            ),
            None => format!("redis://{}:{}/{}", self.host, self.port, self.database),
        }
    }

    /// Returns the handshake timeout as a Duration.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Returns the per-operation timeout as a Duration.
    #[must_use]
    pub const fn op_timeout(&self) -> Duration {
        Duration::from_millis(self.op_timeout_ms)
    }

    /// Validates the configuration, failing fast on values that would
    /// only surface as confusing runtime behavior.
    pub fn validate(&self) -> CacheResult<()> {
        if self.host.is_empty() {
            return Err(CacheError::configuration("Cache host is required"));
        }
        if self.port == 0 {
            return Err(CacheError::configuration("Cache port must be non-zero"));
        }
        if self.connect_timeout_ms == 0 {
            return Err(CacheError::configuration(
                "Connect timeout must be positive",
            ));
        }
        if self.op_timeout_ms == 0 {
            return Err(CacheError::configuration(
                "Operation timeout must be positive",
            ));
        }
        self.reconnect.validate()
    }
}

/// Reconnect backoff configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconnectConfig {
    /// Delay before the first retry in milliseconds.
    pub initial_delay_ms: u64,
    /// Ceiling on the delay between retries in milliseconds.
    pub max_delay_ms: u64,
    /// Multiplier for exponential backoff.
    pub multiplier: f64,
    /// Whether to add jitter to delays.
    pub jitter: bool,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: 500,
            max_delay_ms: 30_000,
            multiplier: 2.0,
            jitter: true,
        }
    }
}

impl ReconnectConfig {
    /// Returns the initial delay as a Duration.
    #[must_use]
    pub const fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    /// Returns the maximum delay as a Duration.
    #[must_use]
    pub const fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    fn validate(&self) -> CacheResult<()> {
        if self.initial_delay_ms == 0 {
            return Err(CacheError::configuration(
                "Reconnect initial delay must be positive",
            ));
        }
        if self.initial_delay_ms > self.max_delay_ms {
            return Err(CacheError::configuration(
                "Reconnect initial delay cannot exceed the maximum delay",
            ));
        }
        if self.multiplier <= 1.0 {
            return Err(CacheError::configuration(
                "Reconnect multiplier must be greater than 1.0",
            ));
        }
        Ok(())
    }
}
