//! Unified error types for the cache facade.

use thiserror::Error;

/// Result type for internal cache plumbing.
pub type CacheResult<T> = Result<T, CacheError>;

/// Errors produced while talking to the upstream cache service.
///
/// These never cross the public facade surface directly; operations fold
/// them into an `OperationResult` at the boundary.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The operation exceeded its time budget.
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// The connection failed at the transport level.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The upstream answered with something unintelligible.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// No connection handle is currently available.
    #[error("Not connected to the cache service")]
    Disconnected,

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The key failed validation.
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// The TTL failed validation.
    #[error("Invalid TTL: expiry must be positive")]
    InvalidTtl,

    /// Generic error wrapper.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CacheError {
    /// Creates a timeout error.
    #[must_use]
    pub fn timeout<T: Into<String>>(message: T) -> Self {
        Self::Timeout(message.into())
    }

    /// Creates a transport error.
    #[must_use]
    pub fn transport<T: Into<String>>(message: T) -> Self {
        Self::Transport(message.into())
    }

    /// Creates a protocol error.
    #[must_use]
    pub fn protocol<T: Into<String>>(message: T) -> Self {
        Self::Protocol(message.into())
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn configuration<T: Into<String>>(message: T) -> Self {
        Self::Configuration(message.into())
    }

    /// Checks if a caller retry could plausibly succeed.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_) | Self::Transport(_) | Self::Disconnected
        )
    }

    /// Checks if this error indicates a dead connection that the
    /// reconnect supervisor should replace.
    #[must_use]
    pub const fn should_trip_reconnect(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_) | Self::Transport(_) | Self::Disconnected
        )
    }
}

#[cfg(feature = "redis")]
impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_io_error() || err.is_connection_dropped() || err.is_connection_refusal() {
            Self::Transport(err.to_string())
        } else {
            Self::Protocol(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_constructors() {
        let timeout = CacheError::timeout("after 5s");
        assert!(timeout.to_string().contains("after 5s"));

        let transport = CacheError::transport("broken pipe");
        assert!(transport.to_string().contains("broken pipe"));

        let protocol = CacheError::protocol("unexpected reply");
        assert!(protocol.to_string().contains("unexpected reply"));

        let configuration = CacheError::configuration("bad endpoint");
        assert!(configuration.to_string().contains("bad endpoint"));
    }

    #[test]
    fn test_retriable_errors() {
        assert!(CacheError::timeout("slow").is_retriable());
        assert!(CacheError::transport("reset").is_retriable());
        assert!(CacheError::Disconnected.is_retriable());
        assert!(!CacheError::protocol("garbage").is_retriable());
        assert!(!CacheError::InvalidTtl.is_retriable());
    }

    #[test]
    fn test_reconnect_tripping_errors() {
        assert!(CacheError::transport("reset").should_trip_reconnect());
        assert!(CacheError::timeout("slow").should_trip_reconnect());
        assert!(CacheError::Disconnected.should_trip_reconnect());
        assert!(!CacheError::protocol("garbage").should_trip_reconnect());
        assert!(!CacheError::configuration("bad").should_trip_reconnect());
    }
}
