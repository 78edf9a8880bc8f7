//! Outcome type returned by every facade operation.

use crate::CacheError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why an attempted operation failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    /// The operation exceeded its time budget. The upstream may still have
    /// applied the request.
    Timeout,
    /// The connection broke mid-operation.
    Transport(String),
    /// The upstream answered with something unintelligible.
    Protocol(String),
    /// The key was empty.
    InvalidKey,
    /// The TTL was not positive.
    InvalidTtl,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "operation timed out"),
            Self::Transport(detail) => write!(f, "transport error: {}", detail),
            Self::Protocol(detail) => write!(f, "protocol error: {}", detail),
            Self::InvalidKey => write!(f, "key must be non-empty"),
            Self::InvalidTtl => write!(f, "TTL must be positive"),
        }
    }
}

impl From<CacheError> for FailureReason {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::Timeout(_) => Self::Timeout,
            CacheError::Transport(detail) => Self::Transport(detail),
            CacheError::Protocol(detail) => Self::Protocol(detail),
            CacheError::Disconnected => Self::Transport("connection lost".to_string()),
            CacheError::Configuration(detail) => Self::Protocol(detail),
            CacheError::InvalidKey(_) => Self::InvalidKey,
            CacheError::InvalidTtl => Self::InvalidTtl,
            CacheError::Other(err) => Self::Transport(err.to_string()),
        }
    }
}

/// Result of a single facade operation.
///
/// Every public operation returns one of these; no error or panic crosses
/// the facade boundary. `NotFound` is a valid answer, not a failure, and
/// `Unavailable` means the operation was never attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum OperationResult<T> {
    /// The operation succeeded.
    Ok(T),
    /// The key does not exist upstream.
    NotFound,
    /// No live connection; nothing was sent to the upstream.
    Unavailable,
    /// The operation was attempted and failed.
    Failed(FailureReason),
}

impl<T> OperationResult<T> {
    /// Returns `true` if the operation succeeded.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    /// Returns `true` if the key was absent upstream.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// Returns `true` if no connection was available.
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable)
    }

    /// Converts into `Some(value)` on success, `None` otherwise.
    pub fn ok(self) -> Option<T> {
        match self {
            Self::Ok(value) => Some(value),
            _ => None,
        }
    }

    /// Maps the success value, preserving every other outcome.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> OperationResult<U> {
        match self {
            Self::Ok(value) => OperationResult::Ok(f(value)),
            Self::NotFound => OperationResult::NotFound,
            Self::Unavailable => OperationResult::Unavailable,
            Self::Failed(reason) => OperationResult::Failed(reason),
        }
    }

    /// Chains a fallible transformation of the success value.
    pub fn and_then<U, F: FnOnce(T) -> OperationResult<U>>(self, f: F) -> OperationResult<U> {
        match self {
            Self::Ok(value) => f(value),
            Self::NotFound => OperationResult::NotFound,
            Self::Unavailable => OperationResult::Unavailable,
            Self::Failed(reason) => OperationResult::Failed(reason),
        }
    }
}

impl<T> From<CacheError> for OperationResult<T> {
    fn from(err: CacheError) -> Self {
        Self::Failed(FailureReason::from(err))
    }
}
