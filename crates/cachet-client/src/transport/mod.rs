//! Transport abstraction over the upstream cache connection.

mod redis;

pub use self::redis::RedisTransport;

use async_trait::async_trait;
use cachet_core::CacheResult;
use std::time::Duration;

/// Low-level operations against the upstream cache service.
///
/// One implementor speaks the real wire protocol; tests substitute fakes
/// to exercise the facade without a server. Values are opaque byte
/// sequences; serialization is the caller's concern.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheTransport: Send + Sync {
    /// Establishes (or re-establishes) the connection and verifies
    /// liveness with a handshake.
    async fn connect(&self) -> CacheResult<()>;

    /// Fetches the value stored under `key`.
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>>;

    /// Stores `value` under `key` with the given expiry.
    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> CacheResult<()>;

    /// Removes `key`. Removing an absent key is not an error.
    async fn del(&self, key: &str) -> CacheResult<()>;

    /// Probes whether `key` currently exists.
    async fn exists(&self, key: &str) -> CacheResult<bool>;

    /// Tears down the connection handle.
    async fn close(&self) -> CacheResult<()>;
}
