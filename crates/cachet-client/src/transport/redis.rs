//! Redis-backed transport.

use super::CacheTransport;
use async_trait::async_trait;
use cachet_config::CacheConfig;
use cachet_core::{CacheError, CacheResult};
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

/// Transport over a single multiplexed Redis connection.
///
/// The handle is cheap to clone; concurrent operations interleave over
/// the same stream with no ordering guarantee between them.
pub struct RedisTransport {
    client: Client,
    conn: RwLock<Option<MultiplexedConnection>>,
}

impl RedisTransport {
    /// Creates a transport for the configured endpoint. Does not connect.
    pub fn new(config: &CacheConfig) -> CacheResult<Self> {
        let client = Client::open(config.url())
            .map_err(|e| CacheError::configuration(format!("Invalid cache endpoint: {}", e)))?;

        Ok(Self {
            client,
            conn: RwLock::new(None),
        })
    }

    /// Returns a clone of the live connection handle.
    async fn handle(&self) -> CacheResult<MultiplexedConnection> {
        self.conn.read().await.clone().ok_or(CacheError::Disconnected)
    }
}

#[async_trait]
impl CacheTransport for RedisTransport {
    async fn connect(&self) -> CacheResult<()> {
        let conn = self.client.get_multiplexed_async_connection().await?;

        // Verify liveness before publishing the handle
        let mut ping_conn = conn.clone();
        redis::cmd("PING")
            .query_async::<String>(&mut ping_conn)
            .await?;

        *self.conn.write().await = Some(conn);
        debug!("Cache connection established");
        Ok(())
    }

    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        let mut conn = self.handle().await?;
        let value: Option<Vec<u8>> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> CacheResult<()> {
        let mut conn = self.handle().await?;
        // Sub-second expiries round up to the protocol's 1s granularity
        let ttl_secs = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(key, value, ttl_secs).await?;
        Ok(())
    }

    async fn del(&self, key: &str) -> CacheResult<()> {
        let mut conn = self.handle().await?;
        let deleted: i64 = conn.del(key).await?;
        debug!("Deleted key '{}': {}", key, deleted > 0);
        Ok(())
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        let mut conn = self.handle().await?;
        let exists: bool = conn.exists(key).await?;
        Ok(exists)
    }

    async fn close(&self) -> CacheResult<()> {
        self.conn.write().await.take();
        debug!("Cache connection handle dropped");
        Ok(())
    }
}
