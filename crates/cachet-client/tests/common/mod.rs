//! Shared fake transports for facade tests.

use async_trait::async_trait;
use cachet_client::CacheTransport;
use cachet_core::{CacheError, CacheResult};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::{Duration, Instant};

/// In-memory transport mimicking upstream key/value + TTL semantics,
/// with switchable fault injection.
#[derive(Default)]
pub struct InMemoryTransport {
    entries: Mutex<HashMap<String, (Vec<u8>, Instant)>>,
    connects: AtomicU32,
    op_calls: AtomicU32,
    fail_connects_remaining: AtomicU32,
    fail_ops: AtomicBool,
    op_delay: Mutex<Option<Duration>>,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `n` handshakes fail with a transport error.
    pub fn fail_next_connects(&self, n: u32) {
        self.fail_connects_remaining.store(n, Ordering::SeqCst);
    }

    /// Switches operation-level transport failures on or off.
    pub fn fail_ops(&self, fail: bool) {
        self.fail_ops.store(fail, Ordering::SeqCst);
    }

    /// Delays every operation by `delay` (None to clear).
    pub fn set_op_delay(&self, delay: Option<Duration>) {
        *self.op_delay.lock() = delay;
    }

    /// Number of completed handshake attempts.
    pub fn connect_count(&self) -> u32 {
        self.connects.load(Ordering::SeqCst)
    }

    /// Number of get/set/del/exists calls that reached the transport.
    pub fn op_call_count(&self) -> u32 {
        self.op_calls.load(Ordering::SeqCst)
    }

    async fn enter_op(&self) -> CacheResult<()> {
        self.op_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.op_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_ops.load(Ordering::SeqCst) {
            return Err(CacheError::transport("broken pipe"));
        }
        Ok(())
    }
}

#[async_trait]
impl CacheTransport for InMemoryTransport {
    async fn connect(&self) -> CacheResult<()> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        let remaining = self.fail_connects_remaining.load(Ordering::SeqCst);
        if remaining > 0 {
            if remaining != u32::MAX {
                self.fail_connects_remaining
                    .store(remaining - 1, Ordering::SeqCst);
            }
            return Err(CacheError::transport("connection refused"));
        }
        Ok(())
    }

    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        self.enter_op().await?;
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some((value, expiry)) if *expiry > Instant::now() => Ok(Some(value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> CacheResult<()> {
        self.enter_op().await?;
        self.entries
            .lock()
            .insert(key.to_string(), (value.to_vec(), Instant::now() + ttl));
        Ok(())
    }

    async fn del(&self, key: &str) -> CacheResult<()> {
        self.enter_op().await?;
        self.entries.lock().remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        self.enter_op().await?;
        let entries = self.entries.lock();
        Ok(matches!(entries.get(key), Some((_, expiry)) if *expiry > Instant::now()))
    }

    async fn close(&self) -> CacheResult<()> {
        Ok(())
    }
}
