//! The cache facade: uniform, non-throwing access to one upstream cache.

use crate::backoff::ReconnectPolicy;
use crate::metrics;
use crate::state::{ConnectionState, StateCell};
use crate::transport::{CacheTransport, RedisTransport};
use cachet_config::CacheConfig;
use cachet_core::{CacheError, CacheResult, FailureReason, OperationResult};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Tunables for a facade instance.
#[derive(Debug, Clone)]
pub struct FacadeOptions {
    /// Bound on the initial handshake and every reconnect handshake.
    pub connect_timeout: Duration,
    /// Bound on every get/set/del/exists round trip.
    pub op_timeout: Duration,
    /// Backoff schedule between reconnect attempts.
    pub reconnect: ReconnectPolicy,
}

impl Default for FacadeOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            op_timeout: Duration::from_secs(5),
            reconnect: ReconnectPolicy::default(),
        }
    }
}

impl FacadeOptions {
    /// Derives options from a cache configuration.
    #[must_use]
    pub fn from_config(config: &CacheConfig) -> Self {
        Self {
            connect_timeout: config.connect_timeout(),
            op_timeout: config.op_timeout(),
            reconnect: ReconnectPolicy::from(&config.reconnect),
        }
    }
}

struct Shared {
    transport: Arc<dyn CacheTransport>,
    state: StateCell,
    options: FacadeOptions,
    shutdown: AtomicBool,
    shutdown_signal: Notify,
}

/// Facade over one logical connection to an external cache service.
///
/// Construct once at process start, share via `Arc`, and [`close`] at
/// shutdown. Connecting happens in the background from the moment of
/// construction; every operation returns an [`OperationResult`] and no
/// call blocks past the configured operation timeout, connected or not.
///
/// Concurrent operations may interleave over the shared connection in any
/// order; callers needing read-after-write ordering on a key must
/// serialize themselves.
///
/// [`close`]: CacheFacade::close
pub struct CacheFacade {
    shared: Arc<Shared>,
    supervisor: Mutex<Option<JoinHandle<()>>>,
}

impl CacheFacade {
    /// Creates a facade over `transport` and starts connecting in the
    /// background. Must be called within a Tokio runtime.
    pub fn new(transport: Arc<dyn CacheTransport>, options: FacadeOptions) -> Self {
        let shared = Arc::new(Shared {
            transport,
            state: StateCell::new(),
            options,
            shutdown: AtomicBool::new(false),
            shutdown_signal: Notify::new(),
        });

        let supervisor = tokio::spawn(run_supervisor(Arc::clone(&shared)));

        Self {
            shared,
            supervisor: Mutex::new(Some(supervisor)),
        }
    }

    /// Creates a facade speaking to the endpoint in `config`.
    ///
    /// With `enabled = false` no connection is ever attempted and every
    /// operation answers `Unavailable`.
    pub fn with_config(config: &CacheConfig) -> CacheResult<Self> {
        config.validate()?;
        let transport: Arc<dyn CacheTransport> = Arc::new(RedisTransport::new(config)?);
        let options = FacadeOptions::from_config(config);

        if config.enabled {
            Ok(Self::new(transport, options))
        } else {
            info!("Cache is disabled; facade will answer Unavailable");
            Ok(Self {
                shared: Arc::new(Shared {
                    transport,
                    state: StateCell::new(),
                    options,
                    shutdown: AtomicBool::new(true),
                    shutdown_signal: Notify::new(),
                }),
                supervisor: Mutex::new(None),
            })
        }
    }

    /// Returns `true` iff the connection is live right now.
    ///
    /// The answer is eventually consistent: a failure may land immediately
    /// after it is read.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.shared.state.get() == ConnectionState::Connected
    }

    /// Returns the current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.shared.state.get()
    }

    /// Waits until the connection is live, up to `timeout`. Returns
    /// whether the connection came up in time.
    pub async fn wait_connected(&self, timeout: Duration) -> bool {
        tokio::time::timeout(
            timeout,
            self.shared.state.wait_for(ConnectionState::Connected),
        )
        .await
        .is_ok()
    }

    /// Fetches the value stored under `key`.
    pub async fn get(&self, key: &str) -> OperationResult<Vec<u8>> {
        if key.is_empty() {
            metrics::record_operation("get", "invalid");
            return OperationResult::Failed(FailureReason::InvalidKey);
        }
        if !self.is_alive() {
            metrics::record_operation("get", "unavailable");
            return OperationResult::Unavailable;
        }

        match self
            .run_bounded("get", self.shared.transport.get(key))
            .await
        {
            Ok(Some(value)) => {
                debug!("Cache hit for key '{}'", key);
                metrics::record_hit();
                OperationResult::Ok(value)
            }
            Ok(None) => {
                debug!("Cache miss for key '{}'", key);
                metrics::record_miss();
                OperationResult::NotFound
            }
            Err(reason) => OperationResult::Failed(reason),
        }
    }

    /// Stores `value` under `key` with the given expiry. The TTL must be
    /// positive; sub-second expiries round up to the upstream's 1s
    /// granularity.
    pub async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> OperationResult<()> {
        if key.is_empty() {
            metrics::record_operation("set", "invalid");
            return OperationResult::Failed(FailureReason::InvalidKey);
        }
        if ttl.is_zero() {
            metrics::record_operation("set", "invalid");
            return OperationResult::Failed(FailureReason::InvalidTtl);
        }
        if !self.is_alive() {
            metrics::record_operation("set", "unavailable");
            return OperationResult::Unavailable;
        }

        match self
            .run_bounded("set", self.shared.transport.set(key, value, ttl))
            .await
        {
            Ok(()) => {
                debug!("Cached key '{}' with TTL {:?}", key, ttl);
                OperationResult::Ok(())
            }
            Err(reason) => OperationResult::Failed(reason),
        }
    }

    /// Removes `key`. Idempotent: deleting an absent key still succeeds.
    pub async fn del(&self, key: &str) -> OperationResult<()> {
        if key.is_empty() {
            metrics::record_operation("del", "invalid");
            return OperationResult::Failed(FailureReason::InvalidKey);
        }
        if !self.is_alive() {
            metrics::record_operation("del", "unavailable");
            return OperationResult::Unavailable;
        }

        match self
            .run_bounded("del", self.shared.transport.del(key))
            .await
        {
            Ok(()) => OperationResult::Ok(()),
            Err(reason) => OperationResult::Failed(reason),
        }
    }

    /// Probes whether `key` currently exists upstream.
    pub async fn exists(&self, key: &str) -> OperationResult<bool> {
        if key.is_empty() {
            metrics::record_operation("exists", "invalid");
            return OperationResult::Failed(FailureReason::InvalidKey);
        }
        if !self.is_alive() {
            metrics::record_operation("exists", "unavailable");
            return OperationResult::Unavailable;
        }

        match self
            .run_bounded("exists", self.shared.transport.exists(key))
            .await
        {
            Ok(found) => OperationResult::Ok(found),
            Err(reason) => OperationResult::Failed(reason),
        }
    }

    /// Fetches and JSON-decodes the value stored under `key`.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> OperationResult<T> {
        self.get(key).await.and_then(|bytes| {
            match serde_json::from_slice(&bytes) {
                Ok(value) => OperationResult::Ok(value),
                Err(e) => OperationResult::Failed(FailureReason::Protocol(format!(
                    "invalid cached JSON: {}",
                    e
                ))),
            }
        })
    }

    /// JSON-encodes `value` and stores it under `key`.
    pub async fn set_json<T: Serialize + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> OperationResult<()> {
        let bytes = match serde_json::to_vec(value) {
            Ok(bytes) => bytes,
            Err(e) => {
                return OperationResult::Failed(FailureReason::Protocol(format!(
                    "unencodable value: {}",
                    e
                )))
            }
        };
        self.set(key, &bytes, ttl).await
    }

    /// Shuts the facade down: stops the reconnect supervisor, drops the
    /// connection and parks the state at `Disconnected`. Idempotent.
    pub async fn close(&self) {
        self.shared.shutdown.store(true, Ordering::SeqCst);
        self.shared.shutdown_signal.notify_one();

        let handle = self.supervisor.lock().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }

        if let Err(err) = self.shared.transport.close().await {
            debug!("Transport close reported an error: {}", err);
        }
        self.shared.state.set(ConnectionState::Disconnected);
    }

    /// Runs one transport call under the operation timeout, classifying
    /// the outcome and flagging dead connections for the supervisor.
    async fn run_bounded<T>(
        &self,
        op: &'static str,
        fut: impl Future<Output = CacheResult<T>>,
    ) -> Result<T, FailureReason> {
        match tokio::time::timeout(self.shared.options.op_timeout, fut).await {
            Ok(Ok(value)) => {
                metrics::record_operation(op, "ok");
                Ok(value)
            }
            Ok(Err(err)) => {
                if err.should_trip_reconnect() {
                    self.note_failure(op, &err.to_string());
                }
                metrics::record_operation(op, "failed");
                Err(FailureReason::from(err))
            }
            // Dropping the future abandons the in-flight request; the
            // upstream may still apply it.
            Err(_) => {
                self.note_failure(op, "operation timed out");
                metrics::record_operation(op, "timeout");
                Err(FailureReason::Timeout)
            }
        }
    }

    /// Marks the connection dead and wakes the reconnect supervisor.
    fn note_failure(&self, op: &'static str, detail: &str) {
        if self
            .shared
            .state
            .transition_if(ConnectionState::Connected, ConnectionState::Errored)
        {
            warn!("Cache {} failed: {}; scheduling reconnect", op, detail);
        }
    }
}

impl Drop for CacheFacade {
    fn drop(&mut self) {
        if let Some(handle) = self.supervisor.lock().take() {
            handle.abort();
        }
    }
}

/// Connection lifecycle loop: the facade's only autonomous background
/// activity. Connects, parks while healthy, and reconnects with backoff
/// after failures, forever — the upstream may recover at any time.
async fn run_supervisor(shared: Arc<Shared>) {
    let mut attempt: u32 = 0;
    loop {
        if shared.shutdown.load(Ordering::SeqCst) {
            break;
        }
        shared.state.set(ConnectionState::Connecting);
        metrics::record_connect_attempt();

        let handshake = match tokio::time::timeout(
            shared.options.connect_timeout,
            shared.transport.connect(),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(CacheError::timeout(format!(
                "handshake exceeded {:?}",
                shared.options.connect_timeout
            ))),
        };

        match handshake {
            Ok(()) => {
                attempt = 0;
                shared.state.set(ConnectionState::Connected);
                info!("Cache facade connected");

                tokio::select! {
                    () = shared.state.wait_for(ConnectionState::Errored) => {}
                    () = shared.shutdown_signal.notified() => break,
                }
            }
            Err(err) => {
                shared.state.set(ConnectionState::Errored);
                attempt += 1;
                let delay = shared.options.reconnect.delay_for_attempt(attempt);
                warn!(
                    "Cache handshake failed (attempt {}): {}; retrying in {:?}",
                    attempt, err, delay
                );

                tokio::select! {
                    () = tokio::time::sleep(delay) => {}
                    () = shared.shutdown_signal.notified() => break,
                }
            }
        }
    }
    debug!("Cache supervisor stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockCacheTransport;

    fn test_options() -> FacadeOptions {
        FacadeOptions {
            connect_timeout: Duration::from_millis(100),
            op_timeout: Duration::from_millis(100),
            reconnect: ReconnectPolicy {
                initial_delay: Duration::from_millis(10),
                max_delay: Duration::from_millis(50),
                multiplier: 2.0,
                jitter: false,
            },
        }
    }

    #[tokio::test]
    async fn test_no_network_attempt_while_disconnected() {
        let mut transport = MockCacheTransport::new();
        transport
            .expect_connect()
            .returning(|| Err(CacheError::transport("connection refused")));
        transport.expect_get().times(0);
        transport.expect_set().times(0);
        transport.expect_del().times(0);
        transport.expect_close().returning(|| Ok(()));

        let facade = CacheFacade::new(Arc::new(transport), test_options());

        assert!(!facade.is_alive());
        assert_eq!(facade.get("k").await, OperationResult::Unavailable);
        assert_eq!(
            facade.set("k", b"v", Duration::from_secs(1)).await,
            OperationResult::Unavailable
        );
        assert_eq!(facade.del("k").await, OperationResult::Unavailable);

        facade.close().await;
    }

    #[tokio::test]
    async fn test_invalid_arguments_short_circuit() {
        let mut transport = MockCacheTransport::new();
        transport.expect_connect().returning(|| Ok(()));
        transport.expect_get().times(0);
        transport.expect_set().times(0);
        transport.expect_close().returning(|| Ok(()));

        let facade = CacheFacade::new(Arc::new(transport), test_options());
        assert!(facade.wait_connected(Duration::from_secs(1)).await);

        assert_eq!(
            facade.get("").await,
            OperationResult::Failed(FailureReason::InvalidKey)
        );
        assert_eq!(
            facade.set("", b"v", Duration::from_secs(1)).await,
            OperationResult::Failed(FailureReason::InvalidKey)
        );
        assert_eq!(
            facade.set("k", b"v", Duration::ZERO).await,
            OperationResult::Failed(FailureReason::InvalidTtl)
        );

        facade.close().await;
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let mut transport = MockCacheTransport::new();
        transport.expect_connect().returning(|| Ok(()));
        transport.expect_close().returning(|| Ok(()));

        let facade = CacheFacade::new(Arc::new(transport), test_options());
        facade.close().await;
        facade.close().await;
        assert_eq!(facade.state(), ConnectionState::Disconnected);
    }
}
