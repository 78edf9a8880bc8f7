//! Cachet Client - Resilient Cache Facade
//!
//! A facade over one logical connection to an external cache service:
//! - Explicit connection state machine (disconnected, connecting, connected, errored)
//! - Background reconnect supervisor with exponential backoff
//! - Timeout-bounded get/set/del/exists operations
//! - Typed, non-throwing results for every call
//! - Pluggable transport for fault-injected testing
//!
//! # Example
//!
//! ```rust,ignore
//! use cachet_client::CacheFacade;
//! use cachet_config::CacheConfig;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let facade = CacheFacade::with_config(&CacheConfig::default()).unwrap();
//!     facade.wait_connected(Duration::from_secs(5)).await;
//!
//!     facade.set("session:42", b"abc", Duration::from_secs(60)).await;
//!     let value = facade.get("session:42").await;
//!
//!     facade.close().await;
//! }
//! ```

pub mod backoff;
pub mod facade;
pub mod metrics;
pub mod state;
pub mod transport;

pub use backoff::ReconnectPolicy;
pub use facade::{CacheFacade, FacadeOptions};
pub use state::ConnectionState;
pub use transport::{CacheTransport, RedisTransport};

pub use cachet_core::{CacheError, CacheResult, FailureReason, OperationResult};
