//! Prometheus metrics for cache facade monitoring.

use crate::state::ConnectionState;
use metrics::{counter, describe_counter, describe_gauge, gauge};

/// Metric names for the cache facade.
pub mod names {
    /// Total operations, labeled by operation and outcome.
    pub const OPERATIONS_TOTAL: &str = "cachet_operations_total";
    /// Total cache hits.
    pub const HITS_TOTAL: &str = "cachet_hits_total";
    /// Total cache misses.
    pub const MISSES_TOTAL: &str = "cachet_misses_total";
    /// Total connection attempts (initial handshake and reconnects).
    pub const CONNECT_ATTEMPTS_TOTAL: &str = "cachet_connect_attempts_total";
    /// Current connection state code (0=disconnected, 1=connecting,
    /// 2=connected, 3=errored).
    pub const CONNECTION_STATE: &str = "cachet_connection_state";
}

/// Register all metric descriptions.
pub fn register_metrics() {
    describe_counter!(
        names::OPERATIONS_TOTAL,
        "Total number of facade operations by operation and outcome"
    );
    describe_counter!(names::HITS_TOTAL, "Total number of cache hits");
    describe_counter!(names::MISSES_TOTAL, "Total number of cache misses");
    describe_counter!(
        names::CONNECT_ATTEMPTS_TOTAL,
        "Total number of connection attempts"
    );
    describe_gauge!(
        names::CONNECTION_STATE,
        "Current connection state code (0=disconnected, 1=connecting, 2=connected, 3=errored)"
    );
}

/// Record an operation outcome.
pub(crate) fn record_operation(op: &'static str, outcome: &'static str) {
    counter!(names::OPERATIONS_TOTAL, "op" => op, "outcome" => outcome).increment(1);
}

/// Record a cache hit.
pub(crate) fn record_hit() {
    counter!(names::HITS_TOTAL).increment(1);
}

/// Record a cache miss.
pub(crate) fn record_miss() {
    counter!(names::MISSES_TOTAL).increment(1);
}

/// Record a connection attempt.
pub(crate) fn record_connect_attempt() {
    counter!(names::CONNECT_ATTEMPTS_TOTAL).increment(1);
}

/// Record the current connection state.
pub(crate) fn record_state(state: ConnectionState) {
    gauge!(names::CONNECTION_STATE).set(f64::from(state.code()));
}
