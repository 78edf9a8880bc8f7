//! Connection state tracking.

use crate::metrics;
use std::fmt;
use tokio::sync::watch;
use tracing::debug;

/// Health of the facade's single logical connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection and no attempt in progress.
    Disconnected,
    /// A handshake is in flight.
    Connecting,
    /// The connection is live.
    Connected,
    /// The connection broke; a reconnect attempt is scheduled.
    Errored,
}

impl ConnectionState {
    /// Numeric code reported on the connection-state gauge.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Disconnected => 0,
            Self::Connecting => 1,
            Self::Connected => 2,
            Self::Errored => 3,
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Errored => "errored",
        };
        write!(f, "{}", name)
    }
}

/// Shared, awaitable cell holding the current connection state.
///
/// Writers are the reconnect supervisor and the operation failure hook;
/// readers observe eventually-consistent state.
pub(crate) struct StateCell {
    tx: watch::Sender<ConnectionState>,
}

impl StateCell {
    pub(crate) fn new() -> Self {
        Self {
            tx: watch::Sender::new(ConnectionState::Disconnected),
        }
    }

    /// Returns the current state.
    pub(crate) fn get(&self) -> ConnectionState {
        *self.tx.borrow()
    }

    /// Unconditionally moves to `next`.
    pub(crate) fn set(&self, next: ConnectionState) {
        let prev = self.tx.send_replace(next);
        if prev != next {
            debug!("Connection state changed: {} -> {}", prev, next);
            metrics::record_state(next);
        }
    }

    /// Moves to `to` only if currently `from`; returns whether it applied.
    ///
    /// Keeps a stale failure report from stomping a newer state set by the
    /// supervisor.
    pub(crate) fn transition_if(&self, from: ConnectionState, to: ConnectionState) -> bool {
        let mut applied = false;
        self.tx.send_if_modified(|state| {
            if *state == from {
                *state = to;
                applied = true;
                return true;
            }
            false
        });
        if applied {
            debug!("Connection state changed: {} -> {}", from, to);
            metrics::record_state(to);
        }
        applied
    }

    /// Resolves once the state equals `target`.
    pub(crate) async fn wait_for(&self, target: ConnectionState) {
        let mut rx = self.tx.subscribe();
        loop {
            if *rx.borrow_and_update() == target {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}
