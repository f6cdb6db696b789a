//! Connection lifecycle state.
//!
//! The state lives in an `AtomicU8` so it can be read from any task without
//! locking. Nothing here reconnects: once a channel reaches `Disconnected`
//! or `Failed` it stays there until the caller connects again.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Connection state of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected to the server
    Disconnected,
    /// WebSocket open in progress or STOMP handshake pending
    Connecting,
    /// Subscribed and ready to send
    Connected,
    /// The last connection attempt failed
    Failed,
}

impl ConnectionState {
    /// Convert to u8 for atomic storage.
    pub fn to_u8(self) -> u8 {
        match self {
            ConnectionState::Disconnected => 0,
            ConnectionState::Connecting => 1,
            ConnectionState::Connected => 2,
            ConnectionState::Failed => 3,
        }
    }

    /// Convert from u8 (atomic storage).
    pub fn from_u8(v: u8) -> Self {
        match v {
            1 => ConnectionState::Connecting,
            2 => ConnectionState::Connected,
            3 => ConnectionState::Failed,
            _ => ConnectionState::Disconnected,
        }
    }
}

/// Shared, lock-free connection state cell.
#[derive(Debug, Clone)]
pub struct SharedConnectionState {
    inner: Arc<AtomicU8>,
}

impl SharedConnectionState {
    pub fn new(initial: ConnectionState) -> Self {
        Self {
            inner: Arc::new(AtomicU8::new(initial.to_u8())),
        }
    }

    pub fn get(&self) -> ConnectionState {
        ConnectionState::from_u8(self.inner.load(Ordering::SeqCst))
    }

    pub fn set(&self, state: ConnectionState) {
        self.inner.store(state.to_u8(), Ordering::SeqCst);
    }

    /// Move from `from` to `to` only if the current state is `from`.
    pub fn transition(&self, from: ConnectionState, to: ConnectionState) -> bool {
        self.inner
            .compare_exchange(from.to_u8(), to.to_u8(), Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub fn is_connected(&self) -> bool {
        self.get() == ConnectionState::Connected
    }
}

impl Default for SharedConnectionState {
    fn default() -> Self {
        Self::new(ConnectionState::Disconnected)
    }
}
