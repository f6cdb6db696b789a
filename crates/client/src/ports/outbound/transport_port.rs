//! Transport Port - STOMP session boundary
//!
//! A [`StompConnector`] opens sessions; a [`StompSession`] is one connected
//! STOMP-over-WebSocket link. Channels own exactly one session at a time and
//! subscribe to exactly one topic on it.
//!
//! Session methods are synchronous: outbound frames are handed to the
//! session's writer and the call returns without waiting for the socket.

use std::sync::Arc;

use super::TransportError;
use crate::infrastructure::messaging::ConnectionState;

/// Receives the body of each MESSAGE frame delivered to a subscription.
pub type FrameHandler = Arc<dyn Fn(String) + Send + Sync>;

#[async_trait::async_trait]
pub trait StompConnector: Send + Sync {
    /// Open the socket and complete the STOMP CONNECT/CONNECTED handshake.
    async fn connect(&self, url: &str) -> Result<Box<dyn StompSession>, TransportError>;
}

pub trait StompSession: Send + Sync {
    fn is_connected(&self) -> bool;

    /// Lifecycle as seen by the session. A broker ERROR or socket failure
    /// after the handshake shows up here as `Failed`.
    fn state(&self) -> ConnectionState;

    /// Subscribe to a topic. Returns the subscription id.
    fn subscribe(
        &self,
        destination: &str,
        headers: &[(String, String)],
        handler: FrameHandler,
    ) -> Result<String, TransportError>;

    /// Send a JSON body to a route.
    fn send(&self, destination: &str, body: String) -> Result<(), TransportError>;

    /// Send DISCONNECT and close the socket. Does nothing if already closed.
    fn disconnect(&self);
}
