//! Generic channel client.
//!
//! Lobby, chat and game channels have the same shape: connect, subscribe to
//! one topic, optionally announce entry, send actions to fixed routes and
//! announce departure on disconnect. [`ChannelSpec`] captures the parts that
//! differ; [`ChannelClient`] does the rest.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;

use crate::infrastructure::messaging::{ConnectionState, SharedConnectionState};
use crate::infrastructure::websocket::OutboundFrame;
use crate::ports::outbound::{
    ChannelError, EventSink, FrameHandler, StompConnector, StompSession, TransportError,
};

/// Everything that distinguishes one kind of channel from another.
#[derive(Debug, Clone)]
pub struct ChannelSpec {
    /// Short label used in log lines ("lobby", "chat", "game").
    pub label: &'static str,
    pub endpoint: String,
    pub topic: String,
    pub subscribe_headers: Vec<(String, String)>,
    /// Sent right after subscribing, before `connect()` returns.
    pub entry: Option<OutboundFrame>,
    /// Sent on `disconnect()` while still connected.
    pub leave: Option<OutboundFrame>,
}

struct ChannelSession {
    handle: Box<dyn StompSession>,
    subscription_id: String,
}

/// One logical channel bound to one topic.
pub struct ChannelClient {
    spec: ChannelSpec,
    connector: Arc<dyn StompConnector>,
    sink: Arc<dyn EventSink>,
    connect_timeout: Option<Duration>,
    session: Mutex<Option<ChannelSession>>,
    state: SharedConnectionState,
    connect_lock: tokio::sync::Mutex<()>,
}

impl ChannelClient {
    pub fn new(
        spec: ChannelSpec,
        connector: Arc<dyn StompConnector>,
        sink: Arc<dyn EventSink>,
        connect_timeout: Option<Duration>,
    ) -> Self {
        Self {
            spec,
            connector,
            sink,
            connect_timeout,
            session: Mutex::new(None),
            state: SharedConnectionState::default(),
            connect_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Connect, subscribe and send the entry frame.
    ///
    /// Returns once the entry frame has been handed to the session. Calling
    /// this while already connected does nothing.
    pub async fn connect(&self) -> Result<(), ChannelError> {
        let _guard = self.connect_lock.lock().await;
        if self.is_connected() {
            tracing::debug!(channel = self.spec.label, "Already connected");
            return Ok(());
        }

        // Drop any dead session left behind by a server-side close.
        self.teardown_stale_session();

        tracing::info!(
            channel = self.spec.label,
            endpoint = %self.spec.endpoint,
            "Connecting"
        );
        self.state.set(ConnectionState::Connecting);

        let handle = match self.open_session().await {
            Ok(handle) => handle,
            Err(e) => {
                tracing::error!(channel = self.spec.label, "Connection failed: {}", e);
                self.state.set(ConnectionState::Failed);
                return Err(ChannelError::ConnectFailed(e));
            }
        };

        let subscription_id =
            match handle.subscribe(&self.spec.topic, &self.spec.subscribe_headers, self.handler()) {
                Ok(id) => id,
                Err(e) => {
                    tracing::error!(channel = self.spec.label, "Subscribe failed: {}", e);
                    handle.disconnect();
                    self.state.set(ConnectionState::Failed);
                    return Err(ChannelError::Transport(e));
                }
            };
        tracing::info!(
            channel = self.spec.label,
            topic = %self.spec.topic,
            subscription = %subscription_id,
            "Subscribed"
        );

        if let Some(entry) = &self.spec.entry {
            if let Err(e) = handle.send(&entry.destination, entry.body.clone()) {
                tracing::error!(channel = self.spec.label, "Entry frame failed: {}", e);
                handle.disconnect();
                self.state.set(ConnectionState::Failed);
                return Err(ChannelError::Transport(e));
            }
        }

        *self.session.lock().unwrap_or_else(|e| e.into_inner()) = Some(ChannelSession {
            handle,
            subscription_id,
        });
        self.state.set(ConnectionState::Connected);
        Ok(())
    }

    async fn open_session(&self) -> Result<Box<dyn StompSession>, TransportError> {
        let attempt = self.connector.connect(&self.spec.endpoint);
        match self.connect_timeout {
            Some(limit) => tokio::time::timeout(limit, attempt)
                .await
                .map_err(|_| TransportError::Timeout(limit.as_millis() as u64))?,
            None => attempt.await,
        }
    }

    fn handler(&self) -> FrameHandler {
        let sink = Arc::clone(&self.sink);
        let label = self.spec.label;
        Arc::new(move |body: String| dispatch_inbound(sink.as_ref(), label, &body))
    }

    fn teardown_stale_session(&self) {
        if let Some(stale) = self.session.lock().unwrap_or_else(|e| e.into_inner()).take() {
            stale.handle.disconnect();
        }
    }

    /// Send the leave frame (if any) and close the session.
    ///
    /// A second call, or a call while not connected, sends nothing.
    pub fn disconnect(&self) {
        let session = self.session.lock().unwrap_or_else(|e| e.into_inner()).take();
        let Some(session) = session else {
            return;
        };

        if session.handle.is_connected() {
            if let Some(leave) = &self.spec.leave {
                if let Err(e) = session.handle.send(&leave.destination, leave.body.clone()) {
                    tracing::error!(channel = self.spec.label, "Leave frame failed: {}", e);
                }
            }
            session.handle.disconnect();
            tracing::info!(
                channel = self.spec.label,
                subscription = %session.subscription_id,
                "Disconnected"
            );
        } else {
            session.handle.disconnect();
        }
        self.state.set(ConnectionState::Disconnected);
    }

    pub fn is_connected(&self) -> bool {
        self.session
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|s| s.handle.is_connected())
    }

    /// While a session is held, its own state wins, so a broker ERROR or a
    /// socket failure after connecting reads as `Failed`.
    pub fn state(&self) -> ConnectionState {
        let session_state = self
            .session
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|s| s.handle.state());
        match (self.state.get(), session_state) {
            (ConnectionState::Connected, Some(state)) => state,
            (ConnectionState::Connected, None) => ConnectionState::Disconnected,
            (other, _) => other,
        }
    }

    /// Send one action frame.
    ///
    /// While disconnected the frame is dropped, the drop is logged and
    /// `Err(NotConnected)` is returned.
    pub fn send(&self, frame: OutboundFrame) -> Result<(), ChannelError> {
        let guard = self.session.lock().unwrap_or_else(|e| e.into_inner());
        match guard.as_ref() {
            Some(session) if session.handle.is_connected() => session
                .handle
                .send(&frame.destination, frame.body)
                .map_err(|e| {
                    tracing::error!(
                        channel = self.spec.label,
                        destination = %frame.destination,
                        "Send failed: {}",
                        e
                    );
                    match e {
                        TransportError::NotConnected | TransportError::Closed => {
                            ChannelError::NotConnected
                        }
                        other => ChannelError::Transport(other),
                    }
                }),
            _ => {
                tracing::error!(
                    channel = self.spec.label,
                    destination = %frame.destination,
                    "WebSocket is not connected, dropping action"
                );
                Err(ChannelError::NotConnected)
            }
        }
    }
}

impl Drop for ChannelClient {
    fn drop(&mut self) {
        self.disconnect();
    }
}

fn dispatch_inbound(sink: &dyn EventSink, label: &str, body: &str) {
    match serde_json::from_str::<Value>(body) {
        Ok(event) => sink.on_event(event),
        Err(e) => {
            tracing::warn!(channel = label, "Dropping malformed inbound message: {}", e);
            sink.on_malformed(body, &e.to_string());
        }
    }
}
