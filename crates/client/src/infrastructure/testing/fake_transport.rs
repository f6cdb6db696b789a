//! In-memory STOMP transport for channel tests.
//!
//! Every session opened by a [`FakeConnector`] records the frames it would
//! have written, in order, into a log shared with the connector.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::infrastructure::messaging::{ConnectionState, SharedConnectionState};
use crate::ports::outbound::{FrameHandler, StompConnector, StompSession, TransportError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedFrame {
    Subscribe {
        destination: String,
        headers: Vec<(String, String)>,
    },
    Send {
        destination: String,
        body: String,
    },
    Disconnect,
}

impl RecordedFrame {
    pub fn send(destination: &str, body: &str) -> Self {
        RecordedFrame::Send {
            destination: destination.to_string(),
            body: body.to_string(),
        }
    }
}

#[derive(Clone)]
enum Behaviour {
    Accept,
    Fail(TransportError),
    Hang,
}

#[derive(Default)]
struct Shared {
    frames: Mutex<Vec<RecordedFrame>>,
    handler: Mutex<Option<FrameHandler>>,
    sessions: Mutex<Vec<SharedConnectionState>>,
    connects: AtomicUsize,
}

#[derive(Clone)]
pub struct FakeConnector {
    behaviour: Behaviour,
    shared: Arc<Shared>,
}

impl FakeConnector {
    pub fn new() -> Self {
        Self {
            behaviour: Behaviour::Accept,
            shared: Arc::new(Shared::default()),
        }
    }

    /// Every connection attempt fails with `error`.
    pub fn failing(error: TransportError) -> Self {
        Self {
            behaviour: Behaviour::Fail(error),
            ..Self::new()
        }
    }

    /// Connection attempts never complete.
    pub fn hanging() -> Self {
        Self {
            behaviour: Behaviour::Hang,
            ..Self::new()
        }
    }

    pub fn frames(&self) -> Vec<RecordedFrame> {
        lock(&self.shared.frames).clone()
    }

    /// Bodies sent to `destination`, parsed as JSON.
    pub fn bodies_to(&self, destination: &str) -> Vec<serde_json::Value> {
        self.frames()
            .into_iter()
            .filter_map(|f| match f {
                RecordedFrame::Send {
                    destination: d,
                    body,
                } if d == destination => serde_json::from_str(&body).ok(),
                _ => None,
            })
            .collect()
    }

    pub fn sends_to(&self, destination: &str) -> usize {
        self.frames()
            .iter()
            .filter(|f| matches!(f, RecordedFrame::Send { destination: d, .. } if d == destination))
            .count()
    }

    pub fn connect_count(&self) -> usize {
        self.shared.connects.load(Ordering::SeqCst)
    }

    /// Push a MESSAGE body to the most recent subscription.
    pub fn deliver(&self, body: &str) {
        let handler = lock(&self.shared.handler).clone();
        if let Some(handler) = handler {
            handler(body.to_string());
        }
    }

    /// Simulate the server dropping every open session.
    pub fn drop_connection(&self) {
        self.end_sessions(ConnectionState::Disconnected);
    }

    /// Simulate a broker ERROR or socket failure on every open session.
    pub fn fail_connection(&self) {
        self.end_sessions(ConnectionState::Failed);
    }

    fn end_sessions(&self, to: ConnectionState) {
        for state in lock(&self.shared.sessions).iter() {
            state.transition(ConnectionState::Connected, to);
        }
    }
}

impl Default for FakeConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl StompConnector for FakeConnector {
    async fn connect(&self, _url: &str) -> Result<Box<dyn StompSession>, TransportError> {
        match &self.behaviour {
            Behaviour::Accept => {}
            Behaviour::Fail(e) => return Err(e.clone()),
            Behaviour::Hang => std::future::pending::<()>().await,
        }
        self.shared.connects.fetch_add(1, Ordering::SeqCst);
        let state = SharedConnectionState::new(ConnectionState::Connected);
        lock(&self.shared.sessions).push(state.clone());
        Ok(Box::new(FakeSession {
            shared: Arc::clone(&self.shared),
            state,
        }))
    }
}

struct FakeSession {
    shared: Arc<Shared>,
    state: SharedConnectionState,
}

impl FakeSession {
    fn record(&self, frame: RecordedFrame) {
        lock(&self.shared.frames).push(frame);
    }
}

impl StompSession for FakeSession {
    fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    fn state(&self) -> ConnectionState {
        self.state.get()
    }

    fn subscribe(
        &self,
        destination: &str,
        headers: &[(String, String)],
        handler: FrameHandler,
    ) -> Result<String, TransportError> {
        if !self.is_connected() {
            return Err(TransportError::NotConnected);
        }
        *lock(&self.shared.handler) = Some(handler);
        self.record(RecordedFrame::Subscribe {
            destination: destination.to_string(),
            headers: headers.to_vec(),
        });
        Ok("sub-0".to_string())
    }

    fn send(&self, destination: &str, body: String) -> Result<(), TransportError> {
        if !self.is_connected() {
            return Err(TransportError::NotConnected);
        }
        self.record(RecordedFrame::Send {
            destination: destination.to_string(),
            body,
        });
        Ok(())
    }

    fn disconnect(&self) {
        if self
            .state
            .transition(ConnectionState::Connected, ConnectionState::Disconnected)
        {
            self.record(RecordedFrame::Disconnect);
        }
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}
