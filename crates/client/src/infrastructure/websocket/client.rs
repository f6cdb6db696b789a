//! Desktop STOMP-over-WebSocket client using tokio-tungstenite

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

use baduk_protocol::{Command, Frame};

use crate::infrastructure::messaging::{ConnectionState, SharedConnectionState};
use crate::ports::outbound::{FrameHandler, StompConnector, StompSession, TransportError};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsWrite = SplitSink<WsStream, Message>;
type WsRead = SplitStream<WsStream>;

/// Opens STOMP sessions over plain WebSockets.
///
/// SockJS endpoints also accept raw WebSocket connections at
/// `{endpoint}/websocket`, which is what the default configuration targets.
#[derive(Debug, Clone, Default)]
pub struct WsConnector;

impl WsConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl StompConnector for WsConnector {
    async fn connect(&self, url: &str) -> Result<Box<dyn StompSession>, TransportError> {
        let host = stomp_host(url);

        let (ws_stream, _) = connect_async(url)
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;
        tracing::debug!("WebSocket open at {}, sending STOMP CONNECT", url);

        let (mut write, mut read) = ws_stream.split();
        write
            .send(Message::Text(Frame::connect(&host).encode()))
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        await_connected(&mut read).await?;
        tracing::info!("STOMP session established with {}", url);

        Ok(Box::new(WsStompSession::start(write, read)))
    }
}

/// Wait for CONNECTED, skipping heart-beats.
async fn await_connected(read: &mut WsRead) -> Result<(), TransportError> {
    while let Some(msg) = read.next().await {
        let text = match msg {
            Ok(Message::Text(text)) => text,
            Ok(Message::Binary(bytes)) => String::from_utf8_lossy(&bytes).into_owned(),
            Ok(Message::Close(_)) => return Err(TransportError::Closed),
            Ok(_) => continue,
            Err(e) => return Err(TransportError::Connect(e.to_string())),
        };
        match Frame::decode(&text)? {
            Some(frame) if frame.command == Command::Connected => return Ok(()),
            Some(frame) if frame.command == Command::Error => {
                return Err(TransportError::Rejected(error_message(&frame)));
            }
            Some(frame) => {
                tracing::warn!("Ignoring {} frame before CONNECTED", frame.command);
            }
            None => {}
        }
    }
    Err(TransportError::Closed)
}

fn stomp_host(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| "localhost".to_string())
}

fn error_message(frame: &Frame) -> String {
    frame
        .get_header("message")
        .map(str::to_string)
        .unwrap_or_else(|| frame.body.clone())
}

enum Outbound {
    Frame(Frame),
    Close,
}

type Subscriptions = Arc<Mutex<HashMap<String, FrameHandler>>>;

/// One live STOMP session.
///
/// A writer task drains an in-order queue onto the socket, so frames sent
/// before [`StompSession::disconnect`] reach the wire before DISCONNECT.
/// A reader task routes MESSAGE bodies to their subscription handler.
pub struct WsStompSession {
    state: SharedConnectionState,
    outbound: mpsc::UnboundedSender<Outbound>,
    subscriptions: Subscriptions,
    next_subscription: AtomicU32,
    reader: Mutex<Option<JoinHandle<()>>>,
}

impl WsStompSession {
    fn start(write: WsWrite, read: WsRead) -> Self {
        let state = SharedConnectionState::new(ConnectionState::Connected);
        let subscriptions: Subscriptions = Arc::new(Mutex::new(HashMap::new()));
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(write_loop(write, rx, state.clone()));
        let reader = tokio::spawn(read_loop(read, Arc::clone(&subscriptions), state.clone()));

        Self {
            state,
            outbound: tx,
            subscriptions,
            next_subscription: AtomicU32::new(0),
            reader: Mutex::new(Some(reader)),
        }
    }

    fn enqueue(&self, frame: Frame) -> Result<(), TransportError> {
        self.outbound
            .send(Outbound::Frame(frame))
            .map_err(|_| TransportError::Closed)
    }
}

impl StompSession for WsStompSession {
    fn is_connected(&self) -> bool {
        self.state.is_connected()
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
        let id = format!("sub-{}", self.next_subscription.fetch_add(1, Ordering::SeqCst));
        self.subscriptions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id.clone(), handler);
        self.enqueue(Frame::subscribe(&id, destination, headers))?;
        tracing::debug!("Subscribed {} to {}", id, destination);
        Ok(id)
    }

    fn send(&self, destination: &str, body: String) -> Result<(), TransportError> {
        if !self.is_connected() {
            return Err(TransportError::NotConnected);
        }
        tracing::debug!("SEND {} {}", destination, body);
        self.enqueue(Frame::send(destination, body))
    }

    fn state(&self) -> ConnectionState {
        self.state.get()
    }

    /// Sends DISCONNECT and closes the socket only on the first call while
    /// connected. Handlers are always dropped and the reader always stops,
    /// so a failed session delivers nothing after this returns.
    fn disconnect(&self) {
        if self
            .state
            .transition(ConnectionState::Connected, ConnectionState::Disconnected)
        {
            let _ = self.outbound.send(Outbound::Frame(Frame::disconnect()));
            let _ = self.outbound.send(Outbound::Close);
        }

        self.subscriptions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
        if let Some(reader) = self.reader.lock().unwrap_or_else(|e| e.into_inner()).take() {
            reader.abort();
        }
    }
}

impl Drop for WsStompSession {
    fn drop(&mut self) {
        self.disconnect();
    }
}

async fn write_loop(
    mut write: WsWrite,
    mut rx: mpsc::UnboundedReceiver<Outbound>,
    state: SharedConnectionState,
) {
    while let Some(item) = rx.recv().await {
        match item {
            Outbound::Frame(frame) => {
                if let Err(e) = write.send(Message::Text(frame.encode())).await {
                    tracing::error!("Failed to send {} frame: {}", frame.command, e);
                    state.transition(ConnectionState::Connected, ConnectionState::Failed);
                    break;
                }
            }
            Outbound::Close => {
                let _ = write.send(Message::Close(None)).await;
                break;
            }
        }
    }
}

async fn read_loop(mut read: WsRead, subscriptions: Subscriptions, state: SharedConnectionState) {
    while let Some(msg) = read.next().await {
        let text = match msg {
            Ok(Message::Text(text)) => text,
            Ok(Message::Binary(bytes)) => String::from_utf8_lossy(&bytes).into_owned(),
            Ok(Message::Close(_)) => {
                tracing::info!("Server closed connection");
                break;
            }
            Ok(_) => continue,
            Err(e) => {
                tracing::error!("WebSocket error: {}", e);
                state.transition(ConnectionState::Connected, ConnectionState::Failed);
                return;
            }
        };

        let frame = match Frame::decode(&text) {
            Ok(Some(frame)) => frame,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!("Failed to decode STOMP frame: {}", e);
                continue;
            }
        };

        match frame.command {
            Command::Message => {
                let handler = frame.get_header("subscription").and_then(|id| {
                    subscriptions
                        .lock()
                        .unwrap_or_else(|e| e.into_inner())
                        .get(id)
                        .cloned()
                });
                match handler {
                    Some(handler) => handler(frame.body),
                    None => tracing::warn!(
                        "MESSAGE for unknown subscription {:?}",
                        frame.get_header("subscription")
                    ),
                }
            }
            Command::Error => {
                tracing::error!("Broker sent ERROR: {}", error_message(&frame));
                state.transition(ConnectionState::Connected, ConnectionState::Failed);
                return;
            }
            other => tracing::debug!("Ignoring {} frame", other),
        }
    }

    state.transition(ConnectionState::Connected, ConnectionState::Disconnected);
}
