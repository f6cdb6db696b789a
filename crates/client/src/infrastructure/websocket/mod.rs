//! STOMP-over-WebSocket transport
//!
//! - `client`: tokio-tungstenite based connector and session
//! - `message_builder`: shared outbound frame construction

mod client;
mod message_builder;

pub use client::{WsConnector, WsStompSession};
pub use message_builder::{FrameBuilder, OutboundFrame};
