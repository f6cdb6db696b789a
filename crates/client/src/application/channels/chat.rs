//! Chat room channel.

use std::sync::Arc;

use baduk_protocol::routes::{chat_room_topic, USERNAME_HEADER};
use baduk_protocol::ChatMessage;

use crate::config::ClientConfig;
use crate::infrastructure::messaging::{ChannelClient, ChannelSpec, ConnectionState};
use crate::infrastructure::websocket::{FrameBuilder, WsConnector};
use crate::ports::outbound::{ChannelError, EventSink, StompConnector};

/// One participant in one chat room.
///
/// Connecting announces ENTER; disconnecting announces LEAVE.
pub struct ChatChannel {
    room_id: String,
    username: String,
    channel: ChannelClient,
}

impl ChatChannel {
    pub fn new(
        config: &ClientConfig,
        room_id: &str,
        username: &str,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, ChannelError> {
        Self::with_connector(config, room_id, username, Arc::new(WsConnector::new()), sink)
    }

    pub fn with_connector(
        config: &ClientConfig,
        room_id: &str,
        username: &str,
        connector: Arc<dyn StompConnector>,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, ChannelError> {
        let spec = ChannelSpec {
            label: "chat",
            endpoint: config.chat.ws_url.clone(),
            topic: chat_room_topic(room_id),
            subscribe_headers: vec![(USERNAME_HEADER.to_string(), username.to_string())],
            entry: Some(FrameBuilder::chat(&ChatMessage::enter(room_id, username))?),
            leave: Some(FrameBuilder::chat(&ChatMessage::leave(room_id, username))?),
        };
        tracing::debug!(room_id, username, "Created chat channel");

        Ok(Self {
            room_id: room_id.to_string(),
            username: username.to_string(),
            channel: ChannelClient::new(spec, connector, sink, config.connect_timeout),
        })
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Connect, subscribe to the room and announce ENTER.
    pub async fn connect(&self) -> Result<(), ChannelError> {
        self.channel.connect().await
    }

    /// Announce LEAVE and close the connection.
    pub fn disconnect(&self) {
        self.channel.disconnect()
    }

    pub fn is_connected(&self) -> bool {
        self.channel.is_connected()
    }

    pub fn state(&self) -> ConnectionState {
        self.channel.state()
    }

    pub fn send_message(&self, message: &str) -> Result<(), ChannelError> {
        self.send(ChatMessage::talk(&self.room_id, &self.username, message))
    }

    /// Announce ENTER again (already done by `connect`).
    pub fn enter(&self) -> Result<(), ChannelError> {
        self.send(ChatMessage::enter(&self.room_id, &self.username))
    }

    /// Announce LEAVE without closing the connection.
    pub fn leave(&self) -> Result<(), ChannelError> {
        self.send(ChatMessage::leave(&self.room_id, &self.username))
    }

    fn send(&self, message: ChatMessage) -> Result<(), ChannelError> {
        self.channel.send(FrameBuilder::chat(&message)?)
    }
}
