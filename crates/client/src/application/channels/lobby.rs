//! Lobby channel: live room-list updates.

use std::sync::Arc;

use baduk_protocol::routes::LOBBY_TOPIC;

use crate::config::ClientConfig;
use crate::infrastructure::messaging::{ChannelClient, ChannelSpec, ConnectionState};
use crate::infrastructure::websocket::{FrameBuilder, WsConnector};
use crate::ports::outbound::{ChannelError, EventSink, StompConnector};

/// Subscribes to `/topic/lobby` on the chat service.
///
/// The lobby has no entry or leave action; after subscribing it asks the
/// server for the current room list once.
pub struct LobbyChannel {
    channel: ChannelClient,
}

impl LobbyChannel {
    pub fn new(config: &ClientConfig, sink: Arc<dyn EventSink>) -> Self {
        Self::with_connector(config, Arc::new(WsConnector::new()), sink)
    }

    pub fn with_connector(
        config: &ClientConfig,
        connector: Arc<dyn StompConnector>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        let spec = ChannelSpec {
            label: "lobby",
            endpoint: config.chat.ws_url.clone(),
            topic: LOBBY_TOPIC.to_string(),
            subscribe_headers: Vec::new(),
            entry: Some(FrameBuilder::lobby_subscribe()),
            leave: None,
        };
        Self {
            channel: ChannelClient::new(spec, connector, sink, config.connect_timeout),
        }
    }

    pub async fn connect(&self) -> Result<(), ChannelError> {
        self.channel.connect().await
    }

    pub fn disconnect(&self) {
        self.channel.disconnect()
    }

    pub fn is_connected(&self) -> bool {
        self.channel.is_connected()
    }

    pub fn state(&self) -> ConnectionState {
        self.channel.state()
    }

    /// Ask again for the full room list.
    pub fn request_room_list(&self) -> Result<(), ChannelError> {
        self.channel.send(FrameBuilder::lobby_subscribe())
    }
}
