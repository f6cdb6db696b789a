//! Game room channel.
//!
//! Direct commands (`start`, `undo`, `score`, ...) and the negotiated
//! request/respond pairs use different routes and stay separate code paths.

use std::sync::{Arc, Mutex};

use baduk_protocol::routes::{game_topic, USERNAME_HEADER};
use baduk_protocol::{BoardPoint, GameAction, Negotiable};

use super::negotiation::{Negotiator, ProposalState};
use crate::config::ClientConfig;
use crate::infrastructure::messaging::{ChannelClient, ChannelSpec, ConnectionState};
use crate::infrastructure::websocket::{FrameBuilder, WsConnector};
use crate::ports::outbound::{ChannelError, EventSink, StompConnector};

/// One participant in one game room.
///
/// Connecting announces JOIN; disconnecting announces LEAVE. Proposal state
/// is tracked locally for display only. The server is authoritative, so a
/// second request while one is outstanding is still sent.
pub struct GameChannel {
    game_id: String,
    username: String,
    channel: ChannelClient,
    negotiator: Mutex<Negotiator>,
}

impl GameChannel {
    pub fn new(
        config: &ClientConfig,
        game_id: &str,
        username: &str,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, ChannelError> {
        Self::with_connector(config, game_id, username, Arc::new(WsConnector::new()), sink)
    }

    pub fn with_connector(
        config: &ClientConfig,
        game_id: &str,
        username: &str,
        connector: Arc<dyn StompConnector>,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, ChannelError> {
        let spec = ChannelSpec {
            label: "game",
            endpoint: config.game.ws_url.clone(),
            topic: game_topic(game_id),
            subscribe_headers: vec![(USERNAME_HEADER.to_string(), username.to_string())],
            entry: Some(FrameBuilder::game(GameAction::Join, game_id, username)?),
            leave: Some(FrameBuilder::game(GameAction::Leave, game_id, username)?),
        };

        Ok(Self {
            game_id: game_id.to_string(),
            username: username.to_string(),
            channel: ChannelClient::new(spec, connector, sink, config.connect_timeout),
            negotiator: Mutex::new(Negotiator::new()),
        })
    }

    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Connect, subscribe to the game topic and announce JOIN.
    pub async fn connect(&self) -> Result<(), ChannelError> {
        self.channel.connect().await
    }

    /// Announce LEAVE, close the connection and forget pending proposals.
    pub fn disconnect(&self) {
        self.channel.disconnect();
        self.negotiator().reset();
    }

    pub fn is_connected(&self) -> bool {
        self.channel.is_connected()
    }

    pub fn state(&self) -> ConnectionState {
        self.channel.state()
    }

    // =========================================================================
    // Direct commands
    // =========================================================================

    pub fn join(&self) -> Result<(), ChannelError> {
        self.send(GameAction::Join)
    }

    pub fn start(&self) -> Result<(), ChannelError> {
        self.send(GameAction::Start)
    }

    /// Place a stone. Coordinates are 1-based; anything outside `1..=19` is
    /// rejected before a frame is built.
    pub fn play_move(&self, x: u8, y: u8) -> Result<(), ChannelError> {
        let point = BoardPoint::new(x, y).map_err(|e| {
            tracing::warn!(game_id = %self.game_id, "Rejected move: {}", e);
            e
        })?;
        self.send(GameAction::Move(point))
    }

    pub fn undo(&self) -> Result<(), ChannelError> {
        self.send(GameAction::Undo)
    }

    pub fn analysis(&self) -> Result<(), ChannelError> {
        self.send(GameAction::Analysis)
    }

    /// Score the position and broadcast the result to the room.
    pub fn score(&self) -> Result<(), ChannelError> {
        self.send(GameAction::Score)
    }

    /// Announce LEAVE without closing the connection.
    pub fn leave(&self) -> Result<(), ChannelError> {
        self.send(GameAction::Leave)
    }

    // =========================================================================
    // Negotiated actions
    // =========================================================================

    pub fn request_start(&self) -> Result<(), ChannelError> {
        self.request(Negotiable::Start)
    }

    pub fn request_undo(&self) -> Result<(), ChannelError> {
        self.request(Negotiable::Undo)
    }

    pub fn request_score(&self) -> Result<(), ChannelError> {
        self.request(Negotiable::Score)
    }

    pub fn respond_start(&self, accepted: bool) -> Result<(), ChannelError> {
        self.respond(Negotiable::Start, accepted)
    }

    pub fn respond_undo(&self, accepted: bool) -> Result<(), ChannelError> {
        self.respond(Negotiable::Undo, accepted)
    }

    pub fn respond_score(&self, accepted: bool) -> Result<(), ChannelError> {
        self.respond(Negotiable::Score, accepted)
    }

    pub fn request(&self, kind: Negotiable) -> Result<(), ChannelError> {
        self.send(GameAction::Request(kind))?;
        self.negotiator().request_sent(kind);
        Ok(())
    }

    pub fn respond(&self, kind: Negotiable, accepted: bool) -> Result<(), ChannelError> {
        self.send(GameAction::Respond { kind, accepted })?;
        self.negotiator().resolved(kind);
        Ok(())
    }

    /// Record an opponent proposal the caller recognised in a broadcast.
    pub fn proposal_received(&self, kind: Negotiable) {
        self.negotiator().proposal_received(kind);
    }

    /// Record that the server settled a proposal (accepted or rejected).
    pub fn proposal_resolved(&self, kind: Negotiable) {
        self.negotiator().resolved(kind);
    }

    pub fn proposal(&self, kind: Negotiable) -> ProposalState {
        self.negotiator().state(kind)
    }

    /// Proposals still waiting on one side, in `Negotiable::ALL` order.
    pub fn pending_proposals(&self) -> Vec<(Negotiable, ProposalState)> {
        self.negotiator().pending()
    }

    fn negotiator(&self) -> std::sync::MutexGuard<'_, Negotiator> {
        self.negotiator.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn send(&self, action: GameAction) -> Result<(), ChannelError> {
        let frame = FrameBuilder::game(action, &self.game_id, &self.username)?;
        self.channel.send(frame)
    }
}
