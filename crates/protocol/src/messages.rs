//! Action payloads sent as STOMP frame bodies
//!
//! Chat actions share a single route and are distinguished by `type`.
//! Game actions each have their own route and share one payload shape.

use serde::{Deserialize, Serialize};

use crate::board::{BoardPoint, Coordinate};
use crate::routes::CHAT_SEND_MESSAGE;

// =============================================================================
// Chat
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChatMessageType {
    Enter,
    Talk,
    Leave,
}

/// Body of every `/app/chat.sendMessage` frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    #[serde(rename = "type")]
    pub message_type: ChatMessageType,
    pub room_id: String,
    pub sender: String,
    pub message: String,
}

impl ChatMessage {
    pub fn enter(room_id: &str, sender: &str) -> Self {
        Self::new(ChatMessageType::Enter, room_id, sender, "")
    }

    pub fn talk(room_id: &str, sender: &str, message: &str) -> Self {
        Self::new(ChatMessageType::Talk, room_id, sender, message)
    }

    pub fn leave(room_id: &str, sender: &str) -> Self {
        Self::new(ChatMessageType::Leave, room_id, sender, "")
    }

    fn new(message_type: ChatMessageType, room_id: &str, sender: &str, message: &str) -> Self {
        Self {
            message_type,
            room_id: room_id.to_string(),
            sender: sender.to_string(),
            message: message.to_string(),
        }
    }

    pub fn route(&self) -> &'static str {
        CHAT_SEND_MESSAGE
    }
}

// =============================================================================
// Game
// =============================================================================

/// Actions that go through the propose/respond handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Negotiable {
    /// Restart the game
    Start,
    Undo,
    /// Re-score the position
    Score,
}

impl Negotiable {
    pub const ALL: [Negotiable; 3] = [Negotiable::Start, Negotiable::Undo, Negotiable::Score];

    pub fn as_str(self) -> &'static str {
        match self {
            Negotiable::Start => "start",
            Negotiable::Undo => "undo",
            Negotiable::Score => "score",
        }
    }
}

/// Outbound game actions.
///
/// The plain `Start`, `Undo` and `Score` variants are direct commands and are
/// distinct from the negotiated `Request`/`Respond` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    Join,
    Start,
    Move(BoardPoint),
    Undo,
    Analysis,
    Score,
    Leave,
    Request(Negotiable),
    Respond { kind: Negotiable, accepted: bool },
}

impl GameAction {
    pub fn route(&self) -> &'static str {
        match self {
            GameAction::Join => "/app/game/join",
            GameAction::Start => "/app/game/start",
            GameAction::Move(_) => "/app/game/move",
            GameAction::Undo => "/app/game/undo",
            GameAction::Analysis => "/app/game/analysis",
            GameAction::Score => "/app/game/score",
            GameAction::Leave => "/app/game/leave",
            GameAction::Request(Negotiable::Start) => "/app/game/request/start",
            GameAction::Request(Negotiable::Undo) => "/app/game/request/undo",
            GameAction::Request(Negotiable::Score) => "/app/game/request/score",
            GameAction::Respond { kind, .. } => match kind {
                Negotiable::Start => "/app/game/respond/start",
                Negotiable::Undo => "/app/game/respond/undo",
                Negotiable::Score => "/app/game/respond/score",
            },
        }
    }

    pub fn payload(&self, game_id: &str, username: &str) -> GamePayload {
        let mut payload = GamePayload {
            game_id: game_id.to_string(),
            username: username.to_string(),
            x: None,
            y: None,
            accepted: None,
        };
        match *self {
            GameAction::Move(point) => {
                payload.x = Some(point.x);
                payload.y = Some(point.y);
            }
            GameAction::Respond { accepted, .. } => payload.accepted = Some(accepted),
            _ => {}
        }
        payload
    }
}

/// Body of every `/app/game/...` frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GamePayload {
    pub game_id: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<Coordinate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<Coordinate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted: Option<bool>,
}
