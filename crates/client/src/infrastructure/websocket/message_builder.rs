//! Outbound frame builder
//!
//! Centralizes turning typed actions into `(route, JSON body)` pairs so the
//! lobby, chat and game channels share one serialization path.

use baduk_protocol::routes::LOBBY_SUBSCRIBE;
use baduk_protocol::{ChatMessage, GameAction};

use crate::ports::outbound::ChannelError;

/// A serialized action ready to be handed to a STOMP session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundFrame {
    pub destination: String,
    pub body: String,
}

/// Builder for [`OutboundFrame`]s.
///
/// ```rust,ignore
/// let frame = FrameBuilder::game(GameAction::Undo, "g1", "alice")?;
/// channel.send(frame)?;
/// ```
pub struct FrameBuilder;

impl FrameBuilder {
    /// Chat frame (ENTER, TALK or LEAVE), all on the same route.
    pub fn chat(message: &ChatMessage) -> Result<OutboundFrame, ChannelError> {
        Ok(OutboundFrame {
            destination: message.route().to_string(),
            body: to_json(message)?,
        })
    }

    pub fn game(
        action: GameAction,
        game_id: &str,
        username: &str,
    ) -> Result<OutboundFrame, ChannelError> {
        Ok(OutboundFrame {
            destination: action.route().to_string(),
            body: to_json(&action.payload(game_id, username))?,
        })
    }

    /// Ask the lobby to push the current room list.
    pub fn lobby_subscribe() -> OutboundFrame {
        OutboundFrame {
            destination: LOBBY_SUBSCRIBE.to_string(),
            body: "{}".to_string(),
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, ChannelError> {
    serde_json::to_string(value).map_err(|e| ChannelError::Serialize(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use baduk_protocol::{BoardPoint, Negotiable};
    use serde_json::{json, Value};

    fn body(frame: &OutboundFrame) -> Value {
        serde_json::from_str(&frame.body).unwrap()
    }

    #[test]
    fn test_chat_talk() {
        let frame = FrameBuilder::chat(&ChatMessage::talk("r1", "alice", "hello")).unwrap();
        assert_eq!(frame.destination, "/app/chat.sendMessage");
        assert_eq!(
            body(&frame),
            json!({"type": "TALK", "roomId": "r1", "sender": "alice", "message": "hello"})
        );
    }

    #[test]
    fn test_game_move() {
        let point = BoardPoint::new(10, 4).unwrap();
        let frame = FrameBuilder::game(GameAction::Move(point), "g9", "bob").unwrap();
        assert_eq!(frame.destination, "/app/game/move");
        assert_eq!(body(&frame)["x"], 10);
        assert_eq!(body(&frame)["y"], 4);
    }

    #[test]
    fn test_game_respond() {
        let action = GameAction::Respond {
            kind: Negotiable::Score,
            accepted: true,
        };
        let frame = FrameBuilder::game(action, "g9", "bob").unwrap();
        assert_eq!(frame.destination, "/app/game/respond/score");
        assert_eq!(body(&frame)["accepted"], true);
    }

    #[test]
    fn test_lobby_subscribe_is_empty_object() {
        let frame = FrameBuilder::lobby_subscribe();
        assert_eq!(frame.destination, "/app/lobby.subscribe");
        assert_eq!(frame.body, "{}");
    }
}
