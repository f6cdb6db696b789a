//! Server routes (`/app/...`) and broadcast topics (`/topic/...`)

/// Route for every chat action (ENTER, TALK, LEAVE).
pub const CHAT_SEND_MESSAGE: &str = "/app/chat.sendMessage";

/// Route asking the lobby to push its current room list.
pub const LOBBY_SUBSCRIBE: &str = "/app/lobby.subscribe";

/// Topic carrying lobby room-list updates.
pub const LOBBY_TOPIC: &str = "/topic/lobby";

/// Subscription header identifying the participant to the server.
pub const USERNAME_HEADER: &str = "username";

pub fn chat_room_topic(room_id: &str) -> String {
    format!("/topic/chat/room/{}", room_id)
}

pub fn game_topic(game_id: &str) -> String {
    format!("/topic/game.{}", game_id)
}
