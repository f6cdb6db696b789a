//! Data Transfer Objects (DTOs)
//!
//! Wire-format types for the REST endpoints. Room bodies are passed through
//! as raw JSON, so only the KataGo responses and the room-creation form are
//! typed here.

use serde::{Deserialize, Serialize};

/// Form body for `POST /rooms` (`application/x-www-form-urlencoded`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRoomForm {
    pub name: String,
}

/// Suggested move from `GET /katago/bluespots/{gameId}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlueSpot {
    pub x: i32,
    pub y: i32,
}

/// Scoring outcome from `GET /katago/score/{gameId}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub result: String,
}
