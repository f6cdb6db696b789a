//! Baduk Protocol - Shared wire types for the game and chat backends
//!
//! This crate contains everything that crosses the wire:
//! - STOMP 1.2 text frames (the envelope carried in WebSocket text messages)
//! - Server routes and broadcast topics
//! - Chat and game action payloads (JSON frame bodies)
//! - REST DTOs for the room and KataGo endpoints
//!
//! # Design Principles
//!
//! 1. **Minimal dependencies** - Only serde, serde_json and thiserror
//! 2. **No runtime** - Pure data types, parsing and serialization
//! 3. **Validated at the edge** - Board coordinates cannot be built out of range

pub mod board;
pub mod dto;
pub mod messages;
pub mod routes;
pub mod stomp;

// =============================================================================
// STOMP Framing
// =============================================================================
pub use stomp::{Command, Frame, FrameError};

// =============================================================================
// Board Types
// =============================================================================
pub use board::{BoardPoint, Coordinate, CoordinateError, BOARD_SIZE};

// =============================================================================
// Action Payloads
// =============================================================================
pub use messages::{ChatMessage, ChatMessageType, GameAction, GamePayload, Negotiable};

// =============================================================================
// REST DTOs
// =============================================================================
pub use dto::{BlueSpot, CreateRoomForm, ScoreResult};
