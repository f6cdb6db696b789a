//! Channel facades
//!
//! Each facade wires a [`ChannelSpec`](crate::infrastructure::ChannelSpec)
//! for one service topic and exposes that channel's actions:
//! - `lobby`: room-list updates
//! - `chat`: one chat room
//! - `game`: one game room, including negotiated actions
//! - `negotiation`: local proposal bookkeeping used by `game`

pub mod chat;
pub mod game;
pub mod lobby;
pub mod negotiation;

pub use chat::ChatChannel;
pub use game::GameChannel;
pub use lobby::LobbyChannel;
pub use negotiation::{Negotiator, ProposalState};
