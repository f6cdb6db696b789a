//! Channel messaging infrastructure.
//!
//! - `connection`: lock-free connection state shared with the transport
//! - `channel`: the generic connect/subscribe/act/leave client

pub mod channel;
pub mod connection;

pub use channel::{ChannelClient, ChannelSpec};
pub use connection::{ConnectionState, SharedConnectionState};
