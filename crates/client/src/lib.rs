//! Baduk Client - STOMP channels and REST clients for the baduk platform
//!
//! # Layers
//!
//! - `ports`: transport and event-sink contracts plus the error types
//! - `infrastructure`: WebSocket/STOMP adapter, the generic channel client,
//!   REST clients and test doubles
//! - `application`: typed lobby, chat and game channels, proposal tracking
//!   and the console command parser
//! - `config`: service endpoints and timeouts from the environment

pub mod application;
pub mod config;
pub mod infrastructure;
pub mod ports;

pub use application::{ChatChannel, GameChannel, LobbyChannel, ProposalState};
pub use config::{ClientConfig, ServiceEndpoints};
pub use infrastructure::http_client::{ChatApi, GameApi};
pub use infrastructure::ConnectionState;
pub use ports::outbound::{ApiError, ChannelError, EventSink, FnSink, TransportError};
