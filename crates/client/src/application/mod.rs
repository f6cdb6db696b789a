//! Application layer - channel facades and the console command parser

pub mod channels;
pub mod console;

pub use channels::{ChatChannel, GameChannel, LobbyChannel, Negotiator, ProposalState};
pub use console::{ConsoleCommand, ParseError};
