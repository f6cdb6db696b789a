//! Outbound ports - Interfaces for external services
//!
//! These ports define the contracts that infrastructure adapters must implement,
//! allowing the channel clients to be driven by a real WebSocket or by an
//! in-memory fake in tests.

pub mod error;
pub mod event_sink;
pub mod transport_port;

pub use error::{ApiError, ChannelError, TransportError};
pub use event_sink::{EventSink, FnSink};
pub use transport_port::{FrameHandler, StompConnector, StompSession};

#[cfg(any(test, feature = "testing"))]
pub use event_sink::MockEventSink;
