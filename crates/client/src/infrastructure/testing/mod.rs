//! Test doubles for the transport port.

mod fake_transport;
pub mod fixtures;

pub use fake_transport::{FakeConnector, RecordedFrame};
