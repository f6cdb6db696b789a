//! Ports - the boundaries between channel logic and the outside world.

pub mod outbound;
