//! Event sink for inbound topic messages.
//!
//! Each channel has exactly one sink. Bodies are parsed to JSON and handed
//! over unchanged; the sink decides what they mean.

use serde_json::Value;

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait EventSink: Send + Sync {
    /// Called for every inbound message that parsed as JSON.
    fn on_event(&self, event: Value);

    /// Called when an inbound body is not valid JSON. The subscription stays
    /// active.
    fn on_malformed(&self, raw: &str, error: &str) {
        let _ = (raw, error);
    }
}

/// Adapts a closure into an [`EventSink`].
pub struct FnSink<F> {
    callback: F,
}

impl<F> FnSink<F>
where
    F: Fn(Value) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> EventSink for FnSink<F>
where
    F: Fn(Value) + Send + Sync,
{
    fn on_event(&self, event: Value) {
        (self.callback)(event)
    }
}
