//! Simple test fixtures used across unit tests.

use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::config::{ClientConfig, ServiceEndpoints};
use crate::ports::outbound::{ApiError, FnSink};

pub fn api_request_failed(msg: &str) -> ApiError {
    ApiError::RequestFailed {
        action: "test request",
        message: msg.to_string(),
    }
}

/// Config pointing at unroutable fake endpoints.
pub fn fake_config() -> ClientConfig {
    ClientConfig {
        chat: ServiceEndpoints {
            ws_url: "ws://chat.test/ws-chat/websocket".to_string(),
            api_base: "http://chat.test/api".to_string(),
        },
        game: ServiceEndpoints {
            ws_url: "ws://game.test/ws-game/websocket".to_string(),
            api_base: "http://game.test/api".to_string(),
        },
        connect_timeout: None,
        request_timeout: None,
    }
}

/// Sink that stores every event it receives.
pub fn collecting_sink() -> (
    Arc<FnSink<impl Fn(Value) + Send + Sync>>,
    Arc<Mutex<Vec<Value>>>,
) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let store = Arc::clone(&events);
    let sink = FnSink::new(move |event| {
        store.lock().unwrap_or_else(|e| e.into_inner()).push(event);
    });
    (Arc::new(sink), events)
}
