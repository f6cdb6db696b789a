//! Client configuration.
//!
//! Two backend services (chat and game), each with a WebSocket endpoint and
//! a REST base URL. Values come from the environment, optionally seeded from
//! a `.env` file, and fall back to a local development deployment.
//!
//! | Variable                   | Default                                   |
//! |----------------------------|-------------------------------------------|
//! | `BADUK_CHAT_WS_URL`        | `ws://localhost:8082/ws-chat/websocket`   |
//! | `BADUK_CHAT_API_BASE`      | `http://localhost:8082/api`               |
//! | `BADUK_GAME_WS_URL`        | `ws://localhost:8081/ws-game/websocket`   |
//! | `BADUK_GAME_API_BASE`      | `http://localhost:8081/api`               |
//! | `BADUK_CONNECT_TIMEOUT_MS` | unset (transport default)                 |
//! | `BADUK_REQUEST_TIMEOUT_MS` | unset (transport default)                 |

use std::time::Duration;

pub const DEFAULT_CHAT_WS_URL: &str = "ws://localhost:8082/ws-chat/websocket";
pub const DEFAULT_CHAT_API_BASE: &str = "http://localhost:8082/api";
pub const DEFAULT_GAME_WS_URL: &str = "ws://localhost:8081/ws-game/websocket";
pub const DEFAULT_GAME_API_BASE: &str = "http://localhost:8081/api";

/// WebSocket and REST addresses of one backend service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoints {
    pub ws_url: String,
    pub api_base: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Chat service; also hosts the lobby topic.
    pub chat: ServiceEndpoints,
    pub game: ServiceEndpoints,
    /// Upper bound on the WebSocket + STOMP handshake. `None` relies on the
    /// transport default.
    pub connect_timeout: Option<Duration>,
    /// Upper bound on REST calls. `None` relies on the transport default.
    pub request_timeout: Option<Duration>,
}

impl ClientConfig {
    /// Local development deployment.
    pub fn local() -> Self {
        Self {
            chat: ServiceEndpoints {
                ws_url: DEFAULT_CHAT_WS_URL.to_string(),
                api_base: DEFAULT_CHAT_API_BASE.to_string(),
            },
            game: ServiceEndpoints {
                ws_url: DEFAULT_GAME_WS_URL.to_string(),
                api_base: DEFAULT_GAME_API_BASE.to_string(),
            },
            connect_timeout: None,
            request_timeout: None,
        }
    }

    /// Load `.env` (if present) and read overrides from the environment.
    pub fn from_env() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup, starting from [`ClientConfig::local`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::local();

        if let Some(v) = lookup("BADUK_CHAT_WS_URL") {
            config.chat.ws_url = v;
        }
        if let Some(v) = lookup("BADUK_CHAT_API_BASE") {
            config.chat.api_base = trim_base(v);
        }
        if let Some(v) = lookup("BADUK_GAME_WS_URL") {
            config.game.ws_url = v;
        }
        if let Some(v) = lookup("BADUK_GAME_API_BASE") {
            config.game.api_base = trim_base(v);
        }
        config.connect_timeout = parse_millis(&lookup, "BADUK_CONNECT_TIMEOUT_MS");
        config.request_timeout = parse_millis(&lookup, "BADUK_REQUEST_TIMEOUT_MS");

        config
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::local()
    }
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

fn parse_millis(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<Duration> {
    let raw = lookup(key)?;
    match raw.trim().parse::<u64>() {
        Ok(0) => {
            tracing::warn!("Ignoring {}=0; using the transport default", key);
            None
        }
        Ok(ms) => Some(Duration::from_millis(ms)),
        Err(_) => {
            tracing::warn!("Ignoring {}={:?}: not a number of milliseconds", key, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_are_local() {
        let config = ClientConfig::from_lookup(|_| None);
        assert_eq!(config, ClientConfig::local());
        assert_eq!(config.chat.api_base, "http://localhost:8082/api");
        assert_eq!(config.game.ws_url, "ws://localhost:8081/ws-game/websocket");
        assert_eq!(config.connect_timeout, None);
    }

    #[test]
    fn test_overrides() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("BADUK_GAME_WS_URL", "wss://go.example.com/ws-game/websocket"),
            ("BADUK_GAME_API_BASE", "https://go.example.com/api/"),
            ("BADUK_CONNECT_TIMEOUT_MS", "2500"),
        ]));

        assert_eq!(config.game.ws_url, "wss://go.example.com/ws-game/websocket");
        assert_eq!(config.game.api_base, "https://go.example.com/api");
        assert_eq!(config.connect_timeout, Some(Duration::from_millis(2500)));
        assert_eq!(config.chat, ClientConfig::local().chat);
    }

    #[test]
    fn test_invalid_timeout_is_ignored() {
        let config =
            ClientConfig::from_lookup(lookup_from(&[("BADUK_REQUEST_TIMEOUT_MS", "soon")]));
        assert_eq!(config.request_timeout, None);
    }

    #[test]
    fn test_zero_timeout_means_unset() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("BADUK_CONNECT_TIMEOUT_MS", "0"),
            ("BADUK_REQUEST_TIMEOUT_MS", " 0 "),
        ]));
        assert_eq!(config.connect_timeout, None);
        assert_eq!(config.request_timeout, None);
    }
}
