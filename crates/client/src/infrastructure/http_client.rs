//! REST clients for the chat rooms and the KataGo analysis endpoints
//!
//! Each call issues one request and decodes the full JSON body. Nothing is
//! retried; a non-2xx status becomes [`ApiError::Status`] with the server's
//! response text attached.

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

use baduk_protocol::{BlueSpot, CreateRoomForm, ScoreResult};

use crate::config::ClientConfig;
use crate::ports::outbound::ApiError;

fn build_client(timeout: Option<Duration>) -> Client {
    let mut builder = Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().unwrap_or_else(|_| Client::new())
}

async fn read_json<T: DeserializeOwned>(
    response: Result<Response, reqwest::Error>,
    action: &'static str,
) -> Result<T, ApiError> {
    let response = response.map_err(|e| ApiError::RequestFailed {
        action,
        message: e.to_string(),
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::error!("{} failed with {}: {}", action, status, body);
        return Err(ApiError::Status {
            action,
            status: status.as_u16(),
            body,
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::InvalidResponse {
            action,
            message: e.to_string(),
        })
}

/// Chat room listing and creation.
#[derive(Clone)]
pub struct ChatApi {
    client: Client,
    base_url: String,
}

impl ChatApi {
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_base_url(&config.chat.api_base, config.request_timeout)
    }

    pub fn with_base_url(base_url: &str, timeout: Option<Duration>) -> Self {
        Self {
            client: build_client(timeout),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// `GET /rooms`
    pub async fn get_rooms(&self) -> Result<Vec<Value>, ApiError> {
        let response = self
            .client
            .get(format!("{}/rooms", self.base_url))
            .send()
            .await;
        read_json(response, "room listing").await
    }

    /// `POST /rooms` with a form-encoded `name`.
    pub async fn create_room(&self, name: &str) -> Result<Value, ApiError> {
        let form = CreateRoomForm {
            name: name.to_string(),
        };
        let response = self
            .client
            .post(format!("{}/rooms", self.base_url))
            .form(&form)
            .send()
            .await;
        read_json(response, "room creation").await
    }

    /// `GET /rooms/{roomId}`
    pub async fn get_room(&self, room_id: &str) -> Result<Value, ApiError> {
        let response = self
            .client
            .get(format!("{}/rooms/{}", self.base_url, room_id))
            .send()
            .await;
        read_json(response, "room lookup").await
    }
}

/// KataGo move suggestions and position scoring for a game room.
#[derive(Clone)]
pub struct GameApi {
    client: Client,
    base_url: String,
}

impl GameApi {
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_base_url(&config.game.api_base, config.request_timeout)
    }

    pub fn with_base_url(base_url: &str, timeout: Option<Duration>) -> Self {
        Self {
            client: build_client(timeout),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// `GET /katago/bluespots/{gameId}`
    pub async fn get_blue_spots(&self, game_id: &str) -> Result<BlueSpot, ApiError> {
        let response = self
            .client
            .get(format!("{}/katago/bluespots/{}", self.base_url, game_id))
            .send()
            .await;
        read_json(response, "move suggestion").await
    }

    /// `GET /katago/score/{gameId}`
    pub async fn get_score(&self, game_id: &str) -> Result<ScoreResult, ApiError> {
        let response = self
            .client
            .get(format!("{}/katago/score/{}", self.base_url, game_id))
            .send()
            .await;
        read_json(response, "score estimate").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::testing::fixtures::{api_request_failed, fake_config};

    #[test]
    fn test_clients_use_configured_bases() {
        let config = fake_config();
        assert_eq!(ChatApi::new(&config).base_url, "http://chat.test/api");
        assert_eq!(GameApi::new(&config).base_url, "http://game.test/api");
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let api = GameApi::with_base_url("http://localhost:8081/api/", None);
        assert_eq!(api.base_url, "http://localhost:8081/api");
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            api_request_failed("connection refused").to_string(),
            "test request failed: connection refused"
        );
        let status = ApiError::Status {
            action: "score estimate",
            status: 500,
            body: "katago offline".to_string(),
        };
        assert_eq!(status.to_string(), "score estimate failed with status 500");
        assert_eq!(status.body(), Some("katago offline"));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_request_failed() {
        let api = ChatApi::with_base_url("http://127.0.0.1:1", Some(Duration::from_secs(2)));
        let err = api.get_rooms().await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::RequestFailed {
                action: "room listing",
                ..
            }
        ));
    }
}
