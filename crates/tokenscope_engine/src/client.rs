use serde_json::Value;

use crate::{TokenRequest, TokenResult, COUNT_TOKENS_PATH};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    /// Base URL of the token-count server, without a trailing path.
    pub server_url: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:3000".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    #[error("could not reach the token-count server: {0}")]
    Network(String),
    #[error("server answered {status} with an unreadable body: {message}")]
    InvalidBody { status: u16, message: String },
}

/// Raw answer of the endpoint: status plus JSON body, success or not.
#[derive(Debug, Clone, PartialEq)]
pub struct CountReply {
    pub status: u16,
    pub body: Value,
}

impl CountReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Interpret the body: a [`TokenResult`] on 2xx, otherwise the `error`
    /// message the server sent.
    pub fn result(&self) -> Result<TokenResult, String> {
        if !self.is_success() {
            let message = self
                .body
                .get("error")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("token count failed with status {}", self.status));
            return Err(message);
        }
        serde_json::from_value(self.body.clone())
            .map_err(|err| format!("unexpected token count body: {err}"))
    }
}

/// HTTP client for `POST /api/count-tokens`. No timeout and no retry: a
/// failed request is reported once.
#[derive(Debug, Clone)]
pub struct TokenCountClient {
    endpoint: String,
    client: reqwest::Client,
}

impl TokenCountClient {
    pub fn new(settings: &ClientSettings) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|err| ClientError::Network(err.to_string()))?;
        Ok(Self {
            endpoint: format!(
                "{}{}",
                settings.server_url.trim_end_matches('/'),
                COUNT_TOKENS_PATH
            ),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn count(&self, request: &TokenRequest) -> Result<CountReply, ClientError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|err| ClientError::Network(err.to_string()))?;

        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| ClientError::Network(err.to_string()))?;
        let body = serde_json::from_slice(&bytes).map_err(|err| ClientError::InvalidBody {
            status,
            message: err.to_string(),
        })?;
        Ok(CountReply { status, body })
    }
}
