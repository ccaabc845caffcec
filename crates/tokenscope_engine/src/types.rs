use serde::{Deserialize, Serialize};

/// Path of the token-count endpoint, shared by the server and the client.
pub const COUNT_TOKENS_PATH: &str = "/api/count-tokens";

/// Body of `POST /api/count-tokens`.
///
/// String fields are optional on the wire so that a missing field can be
/// reported as a validation error instead of a deserialization failure.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default)]
    pub visualize: bool,
}

impl TokenRequest {
    pub fn new(
        text: impl Into<String>,
        provider: impl Into<String>,
        model: impl Into<String>,
        visualize: bool,
    ) -> Self {
        Self {
            text: Some(text.into()),
            provider: Some(provider.into()),
            model: Some(model.into()),
            visualize,
        }
    }
}

/// A validated request, as handed to a [`crate::TokenizerProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenQuery {
    pub text: String,
    pub provider: String,
    pub model: String,
    pub visualize: bool,
}

/// Token count, price and optional visualization for one text.
///
/// This is both what a provider produces and the success body of the
/// endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResult {
    pub token_count: u64,
    #[serde(default)]
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visualization: Option<Visualization>,
}

/// Per-character token membership reported by a tokenizer.
///
/// `char_to_token` has one entry per non-whitespace character of `text`.
/// Entries are `None` where the tokenizer could not attribute a character.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visualization {
    pub text: String,
    #[serde(default)]
    pub token_ids: Vec<i64>,
    #[serde(default)]
    pub tokens: Vec<String>,
    #[serde(default)]
    pub char_to_token: Vec<Option<usize>>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VisualizationError {
    #[error("tokenIds has {ids} entries but tokens has {tokens}")]
    LengthMismatch { ids: usize, tokens: usize },
    #[error("charToToken[{position}] = {index} is out of range for {tokens} tokens")]
    IndexOutOfRange {
        position: usize,
        index: usize,
        tokens: usize,
    },
}

impl Visualization {
    /// Checks that ids and tokens line up and that every mapped character
    /// points at an existing token.
    pub fn validate(&self) -> Result<(), VisualizationError> {
        if self.token_ids.len() != self.tokens.len() {
            return Err(VisualizationError::LengthMismatch {
                ids: self.token_ids.len(),
                tokens: self.tokens.len(),
            });
        }
        for (position, entry) in self.char_to_token.iter().enumerate() {
            if let Some(index) = *entry {
                if index >= self.tokens.len() {
                    return Err(VisualizationError::IndexOutOfRange {
                        position,
                        index,
                        tokens: self.tokens.len(),
                    });
                }
            }
        }
        Ok(())
    }
}
