use engine_logging::engine_warn;
use serde_json::Value;

use crate::{ProviderError, TokenResult, Visualization};

/// Generic message used when the tokenizer reports failure without saying why.
pub const REPORTED_FAILURE_FALLBACK: &str = "tokenizer reported a failure";

/// Parse one line of tokenizer output.
///
/// Accepts `{"success": false, "error": "..."}` or a payload carrying
/// `tokenCount` with optional `price` and `visualization`. A visualization
/// that does not deserialize is dropped rather than failing the whole count.
pub fn parse_provider_output(line: &str) -> Result<TokenResult, ProviderError> {
    let value: Value = serde_json::from_str(line.trim())
        .map_err(|err| ProviderError::MalformedOutput(err.to_string()))?;
    let object = value
        .as_object()
        .ok_or_else(|| ProviderError::MalformedOutput("expected a JSON object".to_string()))?;

    if object.get("success").and_then(Value::as_bool) == Some(false) {
        let message = object
            .get("error")
            .and_then(Value::as_str)
            .filter(|message| !message.is_empty())
            .unwrap_or(REPORTED_FAILURE_FALLBACK);
        return Err(ProviderError::Reported(message.to_string()));
    }

    let token_count = match object.get("tokenCount") {
        None | Some(Value::Null) => return Err(ProviderError::MissingTokenCount),
        Some(raw) => as_count(raw).ok_or_else(|| ProviderError::InvalidTokenCount(raw.to_string()))?,
    };

    let price = match object.get("price") {
        None | Some(Value::Null) => 0.0,
        Some(raw) => match raw.as_f64() {
            Some(price) if price.is_finite() && price >= 0.0 => price,
            _ => {
                engine_warn!("Ignoring invalid price {} from tokenizer", raw);
                0.0
            }
        },
    };

    let visualization = match object.get("visualization") {
        None | Some(Value::Null) => None,
        Some(raw) => match serde_json::from_value::<Visualization>(raw.clone()) {
            Ok(vis) => Some(vis),
            Err(err) => {
                engine_warn!("Dropping unreadable visualization from tokenizer: {}", err);
                None
            }
        },
    };

    Ok(TokenResult {
        token_count,
        price,
        visualization,
    })
}

fn as_count(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|n| *n >= 0.0 && n.fract() == 0.0 && *n <= u64::MAX as f64)
            .map(|n| n as u64)
    })
}
