use std::sync::Arc;

use engine_logging::{engine_info, engine_warn};

use crate::{ProviderError, TokenQuery, TokenRequest, TokenResult, TokenizerProvider};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Validates count requests and forwards them to the configured provider.
#[derive(Clone)]
pub struct TokenCountService {
    provider: Arc<dyn TokenizerProvider>,
}

impl TokenCountService {
    pub fn new(provider: Arc<dyn TokenizerProvider>) -> Self {
        Self { provider }
    }

    pub async fn count(&self, request: TokenRequest) -> Result<TokenResult, ServiceError> {
        let query = validate_request(request)?;
        engine_info!(
            "Counting tokens provider={} model={} text_len={} visualize={}",
            query.provider,
            query.model,
            query.text.len(),
            query.visualize
        );

        let mut result = self.provider.count(&query).await?;

        if !query.visualize {
            result.visualization = None;
        } else if let Some(Err(err)) = result.visualization.as_ref().map(|vis| vis.validate()) {
            // Renderers tolerate missing ids and out-of-range indices.
            engine_warn!(
                "Keeping inconsistent visualization from provider={}: {}",
                query.provider,
                err
            );
        }

        engine_info!(
            "Counted provider={} model={} tokens={} price={}",
            query.provider,
            query.model,
            result.token_count,
            result.price
        );
        Ok(result)
    }
}

/// Turn a wire request into a query, naming every missing or empty field.
pub fn validate_request(request: TokenRequest) -> Result<TokenQuery, ServiceError> {
    let TokenRequest {
        text,
        provider,
        model,
        visualize,
    } = request;

    let present = |value: Option<String>| value.filter(|v| !v.is_empty());
    let (text, provider, model) = (present(text), present(provider), present(model));

    match (text, provider, model) {
        (Some(text), Some(provider), Some(model)) => Ok(TokenQuery {
            text,
            provider,
            model,
            visualize,
        }),
        (text, provider, model) => {
            let missing: Vec<&str> = [
                ("text", text.is_none()),
                ("provider", provider.is_none()),
                ("model", model.is_none()),
            ]
            .into_iter()
            .filter_map(|(name, absent)| absent.then_some(name))
            .collect();
            Err(ServiceError::Validation(format!(
                "text, provider and model are required (missing: {})",
                missing.join(", ")
            )))
        }
    }
}
