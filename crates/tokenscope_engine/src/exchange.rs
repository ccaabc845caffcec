use std::time::Duration;

use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeSettings {
    pub url: String,
    /// Currency to convert USD prices into.
    pub currency: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ExchangeSettings {
    fn default() -> Self {
        Self {
            url: "https://api.exchangerate-api.com/v4/latest/USD".to_string(),
            currency: "KRW".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExchangeError {
    #[error("exchange rate request failed: {0}")]
    Network(String),
    #[error("exchange rate request timed out")]
    Timeout,
    #[error("exchange rate service answered http status {0}")]
    HttpStatus(u16),
    #[error("exchange rate body is not JSON: {0}")]
    InvalidBody(String),
    #[error("exchange rate for {0} is missing")]
    MissingRate(String),
}

/// Looks up how many units of the configured currency one USD buys.
#[derive(Debug, Clone)]
pub struct ExchangeRateClient {
    settings: ExchangeSettings,
    client: reqwest::Client,
}

impl ExchangeRateClient {
    pub fn new(settings: ExchangeSettings) -> Result<Self, ExchangeError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ExchangeError::Network(err.to_string()))?;
        Ok(Self { settings, client })
    }

    pub fn currency(&self) -> &str {
        &self.settings.currency
    }

    pub async fn fetch_rate(&self) -> Result<f64, ExchangeError> {
        let response = self
            .client
            .get(&self.settings.url)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExchangeError::HttpStatus(status.as_u16()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|err| ExchangeError::InvalidBody(err.to_string()))?;
        extract_rate(&body, &self.settings.currency)
    }
}

/// Reads `USD.<currency>`, falling back to the `rates.<currency>` layout.
pub fn extract_rate(body: &Value, currency: &str) -> Result<f64, ExchangeError> {
    ["USD", "rates"]
        .iter()
        .filter_map(|section| body.get(*section)?.get(currency)?.as_f64())
        .find(|rate| rate.is_finite() && *rate > 0.0)
        .ok_or_else(|| ExchangeError::MissingRate(currency.to_string()))
}

fn map_reqwest_error(err: reqwest::Error) -> ExchangeError {
    if err.is_timeout() {
        return ExchangeError::Timeout;
    }
    ExchangeError::Network(err.to_string())
}
