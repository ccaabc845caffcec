//! Environment-driven configuration for the server and the terminal client.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use engine_logging::LogDestination;

use crate::client::ClientSettings;
use crate::engine::EngineSettings;
use crate::exchange::ExchangeSettings;
use crate::subprocess::{SubprocessSettings, SubprocessTokenizer};
use crate::token::WhitespaceTokenizer;
use crate::TokenizerProvider;

pub const ENV_ADDR: &str = "TOKENSCOPE_ADDR";
pub const ENV_TOKENIZER: &str = "TOKENSCOPE_TOKENIZER";
pub const ENV_TOKENIZER_PROGRAM: &str = "TOKENSCOPE_TOKENIZER_PROGRAM";
pub const ENV_TOKENIZER_ARGS: &str = "TOKENSCOPE_TOKENIZER_ARGS";
pub const ENV_TOKENIZER_DIR: &str = "TOKENSCOPE_TOKENIZER_DIR";
pub const ENV_TOKENIZER_TIMEOUT_SECS: &str = "TOKENSCOPE_TOKENIZER_TIMEOUT_SECS";
pub const ENV_SERVER_URL: &str = "TOKENSCOPE_SERVER_URL";
pub const ENV_EXCHANGE_URL: &str = "TOKENSCOPE_EXCHANGE_URL";
pub const ENV_EXCHANGE_CURRENCY: &str = "TOKENSCOPE_EXCHANGE_CURRENCY";
pub const ENV_LOG: &str = "TOKENSCOPE_LOG";
pub const ENV_MERGE_DOUBLE_SPACES: &str = "TOKENSCOPE_MERGE_DOUBLE_SPACES";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid value `{value}` for {key}: {reason}")]
pub struct SettingsError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

impl SettingsError {
    fn new(key: &'static str, value: &str, reason: impl Into<String>) -> Self {
        Self {
            key,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenizerBackend {
    #[default]
    Subprocess,
    Builtin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSettings {
    pub bind_addr: SocketAddr,
    pub backend: TokenizerBackend,
    pub subprocess: SubprocessSettings,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            backend: TokenizerBackend::default(),
            subprocess: SubprocessSettings::default(),
        }
    }
}

impl ServiceSettings {
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SettingsError> {
        let mut settings = Self::default();

        if let Some(raw) = lookup(ENV_ADDR) {
            settings.bind_addr = raw
                .trim()
                .parse()
                .map_err(|err: std::net::AddrParseError| {
                    SettingsError::new(ENV_ADDR, &raw, err.to_string())
                })?;
        }
        if let Some(raw) = lookup(ENV_TOKENIZER) {
            settings.backend = match raw.trim().to_ascii_lowercase().as_str() {
                "subprocess" => TokenizerBackend::Subprocess,
                "builtin" => TokenizerBackend::Builtin,
                _ => {
                    return Err(SettingsError::new(
                        ENV_TOKENIZER,
                        &raw,
                        "expected `subprocess` or `builtin`",
                    ))
                }
            };
        }
        if let Some(raw) = lookup(ENV_TOKENIZER_PROGRAM).filter(|v| !v.trim().is_empty()) {
            settings.subprocess.program = raw.trim().to_string();
        }
        if let Some(raw) = lookup(ENV_TOKENIZER_ARGS) {
            settings.subprocess.args = raw.split_whitespace().map(str::to_string).collect();
        }
        if let Some(raw) = lookup(ENV_TOKENIZER_DIR).filter(|v| !v.trim().is_empty()) {
            settings.subprocess.working_dir = Some(PathBuf::from(raw.trim()));
        }
        if let Some(raw) = lookup(ENV_TOKENIZER_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|err: std::num::ParseIntError| {
                SettingsError::new(ENV_TOKENIZER_TIMEOUT_SECS, &raw, err.to_string())
            })?;
            settings.subprocess.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        Ok(settings)
    }

    pub fn build_provider(&self) -> Arc<dyn TokenizerProvider> {
        match self.backend {
            TokenizerBackend::Subprocess => {
                Arc::new(SubprocessTokenizer::new(self.subprocess.clone()))
            }
            TokenizerBackend::Builtin => Arc::new(WhitespaceTokenizer),
        }
    }
}

impl EngineSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut client = ClientSettings::default();
        let mut exchange = ExchangeSettings::default();
        if let Some(url) = lookup(ENV_SERVER_URL).filter(|v| !v.trim().is_empty()) {
            client.server_url = url.trim().to_string();
        }
        if let Some(url) = lookup(ENV_EXCHANGE_URL).filter(|v| !v.trim().is_empty()) {
            exchange.url = url.trim().to_string();
        }
        if let Some(currency) = lookup(ENV_EXCHANGE_CURRENCY).filter(|v| !v.trim().is_empty()) {
            exchange.currency = currency.trim().to_ascii_uppercase();
        }
        Self { client, exchange }
    }
}

/// Where a binary sends its log lines; `fallback` applies when the key is unset.
pub fn log_destination(
    lookup: impl Fn(&str) -> Option<String>,
    fallback: LogDestination,
) -> Result<LogDestination, SettingsError> {
    match lookup(ENV_LOG) {
        Some(raw) if !raw.trim().is_empty() => raw
            .parse()
            .map_err(|reason: String| SettingsError::new(ENV_LOG, &raw, reason)),
        _ => Ok(fallback),
    }
}

/// Whether the client renders a pair of spaces as one coloured unit.
pub fn merge_double_spaces(lookup: impl Fn(&str) -> Option<String>) -> Result<bool, SettingsError> {
    let Some(raw) = lookup(ENV_MERGE_DOUBLE_SPACES) else {
        return Ok(false);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" | "off" => Ok(false),
        "1" | "true" | "yes" | "on" => Ok(true),
        _ => Err(SettingsError::new(
            ENV_MERGE_DOUBLE_SPACES,
            &raw,
            "expected a boolean",
        )),
    }
}
