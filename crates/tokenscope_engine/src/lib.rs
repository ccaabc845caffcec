//! Tokenscope engine: token-count service, tokenizer bindings and client IO.
mod client;
mod engine;
mod exchange;
mod parse;
mod pricing;
mod provider;
mod service;
mod settings;
mod subprocess;
mod token;
mod types;

pub use client::{ClientError, ClientSettings, CountReply, TokenCountClient};
pub use engine::{
    ChannelEventSink, EngineError, EngineEvent, EngineHandle, EngineSettings, EventSink, RequestId,
};
pub use exchange::{extract_rate, ExchangeError, ExchangeRateClient, ExchangeSettings};
pub use parse::{parse_provider_output, REPORTED_FAILURE_FALLBACK};
pub use pricing::{estimate_price, price_per_1k_tokens};
pub use provider::{ProviderError, TokenizerProvider};
pub use service::{validate_request, ServiceError, TokenCountService};
pub use settings::{
    log_destination, merge_double_spaces, ServiceSettings, SettingsError, TokenizerBackend,
};
pub use subprocess::{SubprocessSettings, SubprocessTokenizer};
pub use token::{is_layout_whitespace, WhitespaceTokenizer};
pub use types::{
    TokenQuery, TokenRequest, TokenResult, Visualization, VisualizationError, COUNT_TOKENS_PATH,
};
