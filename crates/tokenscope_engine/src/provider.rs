use std::io;
use std::time::Duration;

use crate::{TokenQuery, TokenResult};

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("failed to start tokenizer `{program}`: {source}")]
    Spawn { program: String, source: io::Error },
    #[error("tokenizer io error: {0}")]
    Io(#[from] io::Error),
    #[error("tokenizer exited with {status}: {stderr}")]
    ProcessFailed { status: String, stderr: String },
    #[error("tokenizer did not answer within {0:?}")]
    Timeout(Duration),
    #[error("tokenizer produced no output")]
    NoOutput,
    #[error("tokenizer output is not valid JSON: {0}")]
    MalformedOutput(String),
    /// Failure reported by the tokenizer itself; the message is passed through verbatim.
    #[error("{0}")]
    Reported(String),
    #[error("tokenizer output is missing tokenCount")]
    MissingTokenCount,
    #[error("tokenizer returned an invalid tokenCount: {0}")]
    InvalidTokenCount(String),
}

/// Capability that turns text into a token count for one `(provider, model)`.
///
/// The concrete binding (a subprocess, an in-process estimator, a test stub)
/// is chosen at startup and shared by every request.
#[async_trait::async_trait]
pub trait TokenizerProvider: Send + Sync {
    async fn count(&self, query: &TokenQuery) -> Result<TokenResult, ProviderError>;
}
