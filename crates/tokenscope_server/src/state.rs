use std::sync::Arc;

use tokenscope_engine::{TokenCountService, TokenizerProvider};

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub service: TokenCountService,
}

impl AppState {
    pub fn new(provider: Arc<dyn TokenizerProvider>) -> Self {
        Self {
            service: TokenCountService::new(provider),
        }
    }
}
