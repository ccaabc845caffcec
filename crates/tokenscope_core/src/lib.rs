//! Tokenscope core: pure client state machine and view-model helpers.
mod catalog;
mod effect;
mod log;
mod msg;
mod state;
mod update;
mod view_model;
mod visualize;

pub use catalog::{provider, ProviderInfo, DEFAULT_PROVIDER, EXAMPLE_TEXT, PROVIDERS};
pub use effect::Effect;
pub use log::{
    ApiLog, ApiLogEntry, CountRequest, LoggedRequest, LoggedResponse, RequestId, COUNT_TOKENS_URL,
};
pub use msg::Msg;
pub use state::{AppState, ProviderResult, FALLBACK_CURRENCY, FALLBACK_EXCHANGE_RATE};
pub use update::{update, DEBOUNCE_DELAY};
pub use view_model::{AppViewModel, ProviderTabView, VisualizationView};
pub use visualize::{
    is_whitespace, render_segments, token_color, token_hue, Hsl, RenderOptions, Segment,
    TokenMark, Visualization,
};
