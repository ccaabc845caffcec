use crate::log::ApiLogEntry;
use crate::visualize::Segment;

#[derive(Debug, Clone, PartialEq)]
pub struct AppViewModel {
    pub text: String,
    pub char_count: usize,
    pub active_provider: String,
    pub tabs: Vec<ProviderTabView>,
    pub token_count: u64,
    pub price_usd: f64,
    pub currency: String,
    /// Price converted at `exchange_rate`; `None` until a rate is known.
    pub price_local: Option<f64>,
    pub exchange_rate: Option<f64>,
    pub visualization: Option<VisualizationView>,
    /// Newest first.
    pub logs: Vec<ApiLogEntry>,
    pub notification: Option<String>,
    pub loading: bool,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderTabView {
    pub key: &'static str,
    pub name: &'static str,
    pub models: &'static [&'static str],
    pub selected_model: String,
    pub is_active: bool,
    pub note: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisualizationView {
    pub segments: Vec<Segment>,
    pub token_ids: Vec<i64>,
    pub tokens: Vec<String>,
}
