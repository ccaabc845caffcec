use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::{self, PROVIDERS};
use crate::log::{ApiLog, ApiLogEntry, CountRequest, LoggedRequest, LoggedResponse, RequestId};
use crate::view_model::{AppViewModel, ProviderTabView, VisualizationView};
use crate::visualize::{render_segments, RenderOptions, Visualization};

/// Currency the fallback rate is quoted in.
pub const FALLBACK_CURRENCY: &str = "KRW";
/// KRW per USD used until a live rate arrives. Other currencies start without a rate.
pub const FALLBACK_EXCHANGE_RATE: f64 = 1300.0;

/// Last count shown for one provider.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProviderResult {
    pub token_count: u64,
    pub price: f64,
    pub visualization: Option<Visualization>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    text: String,
    active_provider: String,
    selected_models: BTreeMap<String, String>,
    results: BTreeMap<String, ProviderResult>,
    /// Only the timer carrying this generation may trigger a recount.
    generation: u64,
    next_request_id: RequestId,
    /// Newest request issued per provider; older answers are logged but not shown.
    latest_request: BTreeMap<String, RequestId>,
    in_flight: BTreeSet<RequestId>,
    log: ApiLog,
    currency: String,
    /// Local currency per USD, if known.
    exchange_rate: Option<f64>,
    notification: Option<String>,
    render_options: RenderOptions,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            text: String::new(),
            active_provider: catalog::DEFAULT_PROVIDER.to_string(),
            selected_models: PROVIDERS
                .iter()
                .map(|p| (p.key.to_string(), p.default_model().to_string()))
                .collect(),
            results: BTreeMap::new(),
            generation: 0,
            next_request_id: 1,
            latest_request: BTreeMap::new(),
            in_flight: BTreeSet::new(),
            log: ApiLog::default(),
            currency: FALLBACK_CURRENCY.to_string(),
            exchange_rate: Some(FALLBACK_EXCHANGE_RATE),
            notification: None,
            render_options: RenderOptions::default(),
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render_options = options;
        self
    }

    /// Convert prices into `currency`. The fallback rate only applies to KRW.
    pub fn with_currency(mut self, currency: &str) -> Self {
        self.exchange_rate = (currency == FALLBACK_CURRENCY).then_some(FALLBACK_EXCHANGE_RATE);
        self.currency = currency.to_string();
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn active_provider(&self) -> &str {
        &self.active_provider
    }

    pub fn selected_model(&self, provider: &str) -> Option<&str> {
        self.selected_models.get(provider).map(String::as_str)
    }

    pub fn result_for(&self, provider: &str) -> Option<&ProviderResult> {
        self.results.get(provider)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn log(&self) -> &ApiLog {
        &self.log
    }

    pub fn view(&self) -> AppViewModel {
        let active = self.results.get(&self.active_provider);
        let token_count = active.map_or(0, |r| r.token_count);
        let price_usd = active.map_or(0.0, |r| r.price);

        let tabs = PROVIDERS
            .iter()
            .map(|p| ProviderTabView {
                key: p.key,
                name: p.name,
                models: p.models,
                selected_model: self
                    .selected_model(p.key)
                    .unwrap_or_else(|| p.default_model())
                    .to_string(),
                is_active: p.key == self.active_provider,
                note: p.note,
            })
            .collect();

        let visualization = active
            .and_then(|r| r.visualization.as_ref())
            .map(|vis| VisualizationView {
                segments: render_segments(vis, self.render_options),
                token_ids: vis.token_ids.clone(),
                tokens: vis.tokens.clone(),
            });

        AppViewModel {
            text: self.text.clone(),
            char_count: self.text.chars().count(),
            active_provider: self.active_provider.clone(),
            tabs,
            token_count,
            price_usd,
            currency: self.currency.clone(),
            price_local: self.exchange_rate.map(|rate| price_usd * rate),
            exchange_rate: self.exchange_rate,
            visualization,
            logs: self.log.iter().cloned().collect(),
            notification: self.notification.clone(),
            loading: !self.in_flight.is_empty(),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Replace the text. Returns false when it is unchanged.
    pub(crate) fn set_text(&mut self, text: String) -> bool {
        if self.text == text {
            return false;
        }
        self.text = text;
        self.mark_dirty();
        true
    }

    /// Invalidate any pending timer and return the generation for a new one.
    pub(crate) fn bump_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    pub(crate) fn select_provider(&mut self, key: &str) -> bool {
        if self.active_provider == key || catalog::provider(key).is_none() {
            return false;
        }
        self.active_provider = key.to_string();
        self.mark_dirty();
        true
    }

    pub(crate) fn select_model(&mut self, provider: &str, model: &str) -> bool {
        let Some(info) = catalog::provider(provider) else {
            return false;
        };
        if !info.offers(model) || self.selected_model(provider) == Some(model) {
            return false;
        }
        self.selected_models
            .insert(provider.to_string(), model.to_string());
        self.mark_dirty();
        true
    }

    /// Forget every provider's result and ignore answers still in flight.
    pub(crate) fn clear_results(&mut self) {
        self.results.clear();
        self.latest_request.clear();
        self.mark_dirty();
    }

    /// Show zero for the active provider without asking the server.
    pub(crate) fn zero_active(&mut self) {
        let provider = self.active_provider.clone();
        self.latest_request.remove(&provider);
        self.results.insert(provider, ProviderResult::default());
        self.mark_dirty();
    }

    /// Log and register a count request for the active provider.
    pub(crate) fn issue_request(&mut self, timestamp: String) -> (RequestId, CountRequest) {
        let request_id = self.next_request_id;
        self.next_request_id += 1;

        let provider = self.active_provider.clone();
        let model = self
            .selected_model(&provider)
            .map(str::to_string)
            .or_else(|| catalog::provider(&provider).map(|p| p.default_model().to_string()))
            .unwrap_or_default();
        let request = CountRequest {
            text: self.text.clone(),
            provider: provider.clone(),
            model,
            visualize: true,
        };

        self.log.record(ApiLogEntry {
            id: request_id,
            timestamp,
            request: LoggedRequest::post_json(crate::log::COUNT_TOKENS_URL, request.clone()),
            response: None,
        });
        self.latest_request.insert(provider, request_id);
        self.in_flight.insert(request_id);
        self.mark_dirty();
        (request_id, request)
    }

    pub(crate) fn apply_success(
        &mut self,
        request_id: RequestId,
        provider: &str,
        response: LoggedResponse,
        result: ProviderResult,
    ) {
        self.finish_request(request_id, Some(response));
        if self.latest_request.get(provider) == Some(&request_id) {
            self.results.insert(provider.to_string(), result);
        }
    }

    pub(crate) fn apply_failure(
        &mut self,
        request_id: RequestId,
        response: Option<LoggedResponse>,
        message: String,
    ) {
        self.finish_request(request_id, response);
        self.notification = Some(message);
    }

    fn finish_request(&mut self, request_id: RequestId, response: Option<LoggedResponse>) {
        self.in_flight.remove(&request_id);
        if let Some(response) = response {
            self.log.attach_response(request_id, response);
        }
        self.mark_dirty();
    }

    pub(crate) fn set_exchange_rate(&mut self, rate: f64) {
        if rate.is_finite() && rate > 0.0 {
            self.exchange_rate = Some(rate);
            self.mark_dirty();
        }
    }

    pub(crate) fn dismiss_notification(&mut self) {
        if self.notification.take().is_some() {
            self.mark_dirty();
        }
    }
}
