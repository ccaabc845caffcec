use std::time::Duration;

use crate::catalog::EXAMPLE_TEXT;
use crate::{AppState, Effect, Msg};

/// Quiet period after the last edit before a recount is requested.
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(1000);

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::Started => vec![Effect::FetchExchangeRate],
        Msg::InputChanged(text) => {
            if state.set_text(text) {
                vec![schedule_recount(&mut state)]
            } else {
                Vec::new()
            }
        }
        Msg::ExampleClicked => {
            if state.set_text(EXAMPLE_TEXT.to_string()) {
                vec![schedule_recount(&mut state)]
            } else {
                Vec::new()
            }
        }
        Msg::ClearClicked => {
            // Cancels any pending recount; nothing to ask the server for.
            state.set_text(String::new());
            state.bump_generation();
            state.clear_results();
            Vec::new()
        }
        Msg::TabSelected(key) => {
            if state.select_provider(&key) {
                vec![schedule_recount(&mut state)]
            } else {
                Vec::new()
            }
        }
        Msg::ModelSelected { provider, model } => {
            let changed = state.select_model(&provider, &model);
            if changed && provider == state.active_provider() {
                vec![schedule_recount(&mut state)]
            } else {
                Vec::new()
            }
        }
        Msg::DebounceElapsed {
            generation,
            timestamp,
        } => {
            if generation != state.generation() {
                // Superseded by a later edit.
                Vec::new()
            } else if state.text().trim().is_empty() {
                state.zero_active();
                Vec::new()
            } else {
                let (request_id, request) = state.issue_request(timestamp);
                vec![Effect::CountTokens {
                    request_id,
                    request,
                }]
            }
        }
        Msg::CountSucceeded {
            request_id,
            provider,
            response,
            result,
        } => {
            state.apply_success(request_id, &provider, response, result);
            Vec::new()
        }
        Msg::CountFailed {
            request_id,
            provider: _,
            response,
            message,
        } => {
            state.apply_failure(request_id, response, message);
            Vec::new()
        }
        Msg::ExchangeRateLoaded(rate) => {
            state.set_exchange_rate(rate);
            Vec::new()
        }
        // Whatever rate was known stays in effect.
        Msg::ExchangeRateFailed(_) => Vec::new(),
        Msg::NotificationDismissed => {
            state.dismiss_notification();
            Vec::new()
        }
    };

    (state, effects)
}

fn schedule_recount(state: &mut AppState) -> Effect {
    Effect::ScheduleRecount {
        generation: state.bump_generation(),
        delay: DEBOUNCE_DELAY,
    }
}
