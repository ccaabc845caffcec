use std::sync::Once;

use pretty_assertions::assert_eq;
use tokenscope_core::{
    token_color, update, AppState, Effect, LoggedResponse, Msg, ProviderResult, RenderOptions,
    RequestId, Visualization, COUNT_TOKENS_URL, FALLBACK_CURRENCY, FALLBACK_EXCHANGE_RATE,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

/// Type `text`, let the debounce timer fire, and return the issued request id.
fn count(state: AppState, text: &str, timestamp: &str) -> (AppState, RequestId) {
    let (state, effects) = update(state, Msg::InputChanged(text.to_string()));
    let generation = match &effects[..] {
        [Effect::ScheduleRecount { generation, .. }] => *generation,
        other => panic!("unexpected effects {other:?}"),
    };
    let (state, effects) = update(
        state,
        Msg::DebounceElapsed {
            generation,
            timestamp: timestamp.to_string(),
        },
    );
    match &effects[..] {
        [Effect::CountTokens { request_id, .. }] => (state, *request_id),
        other => panic!("unexpected effects {other:?}"),
    }
}

fn succeed(
    state: AppState,
    request_id: RequestId,
    provider: &str,
    result: ProviderResult,
) -> AppState {
    let (state, effects) = update(
        state,
        Msg::CountSucceeded {
            request_id,
            provider: provider.to_string(),
            response: LoggedResponse {
                status: 200,
                body: format!(r#"{{"tokenCount":{}}}"#, result.token_count),
            },
            result,
        },
    );
    assert!(effects.is_empty());
    state
}

fn plain_result(token_count: u64, price: f64) -> ProviderResult {
    ProviderResult {
        token_count,
        price,
        visualization: None,
    }
}

#[test]
fn success_is_shown_and_logged() {
    init_logging();
    let (state, id) = count(AppState::new(), "hello world", "t1");
    assert!(state.view().loading);

    let state = succeed(state, id, "anthropic", plain_result(3, 0.000009));
    let view = state.view();

    assert!(!view.loading);
    assert_eq!(view.token_count, 3);
    assert_eq!(view.price_usd, 0.000009);
    assert_eq!(view.logs.len(), 1);

    let entry = &view.logs[0];
    assert_eq!(entry.id, id);
    assert_eq!(entry.timestamp, "t1");
    assert_eq!(entry.request.url, COUNT_TOKENS_URL);
    assert_eq!(entry.request.method, "POST");
    assert_eq!(
        entry.request.headers,
        vec![("Content-Type".to_string(), "application/json".to_string())]
    );
    assert_eq!(entry.request.body.text, "hello world");
    assert_eq!(
        entry.response,
        Some(LoggedResponse {
            status: 200,
            body: r#"{"tokenCount":3}"#.to_string(),
        })
    );
}

#[test]
fn failure_notifies_and_keeps_other_providers() {
    init_logging();
    let (state, first) = count(AppState::new(), "hello", "t1");
    let state = succeed(state, first, "anthropic", plain_result(2, 0.000006));

    let (state, effects) = update(state, Msg::TabSelected("cohere".to_string()));
    let generation = match &effects[..] {
        [Effect::ScheduleRecount { generation, .. }] => *generation,
        other => panic!("unexpected effects {other:?}"),
    };
    let (state, effects) = update(
        state,
        Msg::DebounceElapsed {
            generation,
            timestamp: "t2".to_string(),
        },
    );
    let second = match &effects[..] {
        [Effect::CountTokens { request_id, .. }] => *request_id,
        other => panic!("unexpected effects {other:?}"),
    };

    let (state, _) = update(
        state,
        Msg::CountFailed {
            request_id: second,
            provider: "cohere".to_string(),
            response: Some(LoggedResponse {
                status: 500,
                body: r#"{"error":"tokenizer crashed"}"#.to_string(),
            }),
            message: "tokenizer crashed".to_string(),
        },
    );

    let view = state.view();
    assert_eq!(view.notification.as_deref(), Some("tokenizer crashed"));
    assert!(!view.loading);
    assert_eq!(view.logs[0].response.as_ref().map(|r| r.status), Some(500));
    assert_eq!(state.result_for("anthropic"), Some(&plain_result(2, 0.000006)));
    assert_eq!(state.result_for("cohere"), None);

    let (state, _) = update(state, Msg::NotificationDismissed);
    assert_eq!(state.view().notification, None);
}

#[test]
fn network_failure_leaves_log_entry_without_response() {
    init_logging();
    let (state, id) = count(AppState::new(), "hello", "t1");
    let (state, _) = update(
        state,
        Msg::CountFailed {
            request_id: id,
            provider: "anthropic".to_string(),
            response: None,
            message: "connection refused".to_string(),
        },
    );
    let view = state.view();
    assert_eq!(view.logs.len(), 1);
    assert_eq!(view.logs[0].response, None);
    assert_eq!(view.notification.as_deref(), Some("connection refused"));
}

#[test]
fn log_is_newest_first_and_keeps_duplicates() {
    init_logging();
    let (state, first) = count(AppState::new(), "same", "t1");
    let (state, _) = update(state, Msg::InputChanged("other".to_string()));
    let (state, second) = count(state, "same", "t2");

    let view = state.view();
    let ids: Vec<RequestId> = view.logs.iter().map(|entry| entry.id).collect();
    assert_eq!(ids, vec![second, first]);
    assert_eq!(view.logs[0].request.body, view.logs[1].request.body);
    assert_eq!(view.logs[0].timestamp, "t2");
}

#[test]
fn stale_response_is_logged_but_not_shown() {
    init_logging();
    let (state, older) = count(AppState::new(), "first text", "t1");
    let (state, newer) = count(state, "second text", "t2");

    let state = succeed(state, newer, "anthropic", plain_result(5, 0.000015));
    let state = succeed(state, older, "anthropic", plain_result(99, 1.0));

    let view = state.view();
    assert_eq!(view.token_count, 5);
    assert!(view.logs.iter().all(|entry| entry.response.is_some()));
}

#[test]
fn responses_after_clear_are_ignored() {
    init_logging();
    let (state, id) = count(AppState::new(), "some text", "t1");
    let (state, _) = update(state, Msg::ClearClicked);
    let state = succeed(state, id, "anthropic", plain_result(4, 0.1));

    assert_eq!(state.view().token_count, 0);
    assert_eq!(state.log().len(), 1);
}

#[test]
fn switching_back_shows_cached_result_immediately() {
    init_logging();
    let (state, id) = count(AppState::new(), "hello", "t1");
    let state = succeed(state, id, "anthropic", plain_result(2, 0.000006));

    let (state, _) = update(state, Msg::TabSelected("mistral".to_string()));
    assert_eq!(state.view().token_count, 0);

    let (state, _) = update(state, Msg::TabSelected("anthropic".to_string()));
    assert_eq!(state.view().token_count, 2);
}

#[test]
fn exchange_rate_converts_price() {
    init_logging();
    let (state, id) = count(AppState::new(), "hello", "t1");
    let state = succeed(state, id, "anthropic", plain_result(100, 0.5));
    assert_eq!(state.view().currency, FALLBACK_CURRENCY);
    assert_eq!(state.view().price_local, Some(650.0));

    let (state, _) = update(state, Msg::ExchangeRateLoaded(1400.0));
    let view = state.view();
    assert_eq!(view.exchange_rate, Some(1400.0));
    assert_eq!(view.price_local, Some(700.0));

    let (state, _) = update(state, Msg::ExchangeRateLoaded(f64::NAN));
    assert_eq!(state.view().exchange_rate, Some(1400.0));
}

#[test]
fn failed_rate_lookup_keeps_fallback() {
    init_logging();
    let state = AppState::new();
    let (next, effects) = update(state.clone(), Msg::ExchangeRateFailed("offline".into()));

    assert_eq!(state, next);
    assert!(effects.is_empty());
    assert_eq!(next.view().exchange_rate, Some(FALLBACK_EXCHANGE_RATE));
}

#[test]
fn other_currencies_wait_for_a_live_rate() {
    init_logging();
    let state = AppState::new().with_currency("EUR");
    let (state, id) = count(state, "hello", "t1");
    let state = succeed(state, id, "anthropic", plain_result(100, 0.5));

    let (state, _) = update(state, Msg::ExchangeRateFailed("offline".into()));
    let view = state.view();
    assert_eq!(view.currency, "EUR");
    assert_eq!(view.exchange_rate, None);
    assert_eq!(view.price_local, None);
    assert_eq!(view.price_usd, 0.5);

    let (state, _) = update(state, Msg::ExchangeRateLoaded(0.9));
    assert_eq!(state.view().price_local, Some(0.45));
}

#[test]
fn visualization_colours_follow_non_whitespace_offsets() {
    init_logging();
    let (state, id) = count(AppState::new(), "ab cd", "t1");
    let state = succeed(state, id, "llama", plain_result(0, 0.0));
    // Wrong provider for the active tab: nothing displayed.
    assert!(state.view().visualization.is_none());

    let (state, id) = count(state, "ab cd ", "t2");
    let state = succeed(
        state,
        id,
        "anthropic",
        ProviderResult {
            token_count: 2,
            price: 0.000006,
            visualization: Some(Visualization {
                text: "ab cd".to_string(),
                token_ids: vec![370, 4484],
                tokens: vec!["ab".to_string(), " cd".to_string()],
                char_to_token: vec![Some(0), Some(0), Some(1), Some(1)],
            }),
        },
    );

    let vis = state.view().visualization.expect("visualization");
    assert_eq!(vis.token_ids, vec![370, 4484]);

    let rendered: Vec<(&str, Option<usize>)> = vis
        .segments
        .iter()
        .map(|s| (s.text.as_str(), s.token.as_ref().map(|t| t.index)))
        .collect();
    assert_eq!(
        rendered,
        vec![
            ("a", Some(0)),
            ("b", Some(0)),
            (" ", None),
            ("c", Some(1)),
            ("d", Some(1)),
        ]
    );
    let d = vis.segments[4].token.as_ref().expect("token mark");
    assert_eq!(d.color, token_color(1));
    assert_eq!(d.token.as_deref(), Some(" cd"));
}

#[test]
fn double_space_merge_is_opt_in_per_state() {
    init_logging();
    let state = AppState::new().with_render_options(RenderOptions {
        merge_double_spaces: true,
    });
    let (state, id) = count(state, "a  b", "t1");
    let state = succeed(
        state,
        id,
        "anthropic",
        ProviderResult {
            token_count: 2,
            price: 0.0,
            visualization: Some(Visualization {
                text: "a  b".to_string(),
                token_ids: vec![1, 2],
                tokens: vec!["a".to_string(), "  b".to_string()],
                char_to_token: vec![Some(0), Some(1)],
            }),
        },
    );

    let vis = state.view().visualization.expect("visualization");
    let texts: Vec<&str> = vis.segments.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(texts, vec!["a", "  ", "b"]);
    assert_eq!(vis.segments[1].token.as_ref().map(|t| t.index), Some(1));
}
