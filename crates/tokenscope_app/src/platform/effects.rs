use std::sync::{mpsc, Arc};

use chrono::Utc;
use engine_logging::{engine_info, engine_warn};
use tokenscope_core::{Effect, LoggedResponse, Msg, ProviderResult, Visualization};
use tokenscope_engine::{
    ClientError, CountReply, EngineError, EngineEvent, EngineHandle, EngineSettings, EventSink,
    TokenRequest, TokenResult,
};

use super::app::AppEvent;

/// Runs effects on the engine and feeds its events back as messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(settings: EngineSettings, tx: mpsc::Sender<AppEvent>) -> Result<Self, EngineError> {
        let engine = EngineHandle::new(settings, Arc::new(MsgSink { tx }))?;
        Ok(Self { engine })
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::ScheduleRecount { generation, delay } => {
                    self.engine.schedule_timer(generation, delay);
                }
                Effect::CountTokens {
                    request_id,
                    request,
                } => {
                    engine_info!(
                        "CountTokens request_id={} provider={} model={} text_len={}",
                        request_id,
                        request.provider,
                        request.model,
                        request.text.len()
                    );
                    self.engine.count_tokens(
                        request_id,
                        TokenRequest::new(
                            request.text,
                            request.provider,
                            request.model,
                            request.visualize,
                        ),
                    );
                }
                Effect::FetchExchangeRate => self.engine.fetch_exchange_rate(),
            }
        }
    }
}

struct MsgSink {
    tx: mpsc::Sender<AppEvent>,
}

impl EventSink for MsgSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(AppEvent::Msg(map_event(event)));
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::TimerElapsed { generation } => Msg::DebounceElapsed {
            generation,
            timestamp: Utc::now().to_rfc3339(),
        },
        EngineEvent::CountCompleted {
            request_id,
            provider,
            result,
        } => map_count(request_id, provider, result),
        EngineEvent::ExchangeRate(Ok(rate)) => Msg::ExchangeRateLoaded(rate),
        EngineEvent::ExchangeRate(Err(err)) => Msg::ExchangeRateFailed(err.to_string()),
    }
}

fn map_count(request_id: u64, provider: String, result: Result<CountReply, ClientError>) -> Msg {
    let reply = match result {
        Ok(reply) => reply,
        Err(ClientError::InvalidBody { status, message }) => {
            let response = LoggedResponse {
                status,
                body: message.clone(),
            };
            return Msg::CountFailed {
                request_id,
                provider,
                response: Some(response),
                message: format!("unreadable response from server: {message}"),
            };
        }
        Err(err) => {
            return Msg::CountFailed {
                request_id,
                provider,
                response: None,
                message: err.to_string(),
            }
        }
    };

    let response = LoggedResponse {
        status: reply.status,
        body: serde_json::to_string_pretty(&reply.body).unwrap_or_else(|_| reply.body.to_string()),
    };
    match reply.result() {
        Ok(result) => Msg::CountSucceeded {
            request_id,
            provider,
            response,
            result: to_provider_result(result),
        },
        Err(message) => {
            engine_warn!("Request {} for {} failed: {}", request_id, provider, message);
            Msg::CountFailed {
                request_id,
                provider,
                response: Some(response),
                message,
            }
        }
    }
}

fn to_provider_result(result: TokenResult) -> ProviderResult {
    ProviderResult {
        token_count: result.token_count,
        price: result.price,
        visualization: result.visualization.map(|vis| Visualization {
            text: vis.text,
            token_ids: vis.token_ids,
            tokens: vis.tokens,
            char_to_token: vis.char_to_token,
        }),
    }
}
