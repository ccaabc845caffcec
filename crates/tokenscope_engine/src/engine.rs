use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use engine_logging::{engine_debug, engine_warn};

use crate::client::{ClientError, ClientSettings, CountReply, TokenCountClient};
use crate::exchange::{ExchangeError, ExchangeRateClient, ExchangeSettings};
use crate::TokenRequest;

pub type RequestId = u64;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// A debounce timer ran out.
    TimerElapsed { generation: u64 },
    CountCompleted {
        request_id: RequestId,
        provider: String,
        result: Result<CountReply, ClientError>,
    },
    ExchangeRate(Result<f64, ExchangeError>),
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

#[derive(Debug, Clone, Default)]
pub struct EngineSettings {
    pub client: ClientSettings,
    pub exchange: ExchangeSettings,
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Exchange(#[from] ExchangeError),
}

enum EngineCommand {
    ScheduleTimer { generation: u64, delay: Duration },
    CountTokens {
        request_id: RequestId,
        request: TokenRequest,
    },
    FetchExchangeRate,
}

/// Client-side IO worker. Commands are executed on a background tokio
/// runtime; results come back through the [`EventSink`].
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

struct Workers {
    counter: TokenCountClient,
    rates: ExchangeRateClient,
    sink: Arc<dyn EventSink>,
}

impl EngineHandle {
    pub fn new(settings: EngineSettings, sink: Arc<dyn EventSink>) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let workers = Arc::new(Workers {
            counter: TokenCountClient::new(&settings.client)?,
            rates: ExchangeRateClient::new(settings.exchange)?,
            sink,
        });
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                let workers = workers.clone();
                runtime.spawn(async move {
                    handle_command(&workers, command).await;
                });
            }
        });

        Ok(Self { cmd_tx })
    }

    pub fn schedule_timer(&self, generation: u64, delay: Duration) {
        let _ = self
            .cmd_tx
            .send(EngineCommand::ScheduleTimer { generation, delay });
    }

    pub fn count_tokens(&self, request_id: RequestId, request: TokenRequest) {
        let _ = self.cmd_tx.send(EngineCommand::CountTokens {
            request_id,
            request,
        });
    }

    pub fn fetch_exchange_rate(&self) {
        let _ = self.cmd_tx.send(EngineCommand::FetchExchangeRate);
    }
}

async fn handle_command(workers: &Workers, command: EngineCommand) {
    match command {
        EngineCommand::ScheduleTimer { generation, delay } => {
            tokio::time::sleep(delay).await;
            workers.sink.emit(EngineEvent::TimerElapsed { generation });
        }
        EngineCommand::CountTokens {
            request_id,
            request,
        } => {
            let provider = request.provider.clone().unwrap_or_default();
            engine_debug!(
                "POST {} request_id={} provider={}",
                workers.counter.endpoint(),
                request_id,
                provider
            );
            let result = workers.counter.count(&request).await;
            if let Err(err) = &result {
                engine_warn!("Count request {} failed: {}", request_id, err);
            }
            workers.sink.emit(EngineEvent::CountCompleted {
                request_id,
                provider,
                result,
            });
        }
        EngineCommand::FetchExchangeRate => {
            let result = workers.rates.fetch_rate().await;
            if let Err(err) = &result {
                engine_warn!("Exchange rate lookup for {} failed: {}", workers.rates.currency(), err);
            }
            workers.sink.emit(EngineEvent::ExchangeRate(result));
        }
    }
}
