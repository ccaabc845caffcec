use crate::{LoggedResponse, ProviderResult, RequestId};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// The view is up; kick off one-time lookups.
    Started,
    /// User edited the input text (full new contents).
    InputChanged(String),
    /// User asked for the example text.
    ExampleClicked,
    /// User cleared the input.
    ClearClicked,
    /// User switched to another provider tab.
    TabSelected(String),
    /// User picked a model for a provider.
    ModelSelected { provider: String, model: String },
    /// A debounce timer ran out. `timestamp` is the wall-clock time (RFC 3339)
    /// used for the log entry if a request is issued.
    DebounceElapsed { generation: u64, timestamp: String },
    /// The server answered a count request successfully.
    CountSucceeded {
        request_id: RequestId,
        provider: String,
        response: LoggedResponse,
        result: ProviderResult,
    },
    /// A count request failed. `response` is present when the server answered.
    CountFailed {
        request_id: RequestId,
        provider: String,
        response: Option<LoggedResponse>,
        message: String,
    },
    ExchangeRateLoaded(f64),
    ExchangeRateFailed(String),
    NotificationDismissed,
}
