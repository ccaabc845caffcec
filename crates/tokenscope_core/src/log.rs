use std::collections::VecDeque;

pub type RequestId = u64;

pub const COUNT_TOKENS_URL: &str = "/api/count-tokens";

/// Body of one token-count call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountRequest {
    pub text: String,
    pub provider: String,
    pub model: String,
    pub visualize: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedRequest {
    pub url: String,
    pub method: String,
    pub headers: Vec<(String, String)>,
    pub body: CountRequest,
}

impl LoggedRequest {
    pub fn post_json(url: &str, body: CountRequest) -> Self {
        Self {
            url: url.to_string(),
            method: "POST".to_string(),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedResponse {
    pub status: u16,
    /// Response body as received (JSON text).
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiLogEntry {
    pub id: RequestId,
    pub timestamp: String,
    pub request: LoggedRequest,
    pub response: Option<LoggedResponse>,
}

/// Session-long request history, newest first. Nothing is ever evicted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ApiLog {
    entries: VecDeque<ApiLogEntry>,
}

impl ApiLog {
    pub fn record(&mut self, entry: ApiLogEntry) {
        self.entries.push_front(entry);
    }

    /// Returns false when no entry carries `id`.
    pub fn attach_response(&mut self, id: RequestId, response: LoggedResponse) -> bool {
        match self.entries.iter_mut().find(|entry| entry.id == id) {
            Some(entry) => {
                entry.response = Some(response);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ApiLogEntry> {
        self.entries.iter()
    }
}
