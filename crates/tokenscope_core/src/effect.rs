use std::time::Duration;

use crate::{CountRequest, RequestId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Deliver `Msg::DebounceElapsed { generation }` after `delay`.
    ScheduleRecount { generation: u64, delay: Duration },
    CountTokens {
        request_id: RequestId,
        request: CountRequest,
    },
    FetchExchangeRate,
}
