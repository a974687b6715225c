use bedrock_actions_core::operations::Clock;
use chrono::Utc;

/// Wall clock backed by `chrono::Utc`, in epoch milliseconds.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}
