use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Source of "now" for every time-boxed rule (resend cooldown, reset expiry,
/// review stamps). Services hold a `SharedClock` so tests can move time forward.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub type SharedClock = Arc<dyn Clock>;

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

pub fn system_clock() -> SharedClock {
    Arc::new(SystemClock)
}
