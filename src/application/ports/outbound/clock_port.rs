use chrono::{DateTime, Utc};

/// Source of the current time, swappable in tests
pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
