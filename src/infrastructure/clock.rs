//! Time sources for generated module headers

use chrono::{DateTime, Utc};

use crate::application::ports::outbound::ClockPort;

/// Wall-clock time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl ClockPort for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A pinned instant, used for reproducible builds (`SOURCE_DATE_EPOCH`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }

    /// `None` for seconds outside chrono's representable range
    pub fn from_unix_seconds(seconds: i64) -> Option<Self> {
        DateTime::from_timestamp(seconds, 0).map(Self)
    }
}

impl ClockPort for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_from_unix_seconds() {
        let clock = FixedClock::from_unix_seconds(1_700_000_000).expect("in range");
        assert_eq!(clock.now().to_rfc3339(), "2023-11-14T22:13:20+00:00");
        assert_eq!(clock.now(), clock.now());
        assert!(FixedClock::from_unix_seconds(i64::MAX).is_none());
    }

    #[test]
    fn test_system_clock_advances() {
        let before = Utc::now();
        assert!(SystemClock.now() >= before);
    }
}
