//! Clock adapters.

use std::sync::{Arc, RwLock};

use crate::domain::foundation::Timestamp;
use crate::ports::Clock;

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// Settable time for tests. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Arc<RwLock<Timestamp>>,
}

impl FixedClock {
    pub fn new(now: Timestamp) -> Self {
        Self {
            now: Arc::new(RwLock::new(now)),
        }
    }

    pub fn set(&self, now: Timestamp) {
        if let Ok(mut guard) = self.now.write() {
            *guard = now;
        }
    }

    pub fn advance_secs(&self, secs: i64) {
        if let Ok(mut guard) = self.now.write() {
            *guard = guard.plus_secs(secs);
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        match self.now.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    #[test]
    fn fixed_clock_reports_today_and_advances() {
        let clock = FixedClock::new(Timestamp::from_datetime(
            Utc.with_ymd_and_hms(2025, 4, 1, 22, 0, 0).unwrap(),
        ));
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2025, 4, 1).unwrap());

        let shared = clock.clone();
        shared.advance_secs(3 * 3600);
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2025, 4, 2).unwrap());
    }

    #[test]
    fn system_clock_is_close_to_now() {
        let before = Timestamp::now();
        let now = SystemClock.now();
        assert!(!now.is_before(&before));
    }
}
