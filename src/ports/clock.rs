//! Time source, injected so date validation and month windows are testable.

use chrono::NaiveDate;

use crate::domain::foundation::Timestamp;

pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;

    /// Current UTC calendar day.
    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}
