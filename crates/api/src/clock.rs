//! Clock abstraction so handlers and tests agree on "today".

use chrono::{DateTime, Local, NaiveDate, Utc};

/// Source of the current instant and the local calendar day.
///
/// The uniqueness gate and the today view are both expressed against
/// `today()`; tests pin it to a fixed date.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
    fn today(&self) -> NaiveDate;
}

/// Process-local wall clock.
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}
