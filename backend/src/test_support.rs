//! Shared helpers for unit tests.

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Duration, Local, Utc};
use mockable::Clock;

/// Clock that stays put until a test moves it.
#[derive(Debug)]
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Build a clock from an RFC 3339 timestamp.
    pub fn at(rfc3339: &str) -> Self {
        Self::new(rfc3339.parse().expect("valid RFC 3339 timestamp"))
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.lock_clock();
        *now += by;
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        self.0.lock().expect("clock mutex")
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}
