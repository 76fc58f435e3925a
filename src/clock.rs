use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};

/// Source of the current calendar date. Days roll over at server-local
/// midnight.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock pinned to one instant.
pub struct FixedClock(pub NaiveDateTime);

impl FixedClock {
    pub fn on(date: NaiveDate) -> Self {
        Self(date.and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN)))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
