use chrono::{FixedOffset, Local, NaiveDateTime, Utc};

/// Wall-clock source for the reminder scheduler
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Process local time, or a fixed UTC offset when one is configured
pub struct SystemClock {
    offset: Option<FixedOffset>,
}

impl SystemClock {
    pub fn new(offset: Option<FixedOffset>) -> Self {
        Self { offset }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        match self.offset {
            Some(offset) => Utc::now().with_timezone(&offset).naive_local(),
            None => Local::now().naive_local(),
        }
    }
}
