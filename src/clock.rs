use chrono::offset::LocalResult;
use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::sync::{Mutex, PoisonError};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate;

    /// Earliest instant at which local wall clocks read `date` `time`, or
    /// `None` when a DST jump skips that time on `date`.
    fn resolve_local(&self, date: NaiveDate, time: NaiveTime) -> Option<DateTime<Utc>>;

    fn today(&self) -> NaiveDate {
        self.local_date(self.now())
    }
}

fn earliest<Z: TimeZone>(resolved: LocalResult<DateTime<Z>>) -> Option<DateTime<Utc>> {
    resolved.earliest().map(|instant| instant.with_timezone(&Utc))
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&Local).date_naive()
    }

    fn resolve_local(&self, date: NaiveDate, time: NaiveTime) -> Option<DateTime<Utc>> {
        earliest(Local.from_local_datetime(&date.and_time(time)))
    }
}

#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
    zone: Tz,
}

impl ManualClock {
    pub fn new(now: DateTime<Tz>) -> Self {
        Self {
            zone: now.timezone(),
            now: Mutex::new(now.with_timezone(&Utc)),
        }
    }

    pub fn set(&self, now: DateTime<Tz>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now.with_timezone(&Utc);
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.zone).date_naive()
    }

    fn resolve_local(&self, date: NaiveDate, time: NaiveTime) -> Option<DateTime<Utc>> {
        earliest(self.zone.from_local_datetime(&date.and_time(time)))
    }
}
