// src/calendar.rs

use chrono::{DateTime, Datelike, NaiveDateTime, Timelike};

/// Calendar breakdown of one `start_time`, as stored in the `times` table.
///
/// All parts are UTC. `week` is the ISO-8601 week number (weeks start on
/// Monday, week 1 holds the year's first Thursday), while `year` is the
/// plain calendar year, so 2018-12-31 is week 1 of year 2018. `weekday`
/// counts from Sunday = 0 to Saturday = 6.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeParts {
    pub start_time: NaiveDateTime,
    pub hour: u32,
    pub day: u32,
    pub week: u32,
    pub month: u32,
    pub year: i32,
    pub weekday: u32,
}

impl TimeParts {
    /// Break down an event timestamp given in epoch milliseconds.
    /// Sub-second precision is truncated toward zero, like integer division
    /// in the warehouse.
    pub fn from_epoch_millis(ts: i64) -> Option<Self> {
        let start_time = DateTime::from_timestamp(ts / 1000, 0)?.naive_utc();
        Some(Self::from_start_time(start_time))
    }

    pub fn from_start_time(start_time: NaiveDateTime) -> Self {
        Self {
            start_time,
            hour: start_time.hour(),
            day: start_time.day(),
            week: start_time.iso_week().week(),
            month: start_time.month(),
            year: start_time.year(),
            weekday: start_time.weekday().num_days_from_sunday(),
        }
    }
}
