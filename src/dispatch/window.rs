//! Rolling window boundaries for the load-fairness allocator
//!
//! Rank A load is counted over a monthly window, every other tier over a
//! daily window. Both windows cut over at a fixed UTC hour (15:00 UTC by
//! default, midnight in the operating timezone): the daily boundary is
//! the cutover instant each day, the monthly boundary is the cutover
//! instant on the last calendar day of the month.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};

use crate::rank::Rank;

/// Computes window start instants relative to "now".
#[derive(Debug, Clone, Copy)]
pub struct WindowClock {
    cutover_hour: u32,
}

impl Default for WindowClock {
    fn default() -> Self {
        WindowClock { cutover_hour: 15 }
    }
}

impl WindowClock {
    /// Clock with a custom cutover hour (0..=23 UTC).
    pub fn new(cutover_hour: u32) -> Self {
        WindowClock {
            cutover_hour: cutover_hour.min(23),
        }
    }

    /// Start of the applicable window: monthly for rank A, daily
    /// otherwise.
    pub fn window_start(&self, now: DateTime<Utc>, rank: Rank) -> DateTime<Utc> {
        match rank {
            Rank::A => self.monthly_start(now),
            _ => self.daily_start(now),
        }
    }

    fn daily_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today_cutover = self.at_cutover(now.date_naive());
        if now >= today_cutover {
            today_cutover
        } else {
            self.at_cutover(now.date_naive() - Duration::days(1))
        }
    }

    fn monthly_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let current_last = self.at_cutover(last_day_of_month(now.year(), now.month()));
        if now >= current_last {
            current_last
        } else {
            let (year, month) = previous_month(now.year(), now.month());
            self.at_cutover(last_day_of_month(year, month))
        }
    }

    fn at_cutover(&self, date: NaiveDate) -> DateTime<Utc> {
        Utc.from_utc_datetime(&date.and_hms_opt(self.cutover_hour, 0, 0).expect("valid hour"))
    }
}

fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1).expect("valid month start")
        - Duration::days(1)
}
