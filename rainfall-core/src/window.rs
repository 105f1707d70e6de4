//! Date ranges and their split into per-request monthly windows.
//!
//! The observation service limits how many days a single request may span,
//! so a requested range is fetched one calendar month at a time.

use chrono::{Datelike, NaiveDate};
use std::fmt;
use thiserror::Error;

/// Compact date format used on the wire, e.g. `20230401`.
pub const COMPACT_DATE_FORMAT: &str = "%Y%m%d";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("Start date {start} is after end date {end}")]
    StartAfterEnd { start: NaiveDate, end: NaiveDate },
}

/// Inclusive range of calendar days requested by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, RangeError> {
        if start > end {
            return Err(RangeError::StartAfterEnd { start, end });
        }

        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Every day of the range, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(move |d| *d <= self.end)
    }

    /// Split the range into contiguous windows, none crossing a month boundary.
    ///
    /// The first window starts on `start` and the last one ends on `end`;
    /// every window in between covers a whole calendar month.
    pub fn month_windows(&self) -> Vec<DateWindow> {
        let mut windows = Vec::new();
        let mut current = self.start;

        while current <= self.end {
            let next_month = first_of_next_month(current);
            let month_end = next_month.and_then(|d| d.pred_opt()).unwrap_or(NaiveDate::MAX);

            windows.push(DateWindow { start: current, end: month_end.min(self.end) });

            match next_month {
                Some(next) => current = next,
                None => break,
            }
        }

        windows
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// One request's worth of days. Never spans more than one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn compact_start(&self) -> String {
        self.start.format(COMPACT_DATE_FORMAT).to_string()
    }

    pub fn compact_end(&self) -> String {
        self.end.format(COMPACT_DATE_FORMAT).to_string()
    }

    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

fn first_of_next_month(date: NaiveDate) -> Option<NaiveDate> {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };

    NaiveDate::from_ymd_opt(year, month, 1)
}
