//! Aggregates handed to the chart renderers.
//!
//! Everything here is a pure function of the classifier's output and never
//! mutates it.

use chrono::{Datelike, NaiveDate};
use std::collections::{BTreeMap, HashMap};

use crate::{
    model::{IntensityCounts, RainEvent, YearMonth},
    window::DateRange,
};

/// Rain days per calendar month, in chronological order.
pub fn monthly_rain_days(dates: &[NaiveDate]) -> BTreeMap<YearMonth, usize> {
    let mut months = BTreeMap::new();
    for date in dates {
        *months.entry(YearMonth::of(*date)).or_insert(0) += 1;
    }
    months
}

/// Light vs moderate/heavy rain days per calendar month.
pub fn monthly_breakdown(events: &[RainEvent]) -> BTreeMap<YearMonth, IntensityCounts> {
    let mut months: BTreeMap<YearMonth, IntensityCounts> = BTreeMap::new();
    for event in events {
        months.entry(YearMonth::of(event.date)).or_default().increment(event.intensity);
    }
    months
}

/// One month of the calendar heat map.
///
/// `days[d - 1]` is the cell for day `d`: `None` when the day falls outside
/// the requested range (or does not exist in that month), otherwise the rain
/// level, 0 for a dry day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeatMapRow {
    pub month: YearMonth,
    pub days: [Option<u8>; 31],
}

/// Month × day-of-month grid covering every day of `range`.
pub fn heat_map(events: &[RainEvent], range: DateRange) -> Vec<HeatMapRow> {
    let levels: HashMap<NaiveDate, u8> =
        events.iter().map(|e| (e.date, e.intensity.level())).collect();

    let mut rows: Vec<HeatMapRow> = Vec::new();
    for date in range.days() {
        let month = YearMonth::of(date);
        if rows.last().is_none_or(|row| row.month != month) {
            rows.push(HeatMapRow { month, days: [None; 31] });
        }

        if let Some(row) = rows.last_mut() {
            let idx = date.day0() as usize;
            row.days[idx] = Some(levels.get(&date).copied().unwrap_or(0));
        }
    }

    rows
}
