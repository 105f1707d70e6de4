//! Rain-day classification.
//!
//! A day is rainy when it is above freezing, humid (at least 70 %), has a
//! dew point above freezing, and reports a non-negative precipitation
//! amount. Rain days are then split by precipitation amount into light
//! (< 2.5 mm) and moderate/heavy rain.

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    model::{Classification, ObservationRecord, RainEvent, RainIntensity},
    window::COMPACT_DATE_FORMAT,
};

pub const MIN_HUMIDITY_PCT: f64 = 70.0;
pub const LIGHT_RAIN_LIMIT_MM: f64 = 2.5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    #[error("date is missing")]
    Missing,

    #[error("'{0}' is not a YYYYMMDD date")]
    Malformed(String),
}

/// Parse the payload's compact `YYYYMMDD` date.
pub fn parse_compact_date(raw: Option<&str>) -> Result<NaiveDate, DateError> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty()).ok_or(DateError::Missing)?;

    if raw.len() != 8 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DateError::Malformed(raw.to_string()));
    }

    NaiveDate::parse_from_str(raw, COMPACT_DATE_FORMAT)
        .map_err(|_| DateError::Malformed(raw.to_string()))
}

/// Note: zero precipitation passes; only a negative reading rules a day out.
pub fn is_rain_day(record: &ObservationRecord) -> bool {
    record.temperature() > 0.0
        && record.precipitation() >= 0.0
        && record.humidity() >= MIN_HUMIDITY_PCT
        && record.dew_point() > 0.0
}

pub fn intensity(precipitation_mm: f64) -> RainIntensity {
    if precipitation_mm < LIGHT_RAIN_LIMIT_MM {
        RainIntensity::Light
    } else {
        RainIntensity::ModerateHeavy
    }
}

/// Classify every record, keeping input order in the outputs.
///
/// Rows without a usable date are logged and left out.
pub fn classify(records: &[ObservationRecord]) -> Classification {
    let mut classification = Classification::default();

    for (row, record) in records.iter().enumerate() {
        let date = match parse_compact_date(record.date.as_deref()) {
            Ok(date) => date,
            Err(DateError::Missing) => {
                warn!(row, "Missing date, skipping row");
                continue;
            }
            Err(err @ DateError::Malformed(_)) => {
                warn!(row, error = %err, "Date parsing error, skipping row");
                continue;
            }
        };

        debug!(
            %date,
            temperature = record.temperature(),
            precipitation = record.precipitation(),
            humidity = record.humidity(),
            dew_point = record.dew_point(),
            "Observation"
        );

        if is_rain_day(record) {
            classification.record(RainEvent { date, intensity: intensity(record.precipitation()) });
        } else {
            debug!(%date, "Conditions not met");
        }
    }

    classification
}
