use std::{collections::BTreeMap, fmt};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::window::DateRange;

/// Geographic point observations are requested for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// `lat,lon`, as expected by the `geocode` query parameter.
    pub fn geocode(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

/// What a single run analyzes: one point over one inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisRequest {
    pub location: Location,
    pub range: DateRange,
}

impl AnalysisRequest {
    pub fn new(location: Location, range: DateRange) -> Self {
        Self { location, range }
    }
}

/// One day of observations as delivered in the CSV payload.
///
/// Columns the service did not send, left empty, or filled with something
/// non-numeric decode as `None`. The accessors read those, and any
/// non-finite value such as `NaN`, as zero.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ObservationRecord {
    #[serde(default)]
    pub date: Option<String>,

    #[serde(
        rename = "TemperatureLocalDayAvg",
        default,
        deserialize_with = "csv::invalid_option"
    )]
    pub temperature_avg: Option<f64>,

    #[serde(
        rename = "PrecipAmountLocalDayMax",
        default,
        deserialize_with = "csv::invalid_option"
    )]
    pub precipitation_max: Option<f64>,

    #[serde(
        rename = "RelativeHumidityLocalDayAvg",
        default,
        deserialize_with = "csv::invalid_option"
    )]
    pub humidity_avg: Option<f64>,

    #[serde(
        rename = "DewpointLocalDayAvg",
        default,
        deserialize_with = "csv::invalid_option"
    )]
    pub dew_point_avg: Option<f64>,
}

fn finite_or_zero(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

impl ObservationRecord {
    /// Average temperature, °C.
    pub fn temperature(&self) -> f64 {
        finite_or_zero(self.temperature_avg)
    }

    /// Maximum precipitation amount, mm.
    pub fn precipitation(&self) -> f64 {
        finite_or_zero(self.precipitation_max)
    }

    /// Average relative humidity, %.
    pub fn humidity(&self) -> f64 {
        finite_or_zero(self.humidity_avg)
    }

    /// Average dew point, °C.
    pub fn dew_point(&self) -> f64 {
        finite_or_zero(self.dew_point_avg)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum RainIntensity {
    Light,
    ModerateHeavy,
}

impl RainIntensity {
    pub fn label(&self) -> &'static str {
        match self {
            RainIntensity::Light => "Light Rain",
            RainIntensity::ModerateHeavy => "Moderate/Heavy Rain",
        }
    }

    /// Cell value used by the calendar heat map (0 is reserved for dry days).
    pub fn level(&self) -> u8 {
        match self {
            RainIntensity::Light => 1,
            RainIntensity::ModerateHeavy => 2,
        }
    }

    pub const fn all() -> &'static [RainIntensity] {
        &[RainIntensity::Light, RainIntensity::ModerateHeavy]
    }
}

impl fmt::Display for RainIntensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RainEvent {
    pub date: NaiveDate,
    pub intensity: RainIntensity,
}

/// Count of rain days per intensity. Every intensity is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntensityCounts(BTreeMap<RainIntensity, usize>);

impl Default for IntensityCounts {
    fn default() -> Self {
        Self(RainIntensity::all().iter().map(|i| (*i, 0)).collect())
    }
}

impl IntensityCounts {
    pub fn increment(&mut self, intensity: RainIntensity) {
        *self.0.entry(intensity).or_insert(0) += 1;
    }

    pub fn get(&self, intensity: RainIntensity) -> usize {
        self.0.get(&intensity).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RainIntensity, usize)> + '_ {
        self.0.iter().map(|(i, n)| (*i, *n))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RainSummary {
    pub dates: Vec<NaiveDate>,
    pub counts: IntensityCounts,
}

/// Everything the classifier derives from one dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Classification {
    pub summary: RainSummary,
    pub events: Vec<RainEvent>,
}

impl Classification {
    pub fn record(&mut self, event: RainEvent) {
        self.summary.dates.push(event.date);
        self.summary.counts.increment(event.intensity);
        self.events.push(event);
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.summary.dates
    }

    pub fn counts(&self) -> &IntensityCounts {
        &self.summary.counts
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Calendar month used as a grouping key for monthly aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        Self { year: date.year(), month: date.month() }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}
