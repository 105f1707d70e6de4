//! Month-by-month retrieval of a date range.
//!
//! Each window is requested on its own. A window that fails is logged and
//! left out; the remaining windows are still fetched and concatenated in
//! chronological order.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    model::{Location, ObservationRecord},
    payload::{PayloadError, parse_observations},
    provider::{BearerToken, ObservationSource, SourceError},
    window::{DateRange, DateWindow},
};

#[derive(Debug, Error)]
pub enum WindowError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("response body was empty")]
    EmptyBody,

    #[error(transparent)]
    Payload(#[from] PayloadError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedWindow {
    pub window: DateWindow,
    pub reason: String,
}

/// Records of every window that came back, plus the windows that did not.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub records: Vec<ObservationRecord>,
    pub retrieved: Vec<DateWindow>,
    pub skipped: Vec<SkippedWindow>,
}

impl Dataset {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn window_count(&self) -> usize {
        self.retrieved.len() + self.skipped.len()
    }
}

#[derive(Debug)]
pub struct Fetcher {
    source: Box<dyn ObservationSource>,
}

impl Fetcher {
    pub fn new(source: Box<dyn ObservationSource>) -> Self {
        Self { source }
    }

    /// Fetch `range` one calendar month at a time.
    ///
    /// Never fails: a window that cannot be retrieved is recorded in
    /// [`Dataset::skipped`] and contributes no rows.
    pub async fn fetch(
        &self,
        location: Location,
        range: DateRange,
        token: &BearerToken,
    ) -> Dataset {
        let mut dataset = Dataset::default();

        for window in range.month_windows() {
            match self.fetch_window(location, window, token).await {
                Ok(mut records) => {
                    info!(%window, rows = records.len(), "Data retrieved");
                    dataset.records.append(&mut records);
                    dataset.retrieved.push(window);
                }
                Err(err) => {
                    warn!(%window, error = %err, "Failed to retrieve window, skipping");
                    dataset.skipped.push(SkippedWindow { window, reason: err.to_string() });
                }
            }
        }

        dataset
    }

    async fn fetch_window(
        &self,
        location: Location,
        window: DateWindow,
        token: &BearerToken,
    ) -> Result<Vec<ObservationRecord>, WindowError> {
        let body = self.source.fetch_window(location, window, token).await?;

        if body.trim().is_empty() {
            return Err(WindowError::EmptyBody);
        }

        let table = parse_observations(&body)?;
        debug!(%window, columns = ?table.columns, "Columns in response");

        Ok(table.records)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{Datelike, NaiveDate};
    use std::sync::Mutex;

    pub(crate) const HEADER: &str = "date,TemperatureLocalDayAvg,PrecipAmountLocalDayMax,RelativeHumidityLocalDayAvg,DewpointLocalDayAvg";

    /// Serves a canned response per month and remembers what was asked for.
    #[derive(Debug, Default)]
    pub(crate) struct ScriptedSource {
        pub failing_months: Vec<u32>,
        pub blank_months: Vec<u32>,
        pub requested: Mutex<Vec<DateWindow>>,
    }

    impl ScriptedSource {
        pub(crate) fn body_for(window: DateWindow) -> String {
            // One rainy row per window, dated on the window's first day.
            format!("{HEADER}\n{},10,1.0,80,5\n", window.compact_start())
        }
    }

    #[async_trait]
    impl ObservationSource for ScriptedSource {
        async fn fetch_window(
            &self,
            _location: Location,
            window: DateWindow,
            _token: &BearerToken,
        ) -> Result<String, SourceError> {
            self.requested.lock().unwrap().push(window);

            let month = window.start.month();
            if self.failing_months.contains(&month) {
                return Err(SourceError::Status {
                    status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                    body: "upstream exploded".into(),
                });
            }
            if self.blank_months.contains(&month) {
                return Ok("  \n".into());
            }

            Ok(Self::body_for(window))
        }
    }

    fn season() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2023, 4, 1).unwrap(),
            NaiveDate::from_ymd_opt(2023, 9, 30).unwrap(),
        )
        .unwrap()
    }

    fn dates(dataset: &Dataset) -> Vec<&str> {
        dataset.records.iter().filter_map(|r| r.date.as_deref()).collect()
    }

    #[tokio::test]
    async fn concatenates_windows_in_chronological_order() {
        let fetcher = Fetcher::new(Box::new(ScriptedSource::default()));

        let dataset = fetcher
            .fetch(Location::new(47.6, -122.3), season(), &BearerToken::new("t"))
            .await;

        assert_eq!(
            dates(&dataset),
            vec!["20230401", "20230501", "20230601", "20230701", "20230801", "20230901"]
        );
        assert_eq!(dataset.retrieved.len(), 6);
        assert!(dataset.skipped.is_empty());
    }

    #[tokio::test]
    async fn failed_window_is_skipped_without_aborting() {
        let fetcher = Fetcher::new(Box::new(ScriptedSource {
            failing_months: vec![6],
            ..Default::default()
        }));

        let dataset = fetcher
            .fetch(Location::new(47.6, -122.3), season(), &BearerToken::new("t"))
            .await;

        assert_eq!(
            dates(&dataset),
            vec!["20230401", "20230501", "20230701", "20230801", "20230901"]
        );
        assert_eq!(dataset.window_count(), 6);
        assert_eq!(dataset.skipped.len(), 1);

        let skipped = &dataset.skipped[0];
        assert_eq!(skipped.window.start, NaiveDate::from_ymd_opt(2023, 6, 1).unwrap());
        assert!(skipped.reason.contains("500"));
    }

    #[tokio::test]
    async fn blank_body_counts_as_failure() {
        let fetcher = Fetcher::new(Box::new(ScriptedSource {
            blank_months: vec![4, 9],
            ..Default::default()
        }));

        let dataset = fetcher
            .fetch(Location::new(47.6, -122.3), season(), &BearerToken::new("t"))
            .await;

        assert_eq!(dataset.records.len(), 4);
        assert_eq!(dataset.skipped.len(), 2);
        assert!(dataset.skipped.iter().all(|s| s.reason == "response body was empty"));
    }

    #[tokio::test]
    async fn every_window_failing_yields_empty_dataset() {
        let fetcher = Fetcher::new(Box::new(ScriptedSource {
            failing_months: (1..=12).collect(),
            ..Default::default()
        }));

        let dataset = fetcher
            .fetch(Location::new(47.6, -122.3), season(), &BearerToken::new("t"))
            .await;

        assert!(dataset.is_empty());
        assert!(dataset.retrieved.is_empty());
        assert_eq!(dataset.skipped.len(), 6);
    }

    #[tokio::test]
    async fn requests_each_window_once_in_order() {
        let source = std::sync::Arc::new(ScriptedSource::default());
        let fetcher = Fetcher::new(Box::new(SharedSource(source.clone())));

        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2023, 4, 15).unwrap(),
            NaiveDate::from_ymd_opt(2023, 5, 10).unwrap(),
        )
        .unwrap();
        fetcher.fetch(Location::new(1.0, 2.0), range, &BearerToken::new("t")).await;

        let requested = source.requested.lock().unwrap().clone();
        assert_eq!(requested, range.month_windows());
    }

    /// Lets a test keep a handle on a source after handing it to a fetcher.
    #[derive(Debug)]
    pub(crate) struct SharedSource(pub std::sync::Arc<ScriptedSource>);

    #[async_trait]
    impl ObservationSource for SharedSource {
        async fn fetch_window(
            &self,
            location: Location,
            window: DateWindow,
            token: &BearerToken,
        ) -> Result<String, SourceError> {
            self.0.fetch_window(location, window, token).await
        }
    }
}
