use async_trait::async_trait;
use reqwest::Client;

use crate::{model::Location, window::DateWindow};

use super::{BearerToken, ObservationSource, SourceError, truncate_body};

/// Units are pinned to SI so the millimetre thresholds stay meaningful.
const UNITS: &str = "s";
const FORMAT: &str = "csv";
const LANGUAGE: &str = "en-US";

/// Client for the historical daily observations endpoint.
#[derive(Debug, Clone)]
pub struct HistoricalObservationsClient {
    endpoint: String,
    client_id: String,
    http: Client,
}

impl HistoricalObservationsClient {
    pub fn new(endpoint: String, client_id: String) -> Self {
        Self { endpoint, client_id, http: Client::new() }
    }

    /// Use a preconfigured HTTP client instead of the default one.
    pub fn with_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    fn query(location: Location, window: DateWindow) -> [(&'static str, String); 6] {
        [
            ("geocode", location.geocode()),
            ("startDate", window.compact_start()),
            ("endDate", window.compact_end()),
            ("format", FORMAT.to_string()),
            ("units", UNITS.to_string()),
            ("language", LANGUAGE.to_string()),
        ]
    }
}

#[async_trait]
impl ObservationSource for HistoricalObservationsClient {
    async fn fetch_window(
        &self,
        location: Location,
        window: DateWindow,
        token: &BearerToken,
    ) -> Result<String, SourceError> {
        let res = self
            .http
            .get(&self.endpoint)
            .query(&Self::query(location, window))
            .header("X-IBM-Client-Id", &self.client_id)
            .bearer_auth(token.as_str())
            .send()
            .await
            .map_err(SourceError::Transport)?;

        let status = res.status();
        let body = res.text().await.map_err(SourceError::Body)?;

        if !status.is_success() {
            return Err(SourceError::Status { status, body: truncate_body(&body) });
        }

        Ok(body)
    }
}
