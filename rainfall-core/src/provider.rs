use crate::{
    Config,
    model::Location,
    provider::{auth::ApiKeyTokenProvider, observations::HistoricalObservationsClient},
    window::DateWindow,
};
use async_trait::async_trait;
use std::fmt::{self, Debug};
use thiserror::Error;

pub mod auth;
pub mod observations;

/// Short-lived credential authorizing observation requests.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Failed to send authentication request to {url}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to read authentication response body")]
    Body(#[source] reqwest::Error),

    #[error("Authentication failed with status {status}: {body}")]
    Rejected { status: reqwest::StatusCode, body: String },

    #[error("Authentication succeeded but the response contained no token")]
    EmptyToken,
}

/// Why a single window could not be retrieved.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request could not be sent: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("response body could not be read: {0}")]
    Body(#[source] reqwest::Error),

    #[error("service responded with status {status}: {body}")]
    Status { status: reqwest::StatusCode, body: String },
}

/// Exchanges static credentials for a bearer token. Called once per run.
#[async_trait]
pub trait TokenProvider: Send + Sync + Debug {
    async fn token(&self) -> Result<BearerToken, AuthError>;
}

/// Serves one window of daily observations as a raw CSV body.
///
/// A returned body may still be blank; the fetcher decides what that means.
#[async_trait]
pub trait ObservationSource: Send + Sync + Debug {
    async fn fetch_window(
        &self,
        location: Location,
        window: DateWindow,
        token: &BearerToken,
    ) -> Result<String, SourceError>;
}

/// Construct the token provider from configured credentials.
pub fn token_provider_from_config(config: &Config) -> anyhow::Result<Box<dyn TokenProvider>> {
    let credentials = config.credentials()?;

    Ok(Box::new(ApiKeyTokenProvider::new(
        config.endpoints.auth_url.clone(),
        credentials.auth_client_id(),
        credentials.api_key.clone(),
        credentials.org_id.clone(),
    )))
}

/// Construct the observation source from configured credentials.
pub fn observation_source_from_config(
    config: &Config,
) -> anyhow::Result<Box<dyn ObservationSource>> {
    let credentials = config.credentials()?;

    Ok(Box::new(HistoricalObservationsClient::new(
        config.endpoints.observations_url.clone(),
        credentials.observations_client_id(),
    )))
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    let body = body.trim();
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
