use async_trait::async_trait;
use reqwest::Client;
use std::fmt;
use tracing::{error, info};

use super::{AuthError, BearerToken, TokenProvider, truncate_body};

/// Swaps a static API key for a bearer token with a single GET.
#[derive(Clone)]
pub struct ApiKeyTokenProvider {
    endpoint: String,
    client_id: String,
    api_key: String,
    org_id: String,
    http: Client,
}

impl ApiKeyTokenProvider {
    pub fn new(endpoint: String, client_id: String, api_key: String, org_id: String) -> Self {
        Self {
            endpoint,
            client_id,
            api_key,
            org_id,
            http: Client::new(),
        }
    }

    /// Use a preconfigured HTTP client instead of the default one.
    pub fn with_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    fn url(&self) -> String {
        format!("{}/api-key", self.endpoint.trim_end_matches('/'))
    }
}

impl fmt::Debug for ApiKeyTokenProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeyTokenProvider")
            .field("endpoint", &self.endpoint)
            .field("client_id", &self.client_id)
            .field("org_id", &self.org_id)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TokenProvider for ApiKeyTokenProvider {
    async fn token(&self) -> Result<BearerToken, AuthError> {
        let url = self.url();

        let res = self
            .http
            .get(&url)
            .query(&[("orgId", self.org_id.as_str())])
            .header("X-IBM-Client-Id", &self.client_id)
            .header("X-API-Key", &self.api_key)
            .send()
            .await
            .map_err(|source| AuthError::Request { url: url.clone(), source })?;

        let status = res.status();
        let body = res.text().await.map_err(AuthError::Body)?;

        if !status.is_success() {
            error!(%status, "Authentication failed");
            return Err(AuthError::Rejected { status, body: truncate_body(&body) });
        }

        let token = body.trim();
        if token.is_empty() {
            return Err(AuthError::EmptyToken);
        }

        info!("Authentication successful");
        Ok(BearerToken::new(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::test_server::{direct_client, header, request_line, serve_once};

    #[test]
    fn url_appends_api_key_path_once() {
        let provider = ApiKeyTokenProvider::new(
            "https://auth.example.com/run/".into(),
            "saascore-t".into(),
            "SECRET".into(),
            "org".into(),
        );

        assert_eq!(provider.url(), "https://auth.example.com/run/api-key");
    }

    #[test]
    fn debug_output_hides_api_key() {
        let provider = ApiKeyTokenProvider::new(
            "https://auth.example.com".into(),
            "saascore-t".into(),
            "SECRET".into(),
            "org".into(),
        );

        let rendered = format!("{provider:?}");
        assert!(rendered.contains("saascore-t"));
        assert!(!rendered.contains("SECRET"));
    }

    fn provider_for(endpoint: String) -> ApiKeyTokenProvider {
        ApiKeyTokenProvider::new(endpoint, "saascore-t".into(), "secret".into(), "o".into())
            .with_client(direct_client())
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_request_error() {
        // Nothing listens on the discard port.
        let err = provider_for("http://127.0.0.1:9".into()).token().await.unwrap_err();
        assert!(matches!(err, AuthError::Request { .. }));
    }

    #[tokio::test]
    async fn sends_org_id_and_credential_headers() {
        let (url, server) = serve_once("200 OK", "  tok\n  ").await;

        let token = provider_for(url).token().await.unwrap();
        let request = server.await.unwrap();

        assert_eq!(token.as_str(), "tok");
        assert!(request_line(&request).starts_with("GET /api-key?orgId=o "));
        assert_eq!(header(&request, "x-ibm-client-id").as_deref(), Some("saascore-t"));
        assert_eq!(header(&request, "x-api-key").as_deref(), Some("secret"));
    }

    #[tokio::test]
    async fn error_status_is_rejected_with_body() {
        let (url, server) = serve_once("401 Unauthorized", "bad").await;

        let err = provider_for(url).token().await.unwrap_err();
        server.await.unwrap();

        match err {
            AuthError::Rejected { status, body } => {
                assert_eq!(status, reqwest::StatusCode::UNAUTHORIZED);
                assert_eq!(body, "bad");
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn blank_success_body_is_empty_token() {
        let (url, server) = serve_once("200 OK", " \n ").await;

        let err = provider_for(url).token().await.unwrap_err();
        server.await.unwrap();

        assert!(matches!(err, AuthError::EmptyToken));
    }
}
