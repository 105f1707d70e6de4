use tracing::{info, warn};

use crate::{
    classify::classify,
    fetcher::{Fetcher, SkippedWindow},
    model::{AnalysisRequest, Classification},
    provider::{AuthError, TokenProvider},
};

/// Classified result of a run that retrieved at least one row.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub request: AnalysisRequest,
    pub rows: usize,
    pub skipped: Vec<SkippedWindow>,
    pub classification: Classification,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Every window failed or came back without rows. Nothing was classified.
    NoData { skipped: Vec<SkippedWindow> },
    Classified(Analysis),
}

/// Token → fetch → classify, for one request.
#[derive(Debug)]
pub struct Pipeline {
    tokens: Box<dyn TokenProvider>,
    fetcher: Fetcher,
}

impl Pipeline {
    pub fn new(tokens: Box<dyn TokenProvider>, fetcher: Fetcher) -> Self {
        Self { tokens, fetcher }
    }

    /// Only an authentication failure is an error; window and row problems
    /// show up as fewer data points.
    pub async fn run(&self, request: AnalysisRequest) -> Result<RunOutcome, AuthError> {
        let token = self.tokens.token().await?;

        let dataset = self.fetcher.fetch(request.location, request.range, &token).await;
        if dataset.is_empty() {
            warn!(windows = dataset.window_count(), "No weather data retrieved");
            return Ok(RunOutcome::NoData { skipped: dataset.skipped });
        }

        let rows = dataset.records.len();
        let classification = classify(&dataset.records);
        info!(rows, rain_days = classification.events.len(), "Classification complete");

        Ok(RunOutcome::Classified(Analysis {
            request,
            rows,
            skipped: dataset.skipped,
            classification,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        fetcher::tests::{ScriptedSource, SharedSource},
        model::{Location, RainIntensity},
        provider::BearerToken,
        window::DateRange,
    };
    use async_trait::async_trait;
    use chrono::NaiveDate;

    #[derive(Debug)]
    struct StaticToken;

    #[async_trait]
    impl TokenProvider for StaticToken {
        async fn token(&self) -> Result<BearerToken, AuthError> {
            Ok(BearerToken::new("token"))
        }
    }

    #[derive(Debug)]
    struct RejectingToken;

    #[async_trait]
    impl TokenProvider for RejectingToken {
        async fn token(&self) -> Result<BearerToken, AuthError> {
            Err(AuthError::Rejected {
                status: reqwest::StatusCode::UNAUTHORIZED,
                body: "invalid api key".into(),
            })
        }
    }

    fn season() -> AnalysisRequest {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2023, 4, 1).unwrap(),
            NaiveDate::from_ymd_opt(2023, 9, 30).unwrap(),
        )
        .unwrap();
        AnalysisRequest::new(Location::new(47.6062, -122.3321), range)
    }

    #[tokio::test]
    async fn classifies_retrieved_rows() {
        let source = ScriptedSource { failing_months: vec![6], ..Default::default() };
        let pipeline = Pipeline::new(Box::new(StaticToken), Fetcher::new(Box::new(source)));

        let outcome = pipeline.run(season()).await.unwrap();

        let RunOutcome::Classified(analysis) = outcome else {
            panic!("expected classified outcome");
        };
        assert_eq!(analysis.rows, 5);
        assert_eq!(analysis.skipped.len(), 1);
        assert_eq!(analysis.classification.events.len(), 5);
        assert_eq!(analysis.classification.counts().get(RainIntensity::Light), 5);
    }

    #[tokio::test]
    async fn all_windows_failing_is_no_data() {
        let source = ScriptedSource { failing_months: (1..=12).collect(), ..Default::default() };
        let pipeline = Pipeline::new(Box::new(StaticToken), Fetcher::new(Box::new(source)));

        let outcome = pipeline.run(season()).await.unwrap();

        match outcome {
            RunOutcome::NoData { skipped } => assert_eq!(skipped.len(), 6),
            other => panic!("expected NoData, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn auth_failure_stops_before_fetching() {
        let source = std::sync::Arc::new(ScriptedSource::default());
        let pipeline = Pipeline::new(
            Box::new(RejectingToken),
            Fetcher::new(Box::new(SharedSource(source.clone()))),
        );

        let err = pipeline.run(season()).await.unwrap_err();

        assert!(err.to_string().contains("401"));
        assert!(source.requested.lock().unwrap().is_empty());
    }
}
