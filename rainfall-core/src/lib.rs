//! Core library for the `rainfall` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The token provider and observation source seams, with HTTP implementations
//! - Month-by-month retrieval of a date range with per-window failure isolation
//! - Rain-day classification and the aggregates the charts are drawn from
//!
//! It is used by `rainfall-cli`, but can also be reused by other binaries or services.

pub mod classify;
pub mod config;
pub mod fetcher;
pub mod model;
pub mod payload;
pub mod pipeline;
pub mod provider;
pub mod report;
pub mod window;

pub use classify::classify;
pub use config::{Config, Credentials};
pub use fetcher::{Dataset, Fetcher, SkippedWindow};
pub use model::{
    AnalysisRequest, Classification, IntensityCounts, Location, ObservationRecord, RainEvent,
    RainIntensity, RainSummary, YearMonth,
};
pub use pipeline::{Analysis, Pipeline, RunOutcome};
pub use provider::{AuthError, BearerToken, ObservationSource, TokenProvider};
pub use window::{DateRange, DateWindow, RangeError};
