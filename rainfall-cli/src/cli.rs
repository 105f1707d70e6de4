use anyhow::Context;
use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand};
use inquire::{CustomUserError, Password, Text, validator::Validation};
use rainfall_core::{
    Config, Credentials, DateRange, Fetcher, Pipeline, RunOutcome,
    provider::{observation_source_from_config, token_provider_from_config},
};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "rainfall", version, about = "Seasonal rainfall analysis for one location")]
pub struct Cli {
    /// Config file to use instead of the platform default.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store API credentials in the config file.
    Configure,

    /// Fetch observations, classify rain days and print the charts.
    Analyze {
        /// Latitude; defaults to the configured location.
        #[arg(long, allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude; defaults to the configured location.
        #[arg(long, allow_negative_numbers = true)]
        lon: Option<f64>,

        /// First day, YYYY-MM-DD.
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Last day (inclusive), YYYY-MM-DD.
        #[arg(long)]
        end: Option<NaiveDate>,
    },

    /// Print the monthly request windows for a range without fetching anything.
    Windows {
        #[arg(long)]
        start: NaiveDate,

        #[arg(long)]
        end: NaiveDate,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(&config_path(self.config)?),
            Command::Analyze { lat, lon, start, end } => {
                let config = Config::load_from(&config_path(self.config)?)?;
                analyze(&config, lat, lon, start, end).await
            }
            Command::Windows { start, end } => {
                let range = DateRange::new(start, end)?;
                for window in range.month_windows() {
                    println!("{}  {}", window.compact_start(), window.compact_end());
                }
                Ok(())
            }
        }
    }
}

fn config_path(explicit: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path),
        None => Config::config_file_path(),
    }
}

fn configure(path: &Path) -> anyhow::Result<()> {
    let mut config = Config::load_from(path)?;
    let current = config.credentials.clone();

    let api_key = Password::new("API key:")
        .without_confirmation()
        .with_validator(not_blank)
        .prompt()
        .context("Failed to read API key")?;

    let tenant_id = Text::new("Tenant id:")
        .with_initial_value(current.as_ref().map_or("", |c| c.tenant_id.as_str()))
        .with_validator(not_blank)
        .prompt()
        .context("Failed to read tenant id")?;

    let org_id = Text::new("Org id:")
        .with_initial_value(current.as_ref().map_or("", |c| c.org_id.as_str()))
        .with_validator(not_blank)
        .prompt()
        .context("Failed to read org id")?;

    config.set_credentials(Credentials {
        api_key: api_key.trim().to_string(),
        tenant_id: tenant_id.trim().to_string(),
        org_id: org_id.trim().to_string(),
    });
    config.save_to(path)?;

    println!("Credentials saved to {}", path.display());
    Ok(())
}

fn not_blank(input: &str) -> Result<Validation, CustomUserError> {
    if input.trim().is_empty() {
        Ok(Validation::Invalid("Value must not be empty".into()))
    } else {
        Ok(Validation::Valid)
    }
}

async fn analyze(
    config: &Config,
    lat: Option<f64>,
    lon: Option<f64>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> anyhow::Result<()> {
    let request = config.request(lat, lon, start, end)?;

    let pipeline = Pipeline::new(
        token_provider_from_config(config)?,
        Fetcher::new(observation_source_from_config(config)?),
    );

    info!(location = %request.location, range = %request.range, "Starting analysis");
    let outcome = pipeline
        .run(request)
        .await
        .context("Could not authenticate with the observation service")?;

    match outcome {
        RunOutcome::NoData { skipped } => {
            println!("No weather data retrieved for {}.", request.range);
            if !skipped.is_empty() {
                println!("{}", render::skipped_windows(&skipped));
            }
        }
        RunOutcome::Classified(analysis) => {
            println!("{}", render::report(&analysis));
        }
    }

    Ok(())
}
