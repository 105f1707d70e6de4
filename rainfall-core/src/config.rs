use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use crate::{
    model::{AnalysisRequest, Location},
    window::DateRange,
};

pub const DEFAULT_AUTH_URL: &str = "https://api.ibm.com/saascore/run/authentication-retrieve";
pub const DEFAULT_OBSERVATIONS_URL: &str =
    "https://api.ibm.com/geospatial/run/v3/wx/observations/historical/analytical/ext";

/// Static credentials exchanged for a bearer token at the start of a run.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub api_key: String,
    pub tenant_id: String,
    pub org_id: String,
}

impl Credentials {
    /// Client id sent with the authentication exchange.
    pub fn auth_client_id(&self) -> String {
        format!("saascore-{}", self.tenant_id)
    }

    /// Client id sent with observation requests.
    pub fn observations_client_id(&self) -> String {
        format!("geospatial-{}", self.tenant_id)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("tenant_id", &self.tenant_id)
            .field("org_id", &self.org_id)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub auth_url: String,
    pub observations_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            auth_url: DEFAULT_AUTH_URL.to_string(),
            observations_url: DEFAULT_OBSERVATIONS_URL.to_string(),
        }
    }
}

/// Location and season analyzed when the command line does not say otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub latitude: f64,
    pub longitude: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Default for Defaults {
    fn default() -> Self {
        // Seattle, April through September 2023.
        Self {
            latitude: 47.6062,
            longitude: -122.3321,
            start_date: NaiveDate::from_ymd_opt(2023, 4, 1).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2023, 9, 30).unwrap_or_default(),
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// [credentials]
/// api_key = "..."
/// tenant_id = "..."
/// org_id = "..."
///
/// [defaults]
/// latitude = 47.6062
/// longitude = -122.3321
/// start_date = "2023-04-01"
/// end_date = "2023-09-30"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Credentials>,

    #[serde(default)]
    pub endpoints: Endpoints,

    #[serde(default)]
    pub defaults: Defaults,
}

impl Config {
    /// Credentials, or an actionable error if none were configured.
    pub fn credentials(&self) -> Result<&Credentials> {
        self.credentials.as_ref().ok_or_else(|| {
            anyhow!(
                "No credentials configured.\n\
                 Hint: run `rainfall configure` and enter your API key, tenant id and org id."
            )
        })
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    pub fn set_credentials(&mut self, credentials: Credentials) {
        self.credentials = Some(credentials);
    }

    /// Build a request from the stored defaults, overriding any field given.
    pub fn request(
        &self,
        latitude: Option<f64>,
        longitude: Option<f64>,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<AnalysisRequest> {
        let location = Location::new(
            latitude.unwrap_or(self.defaults.latitude),
            longitude.unwrap_or(self.defaults.longitude),
        );
        let range = DateRange::new(
            start.unwrap_or(self.defaults.start_date),
            end.unwrap_or(self.defaults.end_date),
        )?;

        Ok(AnalysisRequest::new(location, range))
    }

    /// Load config from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Load config from `path`, or return an empty default if it doesn't exist yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "rainfall", "rainfall-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
