use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::errors::{AppError, AppResult};

/// Most days of listings the service will return
pub const MAX_DAYS: i64 = 8;

pub const DEFAULT_TIMEZONE: &str = "America/Chicago";
pub const DEFAULT_LINEUP_ID: &str = "USA-OTA35213";
pub const DEFAULT_FILE_NAME: &str = "xmltv.xml";
pub const DEFAULT_BASE_URL: &str = "https://www.tvtv.us";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listing: ListingConfig,
    pub output: OutputConfig,
    pub service: ServiceConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    pub lineup_id: String,
    /// IANA zone the programme times are written in
    pub timezone: String,
    /// Requested days; see [`ListingConfig::effective_days`]
    pub days: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub file_name: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Scheme and host of the listing service, also the prefix of channel logos
    pub base_url: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            lineup_id: DEFAULT_LINEUP_ID.to_string(),
            timezone: DEFAULT_TIMEZONE.to_string(),
            days: MAX_DAYS,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file_name: PathBuf::from(DEFAULT_FILE_NAME),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout_secs: 10,
            request_timeout_secs: 60,
        }
    }
}

impl ListingConfig {
    /// Days of programme data to fetch, clamped to `0..=8`
    pub fn effective_days(&self) -> u32 {
        self.days.clamp(0, MAX_DAYS) as u32
    }
}

impl ServiceConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Config {
    /// Load configuration from an optional TOML file
    ///
    /// Without a path the built-in defaults are used. Keys missing from the
    /// file fall back to their defaults.
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let Some(path) = path else {
            debug!("No configuration file given, using defaults");
            return Ok(Self::default());
        };

        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::configuration(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> AppResult<Self> {
        toml::from_str(contents)
            .map_err(|e| AppError::configuration(format!("Invalid configuration file: {}", e)))
    }

    /// Reject settings that can never produce a guide
    ///
    /// The timezone is not checked here; it is resolved when the first
    /// programme times are computed.
    pub fn validate(&self) -> AppResult<()> {
        if self.listing.lineup_id.trim().is_empty() {
            return Err(AppError::configuration("lineup id must not be empty"));
        }

        url::Url::parse(&self.service.base_url).map_err(|e| {
            AppError::configuration(format!(
                "Invalid service base URL '{}': {}",
                self.service.base_url, e
            ))
        })?;

        if self.output.file_name.as_os_str().is_empty() {
            return Err(AppError::configuration("output file name must not be empty"));
        }

        Ok(())
    }
}
