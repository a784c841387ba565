use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{model::Location, schedule::RefreshSchedule};

pub const DEFAULT_LATITUDE: f64 = 42.358429;
pub const DEFAULT_LONGITUDE: f64 = -71.059769;
pub const DEFAULT_BASE_URL: &str = "http://forecast.weather.gov/MapClick.php";
pub const DEFAULT_USER_AGENT: &str = concat!("weather-relay/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_REFRESH_INTERVAL_MINUTES: u32 = 30;

/// Relay configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// latitude = 42.358429
/// longitude = -71.059769
/// base_url = "http://forecast.weather.gov/MapClick.php"
/// refresh_interval_minutes = 30
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub latitude: f64,
    pub longitude: f64,

    /// Provider endpoint; the query string is appended per request.
    pub base_url: String,

    /// weather.gov refuses requests without a User-Agent.
    pub user_agent: String,

    /// How often the wearable asks for a refresh. 0 disables the schedule.
    pub refresh_interval_minutes: u32,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            latitude: DEFAULT_LATITUDE,
            longitude: DEFAULT_LONGITUDE,
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            refresh_interval_minutes: DEFAULT_REFRESH_INTERVAL_MINUTES,
        }
    }
}

impl RelayConfig {
    /// The configured location, validated.
    pub fn location(&self) -> Result<Location> {
        Ok(Location::new(self.latitude, self.longitude)?)
    }

    /// The wearable's periodic request, if enabled.
    pub fn schedule(&self) -> Result<Option<RefreshSchedule>> {
        if self.refresh_interval_minutes == 0 {
            return Ok(None);
        }

        Ok(Some(RefreshSchedule::new(self.refresh_interval_minutes)?))
    }

    /// Load config from the default location, or defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: RelayConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to the default location.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save config, creating parent directories as needed.
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

    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-relay", "weather-relay")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
