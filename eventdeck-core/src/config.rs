//! eventdeck configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, File};
use serde::{Deserialize, Deserializer};

use crate::error::{EventsError, EventsResult};

static DEFAULT_API_URL: &str = "http://localhost:3000";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_request_timeout() -> Duration {
    DEFAULT_REQUEST_TIMEOUT
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    humantime::parse_duration(&s).map_err(serde::de::Error::custom)
}

/// Configuration at ~/.config/eventdeck/config.toml
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Per-request timeout, e.g. "10s"
    #[serde(default = "default_request_timeout", deserialize_with = "deserialize_duration")]
    pub request_timeout: Duration,

    /// How long unobserved cache entries are kept, e.g. "5m". Zero drops them immediately.
    #[serde(default, deserialize_with = "deserialize_duration")]
    pub gc_time: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            api_url: default_api_url(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            gc_time: Duration::ZERO,
        }
    }
}

impl Settings {
    pub fn config_path() -> EventsResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| EventsError::Config("Could not determine config directory".into()))?
            .join("eventdeck");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, creating a commented-out config on first run.
    pub fn load() -> EventsResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> EventsResult<Self> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .build()
            .map_err(|e| EventsError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| EventsError::Config(e.to_string()))
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> EventsResult<()> {
        let contents = format!(
            "\
# eventdeck configuration

# Base URL of the event API:
# api_url = \"{}\"

# Timeout for each API request:
# request_timeout = \"{}\"

# Keep cached responses this long after leaving a screen:
# gc_time = \"5m\"
",
            DEFAULT_API_URL,
            humantime::format_duration(DEFAULT_REQUEST_TIMEOUT)
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                EventsError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| EventsError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
