use std::env;
use std::time::Duration;

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const DEFAULT_SETTINGS: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../",
    "configs/default.toml"
));

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    /// Root URL of the device web server, e.g. `http://192.168.4.1`
    pub base_url: String,
    pub request_timeout_ms: u64,
    pub connect_timeout_ms: u64,
}

impl Device {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timing {
    /// Cadence of the status poll
    pub poll_interval_ms: u64,
    /// Quiet period before a pulse change is sent
    pub debounce_ms: u64,
}

impl Timing {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            poll_interval_ms: 700,
            debounce_ms: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logger {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub device: Device,
    pub timing: Timing,
    pub logger: Logger,
}

impl Settings {
    /// Embedded defaults, then `configs/{RUN_MODE}.toml`, then `SERVODECK__*` variables.
    pub fn new() -> Result<Self> {
        let run_mode = env::var("RUN_MODE").unwrap_or("development".into());

        let settings: Settings = Config::builder()
            .add_source(File::from_str(DEFAULT_SETTINGS, FileFormat::Toml))
            .add_source(File::with_name(&format!("configs/{run_mode}")).required(false))
            .add_source(
                Environment::with_prefix("SERVODECK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;

        Ok(settings)
    }

    /// Parse settings from a TOML document layered over the embedded defaults.
    pub fn from_toml(document: &str) -> Result<Self> {
        let settings: Settings = Config::builder()
            .add_source(File::from_str(DEFAULT_SETTINGS, FileFormat::Toml))
            .add_source(File::from_str(document, FileFormat::Toml))
            .build()?
            .try_deserialize()?;

        settings.validate()?;

        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        reqwest::Url::parse(&self.device.base_url).map_err(|e| {
            Error::config(format!("invalid device.base_url '{}': {}", self.device.base_url, e))
        })?;

        if self.timing.poll_interval_ms == 0 {
            return Err(Error::config("timing.poll_interval_ms must be positive"));
        }
        if self.timing.debounce_ms == 0 {
            return Err(Error::config("timing.debounce_ms must be positive"));
        }

        Ok(())
    }
}
