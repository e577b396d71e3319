//! ==============================================================================
//! config.rs - Runtime Configuration Loader
//! ==============================================================================
//!
//! purpose:
//!     defines the schema for `reporter.toml`.
//!     loads configuration from file or falls back to defaults.
//!
//! structure:
//!     - EndpointConfig: Where observation records are posted.
//!     - ScheduleConfig: How long to wait between reports.
//!     - LoggingConfig: Default tracing filter when RUST_LOG is unset.
//!
//! every field has a default, so an empty or partial file is valid and
//! a missing file behaves exactly like the built-in settings.
//!
//! ==============================================================================

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:3001/api/vehicles";
pub const DEFAULT_INTERVAL_SECONDS: u64 = 10;

/// Root configuration structure
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct ReporterConfig {
    #[serde(default)]
    pub endpoint: EndpointConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct EndpointConfig {
    #[serde(default = "default_url")]
    pub url: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ScheduleConfig {
    #[serde(default = "default_interval")]
    pub interval_seconds: u64,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_url() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_interval() -> u64 {
    DEFAULT_INTERVAL_SECONDS
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self { url: default_url() }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_interval(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

impl ReporterConfig {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| anyhow::anyhow!("Failed to read config file: {}", e))?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        toml::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse config: {}", e))
    }

    /// Load with default fallback
    pub fn load_or_default() -> (Self, ConfigOrigin) {
        let paths = [
            PathBuf::from("config").join("reporter.toml"),
            PathBuf::from("..").join("config").join("reporter.toml"),
        ];
        Self::load_first(&paths)
    }

    /// first path that exists and parses wins; broken files are skipped
    pub fn load_first(paths: &[PathBuf]) -> (Self, ConfigOrigin) {
        let mut origin = ConfigOrigin::default();

        for path in paths {
            if path.exists() {
                match Self::load(path) {
                    Ok(config) => {
                        origin.loaded_from = Some(path.clone());
                        return (config, origin);
                    }
                    Err(e) => origin.rejected.push((path.clone(), e.to_string())),
                }
            }
        }

        (Self::default(), origin)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.schedule.interval_seconds)
    }

    /// Log configuration summary
    pub fn log_summary(&self) {
        info!(
            endpoint = %self.endpoint.url,
            interval_seconds = self.schedule.interval_seconds,
            log_level = %self.logging.level,
            "[CONFIG] reporter configuration"
        );
    }
}

/// where the configuration came from, reported once logging is up
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConfigOrigin {
    pub loaded_from: Option<PathBuf>,
    /// files that exist but failed to load, with the reason
    pub rejected: Vec<(PathBuf, String)>,
}

impl ConfigOrigin {
    pub fn log(&self) {
        for (path, reason) in &self.rejected {
            warn!("[CONFIG] Failed to load {}: {}", path.display(), reason);
        }
        match &self.loaded_from {
            Some(path) => info!("[CONFIG] Loaded from {}", path.display()),
            None => info!("[CONFIG] No config file found - using defaults"),
        }
    }
}
