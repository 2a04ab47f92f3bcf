//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `nestkit.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use nestkit_app::debounce::DEFAULT_DELAY;
use nestkit_app::engine::EngineOptions;
use nestkit_app::registry::DEFAULT_STALE_AFTER_MISSES;
use nestkit_domain::accessory::AccessoryInfoOverride;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Engine tuning.
    pub bridge: BridgeConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Simulated cloud settings.
    #[serde(rename = "virtual")]
    pub simulation: VirtualConfig,
    /// Per-device model / serial number overrides.
    pub accessory_info: Vec<AccessoryInfoOverride>,
}

/// Engine tuning.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Quiet period before a temperature write goes out, in milliseconds.
    pub debounce_ms: u64,
    /// Snapshots a device may be missing from before its accessory is
    /// removed; `0` keeps it forever.
    pub stale_after_misses: u32,
    /// Expose away, eco mode, fan timer and the other extra characteristics.
    pub extended_characteristics: bool,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Simulated cloud configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VirtualConfig {
    /// JSON device tree to serve instead of the built-in demo home.
    pub fixture: Option<PathBuf>,
}

impl Config {
    /// Load configuration from `nestkit.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("nestkit.toml")?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("NESTKIT_DEBOUNCE_MS")
            && let Ok(ms) = val.parse()
        {
            self.bridge.debounce_ms = ms;
        }
        if let Some(val) = var("NESTKIT_FIXTURE") {
            self.simulation.fixture = Some(PathBuf::from(val));
        }
        if let Some(val) = var("NESTKIT_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.bridge.debounce_ms == 0 {
            return Err(ConfigError::Validation(
                "debounce_ms must be non-zero".to_string(),
            ));
        }
        if let Some(index) = self
            .accessory_info
            .iter()
            .position(|entry| entry.device_id.is_empty())
        {
            return Err(ConfigError::Validation(format!(
                "accessory_info[{index}] needs a device_id"
            )));
        }
        Ok(())
    }

    /// Engine options derived from the `[bridge]` and `[[accessory_info]]`
    /// sections.
    #[must_use]
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            debounce: Duration::from_millis(self.bridge.debounce_ms),
            stale_after_misses: self.bridge.stale_after_misses,
            extended_characteristics: self.bridge.extended_characteristics,
            accessory_info: self.accessory_info.clone(),
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            debounce_ms: u64::try_from(DEFAULT_DELAY.as_millis()).unwrap_or(u64::MAX),
            stale_after_misses: DEFAULT_STALE_AFTER_MISSES,
            extended_characteristics: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "nestkitd=info,nestkit=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
