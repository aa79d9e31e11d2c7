//! CLI configuration.
//!
//! Supports loading from YAML files with environment variable overrides.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use sonos_universal::Config;

/// CLI configuration loaded from YAML with environment overrides.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct CliConfig {
    /// Player that receives commands when `--player` is not given.
    /// Override: `SONOS_UNIVERSAL_PLAYER`
    pub player: Option<String>,

    /// TCP connect timeout per SOAP request, in milliseconds.
    /// Override: `SONOS_UNIVERSAL_SOAP_CONNECT_TIMEOUT_MS`
    pub soap_connect_timeout_ms: u64,

    /// Total timeout per SOAP request, in milliseconds.
    /// Override: `SONOS_UNIVERSAL_SOAP_TIMEOUT_MS`
    pub soap_timeout_ms: u64,

    /// Notification hold time when the player cannot report a duration.
    /// Override: `SONOS_UNIVERSAL_NOTIFICATION_DURATION_MS`
    pub default_notification_duration_ms: u64,

    /// Margin added to a player-reported notification duration.
    pub automatic_duration_margin_ms: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        let core = Config::default();
        Self {
            player: None,
            soap_connect_timeout_ms: core.soap_connect_timeout_ms,
            soap_timeout_ms: core.soap_timeout_ms,
            default_notification_duration_ms: core.default_notification_duration_ms,
            automatic_duration_margin_ms: core.automatic_duration_margin_ms,
        }
    }
}

impl CliConfig {
    /// Loads configuration from a YAML file, then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = path {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Self::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Applies overrides from `lookup`, normally the process environment.
    /// Values that do not parse are ignored.
    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("SONOS_UNIVERSAL_PLAYER") {
            if !val.is_empty() {
                self.player = Some(val);
            }
        }

        let number = |key: &str| lookup(key).and_then(|v| v.parse::<u64>().ok());
        if let Some(ms) = number("SONOS_UNIVERSAL_SOAP_CONNECT_TIMEOUT_MS") {
            self.soap_connect_timeout_ms = ms;
        }
        if let Some(ms) = number("SONOS_UNIVERSAL_SOAP_TIMEOUT_MS") {
            self.soap_timeout_ms = ms;
        }
        if let Some(ms) = number("SONOS_UNIVERSAL_NOTIFICATION_DURATION_MS") {
            self.default_notification_duration_ms = ms;
        }
    }

    /// Converts to sonos-universal's Config type.
    pub fn to_core_config(&self) -> Config {
        Config {
            soap_connect_timeout_ms: self.soap_connect_timeout_ms,
            soap_timeout_ms: self.soap_timeout_ms,
            default_notification_duration_ms: self.default_notification_duration_ms,
            automatic_duration_margin_ms: self.automatic_duration_margin_ms,
        }
    }
}
