//! Runtime configuration for the core library.

use serde::{Deserialize, Serialize};

use crate::error::{UniversalError, UniversalResult};
use crate::protocol_constants::{
    AUTOMATIC_DURATION_MARGIN_MS, DEFAULT_NOTIFICATION_DURATION_MS, SOAP_CONNECT_TIMEOUT_MS,
    SOAP_TIMEOUT_MS,
};

/// Tunables for SOAP transport and notification timing.
///
/// All durations are milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// TCP connect timeout per SOAP request.
    pub soap_connect_timeout_ms: u64,
    /// Total timeout per SOAP request.
    pub soap_timeout_ms: u64,
    /// Notification hold time when the track duration is unknown.
    pub default_notification_duration_ms: u64,
    /// Margin added to a player-reported track duration.
    pub automatic_duration_margin_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            soap_connect_timeout_ms: SOAP_CONNECT_TIMEOUT_MS,
            soap_timeout_ms: SOAP_TIMEOUT_MS,
            default_notification_duration_ms: DEFAULT_NOTIFICATION_DURATION_MS,
            automatic_duration_margin_ms: AUTOMATIC_DURATION_MARGIN_MS,
        }
    }
}

impl Config {
    /// Rejects values that would make every request fail immediately.
    ///
    /// # Errors
    /// Returns `UniversalError::Validation` naming the offending field.
    pub fn validate(&self) -> UniversalResult<()> {
        if self.soap_connect_timeout_ms == 0 {
            return Err(UniversalError::validation(
                "soap_connect_timeout_ms must be greater than 0",
            ));
        }
        if self.soap_timeout_ms == 0 {
            return Err(UniversalError::validation(
                "soap_timeout_ms must be greater than 0",
            ));
        }
        if self.soap_connect_timeout_ms > self.soap_timeout_ms {
            return Err(UniversalError::validation(
                "soap_connect_timeout_ms must not exceed soap_timeout_ms",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert_eq!(config.soap_connect_timeout_ms, 5_000);
        assert_eq!(config.soap_timeout_ms, 10_000);
        assert_eq!(config.default_notification_duration_ms, 5_000);
        assert_eq!(config.automatic_duration_margin_ms, 2_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: Config = serde_json::from_str(r#"{"soap_timeout_ms": 20000}"#).unwrap();
        assert_eq!(config.soap_timeout_ms, 20_000);
        assert_eq!(config.soap_connect_timeout_ms, 5_000);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let config = Config {
            soap_timeout_ms: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(UniversalError::Validation(_))));
    }

    #[test]
    fn connect_timeout_above_total_is_rejected() {
        let config = Config {
            soap_connect_timeout_ms: 30_000,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
