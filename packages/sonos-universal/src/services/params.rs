//! Command message parsing and parameter validation.
//!
//! Hosts deliver a loosely typed JSON message; everything here turns it into
//! typed, range-checked values before any device is contacted.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{UniversalError, UniversalResult};
use crate::protocol_constants::{MAX_COMMAND_VOLUME, MIN_COMMAND_VOLUME};
use crate::sonos::utils::parse_hhmmss_ms;

// ─────────────────────────────────────────────────────────────────────────────
// Message
// ─────────────────────────────────────────────────────────────────────────────

/// Content to play with `play.export`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ExportItem {
    #[serde(default)]
    pub uri: Option<Value>,
    #[serde(default)]
    pub queue: Option<Value>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

/// The optional fields a command may carry. `null` counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandMessage {
    #[serde(default)]
    pub topic: Option<Value>,
    #[serde(default)]
    pub volume: Option<Value>,
    #[serde(default)]
    pub same_volume: Option<Value>,
    #[serde(default)]
    pub player_name: Option<Value>,
    #[serde(default)]
    pub duration: Option<Value>,
    #[serde(default)]
    pub only_when_playing: Option<Value>,
    #[serde(default)]
    pub export: Option<ExportItem>,
}

/// Returns the value unless it is missing or JSON `null`.
pub(crate) fn present(value: &Option<Value>) -> Option<&Value> {
    value.as_ref().filter(|v| !v.is_null())
}

// ─────────────────────────────────────────────────────────────────────────────
// Volume
// ─────────────────────────────────────────────────────────────────────────────

/// A command volume, always within 1..=99.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Volume(u8);

impl Volume {
    /// Returns `None` outside 1..=99.
    #[must_use]
    pub fn new(value: i64) -> Option<Self> {
        let range = i64::from(MIN_COMMAND_VOLUME)..=i64::from(MAX_COMMAND_VOLUME);
        // Range check keeps the cast lossless.
        range.contains(&value).then_some(Self(value as u8))
    }

    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }

    /// Parses an integer or a one/two digit numeral string.
    ///
    /// # Errors
    /// `Validation` naming `field` for any other type, form, or range.
    pub fn from_value(value: &Value, field: &str) -> UniversalResult<Self> {
        let number = match value {
            Value::Number(n) => n.as_i64().ok_or_else(|| {
                UniversalError::validation(format!("{field} is not integer"))
            })?,
            Value::String(s) => {
                let is_numeral = (1..=2).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit());
                if !is_numeral {
                    return Err(UniversalError::validation(format!(
                        "{field} is not a single/double digit"
                    )));
                }
                s.parse::<i64>().map_err(|_| {
                    UniversalError::validation(format!("{field} is not a single/double digit"))
                })?
            }
            _ => {
                return Err(UniversalError::validation(format!(
                    "{field} is not type string or number"
                )))
            }
        };

        Self::new(number).ok_or_else(|| {
            UniversalError::validation(format!(
                "{field} is out of range {MIN_COMMAND_VOLUME} .. {MAX_COMMAND_VOLUME}"
            ))
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Group parameters
// ─────────────────────────────────────────────────────────────────────────────

/// Parameters shared by every group command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedGroupParameters {
    /// Empty means "the addressed player".
    pub player_name: String,
    /// `None` means "don't touch volume".
    pub volume: Option<Volume>,
    pub same_volume: bool,
}

impl ValidatedGroupParameters {
    /// Validates `playerName`, `volume`, and `sameVolume`.
    ///
    /// An explicit `sameVolume: true` without a volume is rejected; the
    /// implicit default is not.
    pub fn from_message(msg: &CommandMessage) -> UniversalResult<Self> {
        let player_name = match present(&msg.player_name) {
            None => String::new(),
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(_) => {
                return Err(UniversalError::validation(
                    "playerName is not string or empty string",
                ))
            }
        };

        let volume = present(&msg.volume)
            .map(|v| Volume::from_value(v, "volume"))
            .transpose()?;

        let same_volume = match present(&msg.same_volume) {
            None => true,
            Some(Value::Bool(flag)) => {
                if *flag && volume.is_none() {
                    return Err(UniversalError::validation(
                        "sameVolume is true but no volume",
                    ));
                }
                *flag
            }
            Some(_) => {
                return Err(UniversalError::validation(
                    "invalid sameVolume - not boolean",
                ))
            }
        };

        Ok(Self {
            player_name,
            volume,
            same_volume,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Other fields
// ─────────────────────────────────────────────────────────────────────────────

/// Parses an `hh:mm:ss` duration (1-2 digit hours, 2 digit minutes/seconds).
pub fn parse_duration(value: &Value) -> UniversalResult<Duration> {
    let Value::String(s) = value else {
        return Err(UniversalError::validation("duration is not a string"));
    };

    let parts: Vec<&str> = s.split(':').collect();
    let well_formed = parts.len() == 3
        && (1..=2).contains(&parts[0].len())
        && parts[1].len() == 2
        && parts[2].len() == 2
        && parts.iter().all(|p| p.bytes().all(|b| b.is_ascii_digit()));

    match parse_hhmmss_ms(s) {
        Some(ms) if well_formed => Ok(Duration::from_millis(ms)),
        _ => Err(UniversalError::validation("duration is not format hh:mm:ss")),
    }
}

/// Checks a TuneIn station id (`s` followed by digits).
pub fn validate_tunein_id(value: Option<&Value>) -> UniversalResult<String> {
    let id = match value {
        Some(Value::String(s)) if !s.is_empty() => s,
        _ => {
            return Err(UniversalError::validation(
                "TuneIn radio id is undefined/invalid",
            ))
        }
    };

    let digits = id.strip_prefix('s').unwrap_or_default();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(UniversalError::validation(format!(
            "TuneIn radio id has wrong syntax: {id}"
        )));
    }
    Ok(id.clone())
}

/// Requires an `http` stream URL as topic.
pub fn validate_http_radio_url(value: Option<&Value>) -> UniversalResult<String> {
    let url = require_topic_string(value)?;
    if !url.starts_with("http") {
        return Err(UniversalError::validation("topic should start with http"));
    }
    Ok(url)
}

/// Requires a non-empty string topic (notification URI).
pub fn require_topic_string(value: Option<&Value>) -> UniversalResult<String> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(_) => Err(UniversalError::validation(
            "topic is not a string or empty string",
        )),
        None => Err(UniversalError::validation("topic is invalid")),
    }
}

/// Optional boolean flag; absent is `false`.
pub fn optional_bool(value: Option<&Value>, field: &str) -> UniversalResult<bool> {
    match value {
        None => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(UniversalError::validation(format!("{field} is not boolean"))),
    }
}
