//! Command names and their verb-specific parameters.
//!
//! Parsing happens entirely before any device is contacted: a request that
//! fails here never reaches the network.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::notification::NotificationDuration;
use super::params::{
    optional_bool, parse_duration, present, require_topic_string, validate_http_radio_url,
    validate_tunein_id, CommandMessage, Volume,
};
use crate::error::{UniversalError, UniversalResult};

/// A command as delivered by the host.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CommandRequest {
    pub command: String,
    #[serde(default)]
    pub message: CommandMessage,
}

impl CommandRequest {
    pub fn new(command: impl Into<String>, message: CommandMessage) -> Self {
        Self {
            command: command.into(),
            message,
        }
    }
}

/// Every recognized command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Play,
    Stop,
    NextTrack,
    PreviousTrack,
    TogglePlayback,
    PlayerGetVolume,
    PlayerSetVolume,
    GetPlaybackState,
    PlayerGetRole,
    PlayQueue,
    PlayTuneIn,
    PlayExport,
    PlayHttpRadio,
    GetMySonos,
    PlayMySonos,
    PlayNotification,
    JoinerPlayNotification,
}

impl Command {
    pub const ALL: [Command; 17] = [
        Self::Play,
        Self::Stop,
        Self::NextTrack,
        Self::PreviousTrack,
        Self::TogglePlayback,
        Self::PlayerGetVolume,
        Self::PlayerSetVolume,
        Self::GetPlaybackState,
        Self::PlayerGetRole,
        Self::PlayQueue,
        Self::PlayTuneIn,
        Self::PlayExport,
        Self::PlayHttpRadio,
        Self::GetMySonos,
        Self::PlayMySonos,
        Self::PlayNotification,
        Self::JoinerPlayNotification,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Play => "play",
            Self::Stop => "stop",
            Self::NextTrack => "next.track",
            Self::PreviousTrack => "previous.track",
            Self::TogglePlayback => "toggle.playback",
            Self::PlayerGetVolume => "player.get.volume",
            Self::PlayerSetVolume => "player.set.volume",
            Self::GetPlaybackState => "get.playbackstate",
            Self::PlayerGetRole => "player.get.role",
            Self::PlayQueue => "play.queue",
            Self::PlayTuneIn => "play.tunein",
            Self::PlayExport => "play.export",
            Self::PlayHttpRadio => "play.httpradio",
            Self::GetMySonos => "get.mysonos",
            Self::PlayMySonos => "play.mysonos",
            Self::PlayNotification => "play.notification",
            Self::JoinerPlayNotification => "joiner.play.notification",
        }
    }

    /// Notifications claim the group; everything else only checks it is free.
    #[must_use]
    pub fn is_notification(&self) -> bool {
        matches!(self, Self::PlayNotification | Self::JoinerPlayNotification)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Command {
    type Err = UniversalError;

    /// Case-insensitive; `group.play.notification` is an alias.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        if lowered == "group.play.notification" {
            return Ok(Self::PlayNotification);
        }
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == lowered)
            .ok_or_else(|| UniversalError::UnknownCommand(s.to_string()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Verb parameters
// ─────────────────────────────────────────────────────────────────────────────

/// Announcement parameters shared by both notification commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    pub uri: String,
    pub only_when_playing: bool,
    pub duration: NotificationDuration,
}

impl NotificationRequest {
    fn from_message(msg: &CommandMessage) -> UniversalResult<Self> {
        let uri = require_topic_string(present(&msg.topic))?;
        let duration = match present(&msg.duration) {
            Some(value) => NotificationDuration::Fixed(parse_duration(value)?),
            None => NotificationDuration::Automatic,
        };
        let only_when_playing = optional_bool(present(&msg.only_when_playing), "onlyWhenPlaying")?;
        Ok(Self {
            uri,
            only_when_playing,
            duration,
        })
    }
}

/// Content for `play.export`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub uri: String,
    pub metadata: String,
    pub queue: bool,
}

impl ExportRequest {
    fn from_message(msg: &CommandMessage) -> UniversalResult<Self> {
        let export = msg
            .export
            .as_ref()
            .ok_or_else(|| UniversalError::validation("export is missing"))?;

        let queue = match present(&export.queue) {
            Some(Value::Bool(b)) => *b,
            Some(_) => return Err(UniversalError::validation("export.queue is not boolean")),
            None => return Err(UniversalError::validation("queue identifier is missing")),
        };
        let uri = match present(&export.uri) {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            _ => return Err(UniversalError::validation("uri is missing")),
        };
        let metadata = match present(&export.metadata) {
            None => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(_) => return Err(UniversalError::validation("export.metadata is not a string")),
        };

        Ok(Self {
            uri,
            metadata,
            queue,
        })
    }
}

/// A command together with its validated verb-specific parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verb {
    Play,
    Stop,
    NextTrack,
    PreviousTrack,
    TogglePlayback,
    PlayerGetVolume,
    PlayerSetVolume(Volume),
    GetPlaybackState,
    PlayerGetRole,
    PlayQueue,
    PlayTuneIn(String),
    PlayExport(ExportRequest),
    PlayHttpRadio(String),
    GetMySonos,
    /// Title search string.
    PlayMySonos(String),
    PlayNotification(NotificationRequest),
    JoinerPlayNotification(NotificationRequest),
}

impl Verb {
    /// Validates what `command` needs beyond the shared group parameters.
    pub fn parse(command: Command, msg: &CommandMessage) -> UniversalResult<Self> {
        Ok(match command {
            Command::Play => Self::Play,
            Command::Stop => Self::Stop,
            Command::NextTrack => Self::NextTrack,
            Command::PreviousTrack => Self::PreviousTrack,
            Command::TogglePlayback => Self::TogglePlayback,
            Command::PlayerGetVolume => Self::PlayerGetVolume,
            Command::PlayerSetVolume => {
                let volume = match (present(&msg.volume), present(&msg.topic)) {
                    (Some(v), _) => Volume::from_value(v, "volume")?,
                    (None, Some(t)) => Volume::from_value(t, "topic")?,
                    (None, None) => {
                        return Err(UniversalError::validation("volume is missing"))
                    }
                };
                Self::PlayerSetVolume(volume)
            }
            Command::GetPlaybackState => Self::GetPlaybackState,
            Command::PlayerGetRole => Self::PlayerGetRole,
            Command::PlayQueue => Self::PlayQueue,
            Command::PlayTuneIn => Self::PlayTuneIn(validate_tunein_id(present(&msg.topic))?),
            Command::PlayExport => Self::PlayExport(ExportRequest::from_message(msg)?),
            Command::PlayHttpRadio => {
                Self::PlayHttpRadio(validate_http_radio_url(present(&msg.topic))?)
            }
            Command::GetMySonos => Self::GetMySonos,
            Command::PlayMySonos => Self::PlayMySonos(require_topic_string(present(&msg.topic))?),
            Command::PlayNotification => {
                Self::PlayNotification(NotificationRequest::from_message(msg)?)
            }
            Command::JoinerPlayNotification => {
                Self::JoinerPlayNotification(NotificationRequest::from_message(msg)?)
            }
        })
    }

    /// Verbs where `sameVolume: false` makes no sense for a lone player.
    #[must_use]
    pub fn guards_independent(&self) -> bool {
        matches!(
            self,
            Self::Play
                | Self::PlayQueue
                | Self::PlayTuneIn(_)
                | Self::PlayExport(_)
                | Self::PlayHttpRadio(_)
                | Self::PlayMySonos(_)
        )
    }
}
