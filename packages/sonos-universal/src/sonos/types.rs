use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::protocol_constants::SONOS_PORT;

// ─────────────────────────────────────────────────────────────────────────────
// Player Address
// ─────────────────────────────────────────────────────────────────────────────

/// Network address of the player a command is sent to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerAddress {
    pub host: String,
    pub port: u16,
}

impl PlayerAddress {
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// `http://{host}:{port}`
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Error returned when a player address string cannot be parsed.
#[derive(Debug, Clone, Error)]
#[error("invalid player address: {0}")]
pub struct ParsePlayerAddressError(String);

impl FromStr for PlayerAddress {
    type Err = ParsePlayerAddressError;

    /// Accepts `host`, `host:port`, or `http://host:port[/...]`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let without_scheme = trimmed.strip_prefix("http://").unwrap_or(trimmed);
        let authority = without_scheme.split('/').next().unwrap_or_default();
        if authority.is_empty() {
            return Err(ParsePlayerAddressError(s.to_string()));
        }

        match authority.rsplit_once(':') {
            Some((host, port)) if !host.is_empty() => {
                let port = port
                    .parse()
                    .map_err(|_| ParsePlayerAddressError(s.to_string()))?;
                Ok(Self::new(host, port))
            }
            Some(_) => Err(ParsePlayerAddressError(s.to_string())),
            None => Ok(Self::new(authority, SONOS_PORT)),
        }
    }
}

impl fmt::Display for PlayerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Transport State
// ─────────────────────────────────────────────────────────────────────────────

/// Playback state reported by `GetTransportInfo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportState {
    Playing,
    Paused,
    Stopped,
    Transitioning,
    NoMedia,
}

impl TransportState {
    /// Lower-case name used in result payloads.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
            Self::Transitioning => "transitioning",
            Self::NoMedia => "no_media",
        }
    }

    /// Playing or about to play.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing | Self::Transitioning)
    }
}

impl fmt::Display for TransportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown transport state string.
#[derive(Debug, Clone, Error)]
#[error("unknown transport state: {0}")]
pub struct ParseTransportStateError(pub String);

impl FromStr for TransportState {
    type Err = ParseTransportStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PLAYING" => Ok(Self::Playing),
            "PAUSED_PLAYBACK" | "PAUSED" => Ok(Self::Paused),
            "STOPPED" => Ok(Self::Stopped),
            "TRANSITIONING" => Ok(Self::Transitioning),
            "NO_MEDIA_PRESENT" => Ok(Self::NoMedia),
            other => Err(ParseTransportStateError(other.to_string())),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Media / Position
// ─────────────────────────────────────────────────────────────────────────────

/// Subset of `GetMediaInfo` needed to restore playback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaInfo {
    pub current_uri: String,
    /// Raw DIDL-Lite metadata, entities decoded.
    pub current_uri_metadata: String,
    pub nr_tracks: u32,
}

/// Subset of `GetPositionInfo` needed to restore playback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionInfo {
    pub track: u32,
    pub track_duration: String,
    pub rel_time: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Zone Groups
// ─────────────────────────────────────────────────────────────────────────────

/// A speaker as listed in ZoneGroupState.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneGroupMember {
    /// Unique identifier in RINCON_xxxxx format.
    pub uuid: String,
    pub host: String,
    pub port: u16,
    /// User-configured room name.
    pub zone_name: String,
}

/// A group as listed in ZoneGroupState, members in device order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneGroup {
    pub id: String,
    pub coordinator_uuid: String,
    pub members: Vec<ZoneGroupMember>,
}

/// One member of a resolved group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub hostname: String,
    pub port: u16,
    pub base_url: String,
    pub uuid: String,
    pub display_name: String,
}

impl From<&ZoneGroupMember> for Member {
    fn from(m: &ZoneGroupMember) -> Self {
        Self {
            hostname: m.host.clone(),
            port: m.port,
            base_url: format!("http://{}:{}", m.host, m.port),
            uuid: m.uuid.clone(),
            display_name: m.zone_name.clone(),
        }
    }
}

/// Role of the addressed player inside its group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Independent,
    Coordinator,
    Joiner,
}

impl Role {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Independent => "independent",
            Self::Coordinator => "coordinator",
            Self::Joiner => "joiner",
        }
    }
}

/// A resolved group with the coordinator at index 0.
///
/// Only constructible through [`GroupTopology::new`], which enforces that the
/// group is non-empty and the caller index is in range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupTopology {
    members: Vec<Member>,
    caller_index: usize,
}

impl GroupTopology {
    /// Builds a topology from the coordinator and the remaining members.
    ///
    /// Returns `None` if `caller_index` does not address a member.
    #[must_use]
    pub fn new(coordinator: Member, others: Vec<Member>, caller_index: usize) -> Option<Self> {
        let mut members = Vec::with_capacity(others.len() + 1);
        members.push(coordinator);
        members.extend(others);
        if caller_index >= members.len() {
            return None;
        }
        Some(Self {
            members,
            caller_index,
        })
    }

    #[must_use]
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    #[must_use]
    pub fn coordinator(&self) -> &Member {
        &self.members[0]
    }

    #[must_use]
    pub fn caller(&self) -> &Member {
        &self.members[self.caller_index]
    }

    #[must_use]
    pub fn caller_index(&self) -> usize {
        self.caller_index
    }

    /// Always at least 1: the coordinator.
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_independent(&self) -> bool {
        self.members.len() == 1
    }

    #[must_use]
    pub fn role(&self) -> Role {
        if self.is_independent() {
            Role::Independent
        } else if self.caller_index == 0 {
            Role::Coordinator
        } else {
            Role::Joiner
        }
    }
}
