//! Centralized error types for the sonos-universal library.
//!
//! This module provides a unified error handling system that:
//! - Defines structured error types using `thiserror`
//! - Exposes machine-readable codes through the `ErrorCode` trait
//! - Serializes errors for hosts that forward them as messages

use serde::Serialize;
use thiserror::Error;

use crate::sonos::soap::SoapError;

/// Trait for error types that provide machine-readable error codes.
///
/// Implement this trait to provide consistent error codes across different
/// error conversion paths.
pub trait ErrorCode {
    /// Returns a machine-readable error code for result messages.
    fn code(&self) -> &'static str;
}

impl ErrorCode for SoapError {
    fn code(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "transport_error",
            Self::Timeout { .. } => "timeout",
            Self::Fault { .. } => "protocol_fault",
            Self::MalformedFault { .. } => "malformed_fault",
            Self::UnexpectedResponse { .. } => "unexpected_response",
            Self::UnknownAction(_) => "unknown_action",
            Self::Parse(_) => "unexpected_response",
        }
    }
}

/// Application-wide error type for group commands.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "details")]
pub enum UniversalError {
    /// A command parameter failed validation.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The anchor player returned no zone group data.
    #[error("Topology not found: undefined all groups data received")]
    TopologyNotFound,

    /// No group contains the requested player.
    #[error("Could not find player {0} in any group")]
    PlayerNotInAnyGroup(String),

    /// No response from the player (refused, unreachable, reset).
    #[error("{action}: transport error: {message}")]
    Transport { action: String, message: String },

    /// The player did not answer within the configured timeout.
    #[error("{action}: request timed out")]
    Timeout { action: String },

    /// The player reported a UPnP fault.
    #[error("{action}: statusCode {status} & upnpErrorCode {code}. upnpErrorMessage >>{message}")]
    ProtocolFault {
        action: String,
        status: u16,
        code: String,
        message: String,
    },

    /// The player answered with an error status that is not a UPnP fault.
    #[error("{action}: HTTP error {status} without UPnP fault")]
    MalformedFault {
        action: String,
        status: u16,
        body: String,
    },

    /// The player answered but the response broke the action's contract.
    #[error("{action}: unexpected response: {detail}")]
    UnexpectedResponse { action: String, detail: String },

    /// An action outside the catalog was requested.
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    /// Another command is still running on this player.
    #[error("Player {0} is busy with another command")]
    GroupBusy(String),

    /// The command string is not recognized.
    #[error("Unknown command: {0}")]
    UnknownCommand(String),
}

impl ErrorCode for UniversalError {
    fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::TopologyNotFound => "topology_not_found",
            Self::PlayerNotInAnyGroup(_) => "player_not_in_any_group",
            Self::Transport { .. } => "transport_error",
            Self::Timeout { .. } => "timeout",
            Self::ProtocolFault { .. } => "protocol_fault",
            Self::MalformedFault { .. } => "malformed_fault",
            Self::UnexpectedResponse { .. } => "unexpected_response",
            Self::UnknownAction(_) => "unknown_action",
            Self::GroupBusy(_) => "group_busy",
            Self::UnknownCommand(_) => "unknown_command",
        }
    }
}

impl UniversalError {
    /// Shorthand for a validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Result Type Aliases
// ─────────────────────────────────────────────────────────────────────────────

pub use crate::sonos::soap::SoapResult;

/// Convenient Result alias for group command operations.
pub type UniversalResult<T> = Result<T, UniversalError>;

/// Serializable error body handed back to hosts.
#[derive(Debug, Serialize)]
pub struct ErrorReport<'a> {
    pub code: &'static str,
    pub message: String,
    pub error: &'a UniversalError,
}

impl UniversalError {
    /// Builds the report hosts forward as an error message.
    #[must_use]
    pub fn report(&self) -> ErrorReport<'_> {
        ErrorReport {
            code: self.code(),
            message: self.to_string(),
            error: self,
        }
    }
}

impl From<SoapError> for UniversalError {
    fn from(err: SoapError) -> Self {
        match err {
            SoapError::Transport { action, source } => Self::Transport {
                action,
                message: source.to_string(),
            },
            SoapError::Timeout { action } => Self::Timeout { action },
            SoapError::Fault {
                action,
                status,
                code,
                message,
            } => Self::ProtocolFault {
                action,
                status,
                code,
                message,
            },
            SoapError::MalformedFault {
                action,
                status,
                body,
            } => Self::MalformedFault {
                action,
                status,
                body,
            },
            SoapError::UnexpectedResponse { action, detail } => {
                Self::UnexpectedResponse { action, detail }
            }
            SoapError::UnknownAction(name) => Self::UnknownAction(name),
            SoapError::Parse(detail) => Self::UnexpectedResponse {
                action: String::new(),
                detail,
            },
        }
    }
}
