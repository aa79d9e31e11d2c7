//! Sonos Universal - group control and notification overlay for Sonos.
//!
//! Commands address one player of a household. The group it belongs to is
//! resolved fresh for every command, and the command is carried out through
//! the group's coordinator over UPnP/SOAP.
//!
//! # Architecture
//!
//! - [`sonos`]: Device layer (SOAP transport, action catalog, topology)
//! - [`services`]: Command layer (validation, dispatch, notifications)
//! - [`config`]: Timeouts and notification timing
//! - [`error`]: Centralized error types
//!
//! # Abstraction Traits
//!
//! [`SoapTransport`](sonos::SoapTransport) decouples every device call from
//! HTTP. [`HttpSoapTransport`] is the production implementation; tests
//! substitute a scripted transport.

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod protocol_constants;
pub mod services;
pub mod sonos;

// Re-export commonly used types at the crate root
pub use config::Config;
pub use error::{ErrorCode, ErrorReport, SoapResult, UniversalError, UniversalResult};

// Re-export Sonos types
pub use sonos::{
    GroupTopology, HttpSoapTransport, Member, PlayerAddress, Role, SoapError, SoapTransport,
    TransportState,
};

// Re-export service types
pub use services::{CommandMessage, CommandRequest, GroupController, ResultPatch};
