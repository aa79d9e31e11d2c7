//! Sonos speaker control over UPnP/SOAP.
//!
//! # Module Structure
//!
//! - `services` - UPnP service definitions (URNs, paths)
//! - `actions` - Immutable catalog of templated actions
//! - `error_codes` - UPnP fault code descriptions
//! - `soap` - Envelope building, HTTP transport, fault classification
//! - `xml` - Generic SOAP body parser
//! - `executor` - Runs catalog actions and checks the response contract
//! - `traits` - Transport abstraction for testability
//! - `types` - Domain types for players, groups, and playback state
//! - `playback` - Transport control and state queries
//! - `volume` - Per-speaker volume
//! - `queue` - Queue inspection and selection
//! - `didl` - DIDL-Lite metadata for announcements, TuneIn and HTTP radio
//! - `favorites` - My Sonos favorites browse and lookup
//! - `zone_groups` - ZoneGroupState parsing and retrieval
//! - `topology` - Group resolution for an addressed player
//! - `utils` - Shared utility functions

pub mod actions;
pub(crate) mod didl;
pub mod error_codes;
pub mod executor;
pub mod favorites;
pub mod playback;
pub mod queue;
pub mod services;
pub mod soap;
pub mod topology;
pub mod traits;
pub mod types;
pub mod utils;
pub mod volume;
pub mod xml;
pub(crate) mod zone_groups;

#[cfg(test)]
pub(crate) mod test_fixtures;

// Re-export domain types
pub use services::SonosService;
pub use soap::{HttpSoapTransport, SoapError, SoapResponse, SoapResult};
pub use traits::SoapTransport;
pub use types::{GroupTopology, Member, PlayerAddress, Role, TransportState};
