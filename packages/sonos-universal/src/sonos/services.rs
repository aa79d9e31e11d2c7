//! Sonos UPnP service definitions.
//!
//! This module provides a single source of truth for the service names,
//! URNs, and control paths used by the action catalog and SOAP transport.

use serde::Serialize;

/// Sonos UPnP services reachable through SOAP control.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SonosService {
    /// Audio/Video transport control (play, pause, stop, seek, transport URI).
    AVTransport,
    /// Individual speaker volume and mute control.
    RenderingControl,
    /// Browsing of queues and favorites.
    ContentDirectory,
    /// Zone group topology and membership information.
    ZoneGroupTopology,
}

impl SonosService {
    /// Returns the short service name used inside the `SOAPAction` header.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::AVTransport => "AVTransport",
            Self::RenderingControl => "RenderingControl",
            Self::ContentDirectory => "ContentDirectory",
            Self::ZoneGroupTopology => "ZoneGroupTopology",
        }
    }

    /// Returns the UPnP service URN.
    #[must_use]
    pub fn urn(&self) -> &'static str {
        match self {
            Self::AVTransport => "urn:schemas-upnp-org:service:AVTransport:1",
            Self::RenderingControl => "urn:schemas-upnp-org:service:RenderingControl:1",
            Self::ContentDirectory => "urn:schemas-upnp-org:service:ContentDirectory:1",
            Self::ZoneGroupTopology => "urn:schemas-upnp-org:service:ZoneGroupTopology:1",
        }
    }

    /// Returns the UPnP control endpoint path for SOAP requests.
    #[must_use]
    pub fn control_path(&self) -> &'static str {
        match self {
            Self::AVTransport => "/MediaRenderer/AVTransport/Control",
            Self::RenderingControl => "/MediaRenderer/RenderingControl/Control",
            Self::ContentDirectory => "/MediaServer/ContentDirectory/Control",
            Self::ZoneGroupTopology => "/ZoneGroupTopology/Control",
        }
    }
}

/// Builds the URN for a service given only its short name.
///
/// The transport receives plain service names from the action catalog, so the
/// URN is derived here rather than looked up.
#[must_use]
pub fn urn_for(service_name: &str) -> String {
    format!("urn:schemas-upnp-org:service:{}:1", service_name)
}
