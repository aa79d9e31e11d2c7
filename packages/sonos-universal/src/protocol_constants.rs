//! Fixed protocol constants that should NOT be changed.
//!
//! These values are defined by external specifications (UPnP, SOAP) or by
//! Sonos firmware behavior, and changing them would break protocol compliance.

// ─────────────────────────────────────────────────────────────────────────────
// HTTP/SOAP
// ─────────────────────────────────────────────────────────────────────────────

/// Default Sonos speaker control port.
pub const SONOS_PORT: u16 = 1400;

/// SOAP 1.1 envelope namespace.
pub const SOAP_ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// SOAP 1.1 encoding style.
pub const SOAP_ENCODING_STYLE: &str = "http://schemas.xmlsoap.org/soap/encoding/";

/// Content type sent with every SOAP request.
pub const SOAP_CONTENT_TYPE: &str = "text/xml; charset=utf8";

/// HTTP status used by UPnP devices to signal a SOAP fault.
pub const SOAP_FAULT_STATUS: u16 = 500;

/// Message used when a UPnP error code has no known description.
pub const UNKNOWN_UPNP_ERROR: &str = "unknown error";

/// Default text key for mixed-content elements in parsed SOAP bodies.
pub const DEFAULT_TEXT_KEY: &str = "_";

// ─────────────────────────────────────────────────────────────────────────────
// Timeouts
// ─────────────────────────────────────────────────────────────────────────────

/// Default TCP connect timeout for SOAP requests (milliseconds).
pub const SOAP_CONNECT_TIMEOUT_MS: u64 = 5_000;

/// Default total timeout for SOAP requests (milliseconds).
///
/// 10 seconds is reasonable for LAN operations.
pub const SOAP_TIMEOUT_MS: u64 = 10_000;

// ─────────────────────────────────────────────────────────────────────────────
// Notifications
// ─────────────────────────────────────────────────────────────────────────────

/// Hold time used when the player cannot report a track duration (milliseconds).
pub const DEFAULT_NOTIFICATION_DURATION_MS: u64 = 5_000;

/// Safety margin added to a player-reported track duration (milliseconds).
///
/// Covers buffering before the announcement actually starts.
pub const AUTOMATIC_DURATION_MARGIN_MS: u64 = 2_000;

// ─────────────────────────────────────────────────────────────────────────────
// Content URIs
// ─────────────────────────────────────────────────────────────────────────────

/// Service id Sonos uses for TuneIn.
pub const TUNEIN_SERVICE_ID: u32 = 254;

/// Object id of the player's own queue in the ContentDirectory service.
pub const QUEUE_OBJECT_ID: &str = "Q:0";

/// Object id of the My Sonos favorites container.
pub const FAVORITES_OBJECT_ID: &str = "FV:2";

/// Favorites returned by one browse.
pub const MAX_FAVORITES: u32 = 100;

/// Scheme Sonos uses to play plain HTTP audio streams as radio.
pub const HTTP_RADIO_SCHEME: &str = "x-rincon-mp3radio";

/// Lowest volume accepted for group commands.
pub const MIN_COMMAND_VOLUME: u8 = 1;

/// Highest volume accepted for group commands.
pub const MAX_COMMAND_VOLUME: u8 = 99;
