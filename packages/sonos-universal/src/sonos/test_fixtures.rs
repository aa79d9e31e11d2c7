//! Shared test fixtures: SOAP response bodies, a scripted transport, and a
//! per-thread log capture.
//!
//! `MockTransport` records every call. Responses are scripted per action or
//! per (speaker, action) and stay in effect until replaced. Set actions that
//! were never scripted answer with a valid empty response.

use std::cell::RefCell;
use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::header::HeaderMap;

use super::actions::CATALOG;
use super::soap::{classify_failure, SoapError, SoapResponse, SoapResult};
use super::traits::SoapTransport;
use super::utils::encode_xml;

// ─────────────────────────────────────────────────────────────────────────────
// Response bodies
// ─────────────────────────────────────────────────────────────────────────────

fn envelope(inner: &str) -> String {
    format!(
        r#"<?xml version="1.0"?><s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/" s:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/"><s:Body>{inner}</s:Body></s:Envelope>"#
    )
}

/// Empty action response in the given namespace.
pub fn set_response_with_ns(action: &str, ns: &str) -> String {
    envelope(&format!(
        r#"<u:{action}Response xmlns:u="{ns}"></u:{action}Response>"#
    ))
}

/// Empty action response in the service's namespace.
pub fn set_response(action: &str, service_name: &str) -> String {
    set_response_with_ns(
        action,
        &format!("urn:schemas-upnp-org:service:{service_name}:1"),
    )
}

pub fn transport_info(state: &str) -> String {
    envelope(&format!(
        r#"<u:GetTransportInfoResponse xmlns:u="urn:schemas-upnp-org:service:AVTransport:1"><CurrentTransportState>{state}</CurrentTransportState><CurrentTransportStatus>OK</CurrentTransportStatus><CurrentSpeed>1</CurrentSpeed></u:GetTransportInfoResponse>"#
    ))
}

/// `metadata` is raw DIDL-Lite; it is escaped the way a speaker would send it.
pub fn media_info(uri: &str, metadata: &str, nr_tracks: u32) -> String {
    envelope(&format!(
        r#"<u:GetMediaInfoResponse xmlns:u="urn:schemas-upnp-org:service:AVTransport:1"><NrTracks>{nr_tracks}</NrTracks><MediaDuration>NOT_IMPLEMENTED</MediaDuration><CurrentURI>{}</CurrentURI><CurrentURIMetaData>{}</CurrentURIMetaData><NextURI></NextURI><NextURIMetaData></NextURIMetaData><PlayMedium>NETWORK</PlayMedium><RecordMedium>NOT_IMPLEMENTED</RecordMedium><WriteStatus>NOT_IMPLEMENTED</WriteStatus></u:GetMediaInfoResponse>"#,
        encode_xml(uri),
        encode_xml(metadata)
    ))
}

pub fn position_info(track: u32, duration: &str, rel_time: &str) -> String {
    envelope(&format!(
        r#"<u:GetPositionInfoResponse xmlns:u="urn:schemas-upnp-org:service:AVTransport:1"><Track>{track}</Track><TrackDuration>{duration}</TrackDuration><TrackMetaData></TrackMetaData><TrackURI></TrackURI><RelTime>{rel_time}</RelTime><AbsTime>NOT_IMPLEMENTED</AbsTime><RelCount>2147483647</RelCount><AbsCount>2147483647</AbsCount></u:GetPositionInfoResponse>"#
    ))
}

pub fn volume_response(volume: u8) -> String {
    envelope(&format!(
        r#"<u:GetVolumeResponse xmlns:u="urn:schemas-upnp-org:service:RenderingControl:1"><CurrentVolume>{volume}</CurrentVolume></u:GetVolumeResponse>"#
    ))
}

pub fn browse_queue(number_returned: u32, total_matches: u32) -> String {
    envelope(&format!(
        r#"<u:BrowseResponse xmlns:u="urn:schemas-upnp-org:service:ContentDirectory:1"><Result>&lt;DIDL-Lite&gt;&lt;/DIDL-Lite&gt;</Result><NumberReturned>{number_returned}</NumberReturned><TotalMatches>{total_matches}</TotalMatches><UpdateID>1</UpdateID></u:BrowseResponse>"#
    ))
}

/// Raw DIDL-Lite of three favorites: a TuneIn station, a library album,
/// and a podcast without URI.
pub fn favorites_didl() -> String {
    let radio_md = r#"<DIDL-Lite xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:upnp="urn:schemas-upnp-org:metadata-1-0/upnp/"><item id="F00092020s24896"><dc:title>Radio Paradise</dc:title><upnp:class>object.item.audioItem.audioBroadcast</upnp:class></item></DIDL-Lite>"#;
    let album_md = r#"<DIDL-Lite xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:upnp="urn:schemas-upnp-org:metadata-1-0/upnp/"><item id="A:ALBUM/Kind"><dc:title>Kind of Blue</dc:title><upnp:class>object.container.album.musicAlbum</upnp:class></item></DIDL-Lite>"#;
    let podcast_md = r#"<DIDL-Lite xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:upnp="urn:schemas-upnp-org:metadata-1-0/upnp/"><item id="P:1"><dc:title>Pocket Casts</dc:title><upnp:class>object.item.audioItem.podcast</upnp:class></item></DIDL-Lite>"#;

    format!(
        r#"<DIDL-Lite xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:upnp="urn:schemas-upnp-org:metadata-1-0/upnp/" xmlns:r="urn:schemas-rinconnetworks-com:metadata-1-0/" xmlns="urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/"><item id="FV:2/1" parentID="FV:2" restricted="false"><dc:title>Radio Paradise</dc:title><upnp:class>object.itemobject.item.sonos-favorite</upnp:class><upnp:albumArtURI>http://cdn-radiotime-logos.tunein.com/s24896q.png</upnp:albumArtURI><res protocolInfo="x-sonosapi-stream:*:*:*">{}</res><r:resMD>{}</r:resMD></item><item id="FV:2/2" parentID="FV:2" restricted="false"><dc:title>Kind of Blue</dc:title><upnp:class>object.itemobject.item.sonos-favorite</upnp:class><upnp:albumArtURI>/getaa?u=x-file-cifs%3a%2f%2fnas%2fa</upnp:albumArtURI><res protocolInfo="x-rincon-playlist:*:*:*">x-rincon-playlist:RINCON_A#A:ALBUM/Kind</res><r:resMD>{}</r:resMD></item><item id="FV:2/3" parentID="FV:2" restricted="false"><dc:title>Pocket Casts</dc:title><upnp:class>object.itemobject.item.sonos-favorite</upnp:class><r:resMD>{}</r:resMD></item></DIDL-Lite>"#,
        encode_xml("x-sonosapi-stream:s24896?sid=254&flags=8224&sn=0"),
        encode_xml(radio_md),
        encode_xml(album_md),
        encode_xml(podcast_md),
    )
}

/// Favorites browse response wrapping [`favorites_didl`].
pub fn browse_favorites() -> String {
    envelope(&format!(
        r#"<u:BrowseResponse xmlns:u="urn:schemas-upnp-org:service:ContentDirectory:1"><Result>{}</Result><NumberReturned>3</NumberReturned><TotalMatches>3</TotalMatches><UpdateID>1</UpdateID></u:BrowseResponse>"#,
        encode_xml(&favorites_didl())
    ))
}

/// Groups as `(coordinator uuid, [(uuid, host, zone name)])`.
pub fn zone_group_state(groups: &[(&str, &[(&str, &str, &str)])]) -> String {
    let mut inner = String::from("<ZoneGroupState><ZoneGroups>");
    for (i, (coordinator, members)) in groups.iter().enumerate() {
        inner.push_str(&format!(
            r#"<ZoneGroup Coordinator="{coordinator}" ID="{coordinator}:{i}">"#
        ));
        for (uuid, host, name) in members.iter() {
            inner.push_str(&format!(
                r#"<ZoneGroupMember UUID="{uuid}" Location="http://{host}:1400/xml/device_description.xml" ZoneName="{name}" Invisible="0"/>"#
            ));
        }
        inner.push_str("</ZoneGroup>");
    }
    inner.push_str("</ZoneGroups><VanishedDevices></VanishedDevices></ZoneGroupState>");

    envelope(&format!(
        r#"<u:GetZoneGroupStateResponse xmlns:u="urn:schemas-upnp-org:service:ZoneGroupTopology:1"><ZoneGroupState>{}</ZoneGroupState></u:GetZoneGroupStateResponse>"#,
        encode_xml(&inner)
    ))
}

/// UPnP fault body as sent with HTTP 500.
pub fn fault(code: &str) -> String {
    envelope(&format!(
        r#"<s:Fault><faultcode>s:Client</faultcode><faultstring>UPnPError</faultstring><detail><UPnPError xmlns="urn:schemas-upnp-org:control-1-0"><errorCode>{code}</errorCode></UPnPError></detail></s:Fault>"#
    ))
}

// ─────────────────────────────────────────────────────────────────────────────
// Mock transport
// ─────────────────────────────────────────────────────────────────────────────

/// One call seen by `MockTransport`.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub base_url: String,
    pub path: String,
    pub service: String,
    pub action: String,
    pub args: Vec<(String, String)>,
}

impl RecordedCall {
    pub fn arg(&self, name: &str) -> Option<&str> {
        self.args
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone)]
enum Script {
    Body { status: u16, body: String },
    Fault(String),
    Timeout,
}

#[derive(Default)]
pub struct MockTransport {
    calls: Mutex<Vec<RecordedCall>>,
    by_action: Mutex<HashMap<String, Script>>,
    by_target: Mutex<HashMap<(String, String), Script>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers `action` on every speaker with HTTP 200 and `body`.
    pub fn respond(&self, action: &str, body: String) {
        self.respond_with_status(action, 200, body);
    }

    pub fn respond_with_status(&self, action: &str, status: u16, body: String) {
        self.by_action
            .lock()
            .insert(action.to_string(), Script::Body { status, body });
    }

    /// Answers `action` on one speaker only.
    pub fn respond_at(&self, base_url: &str, action: &str, body: String) {
        self.by_target.lock().insert(
            (base_url.to_string(), action.to_string()),
            Script::Body { status: 200, body },
        );
    }

    /// Fails `action` on every speaker with a UPnP fault.
    pub fn fail_with_fault(&self, action: &str, code: &str) {
        self.by_action
            .lock()
            .insert(action.to_string(), Script::Fault(code.to_string()));
    }

    /// Fails `action` on one speaker with a UPnP fault.
    pub fn fail_at(&self, base_url: &str, action: &str, code: &str) {
        self.by_target.lock().insert(
            (base_url.to_string(), action.to_string()),
            Script::Fault(code.to_string()),
        );
    }

    pub fn time_out(&self, action: &str) {
        self.by_action
            .lock()
            .insert(action.to_string(), Script::Timeout);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Calls with the given wire action verb, in order.
    pub fn calls_for(&self, action: &str) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.action == action)
            .cloned()
            .collect()
    }

    /// Wire action verbs in call order.
    pub fn actions(&self) -> Vec<String> {
        self.calls.lock().iter().map(|c| c.action.clone()).collect()
    }

    fn script_for(&self, base_url: &str, action: &str) -> Option<Script> {
        let target = (base_url.to_string(), action.to_string());
        if let Some(script) = self.by_target.lock().get(&target) {
            return Some(script.clone());
        }
        self.by_action.lock().get(action).cloned()
    }
}

#[async_trait]
impl SoapTransport for MockTransport {
    async fn send(
        &self,
        base_url: &str,
        path: &str,
        service_name: &str,
        action: &str,
        args: &[(String, String)],
    ) -> SoapResult<SoapResponse> {
        self.calls.lock().push(RecordedCall {
            base_url: base_url.to_string(),
            path: path.to_string(),
            service: service_name.to_string(),
            action: action.to_string(),
            args: args.to_vec(),
        });

        let script = self.script_for(base_url, action).or_else(|| {
            CATALOG
                .iter()
                .any(|t| t.action == action && t.is_set())
                .then(|| Script::Body {
                    status: 200,
                    body: set_response(action, service_name),
                })
        });

        match script {
            Some(Script::Body { status, body }) if (200..300).contains(&status) => {
                Ok(SoapResponse {
                    headers: HeaderMap::new(),
                    body,
                    status,
                })
            }
            Some(Script::Body { status, body }) => {
                Err(classify_failure(service_name, action, status, body))
            }
            Some(Script::Fault(code)) => Err(classify_failure(
                service_name,
                action,
                500,
                fault(&code),
            )),
            Some(Script::Timeout) => Err(SoapError::Timeout {
                action: action.to_string(),
            }),
            None => Err(SoapError::MalformedFault {
                action: action.to_string(),
                status: 501,
                body: format!("no scripted response for {action}"),
            }),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Log capture
// ─────────────────────────────────────────────────────────────────────────────

thread_local! {
    static CAPTURED_LOGS: RefCell<Vec<(log::Level, String)>> = const { RefCell::new(Vec::new()) };
}

struct ThreadLogger;

impl log::Log for ThreadLogger {
    fn enabled(&self, _: &log::Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &log::Record<'_>) {
        CAPTURED_LOGS.with(|logs| {
            logs.borrow_mut()
                .push((record.level(), record.args().to_string()));
        });
    }

    fn flush(&self) {}
}

static THREAD_LOGGER: ThreadLogger = ThreadLogger;

/// Starts recording log records emitted on the current thread.
///
/// `#[tokio::test]` runs on a single thread, so records from the code under
/// test land here.
pub fn capture_logs() {
    // Another test may have installed it already.
    let _ = log::set_logger(&THREAD_LOGGER);
    log::set_max_level(log::LevelFilter::Trace);
    CAPTURED_LOGS.with(|logs| logs.borrow_mut().clear());
}

/// Records captured on this thread since [`capture_logs`].
pub fn captured_logs() -> Vec<(log::Level, String)> {
    CAPTURED_LOGS.with(|logs| logs.borrow().clone())
}
