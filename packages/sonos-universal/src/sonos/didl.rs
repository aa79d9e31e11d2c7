//! DIDL-Lite metadata formatting for Sonos display.
//!
//! Sonos shows the `dc:title` of the metadata sent with `SetAVTransportURI`.
//! These builders return raw DIDL-Lite; encoding for the SOAP body happens in
//! `playback::set_av_transport_uri`.

use reqwest::Url;

use super::utils::encode_xml;
use crate::protocol_constants::{HTTP_RADIO_SCHEME, TUNEIN_SERVICE_ID};

const DIDL_OPEN: &str = r#"<DIDL-Lite xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:upnp="urn:schemas-upnp-org:metadata-1-0/upnp/" xmlns:r="urn:schemas-rinconnetworks-com:metadata-1-0/" xmlns="urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/">"#;

/// Guesses a MIME type from the URI's file extension.
fn mime_for(uri: &str) -> &'static str {
    let path = Url::parse(uri)
        .map(|u| u.path().to_ascii_lowercase())
        .unwrap_or_else(|_| uri.to_ascii_lowercase());

    match path.rsplit_once('.').map(|(_, ext)| ext) {
        Some("mp3") => "audio/mpeg",
        Some("m4a") | Some("mp4") | Some("aac") => "audio/mp4",
        Some("ogg") | Some("oga") => "audio/ogg",
        Some("flac") => "audio/flac",
        Some("wav") => "audio/wav",
        _ => "*",
    }
}

/// Title shown for an announcement: the file name, else the whole URI.
fn title_for(uri: &str) -> String {
    Url::parse(uri)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|mut s| s.next_back().map(str::to_string))
        })
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| uri.to_string())
}

/// Metadata for an announcement clip.
#[must_use]
pub fn notification_metadata(uri: &str) -> String {
    let mut didl = String::from(DIDL_OPEN);
    didl.push_str(r#"<item id="-1" parentID="-1" restricted="true">"#);
    didl.push_str(&format!(
        "<dc:title>{}</dc:title>",
        encode_xml(&title_for(uri))
    ));
    didl.push_str("<upnp:class>object.item.audioItem.musicTrack</upnp:class>");
    didl.push_str(&format!(
        r#"<res protocolInfo="http-get:*:{}:*">{}</res>"#,
        mime_for(uri),
        encode_xml(uri)
    ));
    didl.push_str("</item></DIDL-Lite>");
    didl
}

/// Stream URI for a TuneIn station id such as `s24896`.
#[must_use]
pub fn tunein_uri(station_id: &str) -> String {
    format!(
        "x-sonosapi-stream:{}?sid={}&flags=8224&sn=0",
        station_id, TUNEIN_SERVICE_ID
    )
}

/// Metadata Sonos expects for a TuneIn station.
#[must_use]
pub fn tunein_metadata(station_id: &str) -> String {
    let mut didl = String::from(DIDL_OPEN);
    didl.push_str(&format!(
        r#"<item id="F00092020{}" parentID="L" restricted="true">"#,
        encode_xml(station_id)
    ));
    didl.push_str("<dc:title>tunein</dc:title>");
    didl.push_str("<upnp:class>object.item.audioItem.audioBroadcast</upnp:class>");
    didl.push_str(r#"<desc id="cdudn" nameSpace="urn:schemas-rinconnetworks-com:metadata-1-0/">SA_RINCON65031_</desc>"#);
    didl.push_str("</item></DIDL-Lite>");
    didl
}

/// Radio form of an `http://` or `https://` stream URL.
#[must_use]
pub fn http_radio_uri(url: &str) -> String {
    match url.split_once("://") {
        Some((_, rest)) => format!("{HTTP_RADIO_SCHEME}://{rest}"),
        None => format!("{HTTP_RADIO_SCHEME}://{url}"),
    }
}

/// Metadata for an HTTP radio stream, titled with its URL.
#[must_use]
pub fn http_radio_metadata(url: &str) -> String {
    let mut didl = String::from(DIDL_OPEN);
    didl.push_str(r#"<item id="R:0/0/0" parentID="R:0/0" restricted="true">"#);
    didl.push_str(&format!("<dc:title>{}</dc:title>", encode_xml(url)));
    didl.push_str("<upnp:class>object.item.audioItem.audioBroadcast</upnp:class>");
    didl.push_str(r#"<desc id="cdudn" nameSpace="urn:schemas-rinconnetworks-com:metadata-1-0/">SA_RINCON65031_</desc>"#);
    didl.push_str("</item></DIDL-Lite>");
    didl
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_metadata_uses_file_name_and_mime() {
        let didl = notification_metadata("http://192.168.1.2/sounds/door%20bell.mp3");
        assert!(didl.contains("<dc:title>door%20bell.mp3</dc:title>"));
        assert!(didl.contains(r#"protocolInfo="http-get:*:audio/mpeg:*""#));
        assert!(didl.contains("object.item.audioItem.musicTrack"));
    }

    #[test]
    fn notification_metadata_escapes_uri() {
        let didl = notification_metadata("http://host/tts?text=a&lang=en");
        assert!(didl.contains("http://host/tts?text=a&amp;lang=en</res>"));
        assert!(didl.contains(r#"protocolInfo="http-get:*:*:*""#));
    }

    #[test]
    fn tunein_uri_and_metadata() {
        assert_eq!(
            tunein_uri("s111111"),
            "x-sonosapi-stream:s111111?sid=254&flags=8224&sn=0"
        );
        let didl = tunein_metadata("s111111");
        assert!(didl.contains(r#"<item id="F00092020s111111" parentID="L""#));
        assert!(didl.contains("SA_RINCON65031_"));
    }

    #[test]
    fn http_radio_replaces_the_scheme() {
        assert_eq!(
            http_radio_uri("http://stream.radioparadise.com/mp3-192"),
            "x-rincon-mp3radio://stream.radioparadise.com/mp3-192"
        );
        assert_eq!(
            http_radio_uri("https://icecast.example/live?a=1&b=2"),
            "x-rincon-mp3radio://icecast.example/live?a=1&b=2"
        );
        let didl = http_radio_metadata("http://host/live?a=1&b=2");
        assert!(didl.contains("<dc:title>http://host/live?a=1&amp;b=2</dc:title>"));
        assert!(didl.contains("object.item.audioItem.audioBroadcast"));
    }
}
