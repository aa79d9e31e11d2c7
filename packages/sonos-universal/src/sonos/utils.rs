use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use reqwest::Url;

use crate::protocol_constants::SONOS_PORT;

// ─────────────────────────────────────────────────────────────────────────────
// XML Parsing Utilities
// ─────────────────────────────────────────────────────────────────────────────

/// Extracts text content from the first occurrence of an XML element.
///
/// Searches for an element by its local name (ignoring namespace prefixes)
/// and returns its decoded text content.
///
/// # Example
/// ```ignore
/// let xml = r#"<u:CurrentVolume>42</u:CurrentVolume>"#;
/// assert_eq!(extract_xml_text(xml, "CurrentVolume"), Some("42".to_string()));
/// ```
pub fn extract_xml_text(xml: &str, element_name: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let target_bytes = element_name.as_bytes();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.local_name().as_ref() == target_bytes => {
                if let Ok(text) = reader.read_text(e.name()) {
                    let decoded = html_escape::decode_html_entities(&text);
                    return Some(decoded.to_string());
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }
    None
}

/// Gets an attribute value from an XML element, with entities decoded.
pub fn get_xml_attr(elem: &BytesStart, attr_name: &[u8]) -> Option<String> {
    elem.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == attr_name)
        .map(|a| {
            let raw = String::from_utf8_lossy(&a.value);
            html_escape::decode_html_entities(&raw).into_owned()
        })
}

// ─────────────────────────────────────────────────────────────────────────────
// XML Encoding
// ─────────────────────────────────────────────────────────────────────────────

/// Escapes the five XML special characters.
///
/// SOAP arguments are embedded verbatim by the transport, so URIs and DIDL-Lite
/// metadata must be passed through this first.
///
/// # Example
/// ```ignore
/// assert_eq!(encode_xml("Tom & Jerry"), "Tom &amp; Jerry");
/// assert_eq!(encode_xml("<title>"), "&lt;title&gt;");
/// ```
pub fn encode_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

// ─────────────────────────────────────────────────────────────────────────────
// Time
// ─────────────────────────────────────────────────────────────────────────────

/// Parses a UPnP `h:mm:ss` / `hh:mm:ss` time string into milliseconds.
///
/// Fractional seconds (`0:00:07.250`) are accepted. Returns `None` for values
/// such as `NOT_IMPLEMENTED` or an empty string.
pub fn parse_hhmmss_ms(value: &str) -> Option<u64> {
    let mut parts = value.trim().split(':');
    let hours: u64 = parts.next()?.parse().ok()?;
    let minutes: u64 = parts.next()?.parse().ok()?;
    let seconds_part = parts.next()?;
    if parts.next().is_some() || minutes >= 60 {
        return None;
    }

    let (secs, frac_ms) = match seconds_part.split_once('.') {
        Some((s, frac)) => {
            let digits: String = frac.chars().take(3).collect();
            if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            let scale = 10u64.pow(3 - digits.len() as u32);
            (s, digits.parse::<u64>().ok()? * scale)
        }
        None => (seconds_part, 0),
    };
    let seconds: u64 = secs.parse().ok()?;
    if seconds >= 60 {
        return None;
    }

    Some((hours * 3600 + minutes * 60 + seconds) * 1000 + frac_ms)
}

// ─────────────────────────────────────────────────────────────────────────────
// Zone Group Parsing Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Extracts host and port from a UPnP Location URL.
///
/// `http://192.168.1.100:1400/xml/device_description.xml` yields
/// `("192.168.1.100", 1400)`. The port defaults to the Sonos control port.
pub fn host_port_from_location(location: &str) -> Option<(String, u16)> {
    let url = Url::parse(location).ok()?;
    let host = url.host_str()?.to_string();
    Some((host, url.port().unwrap_or(SONOS_PORT)))
}
