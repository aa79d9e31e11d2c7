//! My Sonos favorites, read through ContentDirectory `Browse` of `FV:2`.
//!
//! The browse result is a DIDL-Lite document embedded as text. Each item
//! carries its playable URI in `res` and the metadata Sonos needs to play it
//! in `r:resMD`.

use serde::Serialize;
use serde_json::Value;

use super::executor::execute_query;
use super::soap::{SoapError, SoapResult};
use super::traits::SoapTransport;
use super::xml::parse_body;
use crate::protocol_constants::{FAVORITES_OBJECT_ID, MAX_FAVORITES};

/// Text key for the URI inside `<res protocolInfo="...">uri</res>`.
const URI_KEY: &str = "uriIdentifier";

const STREAM_CLASSES: &[&str] = &["object.item.audioItem.audioBroadcast"];
const QUEUE_CLASSES: &[&str] = &[
    "object.container.album.musicAlbum",
    "object.container.playlistContainer",
    "object.item.audioItem.musicTrack",
    "object.container.playlistContainer#playlistItem",
];

/// How a favorite is started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingType {
    /// Set as transport URI and played directly (radio).
    Stream,
    /// Added to the queue, then the queue is played.
    Queue,
    Unsupported,
}

impl ProcessingType {
    fn for_class(upnp_class: &str) -> Self {
        if STREAM_CLASSES.contains(&upnp_class) {
            Self::Stream
        } else if QUEUE_CLASSES.contains(&upnp_class) {
            Self::Queue
        } else {
            Self::Unsupported
        }
    }
}

/// One My Sonos entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MySonosItem {
    pub title: String,
    pub album_art: String,
    pub uri: String,
    pub metadata: String,
    /// Music service id, empty for local content.
    pub sid: String,
    pub upnp_class: String,
    pub processing_type: ProcessingType,
}

/// Service id between `?sid=` and `&flags=`, else empty.
#[must_use]
pub fn service_id(uri: &str) -> String {
    uri.split_once("?sid=")
        .and_then(|(_, rest)| rest.split_once("&flags="))
        .map(|(sid, _)| sid.to_string())
        .unwrap_or_default()
}

/// Content of the first `<upnp:class>` element, else empty.
#[must_use]
pub fn upnp_class(metadata: &str) -> String {
    metadata
        .split_once("<upnp:class>")
        .and_then(|(_, rest)| rest.split_once("</upnp:class>"))
        .map(|(class, _)| class.to_string())
        .unwrap_or_default()
}

fn text(item: &Value, key: &str) -> String {
    match item.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Object(fields)) => fields
            .get(URI_KEY)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        _ => String::new(),
    }
}

fn item_from(entry: &Value, base_url: &str) -> MySonosItem {
    let uri = text(entry, "res");
    let metadata = text(entry, "r:resMD");
    let class = upnp_class(&metadata);

    // Music library art is served by the player itself.
    let mut album_art = text(entry, "upnp:albumArtURI");
    if album_art.starts_with("/getaa") {
        album_art = format!("{base_url}{album_art}");
    }

    MySonosItem {
        title: text(entry, "dc:title"),
        album_art,
        sid: service_id(&uri),
        processing_type: ProcessingType::for_class(&class),
        upnp_class: class,
        uri,
        metadata,
    }
}

/// Parses the DIDL-Lite `Result` of a favorites browse.
///
/// # Errors
/// `SoapError::Parse` if the document is not well-formed or has no
/// `DIDL-Lite` root.
pub fn parse_favorites(didl: &str, base_url: &str) -> SoapResult<Vec<MySonosItem>> {
    if didl.trim().is_empty() {
        return Ok(Vec::new());
    }
    let parsed = parse_body(didl, URI_KEY)?;
    let root = parsed
        .get("DIDL-Lite")
        .ok_or_else(|| SoapError::Parse("favorites result is not DIDL-Lite".into()))?;

    let items = match root.get("item") {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(item) => vec![item],
        None => Vec::new(),
    };
    Ok(items
        .into_iter()
        .map(|entry| item_from(entry, base_url))
        .collect())
}

/// Reads every My Sonos item from the player (up to the browse limit).
pub async fn get_all_mysonos_items(
    transport: &dyn SoapTransport,
    base_url: &str,
) -> SoapResult<Vec<MySonosItem>> {
    let body = execute_query(
        transport,
        base_url,
        "Browse",
        &[
            ("ObjectID", FAVORITES_OBJECT_ID.to_string()),
            ("RequestedCount", MAX_FAVORITES.to_string()),
        ],
    )
    .await?;

    let didl = body
        .get("Result")
        .and_then(Value::as_str)
        .ok_or_else(|| SoapError::UnexpectedResponse {
            action: "Browse".into(),
            detail: "missing Result".into(),
        })?;
    let items = parse_favorites(didl, base_url)?;
    log::debug!("[Sonos] {} My Sonos item(s) on {}", items.len(), base_url);
    Ok(items)
}

/// First playable item whose title contains `search` (case-sensitive).
#[must_use]
pub fn find_by_title<'a>(items: &'a [MySonosItem], search: &str) -> Option<&'a MySonosItem> {
    items
        .iter()
        .find(|item| !item.uri.is_empty() && item.title.contains(search))
}
