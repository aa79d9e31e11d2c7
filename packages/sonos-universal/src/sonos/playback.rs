//! Playback control commands for Sonos speakers.
//!
//! Thin wrappers over the AVTransport catalog entries. Every function takes
//! the speaker's base URL (`http://host:port`); grouped speakers must be
//! addressed through their coordinator for transport commands.

use serde_json::Value;

use super::didl::{http_radio_metadata, http_radio_uri, tunein_metadata, tunein_uri};
use super::executor::{execute_get, execute_query, execute_set};
use super::soap::{SoapError, SoapResult};
use super::traits::SoapTransport;
use super::types::{MediaInfo, PositionInfo, TransportState};
use super::utils::encode_xml;

// ─────────────────────────────────────────────────────────────────────────────
// Transport Control
// ─────────────────────────────────────────────────────────────────────────────

pub async fn play(transport: &dyn SoapTransport, base_url: &str) -> SoapResult<()> {
    log::info!("[Sonos] Play on {}", base_url);
    execute_set(transport, base_url, "Play", &[]).await
}

pub async fn pause(transport: &dyn SoapTransport, base_url: &str) -> SoapResult<()> {
    log::info!("[Sonos] Pause on {}", base_url);
    execute_set(transport, base_url, "Pause", &[]).await
}

pub async fn stop(transport: &dyn SoapTransport, base_url: &str) -> SoapResult<()> {
    log::info!("[Sonos] Stop on {}", base_url);
    execute_set(transport, base_url, "Stop", &[]).await
}

pub async fn next(transport: &dyn SoapTransport, base_url: &str) -> SoapResult<()> {
    execute_set(transport, base_url, "Next", &[]).await
}

pub async fn previous(transport: &dyn SoapTransport, base_url: &str) -> SoapResult<()> {
    execute_set(transport, base_url, "Previous", &[]).await
}

/// Sets the transport URI without starting playback.
///
/// `uri` and `metadata` are raw; both are XML-encoded here. Empty metadata
/// is omitted so the template default (empty) is sent.
pub async fn set_av_transport_uri(
    transport: &dyn SoapTransport,
    base_url: &str,
    uri: &str,
    metadata: &str,
) -> SoapResult<()> {
    log::info!("[Sonos] SetAVTransportURI on {}: {}", base_url, uri);
    let mut overrides = vec![("CurrentURI", encode_xml(uri))];
    if !metadata.is_empty() {
        overrides.push(("CurrentURIMetaData", encode_xml(metadata)));
    }
    execute_set(transport, base_url, "SetAVTransportURI", &overrides).await
}

/// Seeks within the current track to `rel_time` (`h:mm:ss`).
pub async fn seek(transport: &dyn SoapTransport, base_url: &str, rel_time: &str) -> SoapResult<()> {
    execute_set(
        transport,
        base_url,
        "SeekRelTime",
        &[("Target", rel_time.to_string())],
    )
    .await
}

/// Selects a track number in the current queue (1-based).
pub async fn select_track(transport: &dyn SoapTransport, base_url: &str, track: u32) -> SoapResult<()> {
    execute_set(
        transport,
        base_url,
        "SelectTrack",
        &[("Target", track.to_string())],
    )
    .await
}

/// Tunes the player to a TuneIn station and starts playback.
pub async fn play_tunein(
    transport: &dyn SoapTransport,
    base_url: &str,
    station_id: &str,
) -> SoapResult<()> {
    set_av_transport_uri(
        transport,
        base_url,
        &tunein_uri(station_id),
        &tunein_metadata(station_id),
    )
    .await?;
    play(transport, base_url).await
}

/// Plays an HTTP audio stream as radio.
pub async fn play_http_radio(
    transport: &dyn SoapTransport,
    base_url: &str,
    url: &str,
) -> SoapResult<()> {
    set_av_transport_uri(
        transport,
        base_url,
        &http_radio_uri(url),
        &http_radio_metadata(url),
    )
    .await?;
    play(transport, base_url).await
}

// ─────────────────────────────────────────────────────────────────────────────
// State Queries
// ─────────────────────────────────────────────────────────────────────────────

pub async fn get_transport_state(
    transport: &dyn SoapTransport,
    base_url: &str,
) -> SoapResult<TransportState> {
    let raw = execute_get(transport, base_url, "GetTransportInfo", &[]).await?;
    raw.parse().map_err(|_| SoapError::UnexpectedResponse {
        action: "GetTransportInfo".into(),
        detail: format!("unknown transport state {raw}"),
    })
}

fn field(body: &Value, key: &str) -> String {
    body.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

pub async fn get_media_info(transport: &dyn SoapTransport, base_url: &str) -> SoapResult<MediaInfo> {
    let body = execute_query(transport, base_url, "GetMediaInfo", &[]).await?;
    Ok(MediaInfo {
        current_uri: field(&body, "CurrentURI"),
        current_uri_metadata: field(&body, "CurrentURIMetaData"),
        nr_tracks: field(&body, "NrTracks").parse().unwrap_or(0),
    })
}

pub async fn get_position_info(
    transport: &dyn SoapTransport,
    base_url: &str,
) -> SoapResult<PositionInfo> {
    let body = execute_query(transport, base_url, "GetPositionInfo", &[]).await?;
    Ok(PositionInfo {
        track: field(&body, "Track").parse().unwrap_or(0),
        track_duration: field(&body, "TrackDuration"),
        rel_time: field(&body, "RelTime"),
    })
}
