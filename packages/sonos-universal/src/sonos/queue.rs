//! Queue operations: inspecting, filling, and selecting the player's queue.

use super::executor::{execute_query, execute_set};
use super::playback::{play, set_av_transport_uri};
use super::soap::SoapResult;
use super::traits::SoapTransport;
use super::utils::encode_xml;
use crate::protocol_constants::QUEUE_OBJECT_ID;

/// URI that makes a player play its own queue.
#[must_use]
pub fn queue_uri(coordinator_uuid: &str) -> String {
    format!("x-rincon-queue:{}#0", coordinator_uuid)
}

/// Returns the number of items in the player's queue.
///
/// Uses `TotalMatches` when present, else `NumberReturned`.
pub async fn queue_size(transport: &dyn SoapTransport, base_url: &str) -> SoapResult<u32> {
    let body = execute_query(
        transport,
        base_url,
        "Browse",
        &[
            ("ObjectID", QUEUE_OBJECT_ID.to_string()),
            ("RequestedCount", "1".to_string()),
        ],
    )
    .await?;

    let count = |key: &str| {
        body.get(key)
            .and_then(|v| v.as_str())
            .and_then(|s| s.trim().parse::<u32>().ok())
    };
    Ok(count("TotalMatches")
        .or_else(|| count("NumberReturned"))
        .unwrap_or(0))
}

/// Appends a URI to the queue. `uri` and `metadata` are raw.
pub async fn add_uri_to_queue(
    transport: &dyn SoapTransport,
    base_url: &str,
    uri: &str,
    metadata: &str,
) -> SoapResult<()> {
    log::info!("[Sonos] AddURIToQueue on {}: {}", base_url, uri);
    let mut overrides = vec![("EnqueuedURI", encode_xml(uri))];
    if !metadata.is_empty() {
        overrides.push(("EnqueuedURIMetaData", encode_xml(metadata)));
    }
    execute_set(transport, base_url, "AddURIToQueue", &overrides).await
}

/// Switches the coordinator to its queue without starting playback.
pub async fn select_queue(
    transport: &dyn SoapTransport,
    base_url: &str,
    coordinator_uuid: &str,
) -> SoapResult<()> {
    set_av_transport_uri(transport, base_url, &queue_uri(coordinator_uuid), "").await
}

/// Switches the coordinator to its queue and starts playback.
pub async fn play_queue(
    transport: &dyn SoapTransport,
    base_url: &str,
    coordinator_uuid: &str,
) -> SoapResult<()> {
    select_queue(transport, base_url, coordinator_uuid).await?;
    play(transport, base_url).await
}
