//! Per-speaker volume control (RenderingControl).

use super::executor::{execute_get, execute_set};
use super::soap::{SoapError, SoapResult};
use super::traits::SoapTransport;

/// Gets the speaker's master volume (0-100).
pub async fn get_volume(transport: &dyn SoapTransport, base_url: &str) -> SoapResult<u8> {
    let raw = execute_get(transport, base_url, "GetVolume", &[]).await?;
    raw.trim()
        .parse()
        .map_err(|_| SoapError::UnexpectedResponse {
            action: "GetVolume".into(),
            detail: format!("volume is not a number: {raw}"),
        })
}

/// Sets the speaker's master volume (values > 100 are clamped).
pub async fn set_volume(transport: &dyn SoapTransport, base_url: &str, volume: u8) -> SoapResult<()> {
    let clamped = volume.min(100);
    log::debug!("[Sonos] SetVolume {} on {}", clamped, base_url);
    execute_set(
        transport,
        base_url,
        "SetVolume",
        &[("DesiredVolume", clamped.to_string())],
    )
    .await
}
