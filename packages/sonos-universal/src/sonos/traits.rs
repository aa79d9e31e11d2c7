//! Trait abstractions for Sonos operations.
//!
//! Everything above the wire depends on `SoapTransport` rather than on
//! `HttpSoapTransport`, so tests can script speaker behavior.

use async_trait::async_trait;

use super::soap::{SoapResponse, SoapResult};

/// Sends one SOAP action to one speaker.
#[async_trait]
pub trait SoapTransport: Send + Sync {
    /// Posts an action and returns the successful response.
    ///
    /// # Arguments
    /// * `base_url` - Speaker address including scheme and port, e.g. `http://192.168.1.30:1400`
    /// * `path` - Control endpoint, e.g. `/MediaRenderer/RenderingControl/Control`
    /// * `service_name` - Short service name, e.g. `RenderingControl`
    /// * `action` - Action verb, e.g. `SetVolume`
    /// * `args` - Ordered arguments, values already XML-encoded
    ///
    /// # Errors
    /// Non-2xx answers are classified into `SoapError::Fault` or
    /// `SoapError::MalformedFault`; missing responses into `Transport` or `Timeout`.
    async fn send(
        &self,
        base_url: &str,
        path: &str,
        service_name: &str,
        action: &str,
        args: &[(String, String)],
    ) -> SoapResult<SoapResponse>;
}
