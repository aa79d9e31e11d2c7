//! Low-level SOAP protocol implementation for UPnP/Sonos communication.
//!
//! This module handles envelope building, HTTP transport, and classification
//! of failed responses. Templated actions live in `actions.rs` and are run by
//! `executor.rs`.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Client;
use thiserror::Error;

use super::error_codes::upnp_error_message;
use super::services::urn_for;
use super::traits::SoapTransport;
use super::utils::extract_xml_text;
use crate::config::Config;
use crate::protocol_constants::{
    SOAP_CONTENT_TYPE, SOAP_ENCODING_STYLE, SOAP_ENVELOPE_NS, SOAP_FAULT_STATUS,
};

// ─────────────────────────────────────────────────────────────────────────────
// Error Types
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that can occur during SOAP operations with Sonos speakers.
#[derive(Debug, Error)]
pub enum SoapError {
    /// No response was received (connection refused, DNS, reset).
    #[error("{action}: HTTP request failed: {source}")]
    Transport {
        action: String,
        source: reqwest::Error,
    },

    /// The request exceeded the configured timeout.
    #[error("{action}: request timed out")]
    Timeout { action: String },

    /// The speaker answered HTTP 500 with a UPnP fault envelope.
    #[error("{action}: statusCode {status} & upnpErrorCode {code}. upnpErrorMessage >>{message}")]
    Fault {
        action: String,
        status: u16,
        code: String,
        message: String,
    },

    /// The speaker answered with an error status that is not a recognizable fault.
    #[error("{action}: HTTP error {status} without UPnP fault")]
    MalformedFault {
        action: String,
        status: u16,
        body: String,
    },

    /// The response arrived but did not match the action's contract.
    #[error("{action}: unexpected response: {detail}")]
    UnexpectedResponse { action: String, detail: String },

    /// No catalog entry exists for the requested action.
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    /// Failed to parse SOAP response XML.
    #[error("Failed to parse SOAP response: {0}")]
    Parse(String),
}

/// Convenient Result alias for SOAP operations.
pub type SoapResult<T> = Result<T, SoapError>;

impl SoapError {
    /// Returns the action this error originated from, where known.
    #[must_use]
    pub fn action(&self) -> Option<&str> {
        match self {
            Self::Transport { action, .. }
            | Self::Timeout { action }
            | Self::Fault { action, .. }
            | Self::MalformedFault { action, .. }
            | Self::UnexpectedResponse { action, .. } => Some(action),
            Self::UnknownAction(name) => Some(name),
            Self::Parse(_) => None,
        }
    }

    /// Returns the UPnP error code for protocol faults.
    #[must_use]
    pub fn upnp_code(&self) -> Option<&str> {
        match self {
            Self::Fault { code, .. } => Some(code),
            _ => None,
        }
    }

    fn from_reqwest(action: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                action: action.to_string(),
            }
        } else {
            Self::Transport {
                action: action.to_string(),
                source: err,
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// SOAP Request/Response
// ─────────────────────────────────────────────────────────────────────────────

/// A successful (2xx) answer from a speaker.
#[derive(Debug, Clone)]
pub struct SoapResponse {
    pub headers: HeaderMap,
    pub body: String,
    pub status: u16,
}

/// Builds a single-line SOAP 1.1 envelope for one action.
///
/// Argument values are embedded verbatim; callers encode URIs and metadata
/// with `encode_xml` beforehand. Sonos rejects whitespace before the root
/// element, so the envelope has none.
#[must_use]
pub fn build_envelope(service_name: &str, action: &str, args: &[(String, String)]) -> String {
    let mut body = format!(
        r#"<?xml version="1.0" encoding="utf-8"?><s:Envelope xmlns:s="{}" s:encodingStyle="{}"><s:Body><u:{} xmlns:u="{}">"#,
        SOAP_ENVELOPE_NS,
        SOAP_ENCODING_STYLE,
        action,
        urn_for(service_name)
    );

    for (k, v) in args {
        body.push_str(&format!("<{k}>{v}</{k}>"));
    }

    body.push_str(&format!("</u:{}></s:Body></s:Envelope>", action));
    body
}

/// Returns the quoted `SOAPAction` header value.
#[must_use]
pub fn soap_action_header(service_name: &str, action: &str) -> String {
    format!("\"{}#{}\"", urn_for(service_name), action)
}

/// Classifies a non-success HTTP answer.
///
/// A 500 whose body carries a UPnP `errorCode` becomes `Fault` with the
/// message resolved against the action and service tables. Anything else is
/// `MalformedFault`.
#[must_use]
pub fn classify_failure(service_name: &str, action: &str, status: u16, body: String) -> SoapError {
    if status == SOAP_FAULT_STATUS {
        if let Some(code) = extract_xml_text(&body, "errorCode").filter(|c| !c.trim().is_empty()) {
            let code = code.trim().to_string();
            let message = upnp_error_message(&code, &[action, service_name]).to_string();
            log::warn!("[SOAP] {} fault: upnpErrorCode {} ({})", action, code, message);
            return SoapError::Fault {
                action: action.to_string(),
                status,
                code,
                message,
            };
        }
    }

    log::warn!("[SOAP] {} failed with status {} and no UPnP fault", action, status);
    SoapError::MalformedFault {
        action: action.to_string(),
        status,
        body,
    }
}

/// SOAP transport over HTTP using a shared `reqwest` client.
#[derive(Clone)]
pub struct HttpSoapTransport {
    client: Client,
    timeout: Duration,
}

impl HttpSoapTransport {
    /// Creates a transport with the connect and total timeouts from `config`.
    ///
    /// # Errors
    /// Fails if the HTTP client cannot be constructed.
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let timeout = Duration::from_millis(config.soap_timeout_ms);
        let client = Client::builder()
            .connect_timeout(Duration::from_millis(config.soap_connect_timeout_ms))
            .timeout(timeout)
            .build()?;
        Ok(Self { client, timeout })
    }
}

#[async_trait]
impl SoapTransport for HttpSoapTransport {
    async fn send(
        &self,
        base_url: &str,
        path: &str,
        service_name: &str,
        action: &str,
        args: &[(String, String)],
    ) -> SoapResult<SoapResponse> {
        let url = format!("{}{}", base_url.trim_end_matches('/'), path);
        let body = build_envelope(service_name, action, args);

        log::info!("[SOAP] {} -> {} (body: {} bytes)", action, url, body.len());
        log::debug!("[SOAP] Request body: {}", body);

        let start = Instant::now();
        let res = self
            .client
            .post(&url)
            .header("Content-Type", SOAP_CONTENT_TYPE)
            .header("SOAPAction", soap_action_header(service_name, action))
            .body(body)
            .timeout(self.timeout)
            .send()
            .await;

        log::info!(
            "[SOAP] {} completed in {:?}: {:?}",
            action,
            start.elapsed(),
            res.as_ref().map(|r| r.status())
        );

        let res = res.map_err(|e| SoapError::from_reqwest(action, e))?;
        let status = res.status().as_u16();
        let headers = res.headers().clone();
        let body = res
            .text()
            .await
            .map_err(|e| SoapError::from_reqwest(action, e))?;

        if !(200..300).contains(&status) {
            return Err(classify_failure(service_name, action, status, body));
        }

        Ok(SoapResponse {
            headers,
            body,
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sonos::test_fixtures;

    #[test]
    fn envelope_is_single_line_with_verbatim_args() {
        let args = vec![
            ("InstanceID".to_string(), "0".to_string()),
            ("CurrentURI".to_string(), "http://x/a.mp3?b=1&amp;c=2".to_string()),
        ];
        let env = build_envelope("AVTransport", "SetAVTransportURI", &args);

        assert!(env.starts_with(r#"<?xml version="1.0" encoding="utf-8"?><s:Envelope"#));
        assert!(!env.contains('\n'));
        assert!(env.contains(
            r#"<u:SetAVTransportURI xmlns:u="urn:schemas-upnp-org:service:AVTransport:1">"#
        ));
        assert!(env.contains("<InstanceID>0</InstanceID>"));
        assert!(env.contains("<CurrentURI>http://x/a.mp3?b=1&amp;c=2</CurrentURI>"));
        assert!(env.ends_with("</u:SetAVTransportURI></s:Body></s:Envelope>"));
    }

    #[test]
    fn soap_action_header_is_quoted() {
        assert_eq!(
            soap_action_header("RenderingControl", "SetVolume"),
            r#""urn:schemas-upnp-org:service:RenderingControl:1#SetVolume""#
        );
    }

    #[test]
    fn fault_with_known_code_uses_catalog_message() {
        let err = classify_failure("AVTransport", "Play", 500, test_fixtures::fault("701"));
        match err {
            SoapError::Fault {
                status,
                code,
                message,
                ..
            } => {
                assert_eq!(status, 500);
                assert_eq!(code, "701");
                assert_eq!(message, "Transition not available");
            }
            other => panic!("expected fault, got {other:?}"),
        }
    }

    #[test]
    fn fault_with_generic_code_uses_upnp_table() {
        let err = classify_failure("AVTransport", "Play", 500, test_fixtures::fault("402"));
        assert!(matches!(err, SoapError::Fault { ref message, .. } if message == "Invalid Args"));
    }

    #[test]
    fn fault_with_unknown_code_says_unknown_error() {
        let err = classify_failure("AVTransport", "Play", 500, test_fixtures::fault("999"));
        assert!(matches!(err, SoapError::Fault { ref message, .. } if message == "unknown error"));
        assert_eq!(err.upnp_code(), Some("999"));
    }

    #[test]
    fn error_without_fault_shape_is_malformed() {
        let err = classify_failure("AVTransport", "Play", 500, "<html>oops</html>".into());
        assert!(matches!(err, SoapError::MalformedFault { status: 500, .. }));

        let err = classify_failure("AVTransport", "Play", 404, test_fixtures::fault("701"));
        assert!(matches!(err, SoapError::MalformedFault { status: 404, ref body, .. } if body.contains("701")));
    }
}
