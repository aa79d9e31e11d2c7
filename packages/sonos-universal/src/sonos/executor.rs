//! Runs catalog actions against a speaker and checks the response contract.

use serde_json::Value;

use super::actions::{build_args, lookup, ActionTemplate};
use super::soap::{SoapError, SoapResult};
use super::traits::SoapTransport;
use super::xml::{lookup_path, parse_body};
use crate::protocol_constants::DEFAULT_TEXT_KEY;

fn unexpected(template: &ActionTemplate, detail: impl Into<String>) -> SoapError {
    SoapError::UnexpectedResponse {
        action: template.name.to_string(),
        detail: detail.into(),
    }
}

/// Sends the action and returns the value found at its response path.
async fn send_and_extract(
    transport: &dyn SoapTransport,
    base_url: &str,
    template: &'static ActionTemplate,
    overrides: &[(&str, String)],
) -> SoapResult<Value> {
    let args = build_args(template, overrides);
    let response = transport
        .send(
            base_url,
            template.http_path(),
            template.service.name(),
            template.action,
            &args,
        )
        .await?;

    if response.status != 200 {
        return Err(unexpected(
            template,
            format!("status code {}", response.status),
        ));
    }
    if response.body.trim().is_empty() {
        return Err(unexpected(template, "missing body"));
    }

    let parsed = parse_body(&response.body, DEFAULT_TEXT_KEY)
        .map_err(|e| unexpected(template, e.to_string()))?;
    lookup_path(&parsed, template.response_path)
        .cloned()
        .ok_or_else(|| {
            unexpected(
                template,
                format!("missing {}", template.response_path.join("/")),
            )
        })
}

fn template_for(action_name: &str) -> SoapResult<&'static ActionTemplate> {
    lookup(action_name).ok_or_else(|| SoapError::UnknownAction(action_name.to_string()))
}

/// Executes a set action and verifies the expected response literal.
///
/// # Errors
/// `UnknownAction` for names outside the catalog; `UnexpectedResponse` when
/// the status, body, path, or value does not match the template.
pub async fn execute_set(
    transport: &dyn SoapTransport,
    base_url: &str,
    action_name: &str,
    overrides: &[(&str, String)],
) -> SoapResult<()> {
    let template = template_for(action_name)?;
    let expected = template
        .response_value
        .ok_or_else(|| unexpected(template, "not a set action"))?;

    let value = send_and_extract(transport, base_url, template, overrides).await?;
    if value.as_str() != Some(expected) {
        return Err(unexpected(
            template,
            format!("expected {expected}, got {value}"),
        ));
    }
    Ok(())
}

/// Executes an action and returns the string at its response path.
///
/// # Errors
/// As [`execute_set`], plus `UnexpectedResponse` when the value is not a
/// primitive string.
pub async fn execute_get(
    transport: &dyn SoapTransport,
    base_url: &str,
    action_name: &str,
    overrides: &[(&str, String)],
) -> SoapResult<String> {
    let template = template_for(action_name)?;
    match send_and_extract(transport, base_url, template, overrides).await? {
        Value::String(s) => Ok(s),
        other => Err(unexpected(template, format!("value is not a string: {other}"))),
    }
}

/// Executes an action and returns the subtree at its response path.
///
/// Used for responses with several fields (media info, position info, browse).
pub async fn execute_query(
    transport: &dyn SoapTransport,
    base_url: &str,
    action_name: &str,
    overrides: &[(&str, String)],
) -> SoapResult<Value> {
    let template = template_for(action_name)?;
    send_and_extract(transport, base_url, template, overrides).await
}
