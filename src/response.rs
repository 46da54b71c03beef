//! Response unwrapping and error normalization.
//!
//! The NotifyHub service has not kept a stable envelope shape across its own
//! releases: payloads arrive either wrapped as `{"data": ...}` or bare, and
//! error bodies carry `error` or `message` fields that may be a single string
//! or a list of strings. Every transport outcome passes through
//! [`unwrap_response`] exactly once, so callers only ever see a typed payload
//! or a [`NotifyHubError`].

use log::debug;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::NotifyHubError;

/// Fallback message when the transport fails without any text of its own.
const NETWORK_ERROR_MESSAGE: &str = "Network error occurred";

/// Summary used when the service reports a list-shaped `message` field.
const VALIDATION_FAILED_MESSAGE: &str = "Validation failed";

/// An `error` or `message` field as the service actually sends it: a single
/// string, a list of strings, or some other shape carrying no usable text.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorDetail {
    Single(String),
    Many(Vec<String>),
    Other(Value),
}

impl ErrorDetail {
    /// Extracts the message and validation list this detail contributes.
    /// Empty strings and empty lists contribute nothing, so the non-empty
    /// message invariant holds.
    fn into_content(self, summary_for_lists: bool) -> Option<(String, Option<Vec<String>>)> {
        match self {
            ErrorDetail::Single(text) if !text.is_empty() => Some((text, None)),
            ErrorDetail::Many(items) if !items.is_empty() => {
                let message = if summary_for_lists {
                    VALIDATION_FAILED_MESSAGE.to_string()
                } else {
                    items.join(", ")
                };
                Some((message, Some(items)))
            }
            _ => None,
        }
    }
}

/// Error body fields shared by every observed envelope variant.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: Option<ErrorDetail>,
    #[serde(default)]
    message: Option<ErrorDetail>,
}

impl ErrorEnvelope {
    /// Applies the field precedence: `error` beats `message`, and a list in
    /// `error` is joined into the message while a list in `message` is
    /// summarized as a validation failure.
    fn classify(self) -> Option<(String, Option<Vec<String>>)> {
        if let Some(content) = self.error.and_then(|d| d.into_content(false)) {
            return Some(content);
        }
        self.message.and_then(|d| d.into_content(true))
    }
}

/// Converts a transport outcome into the operation's payload or a single
/// [`NotifyHubError`]. On success the payload is the envelope's `data` field
/// when one is present, otherwise the whole body.
pub async fn unwrap_response<T: DeserializeOwned>(
    outcome: reqwest::Result<Response>,
) -> Result<T, NotifyHubError> {
    let response = match outcome {
        Ok(response) => response,
        Err(error) => return Err(network_error(error)),
    };

    let status = response.status();
    if !status.is_success() {
        let transport_text = response
            .error_for_status_ref()
            .err()
            .map(|error| error.to_string())
            .unwrap_or_default();
        let body = response.json::<Value>().await.ok();
        debug!("Request failed with status {}", status);
        return Err(error_from_response(status, body, transport_text));
    }

    let bytes = match response.bytes().await {
        Ok(bytes) => bytes,
        Err(error) => return Err(network_error(error)),
    };
    let body: Value = serde_json::from_slice(&bytes)
        .map_err(|error| decode_error(status, None, &error))?;

    let payload = match body {
        Value::Object(mut fields) => match fields.remove("data") {
            Some(data) => data,
            None => Value::Object(fields),
        },
        other => other,
    };

    serde_json::from_value(payload.clone())
        .map_err(|error| decode_error(status, Some(payload), &error))
}

/// Builds the error for a request that never produced a response.
fn network_error(error: reqwest::Error) -> NotifyHubError {
    NotifyHubError {
        message: network_message(error.to_string()),
        status_code: None,
        raw_response: None,
        validation_errors: None,
    }
}

fn network_message(transport_text: String) -> String {
    if transport_text.is_empty() {
        NETWORK_ERROR_MESSAGE.to_string()
    } else {
        transport_text
    }
}

/// Builds the error for a non-2xx response, extracting the best message the
/// body offers and falling back to the transport's own text for the status.
fn error_from_response(
    status: StatusCode,
    body: Option<Value>,
    transport_text: String,
) -> NotifyHubError {
    let classified = body
        .as_ref()
        .and_then(|value| serde_json::from_value::<ErrorEnvelope>(value.clone()).ok())
        .and_then(ErrorEnvelope::classify);

    let (message, validation_errors) = match classified {
        Some(content) => content,
        None => (fallback_message(status, transport_text), None),
    };

    NotifyHubError {
        message,
        status_code: Some(status.as_u16()),
        raw_response: body,
        validation_errors,
    }
}

fn fallback_message(status: StatusCode, transport_text: String) -> String {
    if transport_text.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        transport_text
    }
}

fn decode_error(status: StatusCode, payload: Option<Value>, error: &serde_json::Error) -> NotifyHubError {
    NotifyHubError {
        message: format!("Failed to decode response body: {}", error),
        status_code: Some(status.as_u16()),
        raw_response: payload,
        validation_errors: None,
    }
}
