//! Error types shared by every client operation.

use serde_json::Value;
use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error returned by the client.
#[derive(Debug, Error)]
pub enum Error {
    /// The client could not be constructed. No request was attempted.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A request failed, either on the wire or with an error response.
    #[error(transparent)]
    Request(#[from] NotifyHubError),
}

/// Normalized failure for a single request.
///
/// Every failed call produces exactly one of these, no matter which endpoint
/// failed or which envelope shape the service used. A missing `status_code`
/// means the request never produced a response at all.
#[derive(Debug, Clone, PartialEq)]
pub struct NotifyHubError {
    /// Human-readable summary. Never empty.
    pub message: String,
    /// HTTP status of the response, when one was received.
    pub status_code: Option<u16>,
    /// Raw response body, kept for diagnostics.
    pub raw_response: Option<Value>,
    /// Per-field messages when the service reported a list-shaped error.
    pub validation_errors: Option<Vec<String>>,
}

impl NotifyHubError {
    /// Returns true when the response carried the given HTTP status.
    pub fn is_status(&self, code: u16) -> bool {
        self.status_code == Some(code)
    }

    /// Multi-line rendering of the failure: `[<status>] <message>` followed
    /// by one bullet per validation error. The status prefix is omitted when
    /// no response was received, the bullet list when there is nothing to
    /// list.
    pub fn full_message(&self) -> String {
        let mut out = self.to_string();
        if let Some(errors) = &self.validation_errors {
            if !errors.is_empty() {
                out.push_str("\nValidation errors:");
                for error in errors {
                    out.push_str("\n  - ");
                    out.push_str(error);
                }
            }
        }
        out
    }
}

impl std::fmt::Display for NotifyHubError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(code) = self.status_code {
            write!(f, "[{}] ", code)?;
        }
        f.write_str(&self.message)
    }
}

impl std::error::Error for NotifyHubError {}
