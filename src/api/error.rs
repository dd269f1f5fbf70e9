//! Typed errors for the API client.

use reqwest::StatusCode;

use super::envelope::Envelope;

/// Errors raised by API calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The API answered with a non-good status. `message` is taken
    /// verbatim from the response body's `message` field; the envelope
    /// holds the whole failed exchange for display.
    #[error("API request failed: {message}")]
    Request {
        message: String,
        status: StatusCode,
        envelope: Envelope,
    },

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed API response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// The failed exchange, when the server actually answered.
    pub fn envelope(&self) -> Option<&Envelope> {
        match self {
            ApiError::Request { envelope, .. } => Some(envelope),
            _ => None,
        }
    }
}
