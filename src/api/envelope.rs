//! Uniform request/response record returned by every API call.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::ApiError;

/// The request half of an [`Envelope`]: what was actually put on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestRecord {
    /// HTTP verb
    pub method: String,

    /// Full request URL, including any query string
    pub url: String,

    /// Headers attached to the request
    pub headers: Vec<(String, String)>,

    /// JSON body, for POST requests
    pub body: Option<Value>,
}

/// A completed API exchange: the originating request plus the parsed JSON
/// response body. Every client call returns one of these so the terminal
/// can show exactly what was sent and what came back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub request: RequestRecord,
    pub response: Value,
}

impl Envelope {
    /// Decode the response body into a typed model.
    pub fn decode<T: serde::de::DeserializeOwned>(&self) -> Result<T, ApiError> {
        Ok(serde_json::from_value(self.response.clone())?)
    }
}
