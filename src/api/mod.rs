//! Thin client for the Quovo v2 aggregation API.

pub mod client;
pub mod envelope;
pub mod error;
pub mod types;

pub use client::{AuthMode, QuovoClient};
pub use envelope::{Envelope, RequestRecord};
pub use error::ApiError;
