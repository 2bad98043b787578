//! Error types for quaketracker.
//!
//! Uses `thiserror` for library-style error definitions.

use thiserror::Error;

/// Errors that can occur in quaketracker operations.
///
/// A failed fetch or parse is terminal for that refresh cycle only:
/// callers keep the prior snapshot and surface the message.
#[derive(Error, Debug)]
pub enum QuakeTrackerError {
    /// HTTP transport failed (no connectivity, timeout, TLS)
    #[error("network request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// Response body was not valid feed JSON
    #[error("failed to parse feed JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// Feed endpoint returned a non-2xx status
    #[error("USGS feed error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Response parsed but the envelope is not a FeatureCollection
    #[error("invalid feed response: {0}")]
    InvalidResponse(String),
}
