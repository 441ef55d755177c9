//! Error types for the gateway and payload decoding.

use thiserror::Error;

/// Failure of a single gateway request.
///
/// Transport and status failures are both surfaced to the caller; the
/// gateway never retries.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The network call itself could not complete (DNS, refused, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status.
    #[error("API error: {status}")]
    Status { status: u16, body: String },

    /// A 2xx body that is not valid JSON for the expected type.
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The request could not be built (bad header name or value).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl GatewayError {
    /// HTTP status code, for status failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// The product collection envelope did not have the expected shape.
#[derive(Debug, Error)]
pub enum ShapeError {
    #[error("expected a JSON array or an object with a `data` array, got {0}")]
    UnexpectedShape(&'static str),

    #[error("response object has no `data` array")]
    MissingData,
}
