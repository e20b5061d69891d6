//! Error types for the Cambist SDK.

/// Result type for SDK operations.
pub type SdkResult<T> = Result<T, SdkError>;

/// Errors that can occur when talking to a Cambist server.
#[derive(Debug, thiserror::Error)]
pub enum SdkError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The transport rejected a message (non-success status on POST).
    #[error("transport error (status {status})")]
    Transport { status: u16 },

    /// Serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The server answered with a JSON-RPC error.
    #[error("server error {code}: {message}")]
    Rpc { code: i32, message: String },

    /// The server broke the expected message flow.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// No response arrived within the configured timeout.
    #[error("timed out waiting for the server")]
    Timeout,

    /// The event stream closed.
    #[error("connection closed")]
    Closed,
}
