/// Error types shared by the collaborator clients.
///
/// These errors represent failures at external service boundaries (text generation,
/// search index). Server crates decide how to recover from them and wrap
/// `CollaboratorError` via `#[from]` in their own error types.
use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum CollaboratorError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid response JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("upstream returned error: status={status} message={message}")]
    Upstream { status: StatusCode, message: String },

    #[error("upstream returned non-JSON error: status={status} body={body}")]
    UpstreamBody { status: StatusCode, body: String },

    #[error("{service} did not answer within {timeout_ms}ms")]
    Timeout {
        service: &'static str,
        timeout_ms: u128,
    },

    #[error("malformed payload: {0}")]
    Malformed(String),

    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}

impl CollaboratorError {
    /// True when the failure came from the wall-clock budget rather than the upstream.
    pub fn is_timeout(&self) -> bool {
        match self {
            CollaboratorError::Timeout { .. } => true,
            CollaboratorError::Request(e) => e.is_timeout(),
            _ => false,
        }
    }
}
