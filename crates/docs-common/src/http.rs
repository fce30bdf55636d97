//! Response handling shared by the HTTP collaborator clients.
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::warn;

use crate::error::CollaboratorError;

pub(crate) async fn parse_json_response<T: for<'de> Deserialize<'de>>(
    resp: reqwest::Response,
    max_error_body_bytes: usize,
) -> Result<T, CollaboratorError> {
    if resp.status().is_success() {
        let body = resp.bytes().await?;
        return Ok(serde_json::from_slice::<T>(&body)?);
    }
    Err(to_upstream_error(resp, max_error_body_bytes).await)
}

pub(crate) async fn to_upstream_error(
    resp: reqwest::Response,
    max_error_body_bytes: usize,
) -> CollaboratorError {
    let status = resp.status();
    let body = read_limited_text(resp, max_error_body_bytes).await;
    upstream_error(status, body)
}

/// Turn a failed response body into an error, preferring a JSON `message`/`error` field.
pub(crate) fn upstream_error(status: StatusCode, body: String) -> CollaboratorError {
    if let Ok(parsed) = serde_json::from_str::<ErrorEnvelope>(&body) {
        if let Some(message) = parsed.into_message() {
            return CollaboratorError::Upstream { status, message };
        }
    }
    CollaboratorError::UpstreamBody { status, body }
}

async fn read_limited_text(resp: reqwest::Response, max_bytes: usize) -> String {
    match resp.bytes().await {
        Ok(mut b) => {
            if b.len() > max_bytes {
                b.truncate(max_bytes);
            }
            String::from_utf8_lossy(&b).to_string()
        }
        Err(e) => {
            warn!(error = %e, "failed to read upstream error body");
            "<failed to read error body>".to_string()
        }
    }
}

/// Both llama.cpp (`{"error": {"message": ..}}`) and Algolia (`{"message": ..}`) shapes.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    message: Option<String>,
    error: Option<ErrorObject>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorObject {
    Detailed { message: Option<String> },
    Text(String),
}

impl ErrorEnvelope {
    fn into_message(self) -> Option<String> {
        if let Some(message) = self.message {
            return Some(message);
        }
        match self.error? {
            ErrorObject::Detailed { message } => message,
            ErrorObject::Text(text) => Some(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_error_reads_algolia_message() {
        let err = upstream_error(
            StatusCode::FORBIDDEN,
            r#"{"message":"Invalid Application-ID or API key","status":403}"#.to_string(),
        );
        match err {
            CollaboratorError::Upstream { status, message } => {
                assert_eq!(status, StatusCode::FORBIDDEN);
                assert_eq!(message, "Invalid Application-ID or API key");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn upstream_error_reads_llama_error_object() {
        let err = upstream_error(
            StatusCode::SERVICE_UNAVAILABLE,
            r#"{"error":{"code":503,"message":"Loading model","type":"unavailable_error"}}"#
                .to_string(),
        );
        assert!(matches!(
            err,
            CollaboratorError::Upstream { ref message, .. } if message == "Loading model"
        ));
    }

    #[test]
    fn upstream_error_keeps_raw_body_when_not_json() {
        let err = upstream_error(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>".to_string());
        assert!(matches!(err, CollaboratorError::UpstreamBody { .. }));
    }
}
