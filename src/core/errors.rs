use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

/// Which upstream collaborator a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Embedding,
    Generation,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::Embedding => write!(f, "embedding"),
            Provider::Generation => write!(f, "generation"),
        }
    }
}

/// Structured failure cause, assigned at the point of failure.
///
/// Only HTTP status codes, transport timeout flags and decode failures feed
/// into this; error message text is never inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCause {
    Auth,
    Timeout,
    Malformed,
    Unknown,
}

impl std::fmt::Display for FailureCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureCause::Auth => write!(f, "auth"),
            FailureCause::Timeout => write!(f, "timeout"),
            FailureCause::Malformed => write!(f, "malformed"),
            FailureCause::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Malformed or oversized caller input. Recoverable by correcting input.
    #[error("invalid input: {0}")]
    Validation(String),
    /// Vector store unreachable or its response undecodable.
    #[error("retrieval failed: {0}")]
    Retrieval(String),
    /// Embedding or generation provider failure.
    #[error("{provider} provider failed ({cause}): {message}")]
    Upstream {
        provider: Provider,
        cause: FailureCause,
        message: String,
    },
    /// Session store unreachable on a write path.
    #[error("session store failed: {0}")]
    Store(String),
}

impl PipelineError {
    pub fn upstream(provider: Provider, cause: FailureCause, message: impl Into<String>) -> Self {
        PipelineError::Upstream {
            provider,
            cause,
            message: message.into(),
        }
    }

    /// Classify a `reqwest` transport error for the given provider.
    pub fn from_reqwest(provider: Provider, err: reqwest::Error) -> Self {
        let cause = if err.is_timeout() {
            FailureCause::Timeout
        } else if err.is_decode() {
            FailureCause::Malformed
        } else {
            FailureCause::Unknown
        };
        Self::upstream(provider, cause, err.to_string())
    }

    /// Classify a non-success HTTP status for the given provider.
    pub fn from_status(provider: Provider, status: reqwest::StatusCode, body: String) -> Self {
        let cause = match status {
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                FailureCause::Auth
            }
            _ => FailureCause::Unknown,
        };
        Self::upstream(provider, cause, format!("status {}: {}", status, body))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            PipelineError::Validation(_) => StatusCode::BAD_REQUEST,
            PipelineError::Upstream {
                cause: FailureCause::Auth,
                ..
            } => StatusCode::SERVICE_UNAVAILABLE,
            PipelineError::Upstream {
                cause: FailureCause::Timeout,
                ..
            } => StatusCode::GATEWAY_TIMEOUT,
            PipelineError::Upstream { .. }
            | PipelineError::Retrieval(_)
            | PipelineError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_400() {
        let err = PipelineError::Validation("empty".into());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn upstream_auth_maps_to_503() {
        let err = PipelineError::upstream(Provider::Generation, FailureCause::Auth, "no key");
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn upstream_timeout_maps_to_504() {
        let err = PipelineError::upstream(Provider::Embedding, FailureCause::Timeout, "slow");
        assert_eq!(err.status_code(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn retrieval_and_other_upstream_map_to_500() {
        assert_eq!(
            PipelineError::Retrieval("down".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        let err = PipelineError::upstream(Provider::Generation, FailureCause::Malformed, "bad");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn message_carries_provider_and_cause() {
        let err = PipelineError::upstream(Provider::Embedding, FailureCause::Auth, "401");
        assert_eq!(err.to_string(), "embedding provider failed (auth): 401");
    }
}
