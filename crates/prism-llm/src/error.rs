use std::time::Duration;

use http::StatusCode;
use prism_core::HttpError;
use thiserror::Error;

/// Errors surfaced to API clients by the engine
#[derive(Debug, Error)]
pub enum LlmError {
    /// Client sent a malformed or invalid request
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Requested model is unknown and strict model resolution is enabled
    #[error("model not found: {model}")]
    ModelNotFound { model: String },

    /// The hosted backend failed
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Built-in tool loop did not converge within the turn limit
    #[error("tool orchestration did not finish within {max_turns} turns")]
    OrchestrationLimitExceeded { max_turns: u32 },

    /// Unexpected internal error
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Failures talking to the hosted model backend
#[derive(Debug, Error)]
pub enum BackendError {
    /// The call exceeded the configured timeout
    #[error("backend did not respond within {}s", after.as_secs())]
    Timeout { after: Duration },

    /// The backend kept answering 429 after every retry
    #[error("backend rate limit exceeded")]
    RateLimited { retry_after: Option<Duration> },

    /// The backend rejected the gateway's credentials
    #[error("backend rejected credentials (status {status})")]
    Unauthorized { status: u16 },

    /// Any other non-success status
    #[error("backend returned status {status}")]
    Upstream { status: u16, message: String },

    /// Connection-level failure
    #[error("backend unreachable: {0}")]
    Transport(String),

    /// The backend answered with something that is not JSON
    #[error("backend response could not be decoded: {0}")]
    Decode(String),
}

impl BackendError {
    /// Short label used in logs and metric attributes
    pub const fn outcome(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::RateLimited { .. } => "rate_limited",
            Self::Unauthorized { .. } => "unauthorized",
            Self::Upstream { .. } => "upstream_error",
            Self::Transport(_) => "transport_error",
            Self::Decode(_) => "decode_error",
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}

impl HttpError for LlmError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::ModelNotFound { .. } => StatusCode::NOT_FOUND,
            Self::Backend(BackendError::Timeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
            Self::Backend(BackendError::RateLimited { .. }) => StatusCode::TOO_MANY_REQUESTS,
            Self::Backend(_) => StatusCode::BAD_GATEWAY,
            Self::OrchestrationLimitExceeded { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::InvalidRequest(_) => "invalid_request_error",
            Self::ModelNotFound { .. } => "not_found_error",
            Self::Backend(BackendError::Timeout { .. }) => "timeout_error",
            Self::Backend(BackendError::RateLimited { .. }) => "rate_limit_error",
            Self::Backend(BackendError::Unauthorized { .. }) => "authentication_error",
            Self::Backend(_) | Self::Internal(_) => "api_error",
            Self::OrchestrationLimitExceeded { .. } => "orchestration_error",
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Self::InvalidRequest(_) => "invalid_request",
            Self::ModelNotFound { .. } => "model_not_found",
            Self::Backend(BackendError::Timeout { .. }) => "backend_timeout",
            Self::Backend(BackendError::RateLimited { .. }) => "backend_rate_limited",
            Self::Backend(BackendError::Unauthorized { .. }) => "backend_auth_failed",
            Self::Backend(BackendError::Upstream { .. }) => "backend_error",
            Self::Backend(BackendError::Transport(_)) => "backend_unreachable",
            Self::Backend(BackendError::Decode(_)) => "backend_invalid_response",
            Self::OrchestrationLimitExceeded { .. } => "turn_limit_exceeded",
            Self::Internal(_) => "internal_error",
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::Internal(_) => "an internal error occurred".to_owned(),
            Self::Backend(BackendError::Transport(_)) => "backend unreachable".to_owned(),
            Self::Backend(BackendError::Decode(_)) => "backend response could not be decoded".to_owned(),
            other => other.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        let hint = match self {
            Self::InvalidRequest(_) => "Check the request body against the API reference.",
            Self::ModelNotFound { .. } => "List available models with GET /v1/models.",
            Self::Backend(BackendError::Timeout { .. }) => "Retry the request, or lower max_tokens.",
            Self::Backend(BackendError::RateLimited { .. }) => "Wait a moment before retrying.",
            Self::Backend(BackendError::Unauthorized { .. }) => {
                "The gateway's backend credentials were rejected; contact the operator."
            }
            Self::Backend(_) => "Retry the request; the backend may be temporarily unavailable.",
            Self::OrchestrationLimitExceeded { .. } => "Simplify the request or raise engine.max_turns.",
            Self::Internal(_) => return None,
        };
        Some(hint.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_maps_to_gateway_timeout() {
        let err = LlmError::from(BackendError::Timeout {
            after: Duration::from_secs(30),
        });

        assert_eq!(err.status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(err.error_code(), "backend_timeout");
        insta::assert_snapshot!(err.client_message(), @"backend did not respond within 30s");
    }

    #[test]
    fn internal_errors_hide_details() {
        let err = LlmError::Internal(anyhow::anyhow!("secret connection string"));
        let envelope = err.envelope();

        assert_eq!(envelope.error.message, "an internal error occurred");
        assert!(envelope.error.suggestion.is_none());
    }

    #[test]
    fn every_envelope_shares_one_shape() {
        let errors = [
            LlmError::InvalidRequest("bad".to_owned()),
            LlmError::ModelNotFound { model: "x".to_owned() },
            LlmError::OrchestrationLimitExceeded { max_turns: 2 },
            LlmError::Backend(BackendError::Upstream {
                status: 503,
                message: "down".to_owned(),
            }),
        ];

        for err in errors {
            let json = serde_json::to_value(err.envelope()).unwrap();
            assert_eq!(json["type"], "error");
            assert!(json["error"]["type"].is_string());
            assert!(json["error"]["code"].is_string());
            assert!(json["error"]["message"].is_string());
            assert!(json["error"]["suggestion"].is_string());
        }
    }

    #[test]
    fn upstream_message_omits_backend_body() {
        let err = LlmError::Backend(BackendError::Upstream {
            status: 500,
            message: "stack trace".to_owned(),
        });

        assert_eq!(err.client_message(), "backend returned status 500");
    }
}
