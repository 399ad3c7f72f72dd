use http::StatusCode;
use serde::Serialize;

/// Trait for domain errors that can be converted to HTTP responses
///
/// Implemented by each feature crate's error type. The server layer
/// converts these into actual HTTP responses, keeping domain errors
/// decoupled from axum.
pub trait HttpError: std::error::Error {
    /// HTTP status code for this error
    fn status_code(&self) -> StatusCode;

    /// Machine-readable error type (e.g. `invalid_request_error`)
    fn error_type(&self) -> &str;

    /// Stable, fine-grained error code (e.g. `backend_timeout`)
    fn error_code(&self) -> &str;

    /// Message safe to expose to API consumers
    fn client_message(&self) -> String;

    /// Actionable hint for the caller
    fn suggestion(&self) -> Option<String> {
        None
    }

    /// Render the error into the single client-facing envelope
    fn envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            envelope_type: "error",
            error: ErrorBody {
                error_type: self.error_type().to_owned(),
                code: self.error_code().to_owned(),
                message: self.client_message(),
                suggestion: self.suggestion(),
            },
        }
    }
}

/// Error envelope shared by every client-facing protocol
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorEnvelope {
    /// Always `"error"`
    #[serde(rename = "type")]
    pub envelope_type: &'static str,
    /// Classified error details
    pub error: ErrorBody,
}

/// Classified error details inside an [`ErrorEnvelope`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    /// Error class
    #[serde(rename = "type")]
    pub error_type: String,
    /// Stable error code
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Actionable hint, when one exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}
