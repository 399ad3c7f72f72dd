//! Response and request header names used across the gateway

use http::header::{HeaderName, HeaderValue};

/// Set to `true` when a streaming request was answered non-streamed
pub const STREAM_DOWNGRADED: HeaderName = HeaderName::from_static("x-stream-downgraded");

/// Set to `true` when token usage is an estimate rather than a backend count
pub const USAGE_ESTIMATED: HeaderName = HeaderName::from_static("x-usage-estimated");

/// Milliseconds between receiving the request and producing response headers
pub const PROCESSING_TIME_MS: HeaderName = HeaderName::from_static("x-processing-time-ms");

/// Request correlation id, echoed back to the caller
pub const REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Value used for boolean flag headers
pub const FLAG_TRUE: HeaderValue = HeaderValue::from_static("true");
