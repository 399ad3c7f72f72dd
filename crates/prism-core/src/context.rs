use std::time::Instant;

use crate::headers::REQUEST_ID;

/// Per-request metadata shared by every route handler
///
/// Built by the server middleware before handlers run and discarded with
/// the request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Caller-supplied or generated request identifier
    pub request_id: String,
    /// When the gateway received the request
    pub received_at: Instant,
}

impl RequestContext {
    /// Create a context with a freshly generated request id
    pub fn new() -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().simple().to_string(),
            received_at: Instant::now(),
        }
    }

    /// Create a context from incoming headers, reusing `x-request-id` when present
    pub fn from_headers(headers: &http::HeaderMap) -> Self {
        let mut context = Self::new();

        if let Some(id) = headers
            .get(REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty() && v.len() <= 128)
        {
            id.clone_into(&mut context.request_id);
        }

        context
    }

    /// Milliseconds elapsed since the request was received
    pub fn elapsed_ms(&self) -> u128 {
        self.received_at.elapsed().as_millis()
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_request_id_when_missing() {
        let ctx = RequestContext::from_headers(&http::HeaderMap::new());
        assert_eq!(ctx.request_id.len(), 32);
    }

    #[test]
    fn reuses_incoming_request_id() {
        let mut headers = http::HeaderMap::new();
        headers.insert(REQUEST_ID, http::HeaderValue::from_static("req-123"));

        let ctx = RequestContext::from_headers(&headers);
        assert_eq!(ctx.request_id, "req-123");
    }

    #[test]
    fn ignores_oversized_request_id() {
        let mut headers = http::HeaderMap::new();
        let long = "a".repeat(200);
        headers.insert(REQUEST_ID, http::HeaderValue::from_str(&long).unwrap());

        let ctx = RequestContext::from_headers(&headers);
        assert_ne!(ctx.request_id, long);
    }
}
