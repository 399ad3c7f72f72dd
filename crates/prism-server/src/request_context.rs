use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use http::HeaderValue;
use prism_core::RequestContext;
use prism_core::headers::{PROCESSING_TIME_MS, REQUEST_ID};

/// Middleware that builds the `RequestContext` for downstream handlers
///
/// Echoes the request id and stamps the processing time on every
/// response. For streams the time covers the work done before the first
/// byte.
pub async fn request_context_middleware(mut request: Request, next: Next) -> Response {
    let context = RequestContext::from_headers(request.headers());
    request.extensions_mut().insert(context.clone());

    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    if let Ok(id) = HeaderValue::from_str(&context.request_id) {
        headers.insert(REQUEST_ID, id);
    }
    headers.insert(PROCESSING_TIME_MS, HeaderValue::from(u64::try_from(context.elapsed_ms()).unwrap_or(u64::MAX)));

    response
}
