//! Request ID middleware for request tracing and correlation.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest upstream request ID accepted verbatim.
const MAX_UPSTREAM_ID_LEN: usize = 128;

/// Request ID for the current request, stored in request extensions.
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

/// Accept an upstream ID only if it is short and plain ASCII.
fn sanitize(upstream: &str) -> Option<&str> {
    let trimmed = upstream.trim();
    (!trimmed.is_empty()
        && trimmed.len() <= MAX_UPSTREAM_ID_LEN
        && trimmed
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.')))
    .then_some(trimmed)
}

/// Middleware that ensures every request has a unique request ID.
///
/// Reuses a well-formed `x-request-id` from an upstream proxy and generates
/// a UUID v4 otherwise. The ID is recorded on the current span, tagged on
/// the Sentry scope and echoed in the response headers.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(sanitize)
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    Span::current().record("request_id", &request_id);
    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });
    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}
