//! Request metadata: request IDs, per-request spans, caller details.

use axum::{
    body::Body,
    http::{header::USER_AGENT, HeaderMap, HeaderValue, Request},
};
use tower_http::request_id::{MakeRequestId, RequestId};
use tracing::Span;
use uuid::Uuid;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates a UUID v4 for requests that arrive without an `x-request-id`.
#[derive(Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// The request ID header, or `"unknown"`.
pub fn request_id<B>(request: &Request<B>) -> &str {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Span wrapping each request, tagged with its ID.
pub fn make_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id(request),
    )
}

/// `User-Agent` as text; empty when absent or not valid UTF-8.
pub fn user_agent(headers: &HeaderMap) -> String {
    headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_uuids() {
        let req = Request::builder().body(Body::empty()).unwrap();
        let id = UuidRequestId.make_request_id(&req).unwrap();
        let text = id.header_value().to_str().unwrap();
        assert!(Uuid::parse_str(text).is_ok());
    }

    #[test]
    fn missing_user_agent_is_empty() {
        let mut headers = HeaderMap::new();
        assert_eq!(user_agent(&headers), "");

        headers.insert(USER_AGENT, HeaderValue::from_static("curl/8.5.0"));
        assert_eq!(user_agent(&headers), "curl/8.5.0");
    }

    #[test]
    fn request_id_falls_back_to_unknown() {
        let req = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(request_id(&req), "unknown");

        let req = Request::builder()
            .header(X_REQUEST_ID, "abc-123")
            .body(Body::empty())
            .unwrap();
        assert_eq!(request_id(&req), "abc-123");
    }
}
