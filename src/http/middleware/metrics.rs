//! Per-route request metrics.

use std::time::Instant;

use axum::{
    body::Body,
    extract::MatchedPath,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::observability::metrics;

/// Record count and latency labelled by the matched route template.
///
/// Must be installed with `route_layer` so `MatchedPath` is populated.
pub async fn track_metrics(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());
    let method = request.method().to_string();

    let response = next.run(request).await;

    metrics::record_request(&method, &route, response.status().as_u16(), start);
    response
}
