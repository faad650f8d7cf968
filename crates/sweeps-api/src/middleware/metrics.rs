//! # Request Metrics
//!
//! Counts requests and error responses through the `metrics` facade.
//! Values reach `/metrics` only when a Prometheus recorder is installed;
//! otherwise the counters are no-ops.

use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;

/// Middleware that records `http_requests_total` and `http_errors_total`.
///
/// Requests are labelled with the matched route template rather than the raw
/// path, so ids in URLs do not create new series.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;
    let status = response.status();

    metrics::counter!(
        "http_requests_total",
        "method" => method.clone(),
        "route" => route.clone(),
        "status" => status.as_u16().to_string()
    )
    .increment(1);

    if status.is_client_error() || status.is_server_error() {
        metrics::counter!("http_errors_total", "method" => method, "route" => route).increment(1);
    }

    response
}
