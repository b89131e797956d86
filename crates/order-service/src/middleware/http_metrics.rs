//! Per-route HTTP metrics for every response.
//!
//! Runs outside the router, so it also sees responses no handler produced:
//! 404 for unknown paths, 405 for wrong methods and 408 from the timeout
//! layer.

use crate::observability::OrderMetrics;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

/// Record `order_service_http_requests_total` and
/// `order_service_http_request_duration_seconds` for one request.
///
/// Attach with `middleware::from_fn_with_state(metrics, http_metrics_middleware)`
/// as the outermost layer.
pub async fn http_metrics_middleware(
    State(metrics): State<OrderMetrics>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_owned();

    let response = next.run(request).await;

    metrics.record_http_request(
        method.as_str(),
        &path,
        response.status().as_u16(),
        start.elapsed(),
    );
    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::observability::metrics::{HTTP_ROUTE_DURATION_SECONDS, HTTP_ROUTE_REQUESTS_TOTAL};
    use crate::observability::test_support::{debug_metrics, MetricsSnapshot};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        middleware,
        routing::{get, post},
        Router,
    };
    use metrics_util::debugging::Snapshotter;
    use tower::ServiceExt;

    fn test_app() -> (Router, Snapshotter) {
        let (metrics, snapshotter) = debug_metrics();
        let app = Router::new()
            .route("/health", get(|| async { "OK" }))
            .route(
                "/order",
                post(|| async { (StatusCode::CONFLICT, "out of stock") }),
            )
            .layer(middleware::from_fn_with_state(
                metrics,
                http_metrics_middleware,
            ));
        (app, snapshotter)
    }

    async fn send(app: Router, method: &str, uri: &str) -> StatusCode {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        app.oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_records_handler_response() {
        let (app, snapshotter) = test_app();

        assert_eq!(send(app, "GET", "/health").await, StatusCode::OK);

        let snapshot = MetricsSnapshot::take(&snapshotter);
        assert_eq!(
            snapshot.counter(
                HTTP_ROUTE_REQUESTS_TOTAL,
                &[("method", "GET"), ("endpoint", "/health"), ("status_code", "200")]
            ),
            1
        );
        assert_eq!(
            snapshot.histogram_count(
                HTTP_ROUTE_DURATION_SECONDS,
                &[("endpoint", "/health"), ("status", "success")]
            ),
            1
        );
    }

    #[tokio::test]
    async fn test_records_error_status() {
        let (app, snapshotter) = test_app();

        assert_eq!(send(app, "POST", "/order").await, StatusCode::CONFLICT);

        let snapshot = MetricsSnapshot::take(&snapshotter);
        assert_eq!(
            snapshot.counter(
                HTTP_ROUTE_REQUESTS_TOTAL,
                &[("method", "POST"), ("endpoint", "/order"), ("status_code", "409")]
            ),
            1
        );
        assert_eq!(
            snapshot.histogram_count(HTTP_ROUTE_DURATION_SECONDS, &[("status", "error")]),
            1
        );
    }

    #[tokio::test]
    async fn test_records_router_rejections() {
        let (app, snapshotter) = test_app();

        assert_eq!(
            send(app.clone(), "GET", "/order").await,
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            send(app, "GET", "/orders/42").await,
            StatusCode::NOT_FOUND
        );

        let snapshot = MetricsSnapshot::take(&snapshotter);
        assert_eq!(
            snapshot.counter(
                HTTP_ROUTE_REQUESTS_TOTAL,
                &[("endpoint", "/order"), ("status_code", "405")]
            ),
            1
        );
        assert_eq!(
            snapshot.counter(
                HTTP_ROUTE_REQUESTS_TOTAL,
                &[("endpoint", "/other"), ("status_code", "404")]
            ),
            1
        );
        assert_eq!(snapshot.counter(HTTP_ROUTE_REQUESTS_TOTAL, &[]), 2);
    }
}
