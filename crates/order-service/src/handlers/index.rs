//! Root banner handler.

/// Banner returned by `GET /`.
pub const BANNER: &str = "Order Service with Prometheus Metrics";

/// Handler for GET /
pub async fn index() -> &'static str {
    BANNER
}
