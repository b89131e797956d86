//! HTTP routes for Order Service.
//!
//! Defines the Axum router and application state.

use crate::config::Config;
use crate::handlers;
use crate::middleware::http_metrics_middleware;
use crate::observability::OrderMetrics;
use crate::services::{DelayRange, DependencySimulator, Inventory, PROCESSING_DELAY};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: Config,

    /// Product stock level.
    pub inventory: Arc<Inventory>,

    /// Order-path metric handles.
    pub metrics: OrderMetrics,

    /// External dependency every order calls.
    pub dependency: Arc<dyn DependencySimulator>,

    /// Simulated processing time after a successful dependency call.
    pub processing_delay: DelayRange,
}

impl AppState {
    /// Build state with a full inventory and the production processing delay.
    pub fn new(
        config: Config,
        metrics: OrderMetrics,
        dependency: Arc<dyn DependencySimulator>,
    ) -> Self {
        let inventory = Arc::new(Inventory::new(
            config.inventory_mode,
            metrics.inventory_gauge(),
        ));

        Self {
            config,
            inventory,
            metrics,
            dependency,
            processing_delay: PROCESSING_DELAY,
        }
    }

    /// Replace the simulated processing delay.
    pub fn with_processing_delay(mut self, delay: DelayRange) -> Self {
        self.processing_delay = delay;
        self
    }

    /// Replace the inventory with one starting at `level`.
    pub fn with_inventory_level(mut self, level: i64) -> Self {
        self.inventory = Arc::new(Inventory::with_level(
            level,
            self.config.inventory_mode,
            self.metrics.inventory_gauge(),
        ));
        self
    }
}

/// Build the application routes.
///
/// Creates an Axum router with:
/// - `/` - Plain text banner
/// - `/health` - Liveness check (simple "OK")
/// - `/order` - Create an order (POST)
/// - `/inventory/reset` - Restore the inventory to 100 (POST)
/// - `/metrics` - Prometheus metrics endpoint
/// - TraceLayer for request logging
/// - HTTP metrics middleware
/// - 30 second request timeout
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics = state.metrics.clone();

    let app_routes = Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health_check))
        .route("/order", post(handlers::create_order))
        .route("/inventory/reset", post(handlers::reset_inventory))
        .with_state(state);

    // Metrics route with its own state
    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    // Layer order (bottom-to-top execution):
    // 1. TimeoutLayer - Timeout the request (innermost)
    // 2. TraceLayer - Log request details
    // 3. http_metrics_middleware - Record ALL responses (outermost)
    app_routes
        .merge(metrics_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(middleware::from_fn_with_state(
            metrics,
            http_metrics_middleware,
        ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::observability::metrics::build_recorder;
    use crate::observability::test_support::debug_metrics;
    use crate::services::dependency::mock::FixedDependency;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_app(dependency: FixedDependency) -> Router {
        let recorder = build_recorder().unwrap();
        let handle = recorder.handle();
        let metrics = OrderMetrics::register_with(Arc::new(recorder));
        let state = AppState::new(Config::default(), metrics, Arc::new(dependency))
            .with_processing_delay(DelayRange::ZERO);
        build_routes(Arc::new(state), handle)
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_app_state_is_clone() {
        // AppState must implement Clone for Axum's State extractor.
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn test_with_inventory_level_keeps_mode() {
        let (metrics, _) = debug_metrics();
        let state = AppState::new(
            Config::default(),
            metrics,
            Arc::new(FixedDependency::succeeding()),
        )
        .with_inventory_level(3);

        assert_eq!(state.inventory.get(), 3);
        assert_eq!(state.inventory.mode(), state.config.inventory_mode);
    }

    #[tokio::test]
    async fn test_index_banner() {
        let app = test_app(FixedDependency::succeeding());

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_string(response).await,
            "Order Service with Prometheus Metrics"
        );
    }

    #[tokio::test]
    async fn test_order_route_is_post_only() {
        let app = test_app(FixedDependency::succeeding());

        let response = app
            .oneshot(Request::builder().uri("/order").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_order_route_accepts_empty_post() {
        let app = test_app(FixedDependency::succeeding());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/order")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_metrics_route_renders_exposition() {
        let app = test_app(FixedDependency::succeeding());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/metrics")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("product_inventory 100"));
    }

    #[tokio::test]
    async fn test_route_metrics_share_the_scraped_registry() {
        let app = test_app(FixedDependency::succeeding());

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/missing").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = body_string(response).await;
        assert!(body
            .lines()
            .any(|line| line.starts_with("order_service_http_requests_total{")
                && line.contains("status_code=\"404\"")
                && line.ends_with(" 1")));
    }
}
