//! Test server harness for E2E testing
//!
//! Provides `TestOrderServer` for spawning real Order Service instances in
//! tests. Each server owns its Prometheus recorder, so metric assertions
//! are isolated between servers running in the same test binary.

use crate::exposition::{labelled_value, metric_value};
use order_service::config::Config;
use order_service::observability::metrics::build_recorder;
use order_service::observability::OrderMetrics;
use order_service::routes::{self, AppState};
use order_service::services::dependency::mock::FixedDependency;
use order_service::services::{DelayRange, DependencySimulator, InventoryMode};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Builder for [`TestOrderServer`].
///
/// Defaults: a dependency that always succeeds instantly, no processing
/// delay, 100 units of stock, atomic inventory commits.
pub struct TestOrderServerBuilder {
    dependency: Arc<dyn DependencySimulator>,
    processing_delay: DelayRange,
    inventory: Option<i64>,
    inventory_mode: InventoryMode,
}

impl Default for TestOrderServerBuilder {
    fn default() -> Self {
        Self {
            dependency: Arc::new(FixedDependency::succeeding()),
            processing_delay: DelayRange::ZERO,
            inventory: None,
            inventory_mode: InventoryMode::Atomic,
        }
    }
}

impl TestOrderServerBuilder {
    pub fn dependency(mut self, dependency: Arc<dyn DependencySimulator>) -> Self {
        self.dependency = dependency;
        self
    }

    pub fn processing_delay(mut self, delay: DelayRange) -> Self {
        self.processing_delay = delay;
        self
    }

    pub fn inventory(mut self, level: i64) -> Self {
        self.inventory = Some(level);
        self
    }

    pub fn inventory_mode(mut self, mode: InventoryMode) -> Self {
        self.inventory_mode = mode;
        self
    }

    /// Spawn the server.
    ///
    /// The server will:
    /// - Bind to a random available port (127.0.0.1:0)
    /// - Start the HTTP server in the background
    pub async fn spawn(self) -> Result<TestOrderServer, anyhow::Error> {
        let config = Config {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 0)),
            inventory_mode: self.inventory_mode,
            ..Config::default()
        };

        let recorder = build_recorder()
            .map_err(|e| anyhow::anyhow!("Failed to build metrics recorder: {}", e))?;
        let metrics_handle = recorder.handle();
        let metrics = OrderMetrics::register_with(Arc::new(recorder));

        let mut state = AppState::new(config, metrics, self.dependency)
            .with_processing_delay(self.processing_delay);
        if let Some(level) = self.inventory {
            state = state.with_inventory_level(level);
        }
        let state = Arc::new(state);

        // Build routes using order-service's real route builder
        let app = routes::build_routes(state.clone(), metrics_handle);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(TestOrderServer {
            addr,
            state,
            client: reqwest::Client::new(),
            _handle: handle,
        })
    }
}

/// Test harness for spawning Order Service in E2E tests.
///
/// # Example
/// ```rust,ignore
/// let dependency = Arc::new(FixedDependency::failing());
/// let server = TestOrderServer::builder()
///     .dependency(dependency.clone())
///     .spawn()
///     .await?;
///
/// let response = server.post_order().await?;
/// assert_eq!(response.status(), 502);
/// assert_eq!(server.metric("dependency_errors_total").await?, 1.0);
/// ```
pub struct TestOrderServer {
    addr: SocketAddr,
    state: Arc<AppState>,
    client: reqwest::Client,
    _handle: JoinHandle<()>,
}

impl TestOrderServer {
    pub fn builder() -> TestOrderServerBuilder {
        TestOrderServerBuilder::default()
    }

    /// Spawn a server with all defaults.
    pub async fn spawn() -> Result<Self, anyhow::Error> {
        Self::builder().spawn().await
    }

    /// Get the base URL of the test server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get the socket address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Current inventory level, read directly from the state.
    pub fn inventory(&self) -> i64 {
        self.state.inventory.get()
    }

    /// Get the HTTP client used by the helpers.
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// POST /order
    pub async fn post_order(&self) -> Result<reqwest::Response, anyhow::Error> {
        Ok(self
            .client
            .post(format!("{}/order", self.url()))
            .send()
            .await?)
    }

    /// POST /inventory/reset
    pub async fn reset_inventory(&self) -> Result<reqwest::Response, anyhow::Error> {
        Ok(self
            .client
            .post(format!("{}/inventory/reset", self.url()))
            .send()
            .await?)
    }

    /// GET /metrics as text.
    pub async fn metrics_text(&self) -> Result<String, anyhow::Error> {
        let response = self
            .client
            .get(format!("{}/metrics", self.url()))
            .send()
            .await?;
        Ok(response.text().await?)
    }

    /// Current value of one exposition series, 0 when it is absent.
    pub async fn metric(&self, series: &str) -> Result<f64, anyhow::Error> {
        let text = self.metrics_text().await?;
        Ok(metric_value(&text, series).unwrap_or(0.0))
    }

    /// Current value of the series `name` with exactly `labels`, in any
    /// order, 0 when it is absent.
    pub async fn labelled_metric(
        &self,
        name: &str,
        labels: &[(&str, &str)],
    ) -> Result<f64, anyhow::Error> {
        let text = self.metrics_text().await?;
        Ok(labelled_value(&text, name, labels).unwrap_or(0.0))
    }
}

impl Drop for TestOrderServer {
    fn drop(&mut self) {
        // Abort the HTTP server task when the test completes.
        self._handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_server_spawns_successfully() -> Result<(), anyhow::Error> {
        let server = TestOrderServer::spawn().await?;

        assert!(server.url().starts_with("http://127.0.0.1:"));

        let response = reqwest::get(format!("{}/health", server.url())).await?;
        assert_eq!(response.status(), 200);
        assert_eq!(response.text().await?, "OK");

        Ok(())
    }

    #[tokio::test]
    async fn test_builder_sets_inventory() -> Result<(), anyhow::Error> {
        let server = TestOrderServer::builder().inventory(7).spawn().await?;

        assert_eq!(server.inventory(), 7);
        assert_eq!(server.metric("product_inventory").await?, 7.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_multiple_servers_have_isolated_metrics() -> Result<(), anyhow::Error> {
        let server1 = TestOrderServer::spawn().await?;
        let server2 = TestOrderServer::spawn().await?;

        assert_ne!(server1.addr(), server2.addr());

        assert_eq!(server1.post_order().await?.status(), 200);

        assert_eq!(server1.metric("orders_total{result=\"success\"}").await?, 1.0);
        assert_eq!(server2.metric("orders_total{result=\"success\"}").await?, 0.0);

        Ok(())
    }
}
