//! Metrics definitions for Order Service.
//!
//! The order metrics keep the exact names existing dashboards query:
//!
//! | Metric | Type | Labels |
//! |---|---|---|
//! | `http_requests_in_progress` | gauge | - |
//! | `http_request_latency_seconds` | histogram | - |
//! | `orders_total` | counter | `result` |
//! | `order_processing_seconds` | histogram | - |
//! | `product_inventory` | gauge | - |
//! | `dependency_call_seconds` | histogram | - |
//! | `dependency_errors_total` | counter | - |
//!
//! They are registered once into an [`OrderMetrics`] value held by the
//! application state. `OrderMetrics` also holds the recorder itself, so
//! every instrument, including the per-route HTTP metrics recorded by the
//! middleware under the `order_service_` prefix, lands in one registry.
//! Each server (and each test) owns its registry; nothing is installed
//! globally.
//!
//! # Cardinality
//!
//! - `result`: 2 values (success, failed)
//! - `method`: 7 standard methods plus `OTHER`
//! - `endpoint`: known routes plus `/other`
//! - `status`: 3 values (success, error, timeout)

use crate::models::OrderResult;
use metrics::{
    counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Counter,
    Gauge, Histogram, Recorder,
};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle, PrometheusRecorder};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

pub const HTTP_REQUESTS_IN_PROGRESS: &str = "http_requests_in_progress";
pub const HTTP_REQUEST_LATENCY_SECONDS: &str = "http_request_latency_seconds";
pub const ORDERS_TOTAL: &str = "orders_total";
pub const ORDER_PROCESSING_SECONDS: &str = "order_processing_seconds";
pub const PRODUCT_INVENTORY: &str = "product_inventory";
pub const DEPENDENCY_CALL_SECONDS: &str = "dependency_call_seconds";
pub const DEPENDENCY_ERRORS_TOTAL: &str = "dependency_errors_total";

pub const HTTP_ROUTE_REQUESTS_TOTAL: &str = "order_service_http_requests_total";
pub const HTTP_ROUTE_DURATION_SECONDS: &str = "order_service_http_request_duration_seconds";

pub const HTTP_REQUEST_LATENCY_BUCKETS: &[f64] = &[0.1, 0.3, 0.5, 1.0, 2.0, 3.0, 5.0];
pub const ORDER_PROCESSING_BUCKETS: &[f64] = &[0.2, 0.5, 1.0, 2.0, 3.0, 5.0];
pub const DEPENDENCY_CALL_BUCKETS: &[f64] = &[0.05, 0.1, 0.3, 0.5, 1.0, 2.0];

/// Buckets for the per-route middleware histogram.
const ROUTE_DURATION_BUCKETS: &[f64] = &[
    0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.000, 2.500, 5.000,
];

/// How often histogram samples are folded into their buckets between scrapes.
const UPKEEP_INTERVAL: Duration = Duration::from_secs(5);

/// Prometheus builder with the bucket layout for every histogram.
///
/// Histograms without configured buckets would render as summaries.
pub fn prometheus_builder() -> Result<PrometheusBuilder, String> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(HTTP_REQUEST_LATENCY_SECONDS.to_string()),
            HTTP_REQUEST_LATENCY_BUCKETS,
        )
        .map_err(|e| format!("Failed to set request latency buckets: {e}"))?
        .set_buckets_for_metric(
            Matcher::Full(ORDER_PROCESSING_SECONDS.to_string()),
            ORDER_PROCESSING_BUCKETS,
        )
        .map_err(|e| format!("Failed to set order processing buckets: {e}"))?
        .set_buckets_for_metric(
            Matcher::Full(DEPENDENCY_CALL_SECONDS.to_string()),
            DEPENDENCY_CALL_BUCKETS,
        )
        .map_err(|e| format!("Failed to set dependency call buckets: {e}"))?
        .set_buckets_for_metric(
            Matcher::Full(HTTP_ROUTE_DURATION_SECONDS.to_string()),
            ROUTE_DURATION_BUCKETS,
        )
        .map_err(|e| format!("Failed to set route duration buckets: {e}"))
}

/// Build the Prometheus recorder every instrument registers into.
///
/// The recorder is never installed globally. [`OrderMetrics`] holds it and
/// `recorder.handle()` renders it, so each server owns its registry.
pub fn build_recorder() -> Result<PrometheusRecorder, String> {
    Ok(prometheus_builder()?.build_recorder())
}

/// Periodically drain histogram samples into their buckets.
///
/// An installed recorder does this on its own; a held one needs this task.
pub fn spawn_upkeep(handle: PrometheusHandle) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(UPKEEP_INTERVAL);
        loop {
            interval.tick().await;
            handle.run_upkeep();
        }
    })
}

// ============================================================================
// Order Metrics
// ============================================================================

/// Handles to every instrument, plus the recorder they were registered in.
///
/// Cloning is cheap; clones share the underlying values.
#[derive(Clone)]
pub struct OrderMetrics {
    recorder: Arc<dyn Recorder + Send + Sync>,
    in_progress: Gauge,
    request_latency: Histogram,
    orders_success: Counter,
    orders_failed: Counter,
    order_processing: Histogram,
    inventory: Gauge,
    dependency_latency: Histogram,
    dependency_errors: Counter,
}

impl OrderMetrics {
    /// Describe and register all instruments against `recorder`.
    pub fn register_with(recorder: Arc<dyn Recorder + Send + Sync>) -> Self {
        metrics::with_local_recorder(recorder.as_ref(), || {
            describe_gauge!(HTTP_REQUESTS_IN_PROGRESS, "In progress HTTP requests");
            describe_histogram!(HTTP_REQUEST_LATENCY_SECONDS, "HTTP request latency");
            describe_counter!(ORDERS_TOTAL, "Total orders created");
            describe_histogram!(ORDER_PROCESSING_SECONDS, "Order processing latency");
            describe_gauge!(PRODUCT_INVENTORY, "Current product inventory");
            describe_histogram!(DEPENDENCY_CALL_SECONDS, "External dependency latency");
            describe_counter!(DEPENDENCY_ERRORS_TOTAL, "External dependency errors");
            describe_counter!(HTTP_ROUTE_REQUESTS_TOTAL, "Total HTTP requests by route");
            describe_histogram!(
                HTTP_ROUTE_DURATION_SECONDS,
                "HTTP request duration by route"
            );

            Self {
                recorder: Arc::clone(&recorder),
                in_progress: gauge!(HTTP_REQUESTS_IN_PROGRESS),
                request_latency: histogram!(HTTP_REQUEST_LATENCY_SECONDS),
                orders_success: counter!(ORDERS_TOTAL, "result" => OrderResult::Success.label()),
                orders_failed: counter!(ORDERS_TOTAL, "result" => "failed"),
                order_processing: histogram!(ORDER_PROCESSING_SECONDS),
                inventory: gauge!(PRODUCT_INVENTORY),
                dependency_latency: histogram!(DEPENDENCY_CALL_SECONDS),
                dependency_errors: counter!(DEPENDENCY_ERRORS_TOTAL),
            }
        })
    }

    /// Count a request as in flight until the guard drops.
    pub fn track_in_progress(&self) -> InProgressGuard {
        InProgressGuard::new(self.in_progress.clone())
    }

    /// Time the whole request into `http_request_latency_seconds`.
    pub fn time_request(&self) -> HistogramTimer {
        HistogramTimer::start(self.request_latency.clone())
    }

    /// Time the order handler into `order_processing_seconds`.
    pub fn time_order_processing(&self) -> HistogramTimer {
        HistogramTimer::start(self.order_processing.clone())
    }

    /// Time one dependency call into `dependency_call_seconds`.
    pub fn time_dependency_call(&self) -> HistogramTimer {
        HistogramTimer::start(self.dependency_latency.clone())
    }

    /// Start counting one order in `orders_total`.
    ///
    /// The order is counted exactly once: with the result passed to
    /// [`OrderOutcome::finish`], or as failed if the guard drops first.
    pub fn begin_order(&self) -> OrderOutcome {
        OrderOutcome {
            success: self.orders_success.clone(),
            failed: self.orders_failed.clone(),
            recorded: false,
        }
    }

    /// Increment `dependency_errors_total`.
    pub fn record_dependency_error(&self) {
        self.dependency_errors.increment(1);
    }

    /// Handle to the `product_inventory` gauge, for the inventory to mirror
    /// its level into.
    pub fn inventory_gauge(&self) -> Gauge {
        self.inventory.clone()
    }

    /// Record HTTP request completion
    ///
    /// Metric: `order_service_http_requests_total`,
    /// `order_service_http_request_duration_seconds`
    /// Labels: `method`, `endpoint`, `status` / `status_code`
    pub fn record_http_request(
        &self,
        method: &str,
        path: &str,
        status_code: u16,
        duration: Duration,
    ) {
        let method = normalize_method(method);
        let endpoint = normalize_endpoint(path);
        let status = categorize_status_code(status_code);

        metrics::with_local_recorder(self.recorder.as_ref(), || {
            histogram!(HTTP_ROUTE_DURATION_SECONDS,
                "method" => method,
                "endpoint" => endpoint,
                "status" => status
            )
            .record(duration.as_secs_f64());

            counter!(HTTP_ROUTE_REQUESTS_TOTAL,
                "method" => method,
                "endpoint" => endpoint,
                "status_code" => status_code.to_string()
            )
            .increment(1);
        });
    }
}

/// Counts one order in `orders_total` exactly once.
#[must_use = "an order is counted as failed as soon as the guard is dropped"]
pub struct OrderOutcome {
    success: Counter,
    failed: Counter,
    recorded: bool,
}

impl OrderOutcome {
    pub fn finish(mut self, result: OrderResult) {
        match result {
            OrderResult::Success => self.success.increment(1),
            OrderResult::Failed(_) => self.failed.increment(1),
        }
        self.recorded = true;
    }
}

impl Drop for OrderOutcome {
    fn drop(&mut self) {
        if !self.recorded {
            self.failed.increment(1);
        }
    }
}

/// Increments a gauge on creation and decrements it on drop.
///
/// Drop runs on every exit path: normal return, `?` early return, panic
/// unwind, and a future dropped mid-flight.
#[must_use = "the gauge is decremented as soon as the guard is dropped"]
pub struct InProgressGuard {
    gauge: Gauge,
}

impl InProgressGuard {
    pub fn new(gauge: Gauge) -> Self {
        gauge.increment(1.0);
        Self { gauge }
    }
}

impl Drop for InProgressGuard {
    fn drop(&mut self) {
        self.gauge.decrement(1.0);
    }
}

/// Records the time between creation and drop into a histogram, once.
#[must_use = "the duration is recorded as soon as the timer is dropped"]
pub struct HistogramTimer {
    histogram: Histogram,
    start: Instant,
}

impl HistogramTimer {
    pub fn start(histogram: Histogram) -> Self {
        Self {
            histogram,
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        self.histogram.record(self.start.elapsed().as_secs_f64());
    }
}

/// Categorize HTTP status code into success/error/timeout
fn categorize_status_code(status_code: u16) -> &'static str {
    match status_code {
        200..=299 => "success",
        408 | 504 => "timeout",
        _ => "error",
    }
}

/// Collapse extension methods into one label value.
fn normalize_method(method: &str) -> &'static str {
    match method {
        "GET" => "GET",
        "POST" => "POST",
        "PUT" => "PUT",
        "DELETE" => "DELETE",
        "PATCH" => "PATCH",
        "HEAD" => "HEAD",
        "OPTIONS" => "OPTIONS",
        _ => "OTHER",
    }
}

/// Map a request path onto the fixed route set to bound label cardinality.
fn normalize_endpoint(path: &str) -> &'static str {
    match path {
        "/" => "/",
        "/health" => "/health",
        "/metrics" => "/metrics",
        "/order" => "/order",
        "/inventory/reset" => "/inventory/reset",
        _ => "/other",
    }
}

// ============================================================================
// Tests
// ============================================================================
