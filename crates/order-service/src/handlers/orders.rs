//! Order creation handler.
//!
//! `POST /order` walks one order through its lifecycle:
//!
//! ```text
//! START -> CHECK_INVENTORY -> OUT_OF_STOCK                         (409)
//!                          -> CALL_DEPENDENCY -> DEPENDENCY_FAILED (502)
//!                                             -> PROCESS -> DECREMENT_AND_SUCCEED (200)
//! ```
//!
//! Every request, whichever branch it ends in, is counted once in
//! `orders_total`, timed once into `http_request_latency_seconds` and
//! `order_processing_seconds`, and tracked by `http_requests_in_progress`
//! for its whole duration.
//!
//! The order runs on its own task. A client that disconnects, or the
//! router timeout firing, drops only the wait for the response; the order
//! still finishes and is counted. A task that panics is counted as failed
//! and answered with 500.

use crate::errors::OrderError;
use crate::models::{OrderAccepted, OrderResult, MAX_ORDER_ID, MIN_ORDER_ID};
use crate::routes::AppState;
use crate::services::call_dependency;
use axum::extract::State;
use axum::Json;
use rand::Rng;
use std::sync::Arc;
use tracing::{instrument, Instrument};

/// Handler for POST /order
///
/// No request body is required.
///
/// ## Responses
///
/// - 200 `{"status": "success", "order_id": 48213}`
/// - 409 `{"status": "failed", "reason": "out_of_stock"}`
/// - 502 `{"status": "failed", "reason": "dependency_error"}`
/// - 500 `{"status": "failed", "reason": "internal_error"}`
#[instrument(skip_all, name = "order.create")]
pub async fn create_order(
    State(state): State<Arc<AppState>>,
) -> Result<Json<OrderAccepted>, OrderError> {
    let order = tokio::spawn(async move { run_order(&state).await }.in_current_span());

    match order.await {
        Ok(result) => result.map(Json),
        Err(e) => Err(OrderError::Internal(format!("order task failed: {}", e))),
    }
}

async fn run_order(state: &AppState) -> Result<OrderAccepted, OrderError> {
    let _in_progress = state.metrics.track_in_progress();
    let request_timer = state.metrics.time_request();
    let _processing_timer = state.metrics.time_order_processing();
    let outcome = state.metrics.begin_order();

    let result = process_order(state).await;

    outcome.finish(match &result {
        Ok(_) => OrderResult::Success,
        Err(e) => OrderResult::Failed(e.failure_reason()),
    });
    tracing::debug!(
        target: "order.create",
        elapsed = ?request_timer.elapsed(),
        "Order finished"
    );

    result
}

async fn process_order(state: &AppState) -> Result<OrderAccepted, OrderError> {
    let level = state.inventory.get();
    if level <= 0 {
        tracing::debug!(target: "order.create", inventory = level, "Order rejected: out of stock");
        return Err(OrderError::OutOfStock);
    }

    call_dependency(state.dependency.as_ref(), &state.metrics)
        .await
        .map_err(|e| OrderError::Dependency(e.to_string()))?;

    state.processing_delay.sleep().await;

    if !state.inventory.commit_sale() {
        tracing::info!(
            target: "order.create",
            "Order rejected: stock sold out while the order was in flight"
        );
        return Err(OrderError::OutOfStock);
    }

    let order_id = generate_order_id();
    tracing::info!(
        target: "order.create",
        order_id,
        inventory = state.inventory.get(),
        "Order created"
    );

    Ok(OrderAccepted::new(order_id))
}

fn generate_order_id() -> u32 {
    rand::thread_rng().gen_range(MIN_ORDER_ID..=MAX_ORDER_ID)
}
