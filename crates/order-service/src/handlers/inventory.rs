//! Inventory admin handler.

use crate::models::InventoryResponse;
use crate::routes::AppState;
use axum::extract::State;
use axum::Json;
use std::sync::Arc;
use tracing::instrument;

/// Handler for POST /inventory/reset
///
/// Restores the inventory to 100 regardless of its current level.
///
/// ## Example Response
///
/// ```json
/// {"inventory": 100}
/// ```
#[instrument(skip_all, name = "order.inventory.reset")]
pub async fn reset_inventory(State(state): State<Arc<AppState>>) -> Json<InventoryResponse> {
    let previous = state.inventory.get();
    let inventory = state.inventory.reset();

    tracing::info!(target: "order.inventory", previous, inventory, "Inventory reset");

    Json(InventoryResponse { inventory })
}
