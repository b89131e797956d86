//! Order Service models.
//!
//! Wire types returned by the HTTP handlers and the transient order outcome
//! used for metrics labelling.

use serde::Serialize;

/// Inventory level the reset endpoint restores.
pub const DEFAULT_INVENTORY: i64 = 100;

/// Lowest order id handed out.
pub const MIN_ORDER_ID: u32 = 10_000;

/// Highest order id handed out.
pub const MAX_ORDER_ID: u32 = 99_999;

/// Outcome of a single order request.
///
/// Never persisted. Its only effects are one `orders_total` increment and
/// the HTTP response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderResult {
    Success,
    Failed(FailureReason),
}

/// Why an order failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    OutOfStock,
    DependencyError,
    InternalError,
}

impl OrderResult {
    /// Value of the `result` label on `orders_total`.
    pub fn label(&self) -> &'static str {
        match self {
            OrderResult::Success => "success",
            OrderResult::Failed(_) => "failed",
        }
    }
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::OutOfStock => "out_of_stock",
            FailureReason::DependencyError => "dependency_error",
            FailureReason::InternalError => "internal_error",
        }
    }
}

/// Successful order response.
///
/// ```json
/// {"status": "success", "order_id": 48213}
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct OrderAccepted {
    pub status: &'static str,
    pub order_id: u32,
}

impl OrderAccepted {
    pub fn new(order_id: u32) -> Self {
        Self {
            status: "success",
            order_id,
        }
    }
}

/// Failed order response.
///
/// ```json
/// {"status": "failed", "reason": "out_of_stock"}
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct OrderFailure {
    pub status: &'static str,
    pub reason: &'static str,
}

impl OrderFailure {
    pub fn new(reason: &'static str) -> Self {
        Self {
            status: "failed",
            reason,
        }
    }
}

/// Inventory level response, returned by the reset endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct InventoryResponse {
    pub inventory: i64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_result_labels() {
        assert_eq!(OrderResult::Success.label(), "success");
        assert_eq!(
            OrderResult::Failed(FailureReason::OutOfStock).label(),
            "failed"
        );
        assert_eq!(
            OrderResult::Failed(FailureReason::DependencyError).label(),
            "failed"
        );
    }

    #[test]
    fn test_order_accepted_serialization() {
        let json = serde_json::to_value(OrderAccepted::new(12345)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"status": "success", "order_id": 12345})
        );
    }

    #[test]
    fn test_order_failure_serialization() {
        let json =
            serde_json::to_value(OrderFailure::new(FailureReason::OutOfStock.as_str())).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"status": "failed", "reason": "out_of_stock"})
        );
    }

    #[test]
    fn test_inventory_response_serialization() {
        let json = serde_json::to_value(InventoryResponse {
            inventory: DEFAULT_INVENTORY,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"inventory": 100}));
    }
}
