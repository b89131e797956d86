//! HTTP request handlers for Order Service.

pub mod health;
pub mod index;
pub mod inventory;
pub mod metrics;
pub mod orders;

pub use self::metrics::metrics_handler;
pub use health::health_check;
pub use index::index;
pub use inventory::reset_inventory;
pub use orders::create_order;
