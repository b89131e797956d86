//! Observability module for Order Service.
//!
//! Provides metrics definitions, recorder setup and scoped instrumentation
//! guards.

pub mod metrics;

#[cfg(test)]
pub(crate) mod test_support;

pub use self::metrics::{HistogramTimer, InProgressGuard, OrderMetrics, OrderOutcome};
