//! Service layer for Order Service.
//!
//! # Components
//!
//! - `delay` - Uniformly sampled simulated delays
//! - `dependency` - Simulated external dependency and its mocks
//! - `inventory` - In-memory stock level

pub mod delay;
pub mod dependency;
pub mod inventory;

pub use delay::{DelayRange, PROCESSING_DELAY};
pub use dependency::{call_dependency, DependencyError, DependencySimulator, RandomDependency};
pub use inventory::{Inventory, InventoryMode};
