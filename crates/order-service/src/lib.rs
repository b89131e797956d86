//! Order Service Library
//!
//! A small HTTP service that simulates order processing and exposes
//! Prometheus metrics describing it:
//!
//! - Order creation against an in-memory inventory
//! - A simulated external dependency with random latency and failures
//! - Inventory reset for demos and load tests
//! - `/metrics` exposition for Prometheus scraping
//!
//! # Architecture
//!
//! The service follows the Handler -> Service pattern:
//!
//! ```text
//! routes/mod.rs -> handlers/*.rs -> services/*.rs
//! ```
//!
//! # Modules
//!
//! - `config` - Service configuration from environment
//! - `errors` - Error types with HTTP status code mapping
//! - `handlers` - HTTP request handlers
//! - `middleware` - HTTP metrics middleware
//! - `models` - Wire models
//! - `observability` - Metric registration and scoped instrumentation
//! - `routes` - Axum router setup
//! - `services` - Inventory, dependency simulation and delays

pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod routes;
pub mod services;
