//! # Order Test Utilities
//!
//! Shared test utilities for the Order Service.
//!
//! This crate provides:
//! - Server test harness (`TestOrderServer` for E2E tests)
//! - Prometheus exposition parsing (`metric_value`)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use order_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> Result<(), anyhow::Error> {
//!     let server = TestOrderServer::builder().spawn().await?;
//!     let client = reqwest::Client::new();
//!
//!     let response = client
//!         .post(format!("{}/order", server.url()))
//!         .send()
//!         .await?;
//!
//!     assert_eq!(response.status(), 200);
//!     Ok(())
//! }
//! ```

pub mod exposition;
pub mod server_harness;

// Re-export commonly used items
pub use exposition::*;
pub use server_harness::*;
