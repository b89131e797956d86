//! Simulated external dependency.
//!
//! Every order calls out to a dependency that is slow and occasionally
//! fails. [`RandomDependency`] is the production simulation; the [`mock`]
//! module provides deterministic fakes for tests.

use crate::observability::OrderMetrics;
use crate::services::delay::DelayRange;
use rand::Rng;
use std::time::Duration;
use thiserror::Error;

/// Latency range of one simulated dependency call.
pub const DEPENDENCY_LATENCY: DelayRange =
    DelayRange::new(Duration::from_millis(50), Duration::from_millis(1500));

/// Failure probability of one simulated dependency call.
pub const DEPENDENCY_FAILURE_RATE: f64 = 0.1;

/// A failed dependency call.
#[derive(Debug, Error)]
pub enum DependencyError {
    #[error("External service error after {0:?}")]
    Unavailable(Duration),
}

/// Trait for the external dependency (enables mocking).
#[async_trait::async_trait]
pub trait DependencySimulator: Send + Sync {
    /// Call the dependency, returning the latency it took.
    async fn call(&self) -> Result<Duration, DependencyError>;
}

/// Dependency with uniformly random latency and a fixed failure rate.
#[derive(Debug, Clone)]
pub struct RandomDependency {
    latency: DelayRange,
    failure_rate: f64,
}

impl Default for RandomDependency {
    fn default() -> Self {
        Self::new(DEPENDENCY_FAILURE_RATE)
    }
}

impl RandomDependency {
    pub fn new(failure_rate: f64) -> Self {
        Self::with_latency(DEPENDENCY_LATENCY, failure_rate)
    }

    pub fn with_latency(latency: DelayRange, failure_rate: f64) -> Self {
        Self {
            latency,
            failure_rate,
        }
    }

    pub fn failure_rate(&self) -> f64 {
        self.failure_rate
    }

    fn roll_failure(&self) -> bool {
        rand::thread_rng().gen::<f64>() < self.failure_rate
    }
}

#[async_trait::async_trait]
impl DependencySimulator for RandomDependency {
    async fn call(&self) -> Result<Duration, DependencyError> {
        let latency = self.latency.sleep().await;
        if self.roll_failure() {
            return Err(DependencyError::Unavailable(latency));
        }
        Ok(latency)
    }
}

/// Call `dependency`, timing it into `dependency_call_seconds`.
///
/// Failures increment `dependency_errors_total` before they are returned.
#[tracing::instrument(skip_all, name = "order.dependency.call")]
pub async fn call_dependency(
    dependency: &dyn DependencySimulator,
    metrics: &OrderMetrics,
) -> Result<Duration, DependencyError> {
    let _timer = metrics.time_dependency_call();

    let result = dependency.call().await;
    match &result {
        Ok(latency) => {
            tracing::debug!(
                target: "order.dependency",
                latency = ?latency,
                "Dependency call succeeded"
            );
        }
        Err(_) => metrics.record_dependency_error(),
    }
    result
}

/// Mock dependencies for testing.
pub mod mock {

    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Dependency with scripted outcomes and a fixed latency.
    pub struct FixedDependency {
        /// Outcomes to return, `true` meaning success (cycles through them).
        outcomes: Vec<bool>,
        /// Simulated latency of each call.
        latency: Duration,
        /// Number of calls made.
        call_count: AtomicUsize,
    }

    impl FixedDependency {
        /// Create a mock that always succeeds.
        pub fn succeeding() -> Self {
            Self::with_outcomes(vec![true])
        }

        /// Create a mock that always fails.
        pub fn failing() -> Self {
            Self::with_outcomes(vec![false])
        }

        /// Create a mock that returns the given outcomes in sequence.
        pub fn with_outcomes(outcomes: Vec<bool>) -> Self {
            Self {
                outcomes,
                latency: Duration::ZERO,
                call_count: AtomicUsize::new(0),
            }
        }

        /// Sleep for `latency` on every call.
        pub fn with_latency(mut self, latency: Duration) -> Self {
            self.latency = latency;
            self
        }

        /// Get the number of calls made.
        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl DependencySimulator for FixedDependency {
        async fn call(&self) -> Result<Duration, DependencyError> {
            let count = self.call_count.fetch_add(1, Ordering::SeqCst);

            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }

            let succeeds = match self.outcomes.len() {
                0 => true,
                len => self.outcomes.get(count % len).copied().unwrap_or(true),
            };

            if succeeds {
                Ok(self.latency)
            } else {
                Err(DependencyError::Unavailable(self.latency))
            }
        }
    }

    #[cfg(test)]
    #[allow(clippy::unwrap_used, clippy::expect_used)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_mock_succeeding() {
            let mock = FixedDependency::succeeding();
            assert!(mock.call().await.is_ok());
            assert_eq!(mock.call_count(), 1);
        }

        #[tokio::test]
        async fn test_mock_failing() {
            let mock = FixedDependency::failing();
            assert!(mock.call().await.is_err());
        }

        #[tokio::test]
        async fn test_mock_cycling_outcomes() {
            let mock = FixedDependency::with_outcomes(vec![false, true]);

            assert!(mock.call().await.is_err());
            assert!(mock.call().await.is_ok());
            assert!(mock.call().await.is_err());
            assert_eq!(mock.call_count(), 3);
        }

        #[tokio::test(start_paused = true)]
        async fn test_mock_latency() {
            let mock = FixedDependency::succeeding().with_latency(Duration::from_millis(40));
            let latency = mock.call().await.unwrap();
            assert_eq!(latency, Duration::from_millis(40));
        }
    }
}
