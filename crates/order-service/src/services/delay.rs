//! Uniformly sampled simulated delays.

use rand::Rng;
use std::time::Duration;

/// Simulated internal processing time of a successful order.
pub const PROCESSING_DELAY: DelayRange =
    DelayRange::new(Duration::from_millis(100), Duration::from_millis(500));

/// Closed range of durations to sample from.
///
/// A range whose `min` is not below `max` always yields `min`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    min: Duration,
    max: Duration,
}

impl DelayRange {
    /// Never sleeps. Used by tests.
    pub const ZERO: DelayRange = DelayRange::new(Duration::ZERO, Duration::ZERO);

    pub const fn new(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }

    /// Always the same duration.
    pub const fn fixed(duration: Duration) -> Self {
        Self::new(duration, duration)
    }

    pub fn min(&self) -> Duration {
        self.min
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    /// Draw one duration uniformly from the range.
    pub fn sample(&self) -> Duration {
        if self.min >= self.max {
            return self.min;
        }
        rand::thread_rng().gen_range(self.min..=self.max)
    }

    /// Sleep for a sampled duration and return it.
    pub async fn sleep(&self) -> Duration {
        let delay = self.sample();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        delay
    }
}
