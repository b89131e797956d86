//! `DebuggingRecorder` helpers shared by unit tests.

use super::OrderMetrics;
use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};
use metrics_util::CompositeKey;
use std::sync::Arc;

/// Metrics registered into a fresh debugging recorder.
pub(crate) fn debug_metrics() -> (OrderMetrics, Snapshotter) {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    (OrderMetrics::register_with(Arc::new(recorder)), snapshotter)
}

/// One point-in-time read of every metric.
///
/// Take a single snapshot per assertion block: histogram samples are
/// read out of the recorder when the snapshot is taken.
pub(crate) struct MetricsSnapshot(Vec<(CompositeKey, DebugValue)>);

impl MetricsSnapshot {
    pub(crate) fn take(snapshotter: &Snapshotter) -> Self {
        Self(
            snapshotter
                .snapshot()
                .into_vec()
                .into_iter()
                .map(|(key, _, _, value)| (key, value))
                .collect(),
        )
    }

    fn find<T>(
        &self,
        name: &str,
        labels: &[(&str, &str)],
        pick: impl Fn(&DebugValue) -> Option<T>,
    ) -> Vec<T> {
        self.0
            .iter()
            .filter(|(key, _)| matches_key(key, name, labels))
            .filter_map(|(_, value)| pick(value))
            .collect()
    }

    /// Sum of every counter series named `name` carrying `labels`.
    pub(crate) fn counter(&self, name: &str, labels: &[(&str, &str)]) -> u64 {
        self.find(name, labels, |value| match value {
            DebugValue::Counter(v) => Some(*v),
            _ => None,
        })
        .into_iter()
        .sum()
    }

    pub(crate) fn gauge(&self, name: &str) -> f64 {
        self.find(name, &[], |value| match value {
            DebugValue::Gauge(v) => Some(v.into_inner()),
            _ => None,
        })
        .into_iter()
        .sum()
    }

    /// Observations across every histogram series named `name` carrying
    /// `labels`.
    pub(crate) fn histogram_count(&self, name: &str, labels: &[(&str, &str)]) -> usize {
        self.find(name, labels, |value| match value {
            DebugValue::Histogram(v) => Some(v.len()),
            _ => None,
        })
        .into_iter()
        .sum()
    }
}

fn matches_key(key: &CompositeKey, name: &str, labels: &[(&str, &str)]) -> bool {
    key.key().name() == name
        && labels.iter().all(|(k, v)| {
            key.key()
                .labels()
                .any(|label| label.key() == *k && label.value() == *v)
        })
}
