//! Helpers for asserting on counters recorded by `mqforward::metrics`.
//!
//! `DebuggingRecorder` drains its counters on every snapshot, so take one
//! [`CounterSnapshot`] per test and query it as often as needed.

use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};

/// Create a debugging recorder and its snapshotter.
pub fn debugging_recorder_setup() -> (Snapshotter, DebuggingRecorder) {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    (snapshotter, recorder)
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct CounterEntry {
    name: String,
    operation: Option<String>,
    value: u64,
}

/// Counters captured by a single snapshot.
#[derive(Clone, Debug, Default)]
pub struct CounterSnapshot {
    entries: Vec<CounterEntry>,
}

impl CounterSnapshot {
    /// Sum of counter `name`, optionally filtered by its `operation` label.
    ///
    /// Returns zero when the counter was never touched.
    pub fn counter(&self, name: &str, operation: Option<&str>) -> u64 {
        self.entries
            .iter()
            .filter(|entry| entry.name == name)
            .filter(|entry| operation.is_none_or(|op| entry.operation.as_deref() == Some(op)))
            .map(|entry| entry.value)
            .sum()
    }
}

/// Take one snapshot of every counter held by the recorder.
pub fn snapshot_counters(snapshotter: &Snapshotter) -> CounterSnapshot {
    let entries = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .filter_map(|(key, _, _, value)| match value {
            DebugValue::Counter(count) => Some(CounterEntry {
                name: key.key().name().to_owned(),
                operation: key
                    .key()
                    .labels()
                    .find(|label| label.key() == "operation")
                    .map(|label| label.value().to_owned()),
                value: count,
            }),
            _ => None,
        })
        .collect();
    CounterSnapshot { entries }
}
