//! Per-operation status tally and the end-of-phase report

use crate::workload::Operation;
use gridbench_core::Status;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Counts of each status per operation
pub type StatusCounts = BTreeMap<Operation, BTreeMap<Status, u64>>;

/// Tally shared by the workers of one phase. Workers count locally and
/// merge once when they finish.
#[derive(Debug, Default)]
pub struct Tally {
    counts: Mutex<StatusCounts>,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&self, local: StatusCounts) {
        let mut counts = self.counts.lock();
        for (op, statuses) in local {
            let entry = counts.entry(op).or_default();
            for (status, count) in statuses {
                *entry.entry(status).or_insert(0) += count;
            }
        }
    }

    pub fn snapshot(&self) -> StatusCounts {
        self.counts.lock().clone()
    }
}

/// Record one outcome into a worker-local map
pub fn record(counts: &mut StatusCounts, op: Operation, status: Status) {
    *counts.entry(op).or_default().entry(status).or_insert(0) += 1;
}

/// Summary of a finished phase
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub phase: String,
    pub binding: String,
    pub elapsed_ms: u128,
    pub operations: u64,
    pub counts: StatusCounts,
}

impl Report {
    pub fn new(phase: &str, binding: &str, elapsed: Duration, counts: StatusCounts) -> Self {
        let operations = counts.values().flat_map(BTreeMap::values).sum();
        Self {
            phase: phase.to_string(),
            binding: binding.to_string(),
            elapsed_ms: elapsed.as_millis(),
            operations,
            counts,
        }
    }

    pub fn count(&self, op: Operation, status: Status) -> u64 {
        self.counts
            .get(&op)
            .and_then(|statuses| statuses.get(&status))
            .copied()
            .unwrap_or(0)
    }

    /// Operations whose status counts as success
    pub fn succeeded(&self) -> u64 {
        self.counts
            .values()
            .flat_map(|statuses| statuses.iter())
            .filter(|(status, _)| status.is_ok())
            .map(|(_, count)| count)
            .sum()
    }

    pub fn throughput(&self) -> f64 {
        if self.elapsed_ms == 0 {
            return self.operations as f64;
        }
        self.operations as f64 * 1000.0 / self.elapsed_ms as f64
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[OVERALL], Phase, {}", self.phase)?;
        writeln!(f, "[OVERALL], Binding, {}", self.binding)?;
        writeln!(f, "[OVERALL], RunTime(ms), {}", self.elapsed_ms)?;
        writeln!(f, "[OVERALL], Throughput(ops/sec), {:.2}", self.throughput())?;
        for (op, statuses) in &self.counts {
            let total: u64 = statuses.values().sum();
            writeln!(f, "[{op}], Operations, {total}")?;
            for (status, count) in statuses {
                writeln!(f, "[{op}], Return={status}, {count}")?;
            }
        }
        Ok(())
    }
}
