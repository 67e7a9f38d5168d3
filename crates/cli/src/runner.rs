//! Load and transaction phases
//!
//! Each worker is a tokio task with its own client from the shared
//! [`BindingFactory`]; outcomes are tallied per worker and merged at the end.

use crate::report::{record, Report, StatusCounts, Tally};
use crate::workload::{build_key, Operation, WorkloadConfig};
use anyhow::{Context, Result};
use gridbench_bindings::BindingFactory;
use gridbench_core::{Db, Fields, Status};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Benchmark phase
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Load,
    Run,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Load => "load",
            Phase::Run => "run",
        }
    }
}

struct Worker {
    id: usize,
    client: Box<dyn Db>,
    workload: Arc<WorkloadConfig>,
    rng: fastrand::Rng,
    counts: StatusCounts,
}

impl Worker {
    async fn load(&mut self) {
        let threads = self.workload.thread_count;
        for index in (self.id..self.workload.record_count).step_by(threads) {
            let key = build_key(index as u64);
            let values = self.workload.build_values(&mut self.rng);
            let status = self.client.insert(&self.workload.table, &key, &values).await;
            record(&mut self.counts, Operation::Insert, status);
        }
    }

    async fn run(&mut self, operations: usize, next_insert: &AtomicU64) {
        for _ in 0..operations {
            let op = self.workload.mix.choose(&mut self.rng);
            let status = self.execute(op, next_insert).await;
            record(&mut self.counts, op, status);
        }
    }

    async fn execute(&mut self, op: Operation, next_insert: &AtomicU64) -> Status {
        let table = self.workload.table.as_str();
        match op {
            Operation::Read => {
                let key = existing_key(&mut self.rng, next_insert);
                let mut result = Fields::new();
                self.client.read(table, &key, None, &mut result).await
            }
            Operation::Update => {
                let key = existing_key(&mut self.rng, next_insert);
                let values = self.workload.build_update(&mut self.rng);
                self.client.update(table, &key, &values).await
            }
            Operation::Insert => {
                let key = build_key(next_insert.fetch_add(1, Ordering::Relaxed));
                let values = self.workload.build_values(&mut self.rng);
                self.client.insert(table, &key, &values).await
            }
            Operation::Delete => {
                let key = existing_key(&mut self.rng, next_insert);
                self.client.delete(table, &key).await
            }
        }
    }
}

/// A key from the part of the key space inserted so far
fn existing_key(rng: &mut fastrand::Rng, next_insert: &AtomicU64) -> String {
    let upper = next_insert.load(Ordering::Relaxed).max(1);
    build_key(rng.u64(..upper))
}

/// Run one phase to completion and report the status counts
pub async fn run_phase(
    phase: Phase,
    factory: &BindingFactory,
    workload: Arc<WorkloadConfig>,
    seed: Option<u64>,
) -> Result<Report> {
    let tally = Arc::new(Tally::new());
    let next_insert = Arc::new(AtomicU64::new(workload.record_count as u64));
    let started = Instant::now();

    info!(
        phase = phase.name(),
        binding = %factory.kind(),
        threads = workload.thread_count,
        "starting phase"
    );

    let mut handles = Vec::with_capacity(workload.thread_count);
    for id in 0..workload.thread_count {
        let rng = match seed {
            Some(seed) => fastrand::Rng::with_seed(seed.wrapping_add(id as u64)),
            None => fastrand::Rng::new(),
        };
        let mut worker = Worker {
            id,
            client: factory.create(),
            workload: Arc::clone(&workload),
            rng,
            counts: StatusCounts::new(),
        };
        let tally = Arc::clone(&tally);
        let next_insert = Arc::clone(&next_insert);
        let operations = workload.share(workload.operation_count, id);

        handles.push(tokio::spawn(async move {
            worker.client.init().await?;
            match phase {
                Phase::Load => worker.load().await,
                Phase::Run => worker.run(operations, &next_insert).await,
            }
            if let Err(e) = worker.client.cleanup().await {
                warn!(worker = worker.id, error = %e, "client cleanup failed");
            }
            debug!(worker = worker.id, "worker finished");
            tally.merge(worker.counts);
            Ok::<_, gridbench_core::Error>(())
        }));
    }

    for handle in futures::future::join_all(handles).await {
        handle
            .context("worker task panicked")?
            .context("worker failed to initialise its client")?;
    }

    let report = Report::new(
        phase.name(),
        &factory.kind().to_string(),
        started.elapsed(),
        tally.snapshot(),
    );
    info!(
        phase = phase.name(),
        operations = report.operations,
        succeeded = report.succeeded(),
        elapsed_ms = report.elapsed_ms as u64,
        "phase finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridbench_core::Properties;

    fn workload(props: &Properties) -> Arc<WorkloadConfig> {
        Arc::new(WorkloadConfig::from_properties(props).unwrap())
    }

    #[tokio::test]
    async fn load_inserts_every_record_once() {
        let props = Properties::new()
            .with("recordcount", "25")
            .with("threadcount", "4")
            .with("fieldcount", "2");
        let factory = BindingFactory::new("named", &props).unwrap();

        let report = run_phase(Phase::Load, &factory, workload(&props), Some(1))
            .await
            .unwrap();
        assert_eq!(report.count(Operation::Insert, Status::Ok), 25);
        assert_eq!(report.operations, 25);
    }

    #[tokio::test]
    async fn run_issues_operation_count_operations() {
        let props = Properties::new()
            .with("recordcount", "10")
            .with("operationcount", "30")
            .with("threadcount", "3");
        let factory = BindingFactory::new("grid", &props).unwrap();
        let workload = workload(&props);

        run_phase(Phase::Load, &factory, Arc::clone(&workload), Some(3))
            .await
            .unwrap();
        let report = run_phase(Phase::Run, &factory, workload, Some(3))
            .await
            .unwrap();

        assert_eq!(report.operations, 30);
        assert_eq!(report.succeeded(), 30);
    }
}
