//! Benchmark driver for the gridbench bindings

pub mod report;
pub mod runner;
pub mod workload;

pub use report::{Report, StatusCounts, Tally};
pub use runner::{run_phase, Phase};
pub use workload::{Operation, OperationMix, WorkloadConfig};
