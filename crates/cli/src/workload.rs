//! Core workload: key space, record generation and operation mix

use gridbench_core::{Error, Fields, Properties, Result, DEFAULT_TABLE, TABLE_PROPERTY};
use serde::Serialize;
use std::fmt;

pub const RECORD_COUNT_PROPERTY: &str = "recordcount";
pub const FIELD_COUNT_PROPERTY: &str = "fieldcount";
pub const FIELD_LENGTH_PROPERTY: &str = "fieldlength";
pub const OPERATION_COUNT_PROPERTY: &str = "operationcount";
pub const THREAD_COUNT_PROPERTY: &str = "threadcount";
pub const READ_PROPORTION_PROPERTY: &str = "readproportion";
pub const UPDATE_PROPORTION_PROPERTY: &str = "updateproportion";
pub const INSERT_PROPORTION_PROPERTY: &str = "insertproportion";
pub const DELETE_PROPORTION_PROPERTY: &str = "deleteproportion";

/// Operations issued by the driver
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Operation {
    Read,
    Update,
    Insert,
    Delete,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Read,
        Operation::Update,
        Operation::Insert,
        Operation::Delete,
    ];
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Read => "READ",
            Operation::Update => "UPDATE",
            Operation::Insert => "INSERT",
            Operation::Delete => "DELETE",
        };
        write!(f, "{}", name)
    }
}

/// Weighted choice between operations
#[derive(Debug, Clone, PartialEq)]
pub struct OperationMix {
    weights: Vec<(Operation, f64)>,
    total: f64,
}

impl OperationMix {
    /// Build a mix from `(operation, weight)` pairs. Zero weights are dropped;
    /// at least one weight must be positive.
    pub fn new(weights: &[(Operation, f64)]) -> Result<Self> {
        if let Some((op, weight)) = weights.iter().find(|(_, w)| !w.is_finite() || *w < 0.0) {
            return Err(Error::configuration(format!(
                "proportion for {op} must be a non-negative number, got {weight}"
            )));
        }
        let weights: Vec<_> = weights.iter().copied().filter(|(_, w)| *w > 0.0).collect();
        let total: f64 = weights.iter().map(|(_, w)| w).sum();
        if weights.is_empty() {
            return Err(Error::configuration("operation proportions sum to zero"));
        }
        Ok(Self { weights, total })
    }

    /// Pick an operation using `rng`
    pub fn choose(&self, rng: &mut fastrand::Rng) -> Operation {
        let mut point = rng.f64() * self.total;
        for (op, weight) in &self.weights {
            if point < *weight {
                return *op;
            }
            point -= weight;
        }
        // Rounding can leave `point` just past the last bucket.
        self.weights[self.weights.len() - 1].0
    }

    pub fn proportion(&self, op: Operation) -> f64 {
        self.weights
            .iter()
            .find(|(o, _)| *o == op)
            .map_or(0.0, |(_, w)| w / self.total)
    }
}

/// Workload settings read from [`Properties`]
#[derive(Debug, Clone, PartialEq)]
pub struct WorkloadConfig {
    pub table: String,
    pub record_count: usize,
    pub field_count: usize,
    pub field_length: usize,
    pub operation_count: usize,
    pub thread_count: usize,
    pub mix: OperationMix,
}

impl WorkloadConfig {
    pub fn from_properties(props: &Properties) -> Result<Self> {
        let mix = OperationMix::new(&[
            (Operation::Read, props.get_f64_or(READ_PROPORTION_PROPERTY, 0.95)?),
            (Operation::Update, props.get_f64_or(UPDATE_PROPORTION_PROPERTY, 0.05)?),
            (Operation::Insert, props.get_f64_or(INSERT_PROPORTION_PROPERTY, 0.0)?),
            (Operation::Delete, props.get_f64_or(DELETE_PROPORTION_PROPERTY, 0.0)?),
        ])?;

        let thread_count = props.get_usize_or(THREAD_COUNT_PROPERTY, 1)?;
        if thread_count == 0 {
            return Err(Error::invalid_property(
                THREAD_COUNT_PROPERTY,
                "0",
                "at least one worker is required",
            ));
        }

        Ok(Self {
            table: props.get_or(TABLE_PROPERTY, DEFAULT_TABLE).to_string(),
            record_count: props.get_usize_or(RECORD_COUNT_PROPERTY, 1000)?,
            field_count: props.get_usize_or(FIELD_COUNT_PROPERTY, 10)?,
            field_length: props.get_usize_or(FIELD_LENGTH_PROPERTY, 100)?,
            operation_count: props.get_usize_or(OPERATION_COUNT_PROPERTY, 1000)?,
            thread_count,
            mix,
        })
    }

    /// Share of `total` handled by `worker`; the remainder goes to the first
    /// workers
    pub fn share(&self, total: usize, worker: usize) -> usize {
        let base = total / self.thread_count;
        base + usize::from(worker < total % self.thread_count)
    }

    pub fn field_name(index: usize) -> String {
        format!("field{index}")
    }

    /// A full record of random values
    pub fn build_values(&self, rng: &mut fastrand::Rng) -> Fields {
        (0..self.field_count)
            .map(|j| (Self::field_name(j), self.random_value(rng)))
            .collect()
    }

    /// One random field with a fresh value
    pub fn build_update(&self, rng: &mut fastrand::Rng) -> Fields {
        let mut values = Fields::with_capacity(1);
        if self.field_count > 0 {
            let field = Self::field_name(rng.usize(..self.field_count));
            values.insert(field, self.random_value(rng));
        }
        values
    }

    fn random_value(&self, rng: &mut fastrand::Rng) -> String {
        std::iter::repeat_with(|| rng.alphanumeric())
            .take(self.field_length)
            .collect()
    }
}

pub fn build_key(index: u64) -> String {
    format!("user{index}")
}
