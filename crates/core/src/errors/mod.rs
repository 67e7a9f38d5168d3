//! Error types for gridbench operations

mod builders;
mod conversions;
mod types;

pub use types::{Error, Result};
