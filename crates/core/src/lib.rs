//! Core types for the gridbench bindings.
//!
//! ## Key Components
//!
//! - **`errors`**: the `Error` enum and `Result` alias shared by every crate.
//! - **`status`**: the per-operation `Status` reported back to the harness.
//! - **`db`**: the `Db` trait bindings implement.
//! - **`properties`**: layered `name=value` configuration.
//! - **`constants`**: property names and defaults.

pub mod constants;
pub mod db;
pub mod errors;
pub mod properties;
pub mod status;

pub use self::{
    constants::*,
    db::{Db, Fields},
    errors::{Error, Result},
    properties::{Properties, PropertiesLoader, PropertySource},
    status::Status,
};
