use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a single harness operation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Status {
    /// The operation completed
    Ok,
    /// The backing store raised an error
    Error,
    /// The requested record does not exist
    NotFound,
    /// The binding does not implement the operation
    NotImplemented,
    /// The store returned something the binding did not expect
    UnexpectedState,
    /// The request was malformed
    BadRequest,
    /// The store refused the request
    Forbidden,
    /// The store could not be reached
    ServiceUnavailable,
    /// The operation was accepted into a batch and has not been resolved yet.
    /// Carries no record and does not indicate failure.
    BatchedOk,
}

impl Status {
    /// Every status, in reporting order
    pub const ALL: [Status; 9] = [
        Status::Ok,
        Status::BatchedOk,
        Status::NotFound,
        Status::Error,
        Status::NotImplemented,
        Status::UnexpectedState,
        Status::BadRequest,
        Status::Forbidden,
        Status::ServiceUnavailable,
    ];

    /// Short machine-friendly name
    pub const fn name(&self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::Error => "ERROR",
            Status::NotFound => "NOT_FOUND",
            Status::NotImplemented => "NOT_IMPLEMENTED",
            Status::UnexpectedState => "UNEXPECTED_STATE",
            Status::BadRequest => "BAD_REQUEST",
            Status::Forbidden => "FORBIDDEN",
            Status::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Status::BatchedOk => "BATCHED_OK",
        }
    }

    /// `Ok` and `BatchedOk` both count as success
    pub fn is_ok(&self) -> bool {
        matches!(self, Status::Ok | Status::BatchedOk)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batched_ok_counts_as_success() {
        assert!(Status::Ok.is_ok());
        assert!(Status::BatchedOk.is_ok());
        assert!(!Status::NotFound.is_ok());
        assert!(!Status::Error.is_ok());
    }

    #[test]
    fn display_uses_name() {
        assert_eq!(Status::BatchedOk.to_string(), "BATCHED_OK");
        assert_eq!(Status::NotFound.to_string(), "NOT_FOUND");
    }

    #[test]
    fn all_lists_each_status_once() {
        let unique: std::collections::HashSet<_> = Status::ALL.iter().collect();
        assert_eq!(unique.len(), Status::ALL.len());
    }
}
