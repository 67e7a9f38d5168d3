//! Builder methods for creating errors with context

use super::types::Error;
use std::path::PathBuf;

impl Error {
    /// Create a store error for the given operation and key
    #[must_use]
    pub fn store(
        operation: impl Into<String>,
        key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Error::Store {
            operation: operation.into(),
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create an unsupported table error
    #[must_use]
    pub fn unsupported_table(table: impl Into<String>, expected: impl Into<String>) -> Self {
        Error::UnsupportedTable {
            table: table.into(),
            expected: expected.into(),
        }
    }

    /// Create an invalid property error
    #[must_use]
    pub fn invalid_property(
        property: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Error::InvalidProperty {
            property: property.into(),
            value: value.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    /// Create an unknown binding error
    #[must_use]
    pub fn unknown_binding(name: impl Into<String>, available: &[&str]) -> Self {
        Error::UnknownBinding {
            name: name.into(),
            available: available.join(", "),
        }
    }

    /// Create a file system error with context
    #[must_use]
    pub fn file_system(
        path: impl Into<PathBuf>,
        operation: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Error::FileSystem {
            path: path.into(),
            operation: operation.into(),
            source,
        }
    }

    /// Whether the error was raised by the backing store
    #[must_use]
    pub const fn is_store(&self) -> bool {
        matches!(self, Error::Store { .. })
    }
}
