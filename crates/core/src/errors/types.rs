use std::path::PathBuf;

/// Result type alias for gridbench operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for gridbench operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The backing store failed while serving a request
    #[error("store {operation} failed for key '{key}': {message}")]
    Store {
        operation: String,
        key: String,
        message: String,
    },

    /// The caller addressed a table this binding does not serve
    #[error("unexpected table name '{table}', expected '{expected}'")]
    UnsupportedTable { table: String, expected: String },

    /// A property could not be parsed into the type the binding needs
    #[error("invalid {property} specified: '{value}': {message}")]
    InvalidProperty {
        property: String,
        value: String,
        message: String,
    },

    /// Configuration errors
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// No binding is registered under the requested name
    #[error("unknown binding '{name}', expected one of: {available}")]
    UnknownBinding { name: String, available: String },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// File system operations
    #[error("file system {operation} operation failed for '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },
}
