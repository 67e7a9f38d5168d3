/// Constants shared by the gridbench crates
// Environment variables
pub const ENV_PREFIX: &str = "GRIDBENCH_";
pub const LOG_ENV_VAR: &str = "GRIDBENCH_LOG";

// Table and record type defaults
pub const DEFAULT_TABLE: &str = "usertable";
pub const DEFAULT_RECORD_TYPE: &str = "CustomType";

// Property names understood by the bindings
pub const BATCH_SIZE_PROPERTY: &str = "batchsize";
pub const FETCH_SIZE_PROPERTY: &str = "fetchsize";
pub const TABLE_PROPERTY: &str = "table";
pub const DEBUG_PROPERTY: &str = "debug";
