//! Benchmark properties with layered sources
//!
//! Bindings and the driver read their settings from a flat `name=value`
//! property set. Sources are layered with increasing precedence:
//! defaults, a properties file, `GRIDBENCH_*` environment variables and
//! finally `-p name=value` command line assignments.

use crate::constants::ENV_PREFIX;
use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Where a property value came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertySource {
    /// Set programmatically or built in
    Default,
    /// Properties file
    File(PathBuf),
    /// Environment variable
    Environment(String),
    /// Command line assignment
    CommandLine,
}

/// Flat property set consumed by bindings
#[derive(Debug, Clone, Default)]
pub struct Properties {
    values: BTreeMap<String, String>,
    sources: HashMap<String, PropertySource>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property with [`PropertySource::Default`]
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.set_from(name, value, PropertySource::Default)
    }

    /// Set a property and remember its source
    pub fn set_from(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
        source: PropertySource,
    ) -> &mut Self {
        let name = name.into();
        self.sources.insert(name.clone(), source);
        self.values.insert(name, value.into());
        self
    }

    /// Builder-style `set`
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn get_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.get(name).unwrap_or(default)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn source_of(&self, name: &str) -> Option<&PropertySource> {
        self.sources.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Integer property, `-1` when absent
    pub fn get_int(&self, name: &str) -> Result<i64> {
        match self.get(name) {
            Some(value) => value
                .trim()
                .parse::<i64>()
                .map_err(|e| Error::invalid_property(name, value, e.to_string())),
            None => Ok(-1),
        }
    }

    /// Non-negative integer property with a default
    pub fn get_usize_or(&self, name: &str, default: usize) -> Result<usize> {
        match self.get(name) {
            Some(value) => value
                .trim()
                .parse::<usize>()
                .map_err(|e| Error::invalid_property(name, value, e.to_string())),
            None => Ok(default),
        }
    }

    /// Floating point property with a default
    pub fn get_f64_or(&self, name: &str, default: f64) -> Result<f64> {
        match self.get(name) {
            Some(value) => value
                .trim()
                .parse::<f64>()
                .map_err(|e| Error::invalid_property(name, value, e.to_string())),
            None => Ok(default),
        }
    }

    /// Boolean property; anything other than `true` (any case) is false
    pub fn get_bool(&self, name: &str) -> bool {
        self.get(name)
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    /// Overlay `other` on top of `self`; `other` wins on conflicts
    pub fn merge(&mut self, other: Properties) {
        for (name, value) in other.values {
            let source = other
                .sources
                .get(&name)
                .cloned()
                .unwrap_or(PropertySource::Default);
            self.set_from(name, value, source);
        }
    }

    /// Parse the contents of a properties file.
    ///
    /// One `name=value` (or `name: value`) per line; blank lines and lines
    /// starting with `#` or `!` are ignored.
    pub fn parse_str(content: &str, source: PropertySource) -> Result<Self> {
        let mut properties = Properties::new();
        for (index, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            let Some(split) = line.find(['=', ':']) else {
                return Err(Error::configuration(format!(
                    "line {}: expected 'name=value', got '{line}'",
                    index + 1
                )));
            };
            let (name, value) = line.split_at(split);
            let name = name.trim();
            if name.is_empty() {
                return Err(Error::configuration(format!(
                    "line {}: property name is empty",
                    index + 1
                )));
            }
            properties.set_from(name, value[1..].trim(), source.clone());
        }
        Ok(properties)
    }

    /// Load a properties file from disk
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::file_system(path, "read properties file", e))?;
        Self::parse_str(&content, PropertySource::File(path.to_path_buf()))
    }

    /// Collect `GRIDBENCH_<NAME>` variables as lowercase property names
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    fn from_vars(vars: impl Iterator<Item = (String, String)>) -> Self {
        let mut properties = Properties::new();
        for (var, value) in vars {
            if let Some(name) = var.strip_prefix(ENV_PREFIX) {
                if !name.is_empty() {
                    properties.set_from(
                        name.to_lowercase(),
                        value,
                        PropertySource::Environment(var.clone()),
                    );
                }
            }
        }
        properties
    }

    /// Parse a single `name=value` command line assignment
    pub fn parse_assignment(assignment: &str) -> Result<(String, String)> {
        match assignment.split_once('=') {
            Some((name, value)) if !name.trim().is_empty() => {
                Ok((name.trim().to_string(), value.to_string()))
            }
            _ => Err(Error::configuration(format!(
                "expected 'name=value', got '{assignment}'"
            ))),
        }
    }
}

/// Assembles [`Properties`] from every source in precedence order
pub struct PropertiesLoader;

impl PropertiesLoader {
    /// Load properties: file < environment < command line
    pub fn load(file: Option<&Path>, assignments: &[String]) -> Result<Properties> {
        let mut properties = Properties::new();

        if let Some(path) = file {
            properties.merge(Properties::load_file(path)?);
        }

        properties.merge(Properties::from_env());

        for assignment in assignments {
            let (name, value) = Properties::parse_assignment(assignment)?;
            properties.set_from(name, value, PropertySource::CommandLine);
        }

        tracing::debug!(count = properties.len(), "loaded properties");
        Ok(properties)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn get_int_defaults_to_minus_one() {
        let props = Properties::new();
        assert_eq!(props.get_int("fetchsize").unwrap(), -1);
    }

    #[test]
    fn get_int_rejects_garbage() {
        let props = Properties::new().with("fetchsize", "ten");
        let err = props.get_int("fetchsize").unwrap_err();
        assert!(matches!(err, Error::InvalidProperty { ref property, .. } if property == "fetchsize"));
    }

    #[test]
    fn get_bool_is_case_insensitive() {
        let props = Properties::new().with("debug", "TRUE").with("other", "yes");
        assert!(props.get_bool("debug"));
        assert!(!props.get_bool("other"));
        assert!(!props.get_bool("missing"));
    }

    #[test]
    fn parse_str_skips_comments_and_accepts_colons() {
        let content = "# workload\n! legacy comment\n\nrecordcount=100\nfetchsize : 4\n";
        let props = Properties::parse_str(content, PropertySource::Default).unwrap();
        assert_eq!(props.get("recordcount"), Some("100"));
        assert_eq!(props.get_int("fetchsize").unwrap(), 4);
        assert_eq!(props.len(), 2);
    }

    #[test]
    fn parse_str_rejects_lines_without_separator() {
        let err = Properties::parse_str("recordcount 100", PropertySource::Default).unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn env_vars_become_lowercase_properties() {
        let vars = vec![
            ("GRIDBENCH_FETCHSIZE".to_string(), "8".to_string()),
            ("GRIDBENCH_".to_string(), "ignored".to_string()),
            ("PATH".to_string(), "/bin".to_string()),
        ];
        let props = Properties::from_vars(vars.into_iter());
        assert_eq!(props.get("fetchsize"), Some("8"));
        assert_eq!(props.len(), 1);
        assert_eq!(
            props.source_of("fetchsize"),
            Some(&PropertySource::Environment("GRIDBENCH_FETCHSIZE".to_string()))
        );
    }

    #[test]
    fn parse_assignment_keeps_equals_in_value() {
        let (name, value) = Properties::parse_assignment("password=a=b").unwrap();
        assert_eq!(name, "password");
        assert_eq!(value, "a=b");
        assert!(Properties::parse_assignment("=value").is_err());
        assert!(Properties::parse_assignment("novalue").is_err());
    }

    #[test]
    #[serial]
    fn loader_applies_precedence() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "fetchsize=2").unwrap();
        writeln!(file, "batchsize=3").unwrap();
        writeln!(file, "table=usertable").unwrap();

        std::env::set_var("GRIDBENCH_BATCHSIZE", "5");
        let props =
            PropertiesLoader::load(Some(file.path()), &["table=orders".to_string()]).unwrap();
        std::env::remove_var("GRIDBENCH_BATCHSIZE");

        assert_eq!(props.get("fetchsize"), Some("2"));
        assert_eq!(props.get("batchsize"), Some("5"));
        assert_eq!(props.get("table"), Some("orders"));
        assert_eq!(
            props.source_of("fetchsize"),
            Some(&PropertySource::File(file.path().to_path_buf()))
        );
        assert_eq!(props.source_of("table"), Some(&PropertySource::CommandLine));
    }

    #[test]
    #[serial]
    fn loader_reports_missing_file() {
        let err = PropertiesLoader::load(Some(Path::new("/nonexistent/gridbench.properties")), &[])
            .unwrap_err();
        assert!(matches!(err, Error::FileSystem { .. }));
    }
}
