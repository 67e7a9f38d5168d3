//! Binding configuration built from [`Properties`]

use gridbench_core::{
    Properties, Result, BATCH_SIZE_PROPERTY, DEBUG_PROPERTY, DEFAULT_RECORD_TYPE, DEFAULT_TABLE,
    FETCH_SIZE_PROPERTY, TABLE_PROPERTY,
};

/// Record type name used for inserted records
pub const RECORD_TYPE_PROPERTY: &str = "recordtype";

/// Remote connection property names
pub const CACHE_PROPERTY: &str = "cache";
pub const HOST_PROPERTY: &str = "ip";
pub const PORT_PROPERTY: &str = "port";
pub const USER_PROPERTY: &str = "user";
pub const PASSWORD_PROPERTY: &str = "password";

/// Default port of the remote cache protocol
pub const DEFAULT_REMOTE_PORT: u16 = 11222;

/// Settings for [`crate::GridClient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridConfig {
    /// The single table this binding serves
    pub table: String,
    /// Type name given to inserted records
    pub record_type: String,
    /// Raw `batchsize` value, `-1` when unset
    pub batch_size: i64,
    /// Raw `fetchsize` value, `-1` when unset
    pub fetch_size: i64,
    /// Log every projection
    pub debug: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            table: DEFAULT_TABLE.to_string(),
            record_type: DEFAULT_RECORD_TYPE.to_string(),
            batch_size: -1,
            fetch_size: -1,
            debug: false,
        }
    }
}

impl GridConfig {
    pub fn from_properties(props: &Properties) -> Result<Self> {
        Ok(Self {
            table: props.get_or(TABLE_PROPERTY, DEFAULT_TABLE).to_string(),
            record_type: props
                .get_or(RECORD_TYPE_PROPERTY, DEFAULT_RECORD_TYPE)
                .to_string(),
            batch_size: props.get_int(BATCH_SIZE_PROPERTY)?,
            fetch_size: props.get_int(FETCH_SIZE_PROPERTY)?,
            debug: props.get_bool(DEBUG_PROPERTY),
        })
    }

    /// Set the read batch threshold
    #[must_use]
    pub fn with_fetch_size(mut self, fetch_size: i64) -> Self {
        self.fetch_size = fetch_size;
        self
    }

    /// Read batch threshold, `None` when batching is disabled.
    ///
    /// `fetchsize` wins when set; `batchsize` is accepted as an alias.
    pub fn read_threshold(&self) -> Option<usize> {
        let raw = if self.fetch_size > 0 {
            self.fetch_size
        } else {
            self.batch_size
        };
        usize::try_from(raw).ok().filter(|threshold| *threshold > 0)
    }
}

/// Connection settings for the remote cache manager
#[derive(Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    pub cache_name: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_REMOTE_PORT,
            user: None,
            password: None,
            cache_name: DEFAULT_TABLE.to_string(),
        }
    }
}

impl RemoteConfig {
    pub fn from_properties(props: &Properties) -> Result<Self> {
        let defaults = Self::default();
        let port = match props.get(PORT_PROPERTY) {
            Some(value) => value.trim().parse::<u16>().map_err(|e| {
                gridbench_core::Error::invalid_property(PORT_PROPERTY, value, e.to_string())
            })?,
            None => defaults.port,
        };
        Ok(Self {
            host: props.get_or(HOST_PROPERTY, &defaults.host).to_string(),
            port,
            user: props.get(USER_PROPERTY).map(str::to_string),
            password: props.get(PASSWORD_PROPERTY).map(str::to_string),
            cache_name: props.get_or(CACHE_PROPERTY, DEFAULT_TABLE).to_string(),
        })
    }

    /// `host:port` of the server
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl std::fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("cache_name", &self.cache_name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridbench_core::Error;

    #[test]
    fn batching_disabled_by_default() {
        let config = GridConfig::from_properties(&Properties::new()).unwrap();
        assert_eq!(config.read_threshold(), None);
        assert_eq!(config.table, "usertable");
        assert_eq!(config.record_type, "CustomType");
    }

    #[test]
    fn fetchsize_wins_over_batchsize() {
        let props = Properties::new()
            .with("fetchsize", "2")
            .with("batchsize", "10");
        let config = GridConfig::from_properties(&props).unwrap();
        assert_eq!(config.read_threshold(), Some(2));
    }

    #[test]
    fn batchsize_is_an_alias() {
        let props = Properties::new().with("batchsize", "4");
        let config = GridConfig::from_properties(&props).unwrap();
        assert_eq!(config.read_threshold(), Some(4));
    }

    #[test]
    fn non_positive_threshold_disables_batching() {
        let props = Properties::new().with("fetchsize", "0").with("batchsize", "-3");
        let config = GridConfig::from_properties(&props).unwrap();
        assert_eq!(config.read_threshold(), None);
    }

    #[test]
    fn invalid_fetchsize_is_rejected() {
        let props = Properties::new().with("fetchsize", "lots");
        assert!(matches!(
            GridConfig::from_properties(&props),
            Err(Error::InvalidProperty { .. })
        ));
    }

    #[test]
    fn remote_config_parses_connection_properties() {
        let props = Properties::new()
            .with("ip", "10.0.0.5")
            .with("port", "11333")
            .with("user", "bench")
            .with("password", "secret")
            .with("cache", "ycsb");
        let config = RemoteConfig::from_properties(&props).unwrap();
        assert_eq!(config.address(), "10.0.0.5:11333");
        assert_eq!(config.cache_name, "ycsb");
        assert!(!format!("{config:?}").contains("secret"));
    }

    #[test]
    fn remote_config_rejects_bad_port() {
        let props = Properties::new().with("port", "70000");
        assert!(RemoteConfig::from_properties(&props).is_err());
    }
}
