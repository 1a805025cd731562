#[cfg(feature = "config")]
use core_config::{ConfigError, FromEnv, env_optional, env_parse, env_required};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use crate::consistency::Consistency;
use crate::error::{ScyllaError, ScyllaResult};

/// Native CQL port, used when neither the node nor the configuration names one
pub const DEFAULT_PORT: u16 = 9042;

/// The only CQL protocol version the driver negotiates
pub const DEFAULT_PROTO_VERSION: u8 = 4;

/// ScyllaDB/Cassandra connection configuration
///
/// Every field is optional: zero values and empty strings mean "leave the
/// driver default alone". Only `nodes` must be non-empty to open a session.
///
/// Files use camelCase keys and human-readable durations:
///
/// ```toml
/// nodes = ["node1", "node2:19043"]
/// port = 19042
/// keyspace = "test"
/// username = "cassandra"
/// password = "secret"
/// numConnections = 5
/// reconnectInterval = "10s"
/// timeout = "2s"
/// consistency = "localQuorum"
/// ```
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Configuration {
    /// Host names, IP addresses or `host:port` pairs (container names in docker mode)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<String>,

    /// Port applied to nodes that do not carry one
    #[serde(skip_serializing_if = "is_zero_u16")]
    pub port: u16,

    /// Connections per host
    #[serde(skip_serializing_if = "is_zero_usize")]
    pub num_connections: usize,

    /// How often the driver refreshes cluster metadata and retries lost nodes
    #[serde(with = "crate::duration", skip_serializing_if = "Option::is_none")]
    pub reconnect_interval: Option<Duration>,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub keyspace: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub username: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub password: String,

    /// Requested CQL protocol version (0 = default)
    #[serde(skip_serializing_if = "is_zero_u8")]
    pub proto_version: u8,

    /// Connect timeout, also used as the default request timeout
    #[serde(with = "crate::duration", skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,

    /// Default consistency; blank values keep the driver default
    #[serde(
        deserialize_with = "crate::consistency::deserialize_optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub consistency: Option<Consistency>,
}

fn is_zero_u8(v: &u8) -> bool {
    *v == 0
}

fn is_zero_u16(v: &u16) -> bool {
    *v == 0
}

fn is_zero_usize(v: &usize) -> bool {
    *v == 0
}

impl Configuration {
    /// Create a configuration for the given nodes with everything else unset
    ///
    /// # Example
    /// ```
    /// use scylladbh::Configuration;
    ///
    /// let config = Configuration::new(vec!["127.0.0.1"]).with_keyspace("app");
    /// assert_eq!(config.contact_points(), vec!["127.0.0.1:9042"]);
    /// ```
    pub fn new<S: Into<String>>(nodes: Vec<S>) -> Self {
        Self {
            nodes: nodes.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_keyspace(mut self, keyspace: impl Into<String>) -> Self {
        self.keyspace = keyspace.into();
        self
    }

    /// Set authentication credentials
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    pub fn with_num_connections(mut self, count: usize) -> Self {
        self.num_connections = count;
        self
    }

    pub fn with_reconnect_interval(mut self, interval: Duration) -> Self {
        self.reconnect_interval = Some(interval);
        self
    }

    pub fn with_proto_version(mut self, version: u8) -> Self {
        self.proto_version = version;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_consistency(mut self, consistency: Consistency) -> Self {
        self.consistency = Some(consistency);
        self
    }

    /// Check the preconditions for opening a session
    pub fn validate(&self) -> ScyllaResult<()> {
        if self.nodes.iter().all(|n| n.trim().is_empty()) {
            return Err(ScyllaError::NoNodes);
        }
        Ok(())
    }

    pub fn effective_port(&self) -> u16 {
        if self.port == 0 { DEFAULT_PORT } else { self.port }
    }

    pub fn effective_proto_version(&self) -> u8 {
        if self.proto_version == 0 {
            DEFAULT_PROTO_VERSION
        } else {
            self.proto_version
        }
    }

    /// Nodes as `host:port` pairs; blank entries are skipped
    pub fn contact_points(&self) -> Vec<String> {
        let port = self.effective_port();
        self.nodes
            .iter()
            .map(|n| n.trim())
            .filter(|n| !n.is_empty())
            .map(|n| with_port(n, port))
            .collect()
    }

    pub fn keyspace(&self) -> Option<&str> {
        Some(self.keyspace.as_str()).filter(|k| !k.is_empty())
    }

    /// Username and password, present only when a username is configured
    pub fn credentials(&self) -> Option<(&str, &str)> {
        if self.username.is_empty() {
            None
        } else {
            Some((self.username.as_str(), self.password.as_str()))
        }
    }

    pub fn from_toml_str(raw: &str) -> ScyllaResult<Self> {
        toml::from_str(raw).map_err(|e| ScyllaError::InvalidConfig(e.to_string()))
    }

    pub fn from_json_str(raw: &str) -> ScyllaResult<Self> {
        serde_json::from_str(raw).map_err(|e| ScyllaError::InvalidConfig(e.to_string()))
    }

    /// Load a configuration file, picking the format from its extension (`.toml` or `.json`)
    pub fn from_file(path: impl AsRef<Path>) -> ScyllaResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ScyllaError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;

        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::from_toml_str(&raw),
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::from_json_str(&raw),
            _ => Err(ScyllaError::InvalidConfig(format!(
                "unsupported configuration format: {}",
                path.display()
            ))),
        }
    }
}

fn with_port(node: &str, port: u16) -> String {
    if node.parse::<SocketAddr>().is_ok() {
        return node.to_string();
    }

    if let Ok(IpAddr::V6(ip)) = node.parse::<IpAddr>() {
        return format!("[{ip}]:{port}");
    }

    match node.rsplit_once(':') {
        Some((host, p)) if !host.contains(':') && p.parse::<u16>().is_ok() => node.to_string(),
        _ => format!("{node}:{port}"),
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("nodes", &self.nodes)
            .field("port", &self.port)
            .field("num_connections", &self.num_connections)
            .field("reconnect_interval", &self.reconnect_interval)
            .field("keyspace", &self.keyspace)
            .field("username", &self.username)
            .field("password", &if self.password.is_empty() { "" } else { "***" })
            .field("proto_version", &self.proto_version)
            .field("timeout", &self.timeout)
            .field("consistency", &self.consistency)
            .finish()
    }
}

/// Load Configuration from environment variables
///
/// Environment variables:
/// - `SCYLLA_NODES` (required) - Comma-separated list of nodes
/// - `SCYLLA_PORT` (optional) - Port for nodes without one
/// - `SCYLLA_NUM_CONNECTIONS` (optional) - Connections per host
/// - `SCYLLA_RECONNECT_INTERVAL` (optional) - e.g. "10s"
/// - `SCYLLA_KEYSPACE` (optional)
/// - `SCYLLA_USERNAME` / `SCYLLA_PASSWORD` (optional)
/// - `SCYLLA_PROTO_VERSION` (optional)
/// - `SCYLLA_TIMEOUT` (optional) - e.g. "2s"
/// - `SCYLLA_CONSISTENCY` (optional) - e.g. "localQuorum"
#[cfg(feature = "config")]
impl FromEnv for Configuration {
    fn from_env() -> Result<Self, ConfigError> {
        let nodes: Vec<String> = env_required("SCYLLA_NODES")?
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if nodes.is_empty() {
            return Err(ConfigError::ParseError {
                key: "SCYLLA_NODES".to_string(),
                details: "No valid nodes provided".to_string(),
            });
        }

        Ok(Self {
            nodes,
            port: env_parse("SCYLLA_PORT", 0)?,
            num_connections: env_parse("SCYLLA_NUM_CONNECTIONS", 0)?,
            reconnect_interval: env_duration("SCYLLA_RECONNECT_INTERVAL")?,
            keyspace: env_optional("SCYLLA_KEYSPACE").unwrap_or_default(),
            username: env_optional("SCYLLA_USERNAME").unwrap_or_default(),
            password: env_optional("SCYLLA_PASSWORD").unwrap_or_default(),
            proto_version: env_parse("SCYLLA_PROTO_VERSION", 0)?,
            timeout: env_duration("SCYLLA_TIMEOUT")?,
            consistency: env_optional("SCYLLA_CONSISTENCY").and_then(|c| Consistency::from_config(&c)),
        })
    }
}

#[cfg(feature = "config")]
fn env_duration(key: &str) -> Result<Option<Duration>, ConfigError> {
    match env_optional(key) {
        Some(raw) => crate::duration::parse(&raw).map_err(|e| ConfigError::ParseError {
            key: key.to_string(),
            details: e.to_string(),
        }),
        None => Ok(None),
    }
}
