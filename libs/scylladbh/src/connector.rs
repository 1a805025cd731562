use scylla::client::PoolSize;
use scylla::client::execution_profile::ExecutionProfile;
use scylla::client::session::Session;
use scylla::client::session_builder::SessionBuilder;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::config::{Configuration, DEFAULT_PROTO_VERSION};
use crate::docker::{ContainerResolver, DockerInspect, resolve_nodes};
use crate::error::{ScyllaError, ScyllaResult};
use crate::session_x::SessionX;

/// Shared driver session; cloning is cheap and shares the connection pool
pub type ScyllaSession = Arc<Session>;

/// Translate a configuration into the driver's session builder
///
/// Only fields that are set are copied; everything else keeps the driver
/// default. Callers may add further driver options before calling `build()`.
///
/// # Example
/// ```ignore
/// use scylladbh::{Configuration, session_builder};
///
/// let session = session_builder(&Configuration::new(vec!["127.0.0.1"]))
///     .compression(Some(scylla::frame::Compression::Lz4))
///     .build()
///     .await?;
/// ```
pub fn session_builder(config: &Configuration) -> SessionBuilder {
    let contact_points = config.contact_points();
    debug!(?contact_points, "Known nodes");

    let mut builder = SessionBuilder::new().known_nodes(&contact_points);

    if let Some(keyspace) = config.keyspace() {
        debug!(keyspace, "Default keyspace");
        builder = builder.use_keyspace(keyspace, false);
    }

    if let Some((username, password)) = config.credentials() {
        debug!(username, "Password authentication");
        builder = builder.user(username, password);
    }

    if let Some(per_host) = NonZeroUsize::new(config.num_connections) {
        debug!(per_host = per_host.get(), "Connection pool size");
        builder = builder.pool_size(PoolSize::PerHost(per_host));
    }

    if let Some(interval) = config.reconnect_interval {
        debug!(?interval, "Metadata refresh interval");
        builder = builder.cluster_metadata_refresh_interval(interval);
    }

    if let Some(timeout) = config.timeout {
        debug!(?timeout, "Connection timeout");
        builder = builder.connection_timeout(timeout);
    }

    let proto_version = config.effective_proto_version();
    if proto_version != DEFAULT_PROTO_VERSION {
        warn!(
            requested = proto_version,
            supported = DEFAULT_PROTO_VERSION,
            "Requested CQL protocol version is not supported by the driver, ignoring"
        );
    }

    if config.timeout.is_some() || config.consistency.is_some() {
        builder = builder.default_execution_profile_handle(execution_profile(config).into_handle());
    }

    builder
}

/// Default execution profile carrying the configured consistency and request timeout
pub fn execution_profile(config: &Configuration) -> ExecutionProfile {
    let mut profile = ExecutionProfile::builder();

    if let Some(consistency) = config.consistency {
        debug!(%consistency, "Default consistency");
        profile = profile.consistency(consistency.into());
    }

    if let Some(timeout) = config.timeout {
        profile = profile.request_timeout(Some(timeout));
    }

    profile.build()
}

#[instrument(skip_all, fields(nodes = ?config.nodes))]
async fn open(config: &Configuration) -> ScyllaResult<ScyllaSession> {
    info!("Attempting to connect to ScyllaDB");

    let session: Session = session_builder(config).build().await?;

    info!("Successfully connected to ScyllaDB");
    Ok(Arc::new(session))
}

/// Create a session from a configuration
///
/// # Example
/// ```ignore
/// use scylladbh::{Configuration, new_session};
///
/// let config = Configuration::new(vec!["127.0.0.1"]).with_keyspace("app");
/// let session = new_session(&config).await?;
/// session.query_unpaged("SELECT * FROM users", ()).await?;
/// ```
pub async fn new_session(config: &Configuration) -> ScyllaResult<ScyllaSession> {
    config.validate()?;
    open(config).await
}

/// Create a query-builder session from a configuration
pub async fn new_session_x(config: &Configuration) -> ScyllaResult<SessionX> {
    new_session(config).await.map(SessionX::wrap)
}

/// Create a session where `nodes` are container names
///
/// Each name is resolved with `docker inspect`, reading `inspect_ip_path`
/// (defaults to [`crate::docker::DEFAULT_INSPECT_IP_PATH`]). The caller's
/// configuration is left untouched.
///
/// # Example
/// ```ignore
/// use scylladbh::{Configuration, new_docker_session};
///
/// let config = Configuration::new(vec!["test-scylla"]);
/// let session = new_docker_session(&config, None).await?;
/// ```
pub async fn new_docker_session(
    config: &Configuration,
    inspect_ip_path: Option<&str>,
) -> ScyllaResult<ScyllaSession> {
    new_session_with_resolver(config, &DockerInspect::new(inspect_ip_path)).await
}

/// Create a query-builder session where `nodes` are container names
pub async fn new_docker_session_x(
    config: &Configuration,
    inspect_ip_path: Option<&str>,
) -> ScyllaResult<SessionX> {
    new_docker_session(config, inspect_ip_path)
        .await
        .map(SessionX::wrap)
}

/// Create a session after resolving every node through `resolver`
pub async fn new_session_with_resolver(
    config: &Configuration,
    resolver: &dyn ContainerResolver,
) -> ScyllaResult<ScyllaSession> {
    let resolved = resolve_configuration(config, resolver).await?;
    open(&resolved).await
}

/// Copy of `config` with nodes replaced by their resolved addresses
pub async fn resolve_configuration(
    config: &Configuration,
    resolver: &dyn ContainerResolver,
) -> ScyllaResult<Configuration> {
    config.validate()?;

    let ips = resolve_nodes(resolver, &config.nodes).await?;
    info!(containers = ?config.nodes, ?ips, "Resolved container nodes");

    Ok(Configuration {
        nodes: ips,
        ..config.clone()
    })
}

/// Create a keyspace if it doesn't exist
///
/// # Example
/// ```ignore
/// use scylladbh::{create_keyspace_if_not_exists, new_session};
///
/// let session = new_session(&config).await?;
/// create_keyspace_if_not_exists(&session, "mykeyspace", 1).await?;
/// ```
pub async fn create_keyspace_if_not_exists(
    session: &Session,
    keyspace: &str,
    replication_factor: u32,
) -> ScyllaResult<()> {
    if keyspace.is_empty() || !keyspace.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ScyllaError::InvalidConfig(format!(
            "invalid keyspace name '{}'",
            keyspace
        )));
    }

    let query = format!(
        "CREATE KEYSPACE IF NOT EXISTS {} WITH replication = {{'class': 'SimpleStrategy', 'replication_factor': {}}}",
        keyspace, replication_factor
    );

    session.query_unpaged(query, ()).await?;

    info!("Keyspace '{}' ready", keyspace);
    Ok(())
}

/// Switch the session's default keyspace
pub async fn use_keyspace(session: &Session, keyspace: &str) -> ScyllaResult<()> {
    session.use_keyspace(keyspace, false).await?;

    info!("Using keyspace '{}'", keyspace);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Consistency;
    use crate::docker::MockContainerResolver;
    use scylla::statement::Consistency as DriverConsistency;
    use std::time::Duration;

    #[test]
    fn test_execution_profile_from_config() {
        let config = Configuration::new(vec!["node1"])
            .with_consistency(Consistency::All)
            .with_timeout(Duration::from_secs(3));

        let profile = execution_profile(&config);
        assert_eq!(profile.get_consistency(), DriverConsistency::All);
        assert_eq!(profile.get_request_timeout(), Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_execution_profile_keeps_driver_defaults() {
        let default = ExecutionProfile::builder().build();
        let profile = execution_profile(&Configuration::new(vec!["node1"]));

        assert_eq!(profile.get_consistency(), default.get_consistency());
        assert_eq!(profile.get_request_timeout(), default.get_request_timeout());
    }

    #[test]
    fn test_blank_consistency_keeps_driver_profile() {
        let config = Configuration::from_toml_str("nodes = [\"node1\"]\nconsistency = \"\"").unwrap();
        let default = ExecutionProfile::builder().build();

        let profile = execution_profile(&config);
        assert_eq!(profile.get_consistency(), default.get_consistency());
    }

    #[test]
    fn test_session_builder_translates_config() {
        let config = Configuration::new(vec!["node1", "node2:19043"])
            .with_port(19042)
            .with_keyspace("ks")
            .with_credentials("cassandra", "c4554ndr4")
            .with_num_connections(3)
            .with_reconnect_interval(Duration::from_secs(7))
            .with_timeout(Duration::from_secs(2));

        let builder = session_builder(&config);
        let session_config = &builder.config;

        let nodes = format!("{:?}", session_config.known_nodes);
        assert_eq!(session_config.known_nodes.len(), 2);
        assert!(nodes.contains("node1:19042"), "{nodes}");
        assert!(nodes.contains("node2:19043"), "{nodes}");

        assert_eq!(session_config.used_keyspace.as_deref(), Some("ks"));
        assert!(session_config.authenticator.is_some());
        assert!(matches!(
            session_config.connection_pool_size,
            PoolSize::PerHost(n) if n.get() == 3
        ));
        assert_eq!(session_config.connect_timeout, Duration::from_secs(2));
        assert_eq!(
            session_config.cluster_metadata_refresh_interval,
            Duration::from_secs(7)
        );
    }

    #[test]
    fn test_session_builder_nodes_only_keeps_driver_defaults() {
        let default = SessionBuilder::new();
        let builder = session_builder(&Configuration::new(vec!["node1"]));
        let session_config = &builder.config;

        assert_eq!(session_config.known_nodes.len(), 1);
        assert!(format!("{:?}", session_config.known_nodes).contains("node1:9042"));

        assert!(session_config.used_keyspace.is_none());
        assert!(session_config.authenticator.is_none());
        assert_eq!(
            format!("{:?}", session_config.connection_pool_size),
            format!("{:?}", default.config.connection_pool_size)
        );
        assert_eq!(session_config.connect_timeout, default.config.connect_timeout);
        assert_eq!(
            session_config.cluster_metadata_refresh_interval,
            default.config.cluster_metadata_refresh_interval
        );
    }

    #[test]
    fn test_session_builder_password_without_username() {
        let config = Configuration {
            nodes: vec!["node1".to_string()],
            password: "secret".to_string(),
            ..Configuration::default()
        };

        assert!(session_builder(&config).config.authenticator.is_none());
    }

    #[tokio::test]
    async fn test_new_session_requires_nodes() {
        let err = new_session(&Configuration::default()).await.unwrap_err();
        assert!(matches!(err, ScyllaError::NoNodes));

        let err = new_session_x(&Configuration::default()).await.unwrap_err();
        assert!(matches!(err, ScyllaError::NoNodes));
    }

    #[tokio::test]
    async fn test_docker_session_requires_nodes() {
        let err = new_docker_session(&Configuration::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ScyllaError::NoNodes));

        let err = new_docker_session_x(&Configuration::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ScyllaError::NoNodes));
    }

    #[tokio::test]
    async fn test_resolve_configuration_replaces_nodes() {
        let mut resolver = MockContainerResolver::new();
        resolver
            .expect_resolve_ip()
            .returning(|name| Ok(format!("172.17.0.{}", name.len())));

        let config = Configuration::new(vec!["abc", "abcde"])
            .with_port(19042)
            .with_keyspace("ks");
        let resolved = resolve_configuration(&config, &resolver).await.unwrap();

        assert_eq!(resolved.nodes, vec!["172.17.0.3", "172.17.0.5"]);
        assert_eq!(resolved.port, 19042);
        assert_eq!(resolved.keyspace, "ks");
        assert_eq!(config.nodes, vec!["abc", "abcde"]);
    }

    #[tokio::test]
    async fn test_resolver_not_called_without_nodes() {
        let mut resolver = MockContainerResolver::new();
        resolver.expect_resolve_ip().never();

        let err = new_session_with_resolver(&Configuration::default(), &resolver)
            .await
            .unwrap_err();
        assert!(matches!(err, ScyllaError::NoNodes));
    }

    #[tokio::test]
    async fn test_resolution_failure_is_returned() {
        let mut resolver = MockContainerResolver::new();
        resolver
            .expect_resolve_ip()
            .returning(|name| Err(ScyllaError::container(name, "No such object")));

        let err = new_session_with_resolver(&Configuration::new(vec!["ghost"]), &resolver)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }

    #[tokio::test]
    async fn test_unreachable_node_is_session_error() {
        // Port 1 on localhost refuses connections
        let config = Configuration::new(vec!["127.0.0.1:1"]).with_timeout(Duration::from_millis(500));
        let err = new_session(&config).await.unwrap_err();

        assert!(matches!(err, ScyllaError::Session(_)));
    }

    #[tokio::test]
    #[ignore] // Requires actual ScyllaDB
    async fn test_new_session() {
        let nodes = std::env::var("SCYLLA_NODES").unwrap_or_else(|_| "127.0.0.1".to_string());
        let config = Configuration::new(nodes.split(',').collect());

        let session = new_session(&config).await.unwrap();
        session
            .query_unpaged("SELECT release_version FROM system.local", ())
            .await
            .unwrap();
    }
}
