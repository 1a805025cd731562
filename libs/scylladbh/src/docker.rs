//! Container IP resolution
//!
//! In containerized test environments the configuration names containers
//! rather than hosts. Before connecting, each name is replaced with the IP
//! address the container runtime assigned to it.

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, instrument};

use crate::error::{ScyllaError, ScyllaResult};

/// Go-template path `docker inspect` evaluates when no other path is given
pub const DEFAULT_INSPECT_IP_PATH: &str = ".NetworkSettings.Networks.bridge.IPAddress";

/// Resolves a container name to the IP address it is reachable on
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContainerResolver: Send + Sync {
    async fn resolve_ip(&self, container: &str) -> ScyllaResult<String>;
}

/// Resolver backed by the `docker inspect` command
#[derive(Clone, Debug)]
pub struct DockerInspect {
    binary: String,
    ip_path: String,
}

impl DockerInspect {
    /// Create a resolver reading `ip_path` (defaults to the bridge network address)
    pub fn new(ip_path: Option<&str>) -> Self {
        let ip_path = ip_path
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(DEFAULT_INSPECT_IP_PATH);

        Self {
            binary: "docker".to_string(),
            ip_path: ip_path.to_string(),
        }
    }

    /// Use a different CLI binary (e.g. `podman`)
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn ip_path(&self) -> &str {
        &self.ip_path
    }

    fn format_arg(&self) -> String {
        format!("{{{{ {} }}}}", self.ip_path)
    }
}

impl Default for DockerInspect {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl ContainerResolver for DockerInspect {
    #[instrument(skip(self), fields(binary = %self.binary, path = %self.ip_path))]
    async fn resolve_ip(&self, container: &str) -> ScyllaResult<String> {
        let output = Command::new(&self.binary)
            .arg("inspect")
            .arg("--format")
            .arg(self.format_arg())
            .arg(container)
            .output()
            .await
            .map_err(|e| ScyllaError::container(container, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ScyllaError::container(
                container,
                format!("{} inspect exited with {}: {}", self.binary, output.status, stderr.trim()),
            ));
        }

        let ip = parse_inspect_output(&String::from_utf8_lossy(&output.stdout))
            .ok_or_else(|| ScyllaError::container(container, "no IP address at the inspected path"))?;

        debug!(container, ip = %ip, "Resolved container address");
        Ok(ip)
    }
}

/// Extract the address from `docker inspect --format` output
///
/// Only the first line counts; surrounding whitespace and quotes are dropped.
fn parse_inspect_output(stdout: &str) -> Option<String> {
    let first = stdout.lines().next()?;
    let ip = first.trim().trim_matches(|c| c == '\'' || c == '"').trim();

    if ip.is_empty() || ip == "<no value>" {
        None
    } else {
        Some(ip.to_string())
    }
}

/// Resolve every node in order; the first failure aborts
pub async fn resolve_nodes(
    resolver: &dyn ContainerResolver,
    nodes: &[String],
) -> ScyllaResult<Vec<String>> {
    let mut ips = Vec::with_capacity(nodes.len());
    for node in nodes {
        let node = node.trim();
        if node.is_empty() {
            continue;
        }
        ips.push(resolver.resolve_ip(node).await?);
    }
    Ok(ips)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    #[test]
    fn test_parse_inspect_output() {
        assert_eq!(
            parse_inspect_output("'172.17.0.2'\n"),
            Some("172.17.0.2".to_string())
        );
        assert_eq!(
            parse_inspect_output("  10.0.0.5  \nignored"),
            Some("10.0.0.5".to_string())
        );
        assert_eq!(parse_inspect_output("''\n"), None);
        assert_eq!(parse_inspect_output("<no value>\n"), None);
        assert_eq!(parse_inspect_output(""), None);
    }

    #[test]
    fn test_docker_inspect_default_path() {
        assert_eq!(DockerInspect::default().ip_path(), DEFAULT_INSPECT_IP_PATH);
        assert_eq!(DockerInspect::new(Some("  ")).ip_path(), DEFAULT_INSPECT_IP_PATH);
        assert_eq!(
            DockerInspect::new(Some(".NetworkSettings.IPAddress")).ip_path(),
            ".NetworkSettings.IPAddress"
        );
    }

    #[test]
    fn test_docker_inspect_format_arg() {
        let inspect = DockerInspect::new(Some(".NetworkSettings.IPAddress"));
        assert_eq!(inspect.format_arg(), "{{ .NetworkSettings.IPAddress }}");
    }

    #[tokio::test]
    async fn test_resolve_nodes_in_order() {
        let mut resolver = MockContainerResolver::new();
        resolver
            .expect_resolve_ip()
            .with(eq("scylla-1"))
            .times(1)
            .returning(|_| Ok("172.17.0.2".to_string()));
        resolver
            .expect_resolve_ip()
            .with(eq("scylla-2"))
            .times(1)
            .returning(|_| Ok("172.17.0.3".to_string()));

        let nodes = vec!["scylla-1".to_string(), " ".to_string(), "scylla-2".to_string()];
        let ips = resolve_nodes(&resolver, &nodes).await.unwrap();

        assert_eq!(ips, vec!["172.17.0.2", "172.17.0.3"]);
    }

    #[tokio::test]
    async fn test_resolve_nodes_stops_on_first_failure() {
        let mut resolver = MockContainerResolver::new();
        resolver
            .expect_resolve_ip()
            .with(eq("missing"))
            .times(1)
            .returning(|c| Err(ScyllaError::container(c, "No such object")));

        let nodes = vec!["missing".to_string(), "never-asked".to_string()];
        let err = resolve_nodes(&resolver, &nodes).await.unwrap_err();

        assert!(matches!(
            err,
            ScyllaError::ContainerResolution { ref container, .. } if container == "missing"
        ));
    }

    #[tokio::test]
    async fn test_missing_binary_is_resolution_error() {
        let inspect = DockerInspect::default().with_binary("definitely-not-a-container-cli");
        let err = inspect.resolve_ip("scylla").await.unwrap_err();

        assert!(matches!(err, ScyllaError::ContainerResolution { .. }));
    }
}
