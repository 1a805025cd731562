//! ScyllaDB test infrastructure
//!
//! Provides a `TestScylla` helper that runs a single-node ScyllaDB container.

use testcontainers::core::{IntoContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage, ImageExt};

const IMAGE: &str = "scylladb/scylla";
const TAG: &str = "6.2";
const CQL_PORT: u16 = 9042;

/// Test ScyllaDB wrapper that ensures proper cleanup
///
/// The container is automatically stopped and removed when this struct is dropped.
///
/// # Example
///
/// ```no_run
/// use test_utils::TestScylla;
///
/// # async fn example() {
/// let scylla = TestScylla::new("scylladbh-example").await;
///
/// // Reach the node through the published port...
/// let node = scylla.contact_point();
/// // ...or by container name, resolved with `docker inspect`
/// let name = scylla.container_name();
/// # }
/// ```
pub struct TestScylla {
    container: ContainerAsync<GenericImage>,
    container_name: String,
    pub host_port: u16,
}

impl TestScylla {
    /// Start a developer-mode ScyllaDB node in a container called `name`
    ///
    /// A process id suffix keeps names unique across concurrent test binaries.
    pub async fn new(name: &str) -> Self {
        let container_name = format!("{}-{}", name, std::process::id());

        let image = GenericImage::new(IMAGE, TAG)
            .with_exposed_port(CQL_PORT.tcp())
            .with_wait_for(WaitFor::message_on_either_std("initialization completed"))
            .with_container_name(&container_name)
            .with_cmd([
                "--smp",
                "1",
                "--memory",
                "512M",
                "--overprovisioned",
                "1",
                "--developer-mode",
                "1",
            ]);

        let container = image
            .start()
            .await
            .expect("Failed to start ScyllaDB container");

        let host_port = container
            .get_host_port_ipv4(CQL_PORT)
            .await
            .expect("Failed to get ScyllaDB port");

        tracing::info!(
            port = host_port,
            container = %container_name,
            "Test ScyllaDB ready ({}:{})",
            IMAGE,
            TAG
        );

        Self {
            container,
            container_name,
            host_port,
        }
    }

    /// `host:port` reachable from the test process
    pub fn contact_point(&self) -> String {
        format!("127.0.0.1:{}", self.host_port)
    }

    /// Container name, for tests that exercise container IP resolution
    pub fn container_name(&self) -> &str {
        &self.container_name
    }
}

// Container is automatically cleaned up when TestScylla is dropped
impl Drop for TestScylla {
    fn drop(&mut self) {
        tracing::debug!(
            container = %self.container_name,
            id = self.container.id(),
            "Cleaning up test ScyllaDB container"
        );
    }
}
