//! Session construction helpers for ScyllaDB and Apache Cassandra
//!
//! Turns a declarative [`Configuration`] into a ready-to-use driver session.
//! All protocol, pooling and topology work is done by the `scylla` driver;
//! this crate only validates the configuration, copies the fields that are
//! set onto the driver's session builder and, for containerized
//! environments, resolves container names to their IP addresses first.
//!
//! # Features
//!
//! - `config` (default) - `core_config::FromEnv` support for [`Configuration`]
//!
//! # Examples
//!
//! ## Base session
//!
//! ```ignore
//! use scylladbh::{Configuration, Consistency, new_session};
//!
//! let config = Configuration::new(vec!["10.0.0.1", "10.0.0.2"])
//!     .with_keyspace("app")
//!     .with_credentials("cassandra", "cassandra")
//!     .with_consistency(Consistency::LocalQuorum);
//! let session = new_session(&config).await?;
//! ```
//!
//! ## Query-builder session
//!
//! ```ignore
//! use scylladbh::{new_session_x, qb};
//!
//! let session = new_session_x(&config).await?;
//! session
//!     .exec(&qb::insert("users").columns(["id", "name"]), (id, "alice"))
//!     .await?;
//! ```
//!
//! ## Containers
//!
//! ```ignore
//! use scylladbh::{Configuration, new_docker_session};
//!
//! // nodes name containers; their bridge-network IPs are used to connect
//! let session = new_docker_session(&Configuration::new(vec!["test-scylla"]), None).await?;
//! ```

pub mod config;
pub mod connector;
pub mod consistency;
pub mod docker;
mod duration;
pub mod error;
pub mod health;
pub mod qb;
pub mod session_x;

pub use config::Configuration;
pub use connector::{
    ScyllaSession, create_keyspace_if_not_exists, execution_profile, new_docker_session,
    new_docker_session_x, new_session, new_session_with_resolver, new_session_x,
    resolve_configuration, session_builder, use_keyspace,
};
pub use consistency::Consistency;
pub use docker::{ContainerResolver, DockerInspect};
pub use error::{ScyllaError, ScyllaResult};
pub use health::{ClusterInfo, HealthStatus, check_health, check_health_detailed, get_cluster_info};
pub use session_x::SessionX;

// Re-export scylla types for convenience
pub use scylla::client::session::Session;
pub use scylla::client::session_builder::SessionBuilder;
