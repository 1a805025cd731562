use scylla::client::session::Session;
use scylla::response::query_result::QueryResult;
use std::time::Instant;

use crate::error::ScyllaResult;

const LOCAL_VERSION_QUERY: &str = "SELECT release_version FROM system.local";

/// Health check status for a ScyllaDB/Cassandra session
#[derive(Debug, Clone)]
pub struct HealthStatus {
    pub healthy: bool,
    /// Error details when unhealthy
    pub message: Option<String>,
    pub response_time_ms: u64,
    /// Release version reported by the coordinator node
    pub version: Option<String>,
}

/// Check health with a simple query against `system.local`
pub async fn check_health(session: &Session) -> bool {
    session.query_unpaged(LOCAL_VERSION_QUERY, ()).await.is_ok()
}

/// Check health with timing, version and error details
///
/// # Example
/// ```ignore
/// use scylladbh::{new_session, check_health_detailed};
///
/// let session = new_session(&config).await?;
/// let status = check_health_detailed(&session).await;
/// if !status.healthy {
///     eprintln!("ScyllaDB unhealthy: {:?}", status.message);
/// }
/// ```
pub async fn check_health_detailed(session: &Session) -> HealthStatus {
    let start = Instant::now();
    let result = session.query_unpaged(LOCAL_VERSION_QUERY, ()).await;
    let response_time_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(result) => HealthStatus {
            healthy: true,
            message: None,
            response_time_ms,
            version: extract_version(result),
        },
        Err(e) => HealthStatus {
            healthy: false,
            message: Some(e.to_string()),
            response_time_ms,
            version: None,
        },
    }
}

fn extract_version(result: QueryResult) -> Option<String> {
    let rows_result = result.into_rows_result().ok()?;
    let (version,) = rows_result.maybe_first_row::<(String,)>().ok()??;
    Some(version)
}

/// Cluster information reported by the coordinator node
#[derive(Debug, Clone, Default)]
pub struct ClusterInfo {
    pub cluster_name: Option<String>,
    pub datacenter: Option<String>,
    pub rack: Option<String>,
    pub release_version: Option<String>,
}

pub async fn get_cluster_info(session: &Session) -> ScyllaResult<ClusterInfo> {
    let result = session
        .query_unpaged(
            "SELECT cluster_name, data_center, rack, release_version FROM system.local",
            (),
        )
        .await?;

    let mut info = ClusterInfo::default();

    if let Ok(rows_result) = result.into_rows_result()
        && let Ok(Some((cluster_name, datacenter, rack, release_version))) = rows_result
            .maybe_first_row::<(
                Option<String>,
                Option<String>,
                Option<String>,
                Option<String>,
            )>()
    {
        info.cluster_name = cluster_name;
        info.datacenter = datacenter;
        info.rack = rack;
        info.release_version = release_version;
    }

    Ok(info)
}
