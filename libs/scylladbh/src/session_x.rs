use scylla::client::session::Session;
use scylla::deserialize::row::DeserializeRow;
use scylla::response::query_result::QueryResult;
use scylla::serialize::row::SerializeRow;
use std::ops::Deref;
use std::sync::Arc;
use tracing::trace;

use crate::connector::ScyllaSession;
use crate::error::{ScyllaError, ScyllaResult};
use crate::qb::QueryBuilder;

/// Session augmented with query-builder helpers
///
/// Derefs to the driver [`Session`], so every driver method stays available.
///
/// # Example
/// ```ignore
/// use scylladbh::{new_session_x, qb};
///
/// let session = new_session_x(&config).await?;
/// let names: Vec<(String,)> = session
///     .select(&qb::select("system_schema.keyspaces").columns(["keyspace_name"]), ())
///     .await?;
/// ```
#[derive(Clone, Debug)]
pub struct SessionX {
    session: ScyllaSession,
}

impl SessionX {
    pub fn wrap(session: ScyllaSession) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &ScyllaSession {
        &self.session
    }

    pub fn into_inner(self) -> ScyllaSession {
        self.session
    }

    /// Run raw CQL text, unpaged
    pub async fn query_raw(
        &self,
        cql: impl Into<String>,
        values: impl SerializeRow,
    ) -> ScyllaResult<QueryResult> {
        let cql = cql.into();
        trace!(cql = %cql, "Executing statement");
        Ok(self.session.query_unpaged(cql, values).await?)
    }

    /// Render a builder and run it, discarding any rows
    pub async fn exec(
        &self,
        builder: &impl QueryBuilder,
        values: impl SerializeRow,
    ) -> ScyllaResult<()> {
        let cql = render(builder)?;
        self.query_raw(cql, values).await?;
        Ok(())
    }

    /// Render a builder, run it and deserialize every row
    pub async fn select<T>(
        &self,
        builder: &impl QueryBuilder,
        values: impl SerializeRow,
    ) -> ScyllaResult<Vec<T>>
    where
        T: for<'frame, 'metadata> DeserializeRow<'frame, 'metadata>,
    {
        let cql = render(builder)?;
        let rows_result = self
            .query_raw(cql, values)
            .await?
            .into_rows_result()
            .map_err(|e| ScyllaError::Rows(e.to_string()))?;

        rows_result
            .rows::<T>()
            .map_err(|e| ScyllaError::Rows(e.to_string()))?
            .collect::<Result<Vec<T>, _>>()
            .map_err(|e| ScyllaError::Rows(e.to_string()))
    }

    /// Render a builder, run it and deserialize the first row, if any
    pub async fn get<T>(
        &self,
        builder: &impl QueryBuilder,
        values: impl SerializeRow,
    ) -> ScyllaResult<Option<T>>
    where
        T: for<'frame, 'metadata> DeserializeRow<'frame, 'metadata>,
    {
        let cql = render(builder)?;
        self.query_raw(cql, values)
            .await?
            .into_rows_result()
            .map_err(|e| ScyllaError::Rows(e.to_string()))?
            .maybe_first_row::<T>()
            .map_err(|e| ScyllaError::Rows(e.to_string()))
    }
}

/// CQL text for a builder; marker names are only traced, values bind as given
fn render(builder: &impl QueryBuilder) -> ScyllaResult<String> {
    let (cql, markers) = builder.to_cql()?;
    trace!(cql = %cql, ?markers, "Rendered query");
    Ok(cql)
}

impl Deref for SessionX {
    type Target = Session;

    fn deref(&self) -> &Self::Target {
        &self.session
    }
}

impl From<ScyllaSession> for SessionX {
    fn from(session: ScyllaSession) -> Self {
        Self::wrap(session)
    }
}

impl From<Session> for SessionX {
    fn from(session: Session) -> Self {
        Self::wrap(Arc::new(session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qb;

    #[test]
    fn test_render_returns_cql_text() {
        let cql = render(&qb::update("users").set(["name"]).where_(qb::eq("id"))).unwrap();
        assert_eq!(cql, "UPDATE users SET name = :name WHERE id = :id");
    }

    #[test]
    fn test_render_propagates_builder_errors() {
        let err = render(&qb::delete("users")).unwrap_err();
        assert!(matches!(err, ScyllaError::Query(_)));
    }
}
