//! Shared test utilities
//!
//! - `TestScylla`: ScyllaDB container with automatic cleanup
//! - `TestDataBuilder`: Deterministic keyspace/table names
//! - `assertions`: Custom assertion helpers
//!
//! # Usage
//!
//! ```rust,no_run
//! use test_utils::{TestDataBuilder, TestScylla};
//!
//! #[tokio::test]
//! async fn my_scylla_test() {
//!     let scylla = TestScylla::new("my-test").await;
//!     let builder = TestDataBuilder::from_test_name("my_scylla_test");
//!
//!     let keyspace = builder.keyspace("app");
//!     let node = scylla.contact_point();
//! }
//! ```

mod scylla;

pub use scylla::TestScylla;

/// Builder for test data with deterministic names
///
/// Names are valid CQL identifiers (lowercase alphanumerics and underscores).
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    /// Create a new builder with a seed (for deterministic tests)
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Create from test name (generates seed from test name hash)
    ///
    /// # Example
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("test_select_users");
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Generate a keyspace name unique to this test
    ///
    /// # Example
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::new(42);
    /// assert_eq!(builder.keyspace("app"), "test_app_42");
    /// ```
    pub fn keyspace(&self, prefix: &str) -> String {
        identifier(&format!("test_{}_{}", prefix, self.seed))
    }

    /// Generate a table name unique to this test
    pub fn table(&self, prefix: &str) -> String {
        identifier(&format!("{}_{}", prefix, self.seed))
    }
}

// CQL unquoted identifiers: [a-zA-Z0-9_], at most 48 chars for keyspaces
fn identifier(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .take(48)
        .collect()
}

/// Test assertion helpers
pub mod assertions {
    /// Assert that an optional value is Some
    pub fn assert_some<T>(value: Option<T>, context: &str) -> T {
        value.unwrap_or_else(|| panic!("{}: expected Some, got None", context))
    }

    /// Assert that a name looks like a CQL identifier
    pub fn assert_cql_identifier(name: &str, context: &str) {
        assert!(
            !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'),
            "{}: '{}' is not a valid CQL identifier",
            context,
            name
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_builder_deterministic() {
        let builder1 = TestDataBuilder::new(42);
        let builder2 = TestDataBuilder::new(42);

        assert_eq!(builder1.keyspace("app"), builder2.keyspace("app"));
        assert_eq!(builder1.table("users"), builder2.table("users"));
    }

    #[test]
    fn test_data_builder_different_names() {
        let builder1 = TestDataBuilder::from_test_name("test1");
        let builder2 = TestDataBuilder::from_test_name("test2");

        assert_ne!(builder1.keyspace("app"), builder2.keyspace("app"));
    }

    #[test]
    fn test_names_are_cql_identifiers() {
        let builder = TestDataBuilder::from_test_name("identifiers");

        assertions::assert_cql_identifier(&builder.keyspace("My-App"), "keyspace");
        assertions::assert_cql_identifier(&builder.table("user.events"), "table");
        assert!(builder.keyspace("x".repeat(60).as_str()).len() <= 48);
    }
}
