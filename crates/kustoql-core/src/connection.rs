//! Connection trait

use crate::{QueryResult, Result, SchemaIntrospection, Value};
use async_trait::async_trait;

/// A database connection
///
/// The surface is intentionally read-only: the target endpoint accepts
/// SELECT-shaped statements in autocommit mode and exposes no DML or
/// transaction control.
#[async_trait]
pub trait Connection: Send + Sync + std::fmt::Debug {
    /// Get the driver name (e.g., "kusto")
    fn driver_name(&self) -> &str;

    /// Get the dialect identifier for this connection
    fn dialect_id(&self) -> Option<&'static str> {
        None
    }

    /// Execute a query that returns rows
    async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult>;

    /// The effective isolation level reported for this connection
    ///
    /// The Kusto SQL endpoint does not report one; drivers return a fixed
    /// value instead of querying the server.
    fn isolation_level(&self) -> &'static str {
        "READ COMMITTED"
    }

    /// Close the connection
    async fn close(&self) -> Result<()>;

    /// Check if the connection is closed
    fn is_closed(&self) -> bool;

    /// Get schema introspection interface if supported
    fn as_schema_introspection(&self) -> Option<&dyn SchemaIntrospection> {
        None
    }
}
