use async_trait::async_trait;

use crate::error::Result;
use crate::types::{RawQueryResult, SqlValue};

/// Trait for database driver implementations.
/// Drivers are responsible for:
/// - Connecting to the database
/// - Converting SqlValue parameters to native types
/// - Reporting a best-effort declared type for every result column. Boolean
///   valued expressions (comparisons, `NOT`, boolean literals) carry a
///   `Boolean` hint even when the backend returns them as narrow integers
/// - Returning each cell in its most precision-preserving form (exact text
///   for decimals and wide integers rather than a lossy native conversion)
#[async_trait]
pub trait DatabaseDriver: Send + Sync {
    /// Execute a SQL query with the given parameters.
    /// Parameters use PostgreSQL-style placeholders ($1, $2, etc.)
    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<RawQueryResult>;
}
