//! # Store Errors
//!
//! Every failure the entity store can report, from a closed actor channel to a
//! constraint violation detected inside a commit. Services classify these; they never
//! surface a `StoreError` to a caller without wrapping it.

use crate::store::record::{RowId, Table};
use std::time::Duration;

/// Errors that can occur within the entity store.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("Store closed")]
    Closed,
    #[error("Store dropped response channel")]
    Dropped,
    #[error("Store request timed out after {0:?}")]
    Timeout(Duration),
    #[error("Foreign key violation: {table}.{column} = {value} has no target row")]
    ForeignKeyViolation {
        table: Table,
        column: &'static str,
        value: RowId,
    },
    #[error("Restrict violation: {table} row {id} is referenced by {count} row(s) in {referenced_by}")]
    RestrictViolation {
        table: Table,
        id: RowId,
        referenced_by: Table,
        count: usize,
    },
    #[error("Row not found: {table} {id}")]
    RowNotFound { table: Table, id: RowId },
    #[error("Unexpected row from {found} where {expected} was expected")]
    Corrupt { expected: Table, found: Table },
    #[error("Commit returned no {0} row")]
    EmptyCommit(Table),
    #[error("Commit abandoned: session {session} stopped waiting for it")]
    Abandoned { session: u64 },
    #[error("Store backend error: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}
