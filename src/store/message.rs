//! # Store Messages
//!
//! The message types exchanged between a [`Session`](crate::store::Session) and the
//! [`StoreActor`](crate::store::StoreActor).

use crate::store::error::StoreError;
use crate::store::record::{Draft, Row, RowId, Table};
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by the store.
pub type Response<T> = oneshot::Sender<Result<T, StoreError>>;

/// One buffered write of a transaction.
///
/// - **Insert**: the store assigns the id and both timestamps.
/// - **Update**: replaces the whole row; the store keeps `created_at` and advances `updated_at`.
/// - **Delete**: removes the row if present. Deleting an absent row is not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    Insert(Draft),
    Update(Row),
    Delete { table: Table, id: RowId },
}

/// Internal message type sent to the store actor.
///
/// Reads (`Get`, `List`) see the committed state only. `Commit` carries every write of
/// one transaction; the actor applies them all or none.
#[derive(Debug)]
pub enum StoreRequest {
    Get {
        table: Table,
        id: RowId,
        respond_to: Response<Option<Row>>,
    },
    List {
        table: Table,
        respond_to: Response<Vec<Row>>,
    },
    Commit {
        session: u64,
        writes: Vec<Write>,
        respond_to: Response<Vec<Row>>,
    },
}
