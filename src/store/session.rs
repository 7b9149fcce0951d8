//! # Sessions & Transactions
//!
//! A [`Session`] is the unit of store access for one service operation. It holds a
//! permit from the session pool and is released on drop, whatever the outcome.
//!
//! Writes go through a [`Transaction`] borrowed from the session. The transaction only
//! buffers; nothing reaches the tables until [`Transaction::commit`] sends the whole batch
//! to the store actor, which applies all of it or none of it in one database transaction.

use crate::store::client::StoreClient;
use crate::store::error::StoreError;
use crate::store::message::{StoreRequest, Write};
use crate::store::record::{Record, Row, RowId};
use std::fmt;
use tokio::sync::OwnedSemaphorePermit;
use tracing::{debug, warn};

pub struct Session {
    client: StoreClient,
    id: u64,
    _permit: OwnedSemaphorePermit,
}

impl Session {
    pub(crate) fn new(client: StoreClient, id: u64, permit: OwnedSemaphorePermit) -> Self {
        Self {
            client,
            id,
            _permit: permit,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Reads one committed row.
    pub async fn get<T: Record>(&self, id: RowId) -> Result<Option<T>, StoreError> {
        let table = T::TABLE;
        let row = self
            .client
            .call(|respond_to| StoreRequest::Get {
                table,
                id,
                respond_to,
            })
            .await?;
        row.map(decode::<T>).transpose()
    }

    /// Reads every committed row of `T`'s table in ascending id order.
    pub async fn list<T: Record>(&self) -> Result<Vec<T>, StoreError> {
        let table = T::TABLE;
        let rows = self
            .client
            .call(|respond_to| StoreRequest::List { table, respond_to })
            .await?;
        rows.into_iter().map(decode::<T>).collect()
    }

    /// Starts a transaction. Only one can be open per session at a time.
    pub fn begin(&mut self) -> Transaction<'_> {
        Transaction {
            session: self,
            writes: Vec::new(),
            open: true,
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").field("id", &self.id).finish()
    }
}

fn decode<T: Record>(row: Row) -> Result<T, StoreError> {
    let found = row.table();
    T::from_row(row).ok_or(StoreError::Corrupt {
        expected: T::TABLE,
        found,
    })
}

/// A buffered batch of writes.
///
/// Dropping a transaction without committing it discards the writes.
pub struct Transaction<'s> {
    session: &'s mut Session,
    writes: Vec<Write>,
    open: bool,
}

impl Transaction<'_> {
    pub fn insert<T: Record>(&mut self, draft: T::Draft) -> &mut Self {
        self.writes.push(Write::Insert(T::wrap_draft(draft)));
        self
    }

    pub fn update<T: Record>(&mut self, record: T) -> &mut Self {
        self.writes.push(Write::Update(record.into_row()));
        self
    }

    pub fn delete<T: Record>(&mut self, id: RowId) -> &mut Self {
        self.writes.push(Write::Delete {
            table: T::TABLE,
            id,
        });
        self
    }

    /// Number of buffered writes.
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Sends the batch to the store. Returns the inserted and updated rows in write order.
    pub async fn commit(mut self) -> Result<Vec<Row>, StoreError> {
        self.open = false;
        let writes = std::mem::take(&mut self.writes);
        let session = self.session.id;
        debug!(session, writes = writes.len(), "Committing");
        self.session
            .client
            .call(|respond_to| StoreRequest::Commit {
                session,
                writes,
                respond_to,
            })
            .await
    }

    /// Commits and returns the first written row of `T`'s table.
    pub async fn commit_returning<T: Record>(self) -> Result<T, StoreError> {
        let rows = self.commit().await?;
        let row = rows
            .into_iter()
            .find(|row| row.table() == T::TABLE)
            .ok_or(StoreError::EmptyCommit(T::TABLE))?;
        decode::<T>(row)
    }

    /// Discards every buffered write.
    pub fn rollback(mut self) {
        self.open = false;
        debug!(session = self.session.id, writes = self.writes.len(), "Rolled back");
        self.writes.clear();
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if self.open && !self.writes.is_empty() {
            warn!(
                session = self.session.id,
                writes = self.writes.len(),
                "Transaction dropped without commit, rolled back"
            );
        }
    }
}
