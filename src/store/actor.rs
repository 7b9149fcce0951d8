//! # Store Actor
//!
//! The "server" half of the entity store. It owns the [`Database`] and the receiving end
//! of the request channel and processes one request at a time. A commit is applied
//! completely before the next request is looked at, which is what gives every caller
//! read-after-write consistency.
//!
//! A commit whose caller has already given up (timed out or dropped) is not applied.

use crate::config::StoreConfig;
use crate::store::client::StoreClient;
use crate::store::database::Database;
use crate::store::error::StoreError;
use crate::store::message::{StoreRequest, Write};
use crate::store::record::Table;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub struct StoreActor {
    receiver: mpsc::Receiver<StoreRequest>,
    db: Database,
}

impl StoreActor {
    /// Opens the database and returns the actor together with its first client handle.
    pub async fn connect(config: &StoreConfig) -> Result<(Self, StoreClient), StoreError> {
        let db = Database::connect(config).await?;
        let (sender, receiver) = mpsc::channel(config.channel_capacity.max(1));
        let actor = Self { receiver, db };
        let client = StoreClient::new(sender, config);
        Ok((actor, client))
    }

    /// Runs the store's event loop until every client handle has been dropped.
    pub async fn run(mut self) {
        info!(incident_delete = %self.db.incident_delete(), "Store started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                StoreRequest::Get {
                    table,
                    id,
                    respond_to,
                } => {
                    let row = self.db.get(table, id).await;
                    debug!(%table, id, found = matches!(row, Ok(Some(_))), "Get");
                    let _ = respond_to.send(row);
                }
                StoreRequest::List { table, respond_to } => {
                    let rows = self.db.list(table).await;
                    debug!(%table, size = rows.as_ref().map_or(0, Vec::len), "List");
                    let _ = respond_to.send(rows);
                }
                StoreRequest::Commit {
                    session,
                    writes,
                    respond_to,
                } => {
                    if respond_to.is_closed() {
                        warn!(session, writes = writes.len(), "Caller gone, commit skipped");
                        continue;
                    }
                    debug!(session, writes = writes.len(), "Commit");
                    let summary: Vec<(&'static str, Table)> =
                        writes.iter().map(describe).collect();
                    let result = self
                        .db
                        .commit(session, writes, || respond_to.is_closed())
                        .await;
                    match result {
                        Ok(rows) => {
                            for (op, table) in summary {
                                let size = self.db.len(table).await.unwrap_or(-1);
                                info!(session, %table, op, size, "Committed");
                            }
                            let _ = respond_to.send(Ok(rows));
                        }
                        Err(e) => {
                            warn!(session, error = %e, "Commit rolled back");
                            let _ = respond_to.send(Err(e));
                        }
                    }
                }
            }
        }

        let mut sizes = Vec::with_capacity(3);
        for table in [Table::Incidents, Table::Resources, Table::Communications] {
            sizes.push(self.db.len(table).await.unwrap_or(-1));
        }
        info!(
            incidents = sizes[0],
            resources = sizes[1],
            communications = sizes[2],
            "Shutdown"
        );
        self.db.close().await;
    }
}

fn describe(write: &Write) -> (&'static str, Table) {
    match write {
        Write::Insert(draft) => ("insert", draft.table()),
        Write::Update(row) => ("update", row.table()),
        Write::Delete { table, .. } => ("delete", *table),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Incident, IncidentStatus, NewIncident};
    use std::time::Duration;

    fn draft() -> NewIncident {
        NewIncident {
            title: "Flood".into(),
            description: "River overflow reported".into(),
            location: None,
            status: IncidentStatus::Open,
        }
    }

    /// A commit queued while the actor is busy, whose caller times out, must not land.
    #[tokio::test]
    async fn test_timed_out_commit_is_not_applied() {
        let config = StoreConfig {
            request_timeout_ms: 100,
            ..StoreConfig::in_memory()
        };
        let (actor, client) = StoreActor::connect(&config).await.unwrap();

        let mut session = client.session().await.unwrap();
        let mut tx = session.begin();
        tx.insert::<Incident>(draft());
        let err = tx.commit().await.unwrap_err();
        assert_eq!(err, StoreError::Timeout(Duration::from_millis(100)));

        tokio::spawn(actor.run());

        assert!(session.list::<Incident>().await.unwrap().is_empty());

        // The store keeps serving commits whose callers are still waiting.
        let mut tx = session.begin();
        tx.insert::<Incident>(draft());
        let created: Incident = tx.commit_returning().await.unwrap();
        assert_eq!(session.list::<Incident>().await.unwrap(), vec![created]);
    }
}
