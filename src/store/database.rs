//! # Storage Database
//!
//! The tables themselves, kept in SQLite through a `sqlx` pool and owned exclusively by
//! the [`StoreActor`](crate::store::StoreActor). The actor serialises access, so the pool
//! holds a single connection; an in-memory database only lives as long as that connection.
//!
//! A commit runs inside one database transaction. If any write fails (foreign key,
//! restrict, missing row) or the caller stops waiting, the transaction is rolled back
//! before the error is returned, so a failed commit leaves no trace in any table.
//!
//! Timestamps are stored as fixed-width RFC 3339 text with microsecond precision, which
//! keeps them ordered as text and lets them round-trip exactly.

use crate::config::{DeletePolicy, StoreConfig};
use crate::model::{Communication, Incident, Resource};
use crate::store::error::StoreError;
use crate::store::message::Write;
use crate::store::record::{Draft, Record, Row, RowId, RowMeta, Table};
use crate::validation::Choice;
use chrono::{DateTime, Duration, SecondsFormat, SubsecRound, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row as _;
use std::str::FromStr;
use tracing::{debug, warn};

/// Strictly monotonic source of row timestamps, at the precision the tables keep.
#[derive(Debug, Default)]
pub(crate) struct Clock {
    last: Option<DateTime<Utc>>,
}

impl Clock {
    pub(crate) fn starting_after(last: Option<DateTime<Utc>>) -> Self {
        Self { last }
    }

    pub(crate) fn tick(&mut self) -> DateTime<Utc> {
        let now = Utc::now().trunc_subsecs(6);
        let next = match self.last {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last = Some(next);
        next
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// The three tables plus the store clock.
pub(crate) struct Database {
    pool: SqlitePool,
    clock: Clock,
    incident_delete: DeletePolicy,
}

impl Database {
    /// Opens (creating if missing) the database at `config.database_url` and makes sure
    /// the three tables exist.
    pub(crate) async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(&config.database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        create_tables(&pool, config.incident_delete).await?;

        let incident_delete = effective_delete_policy(&pool).await?;
        if incident_delete != config.incident_delete {
            warn!(
                configured = %config.incident_delete,
                effective = %incident_delete,
                "Existing communications table keeps its delete policy"
            );
        }

        let mut last = None;
        for table in [Table::Incidents, Table::Resources, Table::Communications] {
            let sql = format!("SELECT MAX(updated_at) FROM {}", table);
            let max: Option<String> = sqlx::query_scalar(&sql).fetch_one(&pool).await?;
            if let Some(max) = max {
                let at = DateTime::parse_from_rfc3339(&max)
                    .map_err(|e| StoreError::Backend(format!("{}.updated_at: {}", table, e)))?
                    .with_timezone(&Utc);
                last = last.max(Some(at));
            }
        }

        Ok(Self {
            pool,
            clock: Clock::starting_after(last),
            incident_delete,
        })
    }

    pub(crate) fn incident_delete(&self) -> DeletePolicy {
        self.incident_delete
    }

    pub(crate) async fn len(&self, table: Table) -> Result<i64, StoreError> {
        let sql = format!("SELECT COUNT(*) FROM {}", table);
        Ok(sqlx::query_scalar(&sql).fetch_one(&self.pool).await?)
    }

    pub(crate) async fn get(&self, table: Table, id: RowId) -> Result<Option<Row>, StoreError> {
        let sql = format!("SELECT * FROM {} WHERE id = ?", table);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.map(|row| decode(table, &row)).transpose()
    }

    /// All rows of a table in ascending id order.
    pub(crate) async fn list(&self, table: Table) -> Result<Vec<Row>, StoreError> {
        let sql = format!("SELECT * FROM {} ORDER BY id", table);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(|row| decode(table, row)).collect()
    }

    /// Applies every write or none of them. Returns the inserted and updated rows in write order.
    ///
    /// `abandoned` is asked before the writes are applied and again right before the
    /// transaction commits; once it answers `true` the transaction is rolled back.
    pub(crate) async fn commit(
        &mut self,
        session: u64,
        writes: Vec<Write>,
        abandoned: impl Fn() -> bool,
    ) -> Result<Vec<Row>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut written = Vec::with_capacity(writes.len());

        for write in writes {
            if abandoned() {
                tx.rollback().await?;
                return Err(StoreError::Abandoned { session });
            }
            match self.apply(&mut tx, write).await {
                Ok(Some(row)) => written.push(row),
                Ok(None) => {}
                Err(e) => {
                    tx.rollback().await?;
                    return Err(e);
                }
            }
        }

        if abandoned() {
            tx.rollback().await?;
            return Err(StoreError::Abandoned { session });
        }
        tx.commit().await?;
        Ok(written)
    }

    async fn apply(
        &mut self,
        conn: &mut SqliteConnection,
        write: Write,
    ) -> Result<Option<Row>, StoreError> {
        match write {
            Write::Insert(draft) => {
                if let Some(incident_id) = draft.incident_ref() {
                    check_reference(conn, draft.table(), incident_id).await?;
                }
                let at = self.clock.tick();
                let id = insert(conn, &draft, at).await?;
                Ok(Some(draft.into_row(RowMeta {
                    id,
                    created_at: at,
                    updated_at: at,
                })))
            }
            Write::Update(mut row) => {
                let table = row.table();
                let id = row.meta().id;
                if let Some(incident_id) = row.incident_ref() {
                    check_reference(conn, table, incident_id).await?;
                }
                let sql = format!("SELECT created_at FROM {} WHERE id = ?", table);
                let created_at: DateTime<Utc> = sqlx::query_scalar(&sql)
                    .bind(id)
                    .fetch_optional(&mut *conn)
                    .await?
                    .ok_or(StoreError::RowNotFound { table, id })?;
                row.set_meta(RowMeta {
                    id,
                    created_at,
                    updated_at: self.clock.tick(),
                });
                update(conn, &row).await?;
                Ok(Some(row))
            }
            Write::Delete { table, id } => {
                if table == Table::Incidents && self.incident_delete == DeletePolicy::Restrict {
                    let count: i64 =
                        sqlx::query_scalar("SELECT COUNT(*) FROM communications WHERE incident_id = ?")
                            .bind(id)
                            .fetch_one(&mut *conn)
                            .await?;
                    if count > 0 {
                        return Err(StoreError::RestrictViolation {
                            table,
                            id,
                            referenced_by: Table::Communications,
                            count: count as usize,
                        });
                    }
                }
                let sql = format!("DELETE FROM {} WHERE id = ?", table);
                let result = sqlx::query(&sql).bind(id).execute(&mut *conn).await?;
                debug!(%table, id, removed = result.rows_affected(), "Delete");
                Ok(None)
            }
        }
    }

    /// Closes the pool, flushing a file-backed database.
    pub(crate) async fn close(&self) {
        self.pool.close().await;
    }
}

async fn create_tables(pool: &SqlitePool, policy: DeletePolicy) -> Result<(), StoreError> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS incidents (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            location TEXT,
            status TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS resources (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            type TEXT NOT NULL,
            name TEXT,
            status TEXT NOT NULL,
            location TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    // Orphan keeps the column unconstrained; inserts are still checked before they run.
    let reference = match policy {
        DeletePolicy::Restrict => " REFERENCES incidents(id) ON DELETE RESTRICT",
        DeletePolicy::Cascade => " REFERENCES incidents(id) ON DELETE CASCADE",
        DeletePolicy::Orphan => "",
    };
    let sql = format!(
        "CREATE TABLE IF NOT EXISTS communications (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            incident_id INTEGER NOT NULL{},
            message TEXT NOT NULL,
            channel TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        reference
    );
    sqlx::query(&sql).execute(pool).await?;
    Ok(())
}

/// Reads the `ON DELETE` action the communications table was created with.
async fn effective_delete_policy(pool: &SqlitePool) -> Result<DeletePolicy, StoreError> {
    let action: Option<String> = sqlx::query_scalar(
        "SELECT on_delete FROM pragma_foreign_key_list('communications') WHERE \"table\" = 'incidents'",
    )
    .fetch_optional(pool)
    .await?;
    Ok(match action.as_deref() {
        None => DeletePolicy::Orphan,
        Some("CASCADE") => DeletePolicy::Cascade,
        Some(_) => DeletePolicy::Restrict,
    })
}

async fn check_reference(
    conn: &mut SqliteConnection,
    table: Table,
    incident_id: RowId,
) -> Result<(), StoreError> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM incidents WHERE id = ?")
        .bind(incident_id)
        .fetch_optional(&mut *conn)
        .await?;
    match found {
        Some(_) => Ok(()),
        None => Err(StoreError::ForeignKeyViolation {
            table,
            column: "incident_id",
            value: incident_id,
        }),
    }
}

async fn insert(
    conn: &mut SqliteConnection,
    draft: &Draft,
    at: DateTime<Utc>,
) -> Result<RowId, StoreError> {
    let at = timestamp(at);
    let query = match draft {
        Draft::Incident(d) => sqlx::query(
            "INSERT INTO incidents (title, description, location, status, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&d.title)
        .bind(&d.description)
        .bind(&d.location)
        .bind(d.status.as_str()),
        Draft::Resource(d) => sqlx::query(
            "INSERT INTO resources (type, name, status, location, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&d.kind)
        .bind(&d.name)
        .bind(d.status.as_str())
        .bind(&d.location),
        Draft::Communication(d) => sqlx::query(
            "INSERT INTO communications (incident_id, message, channel, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(d.incident_id)
        .bind(&d.message)
        .bind(d.channel.as_str()),
    };
    let result = query.bind(&at).bind(&at).execute(&mut *conn).await?;
    Ok(result.last_insert_rowid())
}

async fn update(conn: &mut SqliteConnection, row: &Row) -> Result<(), StoreError> {
    let meta = row.meta();
    let query = match row {
        Row::Incident(r) => sqlx::query(
            "UPDATE incidents SET title = ?, description = ?, location = ?, status = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&r.title)
        .bind(&r.description)
        .bind(&r.location)
        .bind(r.status.as_str()),
        Row::Resource(r) => sqlx::query(
            "UPDATE resources SET type = ?, name = ?, status = ?, location = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&r.kind)
        .bind(&r.name)
        .bind(r.status.as_str())
        .bind(&r.location),
        Row::Communication(r) => sqlx::query(
            "UPDATE communications SET incident_id = ?, message = ?, channel = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(r.incident_id)
        .bind(&r.message)
        .bind(r.channel.as_str()),
    };
    query
        .bind(timestamp(meta.updated_at))
        .bind(meta.id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

fn choice<C: Choice>(table: Table, column: &str, row: &SqliteRow) -> Result<C, StoreError> {
    let value: String = row.try_get(column)?;
    C::from_name(&value).ok_or_else(|| {
        StoreError::Backend(format!("{}.{} holds unknown value '{}'", table, column, value))
    })
}

fn decode(table: Table, row: &SqliteRow) -> Result<Row, StoreError> {
    let id: RowId = row.try_get("id")?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at")?;

    let decoded = match table {
        Table::Incidents => Incident {
            id,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            location: row.try_get("location")?,
            status: choice(table, "status", row)?,
            created_at,
            updated_at,
        }
        .into_row(),
        Table::Resources => Resource {
            id,
            kind: row.try_get("type")?,
            name: row.try_get("name")?,
            status: choice(table, "status", row)?,
            location: row.try_get("location")?,
            created_at,
            updated_at,
        }
        .into_row(),
        Table::Communications => Communication {
            id,
            incident_id: row.try_get("incident_id")?,
            message: row.try_get("message")?,
            channel: choice(table, "channel", row)?,
            created_at,
            updated_at,
        }
        .into_row(),
    };
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Channel, Incident, IncidentStatus, NewCommunication, NewIncident, NewResource,
        ResourceStatus,
    };

    fn flood() -> Draft {
        Draft::Incident(NewIncident {
            title: "Flood".into(),
            description: "River overflow reported".into(),
            location: None,
            status: IncidentStatus::Open,
        })
    }

    fn dispatch(incident_id: RowId) -> Draft {
        Draft::Communication(NewCommunication {
            incident_id,
            message: "Dispatch team A".into(),
            channel: Channel::Sms,
        })
    }

    fn delete_incident(id: RowId) -> Write {
        Write::Delete {
            table: Table::Incidents,
            id,
        }
    }

    async fn database(policy: DeletePolicy) -> Database {
        Database::connect(&StoreConfig::in_memory().with_delete_policy(policy))
            .await
            .expect("Failed to open in-memory database")
    }

    async fn commit(db: &mut Database, writes: Vec<Write>) -> Result<Vec<Row>, StoreError> {
        db.commit(1, writes, || false).await
    }

    async fn insert(db: &mut Database, draft: Draft) -> Row {
        commit(db, vec![Write::Insert(draft)])
            .await
            .unwrap()
            .pop()
            .unwrap()
    }

    #[test]
    fn test_clock_is_strictly_monotonic() {
        let mut clock = Clock::default();
        let mut last = clock.tick();
        for _ in 0..1000 {
            let next = clock.tick();
            assert!(next > last);
            last = next;
        }
    }

    #[test]
    fn test_clock_resumes_after_seed() {
        let seed = Utc::now() + Duration::hours(1);
        let mut clock = Clock::starting_after(Some(seed));
        assert!(clock.tick() > seed);
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids_and_equal_timestamps() {
        let mut db = database(DeletePolicy::Restrict).await;
        let first = insert(&mut db, flood()).await.meta();
        let second = insert(&mut db, flood()).await.meta();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.created_at, first.updated_at);
        assert!(second.created_at > first.created_at);
    }

    #[tokio::test]
    async fn test_stored_row_reads_back_unchanged() {
        let mut db = database(DeletePolicy::Restrict).await;
        let row = insert(&mut db, flood()).await;
        assert_eq!(db.get(Table::Incidents, 1).await.unwrap(), Some(row));
        assert_eq!(db.get(Table::Incidents, 2).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_tables_have_independent_id_sequences() {
        let mut db = database(DeletePolicy::Restrict).await;
        insert(&mut db, flood()).await;
        let resource = insert(
            &mut db,
            Draft::Resource(NewResource {
                kind: "ambulance".into(),
                name: None,
                status: ResourceStatus::Available,
                location: None,
            }),
        )
        .await;
        assert_eq!(resource.meta().id, 1);
    }

    #[tokio::test]
    async fn test_deleted_ids_are_not_reused() {
        let mut db = database(DeletePolicy::Restrict).await;
        insert(&mut db, flood()).await;
        commit(&mut db, vec![delete_incident(1)]).await.unwrap();
        assert_eq!(insert(&mut db, flood()).await.meta().id, 2);
    }

    #[tokio::test]
    async fn test_insert_with_dangling_reference_is_rejected() {
        let mut db = database(DeletePolicy::Restrict).await;
        let err = commit(&mut db, vec![Write::Insert(dispatch(7))])
            .await
            .unwrap_err();

        assert_eq!(
            err,
            StoreError::ForeignKeyViolation {
                table: Table::Communications,
                column: "incident_id",
                value: 7,
            }
        );
        assert_eq!(db.len(Table::Communications).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_failed_commit_undoes_earlier_writes() {
        let mut db = database(DeletePolicy::Restrict).await;
        let result = commit(
            &mut db,
            vec![Write::Insert(flood()), Write::Insert(dispatch(99))],
        )
        .await;

        assert!(result.is_err());
        assert_eq!(db.len(Table::Incidents).await.unwrap(), 0);
        assert_eq!(db.len(Table::Communications).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_abandoned_commit_is_rolled_back() {
        let mut db = database(DeletePolicy::Restrict).await;
        let err = db
            .commit(3, vec![Write::Insert(flood())], || true)
            .await
            .unwrap_err();

        assert_eq!(err, StoreError::Abandoned { session: 3 });
        assert_eq!(db.len(Table::Incidents).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_keeps_created_at_and_advances_updated_at() {
        let mut db = database(DeletePolicy::Restrict).await;
        let row = insert(&mut db, flood()).await;
        let before = row.meta();

        let mut incident = Incident::from_row(row).unwrap();
        incident.status = IncidentStatus::Resolved;
        let updated = commit(&mut db, vec![Write::Update(incident.into_row())])
            .await
            .unwrap()
            .pop()
            .unwrap();

        let after = updated.meta();
        assert_eq!(after.id, before.id);
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at > before.updated_at);
        assert_eq!(db.get(Table::Incidents, before.id).await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn test_update_of_missing_row_fails() {
        let mut db = database(DeletePolicy::Restrict).await;
        let row = insert(&mut db, flood()).await;
        commit(&mut db, vec![delete_incident(1)]).await.unwrap();

        let err = commit(&mut db, vec![Write::Update(row)]).await.unwrap_err();
        assert_eq!(
            err,
            StoreError::RowNotFound {
                table: Table::Incidents,
                id: 1
            }
        );
    }

    #[tokio::test]
    async fn test_delete_of_absent_row_is_a_no_op() {
        let mut db = database(DeletePolicy::Restrict).await;
        let written = commit(
            &mut db,
            vec![Write::Delete {
                table: Table::Resources,
                id: 42,
            }],
        )
        .await
        .unwrap();
        assert!(written.is_empty());
    }

    #[tokio::test]
    async fn test_restrict_policy_blocks_referenced_incident_delete() {
        let mut db = database(DeletePolicy::Restrict).await;
        insert(&mut db, flood()).await;
        insert(&mut db, dispatch(1)).await;

        let err = commit(&mut db, vec![delete_incident(1)]).await.unwrap_err();

        assert!(matches!(err, StoreError::RestrictViolation { id: 1, count: 1, .. }));
        assert_eq!(db.len(Table::Incidents).await.unwrap(), 1);
        assert_eq!(db.len(Table::Communications).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_cascade_policy_removes_referencing_rows() {
        let mut db = database(DeletePolicy::Cascade).await;
        assert_eq!(db.incident_delete(), DeletePolicy::Cascade);
        insert(&mut db, flood()).await;
        insert(&mut db, flood()).await;
        insert(&mut db, dispatch(1)).await;
        insert(&mut db, dispatch(2)).await;

        commit(&mut db, vec![delete_incident(1)]).await.unwrap();

        assert_eq!(db.len(Table::Incidents).await.unwrap(), 1);
        let remaining = db.list(Table::Communications).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].incident_ref(), Some(2));
    }

    #[tokio::test]
    async fn test_cascade_is_undone_with_the_rest_of_the_commit() {
        let mut db = database(DeletePolicy::Cascade).await;
        insert(&mut db, flood()).await;
        insert(&mut db, dispatch(1)).await;

        // The delete cascades, then the insert fails on the now-missing incident.
        let result = commit(
            &mut db,
            vec![delete_incident(1), Write::Insert(dispatch(1))],
        )
        .await;

        assert!(result.is_err());
        assert_eq!(db.len(Table::Incidents).await.unwrap(), 1);
        assert_eq!(db.len(Table::Communications).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_orphan_policy_leaves_referencing_rows() {
        let mut db = database(DeletePolicy::Orphan).await;
        assert_eq!(db.incident_delete(), DeletePolicy::Orphan);
        insert(&mut db, flood()).await;
        insert(&mut db, dispatch(1)).await;

        commit(&mut db, vec![delete_incident(1)]).await.unwrap();

        assert_eq!(db.len(Table::Incidents).await.unwrap(), 0);
        assert_eq!(db.len(Table::Communications).await.unwrap(), 1);
    }
}
