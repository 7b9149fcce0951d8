//! # Records & Rows
//!
//! The store keeps every table's rows as a tagged [`Row`] so that one actor can own all
//! three tables and enforce the foreign key between them inside a single commit.
//!
//! Typed access goes through the [`Record`] trait: each entity type names its table, its
//! validated creation payload ([`Record::Draft`]) and how it is wrapped into and out of the
//! tagged enums. A `Session::get::<Incident>` can't hand back a `Resource`, and a
//! `Transaction::insert::<Incident>` only accepts a `NewIncident`.

use crate::model::{
    Communication, Incident, NewCommunication, NewIncident, NewResource, Resource,
};
use chrono::{DateTime, Utc};
use std::fmt::{self, Debug, Display};

/// Primary key type shared by all tables.
pub type RowId = i64;

/// The tables held by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    Incidents,
    Resources,
    Communications,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::Incidents => "incidents",
            Table::Resources => "resources",
            Table::Communications => "communications",
        }
    }
}

impl Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Store-assigned columns carried by every row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowMeta {
    pub id: RowId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A persisted row of any table.
#[derive(Debug, Clone, PartialEq)]
pub enum Row {
    Incident(Incident),
    Resource(Resource),
    Communication(Communication),
}

impl Row {
    pub fn table(&self) -> Table {
        match self {
            Row::Incident(_) => Incident::TABLE,
            Row::Resource(_) => Resource::TABLE,
            Row::Communication(_) => Communication::TABLE,
        }
    }

    pub fn meta(&self) -> RowMeta {
        match self {
            Row::Incident(row) => row.meta(),
            Row::Resource(row) => row.meta(),
            Row::Communication(row) => row.meta(),
        }
    }

    pub(crate) fn set_meta(&mut self, meta: RowMeta) {
        match self {
            Row::Incident(row) => row.set_meta(meta),
            Row::Resource(row) => row.set_meta(meta),
            Row::Communication(row) => row.set_meta(meta),
        }
    }

    /// The incident this row points at, if its table has the `incident_id` foreign key.
    pub fn incident_ref(&self) -> Option<RowId> {
        match self {
            Row::Communication(row) => Some(row.incident_id),
            _ => None,
        }
    }
}

/// A validated payload for a row that does not exist yet.
///
/// The store turns a draft into a [`Row`] at commit time, when it assigns the id and
/// the timestamps.
#[derive(Debug, Clone, PartialEq)]
pub enum Draft {
    Incident(NewIncident),
    Resource(NewResource),
    Communication(NewCommunication),
}

impl Draft {
    pub fn table(&self) -> Table {
        match self {
            Draft::Incident(_) => Incident::TABLE,
            Draft::Resource(_) => Resource::TABLE,
            Draft::Communication(_) => Communication::TABLE,
        }
    }

    pub fn incident_ref(&self) -> Option<RowId> {
        match self {
            Draft::Communication(draft) => Some(draft.incident_id),
            _ => None,
        }
    }

    pub(crate) fn into_row(self, meta: RowMeta) -> Row {
        match self {
            Draft::Incident(draft) => Incident::from_draft(meta, draft).into_row(),
            Draft::Resource(draft) => Resource::from_draft(meta, draft).into_row(),
            Draft::Communication(draft) => Communication::from_draft(meta, draft).into_row(),
        }
    }
}

/// Trait that every entity type implements to be stored in a table.
///
/// # Architecture Note
/// The store database layer only knows [`Row`] and [`Draft`]. This trait is the typed view on
/// top of them: sessions and transactions are generic over `T: Record`, so the service
/// layer never matches on the tagged enums itself.
pub trait Record: Clone + Debug + Send + Sync + 'static {
    /// The table this record lives in.
    const TABLE: Table;

    /// The validated payload required to create a new row.
    type Draft: Debug + Send + Sync + 'static;

    /// Construct the full record from the store-assigned columns and the draft.
    fn from_draft(meta: RowMeta, draft: Self::Draft) -> Self;

    fn meta(&self) -> RowMeta;

    fn set_meta(&mut self, meta: RowMeta);

    fn into_row(self) -> Row;

    /// Unwraps a row of this record's table, or `None` for any other table.
    fn from_row(row: Row) -> Option<Self>;

    fn wrap_draft(draft: Self::Draft) -> Draft;
}
