//! Durable entity store.
//!
//! Holds the `incidents`, `resources` and `communications` tables in a SQLite database
//! and enforces the foreign key `communications.incident_id -> incidents.id`. Ids and
//! timestamps are assigned by the store.
//!
//! # Main Components
//!
//! - [`StoreActor`] - Owns the database and applies requests one at a time
//! - [`StoreClient`] - Cloneable handle; opens pooled [`Session`]s
//! - [`Session`] / [`Transaction`] - Per-operation reads and atomic batches of writes
//! - [`Record`] - Typed view of one table's rows
//! - [`StoreError`] - Everything the store can fail with
//!
//! # Testing
//!
//! See [`mock`] for a scripted store that services can be tested against.

mod actor;
mod client;
mod database;
pub mod error;
pub mod message;
pub mod mock;
pub mod record;
mod session;

pub use actor::StoreActor;
pub use client::StoreClient;
pub use error::StoreError;
pub use message::{Response, StoreRequest, Write};
pub use record::{Draft, Record, Row, RowId, RowMeta, Table};
pub use session::{Session, Transaction};
