//! # Emergency Records
//!
//! A record-keeping backend for emergency management: incidents, the resources sent to
//! respond to them, and the communications logged against incidents.
//!
//! ## Architecture Notes
//!
//! ### 1. One store actor
//! All three tables live in one SQLite database owned by a single
//! [`StoreActor`](store::StoreActor) that processes requests one at a time. Each commit is
//! one database transaction, the foreign key from communications to incidents is enforced
//! by the schema, and every caller gets read-after-write consistency without locks.
//!
//! ### 2. Scoped sessions
//! Services never share a connection. Every operation opens a [`Session`](store::Session)
//! from a bounded pool, buffers its writes in a [`Transaction`](store::Transaction), and
//! commits them atomically. The session is released on drop.
//!
//! ### 3. Validate first
//! Raw payloads are turned into validated values by the [`validation`] layer before any
//! store access, so a bad field never costs a round trip and can never be half-applied.
//!
//! ### 4. Type-Safe Error Handling
//! Each service defines its own error type (`IncidentError`, `ResourceError`,
//! `CommunicationError`). They share an [`ErrorClass`](service::ErrorClass) that the
//! [`api`] boundary maps to status codes.
//!
//! ## Module Tour
//!
//! - [`store`]: the tables, the actor, sessions and the mock store
//! - [`model`] and [`validation`]: entities, payloads, field rules
//! - [`service`]: the shared lifecycle traits; [`incident_service`], [`resource_service`]
//!   and [`communication_service`] implement them
//! - [`api`]: the request surface
//! - [`lifecycle`]: [`EmergencySystem`](lifecycle::EmergencySystem) and tracing setup
//!
//! ### Running the Demo
//!
//! ```bash
//! RUST_LOG=info cargo run -- --database-url sqlite::memory: --incident-delete orphan
//! ```

pub mod api;
pub mod communication_service;
pub mod config;
pub mod incident_service;
pub mod lifecycle;
pub mod model;
pub mod resource_service;
pub mod service;
pub mod store;
pub mod validation;
