//! # Observability & Tracing
//!
//! [`setup_tracing`] initializes structured logging with the `tracing` crate. Log levels
//! come from `RUST_LOG`; the output is the compact format without module paths, so a
//! request shows up as its span followed by the store's structured fields.
//!
//! ## What Gets Traced
//!
//! - **Store Lifecycle**: startup (with the incident delete policy) and final table sizes
//! - **Commits**: one `Committed` line per write with `table`, `op` and the new table `size`
//! - **Requests**: each api call runs in a `request{operation=...}` span
//! - **Errors**: rejected requests at warn, storage failures and rollbacks at warn/error
//!
//! ## Usage
//!
//! ```bash
//! # Compact logs
//! RUST_LOG=info cargo run
//!
//! # Payloads are logged once at debug, at the top of each service call
//! RUST_LOG=debug cargo run
//! ```
//!
//! With `RUST_LOG=info` the flood scenario reads roughly:
//!
//! ```text
//! INFO Store started incident_delete=orphan
//! INFO request:create: Incident created operation="create_incident" id=1 status="open"
//! INFO Committed session=1 table=incidents op="insert" size=1
//! INFO request:create: Communication logged operation="create_communication" id=1 incident_id=1 channel="sms"
//! INFO Committed session=4 table=incidents op="delete" size=0
//! ```

pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
