//! Runtime orchestration and lifecycle management.
//!
//! # Main Components
//!
//! - [`EmergencySystem`] - Starts the store actor and wires the services and api to it
//! - [`setup_tracing`] - Initializes the tracing/logging infrastructure

pub mod system;
pub mod tracing;

pub use system::*;
pub use tracing::*;
