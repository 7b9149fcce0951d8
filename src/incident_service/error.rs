//! Error types for the Incident service.

use crate::service::{Classify, ErrorClass};
use crate::store::{RowId, StoreError};
use crate::validation::ValidationError;
use thiserror::Error;

/// Errors that can occur during incident operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum IncidentError {
    /// The payload broke a field constraint.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The delete was refused because communications still reference the incident.
    #[error("Incident {id} is referenced by {count} communication(s)")]
    Referenced { id: RowId, count: usize },

    /// The store failed; nothing was written.
    #[error("Incident storage error: {0}")]
    Storage(#[source] StoreError),
}

impl From<StoreError> for IncidentError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::RestrictViolation { id, count, .. } => IncidentError::Referenced { id, count },
            other => IncidentError::Storage(other),
        }
    }
}

impl Classify for IncidentError {
    fn class(&self) -> ErrorClass {
        match self {
            IncidentError::Validation(_) => ErrorClass::Validation,
            IncidentError::Referenced { .. } => ErrorClass::ReferentialIntegrity,
            IncidentError::Storage(_) => ErrorClass::Storage,
        }
    }
}
