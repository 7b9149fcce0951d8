//! Error types for the Communication service.

use crate::service::{Classify, ErrorClass};
use crate::store::{RowId, StoreError};
use crate::validation::ValidationError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CommunicationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// `incident_id` names no existing incident.
    #[error("Incident {incident_id} does not exist")]
    UnknownIncident { incident_id: RowId },

    #[error("Communication storage error: {0}")]
    Storage(#[source] StoreError),
}

impl From<StoreError> for CommunicationError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::ForeignKeyViolation { value, .. } => {
                CommunicationError::UnknownIncident { incident_id: value }
            }
            other => CommunicationError::Storage(other),
        }
    }
}

impl Classify for CommunicationError {
    fn class(&self) -> ErrorClass {
        match self {
            CommunicationError::Validation(_) => ErrorClass::Validation,
            CommunicationError::UnknownIncident { .. } => ErrorClass::ReferentialIntegrity,
            CommunicationError::Storage(_) => ErrorClass::Storage,
        }
    }
}
