//! Error types for the Resource service.

use crate::service::{Classify, ErrorClass};
use crate::store::StoreError;
use crate::validation::ValidationError;
use thiserror::Error;

/// Errors that can occur during resource operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ResourceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Resource storage error: {0}")]
    Storage(#[from] StoreError),
}

impl Classify for ResourceError {
    fn class(&self) -> ErrorClass {
        match self {
            ResourceError::Validation(_) => ErrorClass::Validation,
            ResourceError::Storage(_) => ErrorClass::Storage,
        }
    }
}
