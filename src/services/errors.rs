use thiserror::Error;

use crate::domain::category::{RegistryError, UnknownCategory};

/// Generic error type used by service layer functions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// The requested category is not one of the fixed set.
    #[error("unknown category: {0}")]
    UnknownCategory(String),
    /// Submitted data was rejected before reaching the store.
    #[error("{0}")]
    Validation(String),
    /// The store failed or refused the operation.
    #[error("store error: {0}")]
    Store(String),
    /// The manual tone-analysis trigger failed.
    #[error("tone analysis failed: {0}")]
    AnalysisTrigger(String),
}

impl From<UnknownCategory> for ServiceError {
    fn from(value: UnknownCategory) -> Self {
        Self::UnknownCategory(value.0)
    }
}

impl From<RegistryError> for ServiceError {
    fn from(value: RegistryError) -> Self {
        Self::Validation(value.to_string())
    }
}

/// Convenient alias for results returned from service functions.
pub type ServiceResult<T> = Result<T, ServiceError>;
