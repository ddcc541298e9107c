use thiserror::Error;

use crate::domain::types::TypeConstraintError;

/// Errors raised by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No pooled connection could be obtained.
    #[error("connection error: {0}")]
    ConnectionError(String),
    /// The database rejected or failed the query.
    #[error("database error: {0}")]
    DatabaseError(#[from] diesel::result::Error),
    /// Stored or supplied data violates a domain constraint.
    #[error("validation error: {0}")]
    ValidationError(String),
}

impl From<diesel::r2d2::PoolError> for RepositoryError {
    fn from(value: diesel::r2d2::PoolError) -> Self {
        Self::ConnectionError(value.to_string())
    }
}

impl From<TypeConstraintError> for RepositoryError {
    fn from(value: TypeConstraintError) -> Self {
        Self::ValidationError(value.to_string())
    }
}

/// Convenient alias for results returned from repository functions.
pub type RepositoryResult<T> = Result<T, RepositoryError>;
