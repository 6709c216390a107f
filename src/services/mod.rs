//! Business operations over the SQLite store.
//!
//! Handlers stay thin: they parse requests, then call into these services
//! with an explicit `CurrentUser`.

pub mod auth_service;
pub mod bucketlist_service;
pub mod password;
pub mod token;

use crate::validation::ValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("The {field} already exists")]
    Conflict { field: &'static str },
    #[error("{0}")]
    NotFound(String),
    #[error("unauthorized access")]
    Unauthorized,
    #[error("The username or password was invalid. Please try again")]
    InvalidCredentials,
    #[error("internal error: {0}")]
    Internal(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::Validation(err.0)
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Return true if SQLx error indicates a unique constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.message().to_ascii_lowercase().contains("unique")
    )
}
