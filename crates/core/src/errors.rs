use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by the booking and schedule engines.
///
/// Every business-rule violation is reported through one of these variants;
/// raw storage failures never cross the engine boundary except wrapped in
/// [`ServiceError::Internal`].
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    InvalidState(String),

    #[error("{0}")]
    CapacityExhausted(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Timeout(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] eyre::Report),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Wire-level classification of a [`ServiceError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    NotFound,
    InvalidInput,
    InvalidState,
    CapacityExhausted,
    Conflict,
    ConfigurationError,
    Unauthorized,
    Timeout,
    InternalError,
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::NotFound(_) => ErrorKind::NotFound,
            ServiceError::InvalidInput(_) => ErrorKind::InvalidInput,
            ServiceError::InvalidState(_) => ErrorKind::InvalidState,
            ServiceError::CapacityExhausted(_) => ErrorKind::CapacityExhausted,
            ServiceError::Conflict(_) => ErrorKind::Conflict,
            ServiceError::Configuration(_) => ErrorKind::ConfigurationError,
            ServiceError::Unauthorized(_) => ErrorKind::Unauthorized,
            ServiceError::Timeout(_) => ErrorKind::Timeout,
            ServiceError::Internal(_) => ErrorKind::InternalError,
        }
    }

    /// Message safe to hand to a caller. Internal failures are never described.
    pub fn public_message(&self) -> String {
        match self {
            ServiceError::Internal(_) => "Internal Server Error".to_string(),
            other => other.to_string(),
        }
    }
}

/// Failures reported by a store implementation.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error(transparent)]
    Backend(#[from] eyre::Report),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Builds a mapper that logs an unclassified store failure with the operation
/// it happened in and converts it into a [`ServiceError`].
///
/// Unique violations become [`ServiceError::Conflict`] with a generic message;
/// callers that know what the constraint means match on them first.
pub fn storage(operation: &'static str) -> impl Fn(StoreError) -> ServiceError + Copy {
    move |err| match err {
        StoreError::UniqueViolation(detail) => {
            tracing::warn!(operation, %detail, "unique constraint rejected write");
            ServiceError::Conflict("Resource already exists".to_string())
        }
        StoreError::Backend(report) => {
            tracing::error!(operation, error = ?report, "store operation failed");
            ServiceError::Internal(report)
        }
    }
}
