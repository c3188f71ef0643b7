//! Centralized error handling.
//!
//! `StoreError` is what the unit of work reports; `AppError` is what callers
//! of repositories and facades see. The `From` conversion between them is
//! where validation failures get singled out.

use thiserror::Error;

use crate::domain::{EntityId, ValidationFailure};

/// Failures raised by a unit of work
#[derive(Error, Debug)]
pub enum StoreError {
    /// One or more staged entities broke their validation rules
    #[error("{0}")]
    Validation(ValidationFailure),

    /// A single-result query matched more than one row
    #[error("{table}: expected at most one match for {predicate}, found {count}")]
    NonUnique {
        table: &'static str,
        predicate: String,
        count: usize,
    },

    /// A staged update or removal targets an identity the table does not hold
    #[error("{table}: no stored entity with id {id}")]
    NotTracked { table: &'static str, id: EntityId },

    /// The table's identity counter cannot advance any further
    #[error("{table}: identities exhausted after {last}")]
    IdentityExhausted { table: &'static str, last: EntityId },

    #[error("Lock poisoned: {0}")]
    LockPoisoned(&'static str),

    #[error("Snapshot I/O error")]
    Io(#[from] std::io::Error),

    #[error("Snapshot serialization error")]
    Serialization(#[from] serde_json::Error),
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Aggregated store-level validation failure; renders as one line per field
    #[error("{0}")]
    Validation(ValidationFailure),

    /// Any other persistence failure, passed through untouched
    #[error(transparent)]
    Store(StoreError),

    #[error("Resource not found")]
    NotFound,

    #[error("No repository registered for {0}")]
    NotRegistered(&'static str),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(failure) => AppError::Validation(failure),
            other => AppError::Store(other),
        }
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for unit-of-work calls
pub type StoreResult<T> = Result<T, StoreError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self) -> AppResult<T> {
        self.ok_or(AppError::NotFound)
    }
}

/// Convenience constructors
impl AppError {
    pub fn config(msg: impl Into<String>) -> Self {
        AppError::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    /// The aggregated validation failure, if that is what this error is.
    pub fn validation_failure(&self) -> Option<&ValidationFailure> {
        match self {
            AppError::Validation(failure) => Some(failure),
            _ => None,
        }
    }

    /// Whether a single-match query found several rows.
    pub fn is_non_unique(&self) -> bool {
        matches!(self, AppError::Store(StoreError::NonUnique { .. }))
    }
}
