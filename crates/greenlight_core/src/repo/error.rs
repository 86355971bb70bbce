//! Store error taxonomy and backend error translation.
//!
//! # Responsibility
//! - Define the domain errors every record store reports.
//! - Classify raw backend failures by structured result codes, never by
//!   message text, so another backend only needs a new
//!   `ClassifyBackendError` impl.
//!
//! # Invariants
//! - "No rows" means `NotFound` on lookups and `EditConflict` on
//!   version-conditioned updates; the operation decides which.
//! - Anything unclassified is forwarded untouched inside `Unknown`.

use crate::db::{DbError, DeadlineExceeded};
use crate::validator::FieldErrors;
use rusqlite::ErrorCode;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    /// No record matches the requested key.
    NotFound,
    /// A unique constraint rejected the write.
    DuplicateKey { constraint: Option<String> },
    /// The record changed since the caller read it; re-read and retry.
    EditConflict,
    /// Field validation failed; nothing was sent to the backend.
    Validation(FieldErrors),
    /// Any other backend failure, timeouts included. Log it, never show it.
    Unknown(Box<dyn Error + Send + Sync + 'static>),
}

impl StoreError {
    /// True when the backend call was aborted by its deadline.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Unknown(err) => err.is::<DeadlineExceeded>(),
            _ => false,
        }
    }

    /// Short stable label for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::DuplicateKey { .. } => "duplicate_key",
            Self::EditConflict => "edit_conflict",
            Self::Validation(_) => "validation",
            Self::Unknown(_) if self.is_timeout() => "timeout",
            Self::Unknown(_) => "unknown",
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => f.write_str("record not found"),
            Self::DuplicateKey {
                constraint: Some(name),
            } => write!(f, "duplicate key violates unique constraint `{name}`"),
            Self::DuplicateKey { constraint: None } => f.write_str("duplicate key"),
            Self::EditConflict => {
                f.write_str("unable to update the record due to an edit conflict, please try again")
            }
            Self::Validation(errors) => {
                f.write_str("validation failed:")?;
                for (field, message) in errors {
                    write!(f, " {field}: {message};")?;
                }
                Ok(())
            }
            Self::Unknown(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Unknown(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Unknown(Box::new(value))
    }
}

/// Backend-neutral category of a storage failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendFailure {
    UniqueViolation { constraint: Option<String> },
    NoRows,
    /// Aborted by the deadline, or gave up waiting for a lock.
    Interrupted,
    Other,
}

/// Capability to classify a backend's native error.
pub trait ClassifyBackendError: Error + Send + Sync + 'static {
    fn classify(&self) -> BackendFailure;
}

impl ClassifyBackendError for rusqlite::Error {
    fn classify(&self) -> BackendFailure {
        match self {
            rusqlite::Error::QueryReturnedNoRows => BackendFailure::NoRows,
            rusqlite::Error::SqliteFailure(err, message) => match err.code {
                ErrorCode::ConstraintViolation
                    if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                        || err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
                {
                    BackendFailure::UniqueViolation {
                        constraint: message.as_deref().and_then(constraint_columns),
                    }
                }
                ErrorCode::OperationInterrupted
                | ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked => BackendFailure::Interrupted,
                _ => BackendFailure::Other,
            },
            _ => BackendFailure::Other,
        }
    }
}

/// Pulls the `table.column` list out of a SQLite unique-constraint message.
///
/// Informational only; classification above relies on result codes.
fn constraint_columns(message: &str) -> Option<String> {
    message
        .split_once(": ")
        .map(|(_, columns)| columns.trim().to_string())
        .filter(|columns| !columns.is_empty())
}

/// Which store operation produced the failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Insert,
    Lookup,
    ConditionalUpdate,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Lookup => "get",
            Self::ConditionalUpdate => "update",
        }
    }
}

/// Maps a backend failure to exactly one domain error.
///
/// `budget` is the deadline the call ran under; it is reported when the
/// failure turns out to be a timeout.
pub fn translate<E: ClassifyBackendError>(err: E, op: Operation, budget: Duration) -> StoreError {
    match err.classify() {
        BackendFailure::UniqueViolation { constraint } => StoreError::DuplicateKey { constraint },
        BackendFailure::NoRows => match op {
            Operation::ConditionalUpdate => StoreError::EditConflict,
            Operation::Lookup | Operation::Insert => StoreError::NotFound,
        },
        BackendFailure::Interrupted => {
            StoreError::Unknown(Box::new(DeadlineExceeded::new(budget, err)))
        }
        BackendFailure::Other => StoreError::Unknown(Box::new(err)),
    }
}
