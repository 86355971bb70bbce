//! SQLite storage bootstrap, schema migrations and per-call deadlines.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the greenlight core.
//! - Apply schema migrations in deterministic order.
//! - Bound every store round trip with a scoped deadline.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Record stores must not touch a connection before migrations succeed.
//! - A connection never keeps a deadline handler after the call that armed it.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

pub mod deadline;
pub mod migrations;
mod open;

pub use deadline::{DeadlineExceeded, DeadlineGuard};
pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Busy timeout restored on a connection whenever no store call is in flight.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
