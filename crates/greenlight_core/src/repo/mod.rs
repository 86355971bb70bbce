//! Repository layer: the version-checked record store and its mappings.
//!
//! # Responsibility
//! - Define the optimistic-concurrency store contract.
//! - Translate backend failures into `StoreError`.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths run record validation before SQL mutations.
//! - Store APIs return semantic errors (`NotFound`, `DuplicateKey`,
//!   `EditConflict`) in addition to wrapped backend errors.

pub mod error;
pub mod movie_repo;
pub mod record_store;
pub mod user_repo;

use crate::config::CoreConfig;
use movie_repo::MovieStore;
use record_store::SqliteRecordStore;
use rusqlite::Connection;
use std::time::Duration;
use user_repo::UserStore;

/// Per-connection bundle of every record store.
pub struct Models<'conn> {
    pub users: UserStore<'conn>,
    pub movies: MovieStore<'conn>,
}

impl<'conn> Models<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self {
            users: SqliteRecordStore::new(conn),
            movies: SqliteRecordStore::new(conn),
        }
    }

    /// Same as [`Models::new`] with a custom per-call deadline.
    pub fn with_timeout(conn: &'conn Connection, timeout: Duration) -> Self {
        Self {
            users: SqliteRecordStore::new(conn).with_timeout(timeout),
            movies: SqliteRecordStore::new(conn).with_timeout(timeout),
        }
    }

    /// Stores bounded by the configured `query_timeout`.
    pub fn from_config(conn: &'conn Connection, config: &CoreConfig) -> Self {
        Self::with_timeout(conn, config.query_timeout)
    }
}
