//! Version-checked record store shared by every record kind.
//!
//! # Responsibility
//! - Implement insert / lookup-by-key / conditional update once, for any
//!   `Record`.
//! - Bound every backend round trip with a `DeadlineGuard`.
//! - Run record validation before any mutation reaches SQLite.
//!
//! # Invariants
//! - Insert assigns `id`, `created_at` and `version = 1` in the same
//!   statement that writes the row.
//! - Update writes only when both `id` and the caller's `version` match the
//!   stored row, and bumps `version` by exactly one in the same statement.
//! - The store holds no locks and no mutable state of its own; concurrent
//!   writers are ordered by SQLite's atomic statement execution.

use crate::db::DeadlineGuard;
use crate::model::RecordId;
use crate::repo::error::{translate, Operation, StoreError, StoreResult};
use crate::validator::Validator;
use log::{debug, error, info};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row, ToSql};
use std::marker::PhantomData;
use std::time::{Duration, Instant};

/// Default budget for one store call, measured from call entry.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(3);

/// Mapping between a record type and its SQLite table.
///
/// Every table carries `id`, `created_at` and `version` columns managed by
/// the store; `COLUMNS` lists the remaining persisted columns.
pub trait Record: Sized {
    /// Unique lookup key, e.g. `str` for an email or `RecordId`.
    type Key: ToSql + ?Sized;

    const TABLE: &'static str;
    const KEY_COLUMN: &'static str;
    /// Caller-owned columns, in the order `column_values` yields them.
    const COLUMNS: &'static [&'static str];

    fn validate(&self, v: &mut Validator);

    fn column_values(&self) -> StoreResult<Vec<Value>>;

    /// Builds a record from a row selecting `id, created_at, version`
    /// followed by `COLUMNS`.
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    fn id(&self) -> RecordId;
    fn version(&self) -> i32;
    fn assign_identity(&mut self, id: RecordId, created_at: i64, version: i32);
    fn set_version(&mut self, version: i32);
}

/// Optimistic-concurrency store contract.
///
/// `insert` and `update` mutate the passed record in place with the
/// server-assigned fields. No method retries; on `EditConflict` the caller
/// re-reads and reapplies its change.
pub trait VersionedStore<R: Record> {
    fn insert(&self, record: &mut R) -> StoreResult<()>;
    fn get_by_key(&self, key: &R::Key) -> StoreResult<R>;
    fn update(&self, record: &mut R) -> StoreResult<()>;
}

/// SQLite-backed `VersionedStore`.
pub struct SqliteRecordStore<'conn, R> {
    conn: &'conn Connection,
    timeout: Duration,
    _record: PhantomData<fn() -> R>,
}

impl<'conn, R: Record> SqliteRecordStore<'conn, R> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self {
            conn,
            timeout: DEFAULT_QUERY_TIMEOUT,
            _record: PhantomData,
        }
    }

    /// Overrides the per-call deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn validate(&self, record: &R, op: Operation) -> StoreResult<()> {
        let mut v = Validator::new();
        record.validate(&mut v);
        if v.valid() {
            return Ok(());
        }

        info!(
            "event=record_{} module=store table={} status=invalid fields={}",
            op.as_str(),
            R::TABLE,
            v.errors().keys().cloned().collect::<Vec<_>>().join(",")
        );
        Err(StoreError::Validation(v.into_errors()))
    }

    /// Runs `call` under a freshly armed deadline and translates failures.
    fn run<T>(
        &self,
        op: Operation,
        call: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> StoreResult<T> {
        let started_at = Instant::now();
        let (result, expired) = match DeadlineGuard::arm(self.conn, self.timeout) {
            Ok(guard) => {
                let result = call(self.conn);
                (result, guard.is_expired())
            }
            Err(err) => (Err(err), false),
        };
        let duration_ms = started_at.elapsed().as_millis();

        match result {
            Ok(value) => {
                debug!(
                    "event=record_{} module=store table={} status=ok duration_ms={duration_ms}",
                    op.as_str(),
                    R::TABLE
                );
                Ok(value)
            }
            Err(err) => {
                let err = translate(err, op, self.timeout);
                match &err {
                    StoreError::Unknown(cause) => error!(
                        "event=record_{} module=store table={} status={} duration_ms={duration_ms} deadline_expired={expired} error={cause}",
                        op.as_str(),
                        R::TABLE,
                        err.kind()
                    ),
                    _ => info!(
                        "event=record_{} module=store table={} status={} duration_ms={duration_ms}",
                        op.as_str(),
                        R::TABLE,
                        err.kind()
                    ),
                }
                Err(err)
            }
        }
    }
}

impl<R: Record> VersionedStore<R> for SqliteRecordStore<'_, R> {
    fn insert(&self, record: &mut R) -> StoreResult<()> {
        self.validate(record, Operation::Insert)?;
        let values = record.column_values()?;
        let sql = insert_sql(R::TABLE, R::COLUMNS);

        let (id, created_at, version): (RecordId, i64, i32) = self.run(Operation::Insert, |conn| {
            conn.prepare_cached(&sql)?
                .query_row(params_from_iter(values.iter()), |row| {
                    Ok((row.get(0)?, row.get(1)?, row.get(2)?))
                })
        })?;

        record.assign_identity(id, created_at, version);
        Ok(())
    }

    fn get_by_key(&self, key: &R::Key) -> StoreResult<R> {
        let sql = select_sql(R::TABLE, R::KEY_COLUMN, R::COLUMNS);

        self.run(Operation::Lookup, |conn| {
            conn.prepare_cached(&sql)?
                .query_row(params_from_iter([key]), R::from_row)
        })
    }

    fn update(&self, record: &mut R) -> StoreResult<()> {
        self.validate(record, Operation::ConditionalUpdate)?;
        let mut values = record.column_values()?;
        values.push(Value::Integer(record.id()));
        values.push(Value::Integer(i64::from(record.version())));
        let sql = update_sql(R::TABLE, R::COLUMNS);

        let version: i32 = self.run(Operation::ConditionalUpdate, |conn| {
            conn.prepare_cached(&sql)?
                .query_row(params_from_iter(values.iter()), |row| row.get(0))
        })?;

        debug_assert_eq!(Some(version), record.version().checked_add(1));
        record.set_version(version);
        Ok(())
    }
}

fn insert_sql(table: &str, columns: &[&str]) -> String {
    let placeholders = (1..=columns.len())
        .map(|index| format!("?{index}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {table} ({}) VALUES ({placeholders}) RETURNING id, created_at, version;",
        columns.join(", ")
    )
}

fn select_sql(table: &str, key_column: &str, columns: &[&str]) -> String {
    format!(
        "SELECT id, created_at, version, {} FROM {table} WHERE {key_column} = ?1;",
        columns.join(", ")
    )
}

fn update_sql(table: &str, columns: &[&str]) -> String {
    let assignments = columns
        .iter()
        .enumerate()
        .map(|(index, column)| format!("{column} = ?{}", index + 1))
        .collect::<Vec<_>>()
        .join(", ");
    let id_param = columns.len() + 1;
    let version_param = columns.len() + 2;
    format!(
        "UPDATE {table} SET {assignments}, version = version + 1 \
         WHERE id = ?{id_param} AND version = ?{version_param} RETURNING version;"
    )
}
