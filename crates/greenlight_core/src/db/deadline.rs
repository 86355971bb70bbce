//! Scoped per-call deadlines for SQLite round trips.
//!
//! A `DeadlineGuard` is armed at the start of a store call and bounds both
//! ways a statement can stall:
//! - lock contention, through the connection busy timeout;
//! - long-running statements, through a progress handler that interrupts
//!   the VM once the deadline has passed (`SQLITE_INTERRUPT`).
//!
//! Dropping the guard disarms both, on every exit path. SQLite rolls back an
//! interrupted statement, so an aborted call never leaves a partial write.

use super::DEFAULT_BUSY_TIMEOUT;
use log::warn;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{Duration, Instant};

/// Number of VM instructions between two deadline checks.
const PROGRESS_CHECK_OPS: i32 = 1_000;

/// Largest busy timeout SQLite accepts (milliseconds as a C int).
const MAX_BUSY_TIMEOUT: Duration = Duration::from_millis(i32::MAX as u64);

pub struct DeadlineGuard<'conn> {
    conn: &'conn Connection,
    deadline: Option<Instant>,
}

impl<'conn> DeadlineGuard<'conn> {
    /// Arms a deadline of `budget` measured from now on `conn`.
    pub fn arm(conn: &'conn Connection, budget: Duration) -> rusqlite::Result<Self> {
        let deadline = Instant::now().checked_add(budget);
        conn.busy_timeout(budget.min(MAX_BUSY_TIMEOUT))?;
        if let Some(deadline) = deadline {
            conn.progress_handler(
                PROGRESS_CHECK_OPS,
                Some(move || Instant::now() >= deadline),
            );
        }

        Ok(Self { conn, deadline })
    }

    /// True once the statement in flight is due to be interrupted.
    pub fn is_expired(&self) -> bool {
        self.deadline
            .is_some_and(|deadline| Instant::now() >= deadline)
    }
}

impl Drop for DeadlineGuard<'_> {
    fn drop(&mut self) {
        self.conn.progress_handler(0, None::<fn() -> bool>);
        if let Err(err) = self.conn.busy_timeout(DEFAULT_BUSY_TIMEOUT) {
            warn!("event=deadline_disarm module=db status=error error={err}");
        }
    }
}

/// A backend call that did not finish within its budget.
///
/// Surfaces to callers wrapped in `StoreError::Unknown`.
#[derive(Debug)]
pub struct DeadlineExceeded {
    pub budget: Duration,
    source: Box<dyn Error + Send + Sync + 'static>,
}

impl DeadlineExceeded {
    pub fn new(budget: Duration, source: impl Error + Send + Sync + 'static) -> Self {
        Self {
            budget,
            source: Box::new(source),
        }
    }
}

impl Display for DeadlineExceeded {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "storage call exceeded its {} ms deadline: {}",
            self.budget.as_millis(),
            self.source
        )
    }
}

impl Error for DeadlineExceeded {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.source.as_ref())
    }
}
