//! Domain records persisted by the greenlight core.
//!
//! # Invariants
//! - `id`, `created_at` and `version` are server-assigned; a record that was
//!   never inserted carries `id == 0` and `version == 0`.
//! - `version` starts at 1 on insert and grows by exactly one per update.
//! - `created_at` is Unix epoch milliseconds.

pub mod movie;
pub mod runtime;
pub mod user;

/// Server-assigned surrogate key shared by every record kind.
pub type RecordId = i64;
