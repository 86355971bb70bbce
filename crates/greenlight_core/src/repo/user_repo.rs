//! `users` table mapping.
//!
//! Users are looked up by email. The column is `COLLATE NOCASE` and carries
//! the `users_email_key` unique constraint, so uniqueness and lookups are
//! both case-insensitive and enforced by SQLite.

use crate::credential::Password;
use crate::model::user::{validate_user, User};
use crate::model::RecordId;
use crate::repo::error::StoreResult;
use crate::repo::record_store::{Record, SqliteRecordStore};
use crate::validator::Validator;
use rusqlite::types::Value;
use rusqlite::Row;

pub type UserStore<'conn> = SqliteRecordStore<'conn, User>;

impl Record for User {
    type Key = str;

    const TABLE: &'static str = "users";
    const KEY_COLUMN: &'static str = "email";
    const COLUMNS: &'static [&'static str] = &["name", "email", "password_hash", "activated"];

    fn validate(&self, v: &mut Validator) {
        validate_user(v, self);
    }

    fn column_values(&self) -> StoreResult<Vec<Value>> {
        // Only the hash has a column; the transient plaintext is never written.
        Ok(vec![
            Value::Text(self.name.clone()),
            Value::Text(self.email.clone()),
            Value::Text(self.password.hash().to_string()),
            Value::Integer(i64::from(self.activated)),
        ])
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            created_at: row.get("created_at")?,
            name: row.get("name")?,
            email: row.get("email")?,
            password: Password::from_hash(row.get::<_, String>("password_hash")?),
            activated: row.get("activated")?,
            version: row.get("version")?,
        })
    }

    fn id(&self) -> RecordId {
        self.id
    }

    fn version(&self) -> i32 {
        self.version
    }

    fn assign_identity(&mut self, id: RecordId, created_at: i64, version: i32) {
        self.id = id;
        self.created_at = created_at;
        self.version = version;
    }

    fn set_version(&mut self, version: i32) {
        self.version = version;
    }
}
