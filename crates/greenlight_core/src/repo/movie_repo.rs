//! `movies` table mapping.
//!
//! Runtime is stored as plain minutes; genres as a JSON array of strings.

use crate::model::movie::{validate_movie, Movie};
use crate::model::RecordId;
use crate::repo::error::{StoreError, StoreResult};
use crate::repo::record_store::{Record, SqliteRecordStore};
use crate::validator::Validator;
use rusqlite::types::{Type, Value};
use rusqlite::Row;

pub type MovieStore<'conn> = SqliteRecordStore<'conn, Movie>;

impl Record for Movie {
    type Key = RecordId;

    const TABLE: &'static str = "movies";
    const KEY_COLUMN: &'static str = "id";
    const COLUMNS: &'static [&'static str] = &["title", "year", "runtime", "genres"];

    fn validate(&self, v: &mut Validator) {
        validate_movie(v, self);
    }

    fn column_values(&self) -> StoreResult<Vec<Value>> {
        let genres =
            serde_json::to_string(&self.genres).map_err(|err| StoreError::Unknown(Box::new(err)))?;
        Ok(vec![
            Value::Text(self.title.clone()),
            Value::Integer(i64::from(self.year)),
            Value::Integer(i64::from(self.runtime.minutes())),
            Value::Text(genres),
        ])
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let genres_index = row.as_ref().column_index("genres")?;
        let genres_json: String = row.get(genres_index)?;
        let genres = serde_json::from_str(&genres_json).map_err(|err| {
            rusqlite::Error::FromSqlConversionFailure(genres_index, Type::Text, Box::new(err))
        })?;

        Ok(Self {
            id: row.get("id")?,
            created_at: row.get("created_at")?,
            title: row.get("title")?,
            year: row.get("year")?,
            runtime: row.get("runtime")?,
            genres,
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
