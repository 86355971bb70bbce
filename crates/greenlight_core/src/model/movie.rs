//! Movie catalog record.

use crate::model::runtime::Runtime;
use crate::model::RecordId;
use crate::validator::{unique, Validator};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

const TITLE_MAX_BYTES: usize = 500;
const EARLIEST_YEAR: i32 = 1888;
const MAX_GENRES: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    #[serde(default)]
    pub id: RecordId,
    #[serde(skip_deserializing)]
    pub created_at: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "is_zero_year")]
    pub year: i32,
    #[serde(default, skip_serializing_if = "is_zero_runtime")]
    pub runtime: Runtime,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,
    #[serde(default)]
    pub version: i32,
}

impl Movie {
    /// Builds a not-yet-persisted movie.
    pub fn new(
        title: impl Into<String>,
        year: i32,
        runtime: Runtime,
        genres: Vec<String>,
    ) -> Self {
        Self {
            title: title.into(),
            year,
            runtime,
            genres,
            ..Self::default()
        }
    }
}

fn is_zero_year(year: &i32) -> bool {
    *year == 0
}

fn is_zero_runtime(runtime: &Runtime) -> bool {
    runtime.minutes() == 0
}

pub fn validate_movie(v: &mut Validator, movie: &Movie) {
    v.check(!movie.title.is_empty(), "title", "must be provided");
    v.check(
        movie.title.len() <= TITLE_MAX_BYTES,
        "title",
        "must not be more than 500 bytes long",
    );

    v.check(movie.year != 0, "year", "must be provided");
    v.check(
        movie.year >= EARLIEST_YEAR,
        "year",
        "must be greater than 1888",
    );
    v.check(
        movie.year <= OffsetDateTime::now_utc().year(),
        "year",
        "must not be in the future",
    );

    v.check(movie.runtime.minutes() != 0, "runtime", "must be provided");
    v.check(
        movie.runtime.minutes() > 0,
        "runtime",
        "must be a positive integer",
    );

    v.check(!movie.genres.is_empty(), "genres", "must contain at least 1 genre");
    v.check(
        movie.genres.len() <= MAX_GENRES,
        "genres",
        "must not contain more than 5 genres",
    );
    v.check(unique(&movie.genres), "genres", "must not contain duplicate values");
}
