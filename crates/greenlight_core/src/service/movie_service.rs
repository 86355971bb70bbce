//! Movie catalog use-case service.

use crate::model::movie::Movie;
use crate::model::runtime::Runtime;
use crate::model::RecordId;
use crate::repo::error::{StoreError, StoreResult};
use crate::repo::record_store::VersionedStore;
use serde::Deserialize;

/// Partial update request; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MovieChanges {
    pub title: Option<String>,
    pub year: Option<i32>,
    pub runtime: Option<Runtime>,
    pub genres: Option<Vec<String>>,
}

impl MovieChanges {
    pub fn apply_to(&self, movie: &mut Movie) {
        if let Some(title) = &self.title {
            movie.title.clone_from(title);
        }
        if let Some(year) = self.year {
            movie.year = year;
        }
        if let Some(runtime) = self.runtime {
            movie.runtime = runtime;
        }
        if let Some(genres) = &self.genres {
            movie.genres.clone_from(genres);
        }
    }
}

pub struct MovieService<S: VersionedStore<Movie>> {
    store: S,
}

impl<S: VersionedStore<Movie>> MovieService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Inserts `movie`, filling in its id, creation time and version.
    pub fn create(&self, movie: &mut Movie) -> StoreResult<()> {
        self.store.insert(movie)
    }

    pub fn get(&self, id: RecordId) -> StoreResult<Movie> {
        self.store.get_by_key(&id)
    }

    /// Reads the movie, applies `changes` and writes it back.
    ///
    /// # Contract
    /// - `expected_version`, when given, must equal the stored version or
    ///   the call fails with `EditConflict` before writing.
    /// - A concurrent writer between the read and the write also yields
    ///   `EditConflict`; nothing is retried here.
    pub fn update(
        &self,
        id: RecordId,
        expected_version: Option<i32>,
        changes: &MovieChanges,
    ) -> StoreResult<Movie> {
        let mut movie = self.store.get_by_key(&id)?;
        if expected_version.is_some_and(|version| version != movie.version) {
            return Err(StoreError::EditConflict);
        }

        changes.apply_to(&mut movie);
        self.store.update(&mut movie)?;
        Ok(movie)
    }
}
