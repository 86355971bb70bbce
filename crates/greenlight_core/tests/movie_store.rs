use greenlight_core::db::open_db_in_memory;
use greenlight_core::{
    Movie, MovieChanges, MovieService, MovieStore, Runtime, StoreError, VersionedStore,
};

fn casablanca() -> Movie {
    Movie::new(
        "Casablanca",
        1942,
        Runtime(102),
        vec!["drama".to_string(), "romance".to_string()],
    )
}

#[test]
fn runtime_is_stored_as_plain_minutes() {
    let conn = open_db_in_memory().unwrap();
    let store = MovieStore::new(&conn);

    let mut movie = casablanca();
    store.insert(&mut movie).unwrap();

    let (runtime, genres): (i64, String) = conn
        .query_row(
            "SELECT runtime, genres FROM movies WHERE id = ?1;",
            [movie.id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(runtime, 102);
    assert_eq!(genres, r#"["drama","romance"]"#);
}

#[test]
fn inserted_movie_reads_back_identically() {
    let conn = open_db_in_memory().unwrap();
    let store = MovieStore::new(&conn);

    let mut movie = casablanca();
    store.insert(&mut movie).unwrap();
    assert_eq!(movie.version, 1);

    let loaded = store.get_by_key(&movie.id).unwrap();
    assert_eq!(loaded, movie);
}

#[test]
fn missing_movie_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let store = MovieStore::new(&conn);

    let err = store.get_by_key(&7).unwrap_err();
    assert!(matches!(err, StoreError::NotFound), "{err}");
}

#[test]
fn invalid_movie_is_rejected_before_insert() {
    let conn = open_db_in_memory().unwrap();
    let store = MovieStore::new(&conn);

    let mut movie = Movie::new("", 1700, Runtime(0), Vec::new());
    match store.insert(&mut movie).unwrap_err() {
        StoreError::Validation(errors) => {
            assert_eq!(errors["title"], "must be provided");
            assert_eq!(errors["year"], "must be greater than 1888");
            assert_eq!(errors["runtime"], "must be provided");
            assert_eq!(errors["genres"], "must contain at least 1 genre");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(movie.id, 0);
}

#[test]
fn service_update_bumps_version_and_applies_changes() {
    let conn = open_db_in_memory().unwrap();
    let service = MovieService::new(MovieStore::new(&conn));

    let mut movie = casablanca();
    service.create(&mut movie).unwrap();

    let changes = MovieChanges {
        runtime: Some(Runtime(103)),
        ..MovieChanges::default()
    };
    let updated = service.update(movie.id, Some(1), &changes).unwrap();
    assert_eq!(updated.version, 2);
    assert_eq!(updated.runtime, Runtime(103));
    assert_eq!(updated.title, "Casablanca");

    let loaded = service.get(movie.id).unwrap();
    assert_eq!(loaded, updated);
}

#[test]
fn service_update_with_stale_expected_version_conflicts() {
    let conn = open_db_in_memory().unwrap();
    let service = MovieService::new(MovieStore::new(&conn));

    let mut movie = casablanca();
    service.create(&mut movie).unwrap();
    service
        .update(movie.id, None, &MovieChanges::default())
        .unwrap();

    let changes = MovieChanges {
        title: Some("Casablanca (1942)".to_string()),
        ..MovieChanges::default()
    };
    let err = service.update(movie.id, Some(1), &changes).unwrap_err();
    assert!(matches!(err, StoreError::EditConflict), "{err}");

    let loaded = service.get(movie.id).unwrap();
    assert_eq!(loaded.title, "Casablanca");
    assert_eq!(loaded.version, 2);
}

#[test]
fn service_update_of_missing_movie_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = MovieService::new(MovieStore::new(&conn));

    let err = service
        .update(99, None, &MovieChanges::default())
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound), "{err}");
}

#[test]
fn update_at_version_ceiling_fails_without_panicking() {
    let conn = open_db_in_memory().unwrap();
    let store = MovieStore::new(&conn);

    let mut movie = casablanca();
    store.insert(&mut movie).unwrap();
    conn.execute(
        "UPDATE movies SET version = ?1 WHERE id = ?2;",
        rusqlite::params![i32::MAX, movie.id],
    )
    .unwrap();

    let mut loaded = store.get_by_key(&movie.id).unwrap();
    assert_eq!(loaded.version, i32::MAX);

    let err = store.update(&mut loaded).unwrap_err();
    assert!(matches!(err, StoreError::Unknown(_)), "{err}");
    assert_eq!(loaded.version, i32::MAX);
}
