//! Core persistence for the Greenlight movie catalog.
//! Owns the user and movie records, their validation, the credential
//! lifecycle and the version-checked store both record kinds share.

pub mod config;
pub mod credential;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod validator;

pub use config::{ConfigError, CoreConfig};
pub use credential::{CredentialError, Password};
pub use db::{open_db, open_db_in_memory, DbError, DeadlineExceeded, DeadlineGuard};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::movie::Movie;
pub use model::runtime::{Runtime, RuntimeFormatError};
pub use model::user::User;
pub use model::RecordId;
pub use repo::error::{StoreError, StoreResult};
pub use repo::movie_repo::MovieStore;
pub use repo::record_store::{Record, SqliteRecordStore, VersionedStore};
pub use repo::user_repo::UserStore;
pub use repo::Models;
pub use service::movie_service::{MovieChanges, MovieService};
pub use service::user_service::{UserService, UserServiceError, UserServiceResult};
pub use validator::{FieldErrors, Validator};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
