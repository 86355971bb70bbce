//! Account use-case service.

use crate::config::CoreConfig;
use crate::credential::{CredentialError, Password, DEFAULT_PASSWORD_COST};
use crate::model::user::{validate_password_plaintext, User};
use crate::repo::error::StoreError;
use crate::repo::record_store::VersionedStore;
use crate::validator::{FieldErrors, Validator};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type UserServiceResult<T> = Result<T, UserServiceError>;

#[derive(Debug)]
pub enum UserServiceError {
    /// Field-level problems the client can fix, duplicate emails included.
    Validation(FieldErrors),
    Credential(CredentialError),
    Store(StoreError),
}

impl Display for UserServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(errors) => {
                let fields = errors.keys().cloned().collect::<Vec<_>>().join(", ");
                write!(f, "invalid fields: {fields}")
            }
            Self::Credential(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for UserServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(_) => None,
            Self::Credential(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<CredentialError> for UserServiceError {
    fn from(value: CredentialError) -> Self {
        Self::Credential(value)
    }
}

impl From<StoreError> for UserServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Validation(errors) => Self::Validation(errors),
            other => Self::Store(other),
        }
    }
}

/// Use-case service wrapper for user accounts.
pub struct UserService<S: VersionedStore<User>> {
    store: S,
    password_cost: u32,
}

impl<S: VersionedStore<User>> UserService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            password_cost: DEFAULT_PASSWORD_COST,
        }
    }

    /// Overrides the bcrypt cost used for newly derived credentials.
    pub fn with_password_cost(mut self, cost: u32) -> Self {
        self.password_cost = cost;
        self
    }

    /// Derives credentials at the configured `password_cost`.
    pub fn from_config(store: S, config: &CoreConfig) -> Self {
        Self::new(store).with_password_cost(config.password_cost)
    }

    /// Registers a new, not yet activated account.
    ///
    /// # Contract
    /// - Plaintext rules are checked before paying for the hash.
    /// - An email already on file becomes a field error on `email`.
    pub fn register(&self, name: &str, email: &str, plaintext: &str) -> UserServiceResult<User> {
        let mut v = Validator::new();
        validate_password_plaintext(&mut v, plaintext);
        if !v.valid() {
            return Err(UserServiceError::Validation(v.into_errors()));
        }

        let password = Password::set_with_cost(plaintext, self.password_cost)?;
        let mut user = User::new(name, email, password);

        match self.store.insert(&mut user) {
            Ok(()) => {
                info!(
                    "event=user_register module=service status=ok user_id={}",
                    user.id
                );
                Ok(user)
            }
            Err(StoreError::DuplicateKey { .. }) => {
                v.add_error("email", "a user with this email already exists");
                Err(UserServiceError::Validation(v.into_errors()))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Returns the account when `email` exists and `plaintext` matches.
    pub fn authenticate(&self, email: &str, plaintext: &str) -> UserServiceResult<Option<User>> {
        let user = match self.store.get_by_key(email) {
            Ok(user) => user,
            Err(StoreError::NotFound) => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        if user.password.matches(plaintext)? {
            Ok(Some(user))
        } else {
            info!(
                "event=user_authenticate module=service status=mismatch user_id={}",
                user.id
            );
            Ok(None)
        }
    }

    /// Replaces the credential with a freshly derived one.
    ///
    /// Fails with `EditConflict` when `user` is stale.
    pub fn change_password(&self, user: &mut User, plaintext: &str) -> UserServiceResult<()> {
        let mut v = Validator::new();
        validate_password_plaintext(&mut v, plaintext);
        if !v.valid() {
            return Err(UserServiceError::Validation(v.into_errors()));
        }

        let previous = std::mem::replace(
            &mut user.password,
            Password::set_with_cost(plaintext, self.password_cost)?,
        );

        if let Err(err) = self.store.update(user) {
            user.password = previous;
            return Err(err.into());
        }
        Ok(())
    }

    /// Marks the account as activated.
    pub fn activate(&self, user: &mut User) -> UserServiceResult<()> {
        let previous = std::mem::replace(&mut user.activated, true);
        if let Err(err) = self.store.update(user) {
            user.activated = previous;
            return Err(err.into());
        }
        Ok(())
    }
}
