//! One-way credential storage for user accounts.
//!
//! # Responsibility
//! - Derive a bcrypt hash from a plaintext secret.
//! - Verify a candidate secret against a stored hash.
//!
//! # Invariants
//! - The plaintext is held only in memory, right after `Password::set`, so
//!   same-request validation can inspect it. It has no public accessor and
//!   the type implements neither `Serialize` nor `Deserialize`.
//! - A `Password` always carries a hash; there is no way to build one
//!   without deriving or rehydrating it.
//! - `matches` reports `false` for a clean mismatch and only errors when
//!   the stored hash itself is malformed.

use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

/// bcrypt work factor used unless the caller configures another one.
pub const DEFAULT_PASSWORD_COST: u32 = 12;

/// Cheapest cost bcrypt accepts. Only meant for tests and tooling.
pub const MIN_PASSWORD_COST: u32 = 4;

/// Most expensive cost bcrypt accepts.
pub const MAX_PASSWORD_COST: u32 = 31;

#[derive(Debug)]
pub enum CredentialError {
    HashingFailed(bcrypt::BcryptError),
}

impl Display for CredentialError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HashingFailed(err) => write!(f, "password hashing failed: {err}"),
        }
    }
}

impl Error for CredentialError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::HashingFailed(err) => Some(err),
        }
    }
}

impl From<bcrypt::BcryptError> for CredentialError {
    fn from(value: bcrypt::BcryptError) -> Self {
        Self::HashingFailed(value)
    }
}

/// Hashes `plaintext` with bcrypt at the given cost.
///
/// CPU-bound and slow on purpose. Callers on a latency-sensitive path
/// should run it on a worker thread rather than while holding a
/// connection.
pub fn derive_hash(plaintext: &str, cost: u32) -> Result<String, CredentialError> {
    Ok(bcrypt::hash(plaintext, cost)?)
}

/// Checks `candidate` against a bcrypt hash in constant time.
pub fn verify_hash(candidate: &str, stored_hash: &str) -> Result<bool, CredentialError> {
    Ok(bcrypt::verify(candidate, stored_hash)?)
}

/// Credential owned by exactly one user.
#[derive(Clone)]
pub struct Password {
    plaintext: Option<String>,
    hash: String,
}

impl Password {
    /// Derives a hash at `DEFAULT_PASSWORD_COST`.
    pub fn set(plaintext: &str) -> Result<Self, CredentialError> {
        Self::set_with_cost(plaintext, DEFAULT_PASSWORD_COST)
    }

    pub fn set_with_cost(plaintext: &str, cost: u32) -> Result<Self, CredentialError> {
        let hash = derive_hash(plaintext, cost)?;
        Ok(Self {
            plaintext: Some(plaintext.to_string()),
            hash,
        })
    }

    /// Rebuilds a credential from a persisted hash. No plaintext is attached.
    pub fn from_hash(hash: impl Into<String>) -> Self {
        Self {
            plaintext: None,
            hash: hash.into(),
        }
    }

    pub fn matches(&self, candidate: &str) -> Result<bool, CredentialError> {
        verify_hash(candidate, &self.hash)
    }

    pub(crate) fn hash(&self) -> &str {
        &self.hash
    }

    pub(crate) fn plaintext(&self) -> Option<&str> {
        self.plaintext.as_deref()
    }
}

impl Debug for Password {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Password")
            .field("plaintext", &self.plaintext.as_ref().map(|_| "<redacted>"))
            .field("hash", &"<redacted>")
            .finish()
    }
}
