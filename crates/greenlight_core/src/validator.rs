//! Field-level validation accumulator.
//!
//! Collects at most one message per field so callers can report every
//! problem of a request at once.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::hash::Hash;

/// Field name -> first failure message recorded for it.
pub type FieldErrors = BTreeMap<String, String>;

/// Reusable email-shape matcher.
pub static EMAIL_RX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("valid email regex")
});

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validator {
    errors: FieldErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Records `message` under `key` unless the field already has one.
    pub fn add_error(&mut self, key: &str, message: &str) {
        self.errors
            .entry(key.to_string())
            .or_insert_with(|| message.to_string());
    }

    /// Records `message` under `key` when `ok` is false.
    pub fn check(&mut self, ok: bool, key: &str, message: &str) {
        if !ok {
            self.add_error(key, message);
        }
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn into_errors(self) -> FieldErrors {
        self.errors
    }
}

pub fn matches(value: &str, rx: &Regex) -> bool {
    rx.is_match(value)
}

/// True when no element appears twice.
pub fn unique<T: Eq + Hash>(values: &[T]) -> bool {
    let mut seen = HashSet::with_capacity(values.len());
    values.iter().all(|value| seen.insert(value))
}

#[cfg(test)]
mod tests {
    use super::{matches, unique, Validator, EMAIL_RX};

    #[test]
    fn first_message_per_field_wins() {
        let mut v = Validator::new();
        v.check(false, "email", "must be provided");
        v.add_error("email", "must be a valid email address");

        assert!(!v.valid());
        assert_eq!(v.errors()["email"], "must be provided");
    }

    #[test]
    fn passing_checks_leave_validator_valid() {
        let mut v = Validator::new();
        v.check(true, "name", "must be provided");
        assert!(v.valid());
        assert!(v.into_errors().is_empty());
    }

    #[test]
    fn email_matcher_accepts_common_shapes() {
        assert!(matches("ada@example.com", &EMAIL_RX));
        assert!(matches("first.last+tag@sub.example.org", &EMAIL_RX));
        assert!(!matches("ada@", &EMAIL_RX));
        assert!(!matches("not an email", &EMAIL_RX));
    }

    #[test]
    fn unique_detects_repeats() {
        assert!(unique(&["drama", "comedy"]));
        assert!(!unique(&["drama", "drama"]));
        assert!(unique::<&str>(&[]));
    }
}
