//! User account record.

use crate::credential::Password;
use crate::model::RecordId;
use crate::validator::{matches, Validator, EMAIL_RX};
use serde::Serialize;

const NAME_MAX_BYTES: usize = 500;
const PASSWORD_MIN_BYTES: usize = 8;
const PASSWORD_MAX_BYTES: usize = 72;

/// Account record. Serializes to the public wire shape; the credential and
/// the version never leave the process.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: RecordId,
    pub created_at: i64,
    pub name: String,
    pub email: String,
    #[serde(skip)]
    pub password: Password,
    pub activated: bool,
    #[serde(skip)]
    pub version: i32,
}

impl User {
    /// Builds a not-yet-persisted, not-activated account.
    pub fn new(name: impl Into<String>, email: impl Into<String>, password: Password) -> Self {
        Self {
            id: 0,
            created_at: 0,
            name: name.into(),
            email: email.into(),
            password,
            activated: false,
            version: 0,
        }
    }
}

pub fn validate_email(v: &mut Validator, email: &str) {
    v.check(!email.is_empty(), "email", "must be provided");
    v.check(matches(email, &EMAIL_RX), "email", "must be a valid email address");
}

pub fn validate_password_plaintext(v: &mut Validator, plaintext: &str) {
    v.check(!plaintext.is_empty(), "password", "must be provided");
    v.check(
        plaintext.len() >= PASSWORD_MIN_BYTES,
        "password",
        "must be at least 8 bytes long",
    );
    v.check(
        plaintext.len() <= PASSWORD_MAX_BYTES,
        "password",
        "must not be more than 72 bytes long",
    );
}

pub fn validate_user(v: &mut Validator, user: &User) {
    v.check(!user.name.is_empty(), "name", "must be provided");
    v.check(
        user.name.len() <= NAME_MAX_BYTES,
        "name",
        "must not be more than 500 bytes long",
    );

    validate_email(v, &user.email);

    if let Some(plaintext) = user.password.plaintext() {
        validate_password_plaintext(v, plaintext);
    }
}

#[cfg(test)]
mod tests {
    use super::{validate_user, User};
    use crate::credential::{Password, MIN_PASSWORD_COST};
    use crate::validator::Validator;

    fn user_with_password(plaintext: &str) -> User {
        let password = Password::set_with_cost(plaintext, MIN_PASSWORD_COST).unwrap();
        User::new("Ada", "ada@example.com", password)
    }

    #[test]
    fn valid_user_passes() {
        let mut v = Validator::new();
        validate_user(&mut v, &user_with_password("correcthorsebattery"));
        assert!(v.valid(), "{:?}", v.errors());
    }

    #[test]
    fn short_plaintext_is_rejected() {
        let mut v = Validator::new();
        validate_user(&mut v, &user_with_password("short"));
        assert_eq!(v.errors()["password"], "must be at least 8 bytes long");
    }

    #[test]
    fn rehydrated_credential_skips_plaintext_rules() {
        let derived = Password::set_with_cost("short", MIN_PASSWORD_COST).unwrap();
        let user = User::new("Ada", "ada@example.com", Password::from_hash(derived.hash()));

        let mut v = Validator::new();
        validate_user(&mut v, &user);
        assert!(v.valid());
    }

    #[test]
    fn missing_name_and_bad_email_are_both_reported() {
        let mut user = user_with_password("correcthorsebattery");
        user.name.clear();
        user.email = "nope".to_string();

        let mut v = Validator::new();
        validate_user(&mut v, &user);
        assert_eq!(v.errors()["name"], "must be provided");
        assert_eq!(v.errors()["email"], "must be a valid email address");
    }

    #[test]
    fn wire_form_hides_credential_and_version() {
        let mut user = user_with_password("correcthorsebattery");
        user.id = 7;
        user.version = 3;

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["email"], "ada@example.com");
        assert_eq!(json["activated"], false);
        assert!(json.get("password").is_none());
        assert!(json.get("version").is_none());
        assert!(!json.to_string().contains("correcthorsebattery"));
    }
}
