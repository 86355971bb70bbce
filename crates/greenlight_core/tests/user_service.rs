use greenlight_core::credential::MIN_PASSWORD_COST;
use greenlight_core::db::open_db_in_memory;
use greenlight_core::{StoreError, UserService, UserServiceError, UserStore};

fn service(conn: &rusqlite::Connection) -> UserService<UserStore<'_>> {
    UserService::new(UserStore::new(conn)).with_password_cost(MIN_PASSWORD_COST)
}

#[test]
fn registered_user_authenticates_with_the_same_secret() {
    let conn = open_db_in_memory().unwrap();
    let users = service(&conn);

    let user = users
        .register("Ada", "ada@example.com", "correcthorsebattery")
        .unwrap();
    assert_eq!(user.version, 1);

    let found = users
        .authenticate("ada@example.com", "correcthorsebattery")
        .unwrap()
        .unwrap();
    assert_eq!(found.id, user.id);

    assert!(users
        .authenticate("ada@example.com", "correcthorsebatterz")
        .unwrap()
        .is_none());
    assert!(users
        .authenticate("grace@example.com", "correcthorsebattery")
        .unwrap()
        .is_none());
}

#[test]
fn duplicate_email_becomes_a_field_error() {
    let conn = open_db_in_memory().unwrap();
    let users = service(&conn);

    users
        .register("Ada", "ada@example.com", "correcthorsebattery")
        .unwrap();
    match users
        .register("Imposter", "ADA@example.com", "anotherlongsecret")
        .unwrap_err()
    {
        UserServiceError::Validation(errors) => {
            assert_eq!(errors["email"], "a user with this email already exists");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn short_password_is_rejected_before_hashing() {
    let conn = open_db_in_memory().unwrap();
    let users = service(&conn);

    match users.register("Ada", "ada@example.com", "short").unwrap_err() {
        UserServiceError::Validation(errors) => {
            assert_eq!(errors["password"], "must be at least 8 bytes long");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn change_password_replaces_the_credential() {
    let conn = open_db_in_memory().unwrap();
    let users = service(&conn);

    let mut user = users
        .register("Ada", "ada@example.com", "correcthorsebattery")
        .unwrap();
    users.change_password(&mut user, "analyticalengine").unwrap();
    assert_eq!(user.version, 2);

    assert!(users
        .authenticate("ada@example.com", "correcthorsebattery")
        .unwrap()
        .is_none());
    assert!(users
        .authenticate("ada@example.com", "analyticalengine")
        .unwrap()
        .is_some());
}

#[test]
fn stale_activation_conflicts_and_rolls_back() {
    let conn = open_db_in_memory().unwrap();
    let users = service(&conn);

    let mut user = users
        .register("Ada", "ada@example.com", "correcthorsebattery")
        .unwrap();
    let mut stale = user.clone();

    users.activate(&mut user).unwrap();
    assert!(user.activated);
    assert_eq!(user.version, 2);

    let err = users.activate(&mut stale).unwrap_err();
    assert!(matches!(
        err,
        UserServiceError::Store(StoreError::EditConflict)
    ));
    assert!(!stale.activated);
    assert_eq!(stale.version, 1);
}
