// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{OperatorData, Persistence, PersistenceError, SessionData};

#[test]
fn test_create_operator_normalizes_login_and_hashes_password() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();

    let operator_id: i64 = persistence
        .create_operator("dispatch1", "Dispatch One", "secret-pass", "Dispatcher")
        .unwrap();

    let operator: OperatorData = persistence
        .get_operator_by_login("Dispatch1")
        .unwrap()
        .unwrap();
    assert_eq!(operator.operator_id, operator_id);
    assert_eq!(operator.login_name, "DISPATCH1");
    assert_eq!(operator.role, "Dispatcher");
    assert!(!operator.is_disabled);
    assert_ne!(operator.password_hash, "secret-pass");
    assert!(Persistence::verify_password("secret-pass", &operator.password_hash).unwrap());
    assert!(!Persistence::verify_password("wrong-pass", &operator.password_hash).unwrap());
    assert_eq!(persistence.count_operators().unwrap(), 1);
}

#[test]
fn test_duplicate_login_is_rejected() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    persistence
        .create_operator("admin", "Admin", "secret-pass", "Admin")
        .unwrap();

    let result: Result<i64, PersistenceError> =
        persistence.create_operator("ADMIN", "Other", "secret-pass", "Admin");

    assert!(matches!(result, Err(PersistenceError::DuplicateEntry(_))));
}

#[test]
fn test_session_lifecycle() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let operator_id: i64 = persistence
        .create_operator("admin", "Admin", "secret-pass", "Admin")
        .unwrap();

    persistence
        .create_session("tok-live", "csrf-live", operator_id, 2_000)
        .unwrap();
    persistence
        .create_session("tok-old", "csrf-old", operator_id, 500)
        .unwrap();

    let session: SessionData = persistence.get_session_by_token("tok-live").unwrap().unwrap();
    assert_eq!(session.operator_id, operator_id);
    assert_eq!(session.csrf_token, "csrf-live");
    assert_eq!(session.expires_at, 2_000);
    persistence.update_session_activity(session.session_id).unwrap();

    assert_eq!(persistence.delete_expired_sessions(1_000).unwrap(), 1);
    assert!(persistence.get_session_by_token("tok-old").unwrap().is_none());

    persistence.delete_session("tok-live").unwrap();
    assert!(persistence.get_session_by_token("tok-live").unwrap().is_none());
}

#[test]
fn test_unknown_operator_lookups_return_none() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();

    assert!(persistence.get_operator_by_login("nobody").unwrap().is_none());
    assert!(persistence.get_operator_by_id(42).unwrap().is_none());
    assert!(persistence.list_operators().unwrap().is_empty());
}
