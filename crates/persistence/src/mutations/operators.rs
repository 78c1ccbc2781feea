// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Operator and session mutations.

use diesel::SqliteConnection;
use diesel::prelude::*;
use diesel::sql_types::{Nullable, Text};
use tracing::{debug, info};

use crate::backend::PersistenceBackend;
use crate::diesel_schema::{operators, sessions};
use crate::error::PersistenceError;

/// Creates a new operator.
///
/// The `login_name` is normalized to uppercase for case-insensitive uniqueness.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `login_name` - The login name (will be normalized)
/// * `display_name` - The display name
/// * `password` - The plain-text password (will be hashed)
/// * `role` - The role (`Admin` or `Dispatcher`)
///
/// # Errors
///
/// Returns an error if the operator cannot be created or if the login name
/// already exists.
pub fn create_operator(
    conn: &mut SqliteConnection,
    login_name: &str,
    display_name: &str,
    password: &str,
    role: &str,
) -> Result<i64, PersistenceError> {
    let normalized_login: String = login_name.trim().to_uppercase();

    info!(
        login_name = %normalized_login,
        role,
        "Creating operator"
    );

    let password_hash: String = bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| PersistenceError::Other(format!("Failed to hash password: {e}")))?;

    diesel::insert_into(operators::table)
        .values((
            operators::login_name.eq(&normalized_login),
            operators::display_name.eq(display_name),
            operators::password_hash.eq(&password_hash),
            operators::role.eq(role),
        ))
        .execute(conn)?;

    let operator_id: i64 = conn.get_last_insert_rowid()?;
    info!(operator_id, "Operator created");
    Ok(operator_id)
}

/// Updates the last login timestamp for an operator.
///
/// # Errors
///
/// Returns an error if the database update fails.
pub fn update_last_login(
    conn: &mut SqliteConnection,
    operator_id: i64,
) -> Result<(), PersistenceError> {
    debug!("Updating last_login_at for operator ID: {}", operator_id);

    diesel::update(operators::table)
        .filter(operators::operator_id.eq(operator_id))
        .set(operators::last_login_at.eq(diesel::dsl::sql::<Nullable<Text>>("CURRENT_TIMESTAMP")))
        .execute(conn)?;

    Ok(())
}

/// Creates a new session for an operator.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `session_token` - The unique session token
/// * `csrf_token` - The anti-forgery token bound to this session
/// * `operator_id` - The operator ID
/// * `expires_at` - The expiry in unix seconds
///
/// # Errors
///
/// Returns an error if the session cannot be created.
pub fn create_session(
    conn: &mut SqliteConnection,
    session_token: &str,
    csrf_token: &str,
    operator_id: i64,
    expires_at: i64,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(sessions::table)
        .values((
            sessions::session_token.eq(session_token),
            sessions::csrf_token.eq(csrf_token),
            sessions::operator_id.eq(operator_id),
            sessions::expires_at.eq(expires_at),
        ))
        .execute(conn)?;

    let session_id: i64 = conn.get_last_insert_rowid()?;
    debug!(session_id, operator_id, expires_at, "Session created");
    Ok(session_id)
}

/// Updates the last activity timestamp for a session.
///
/// # Errors
///
/// Returns an error if the database update fails.
pub fn update_session_activity(
    conn: &mut SqliteConnection,
    session_id: i64,
) -> Result<(), PersistenceError> {
    diesel::update(sessions::table)
        .filter(sessions::session_id.eq(session_id))
        .set(sessions::last_activity_at.eq(diesel::dsl::sql::<Text>("CURRENT_TIMESTAMP")))
        .execute(conn)?;

    Ok(())
}

/// Deletes a session by token.
///
/// # Errors
///
/// Returns an error if the database delete fails.
pub fn delete_session(
    conn: &mut SqliteConnection,
    session_token: &str,
) -> Result<(), PersistenceError> {
    debug!("Deleting session by token");

    diesel::delete(sessions::table)
        .filter(sessions::session_token.eq(session_token))
        .execute(conn)?;

    Ok(())
}

/// Deletes all sessions that expired before `now` (unix seconds).
///
/// # Errors
///
/// Returns an error if the database delete fails.
pub fn delete_expired_sessions(
    conn: &mut SqliteConnection,
    now: i64,
) -> Result<usize, PersistenceError> {
    let rows_affected: usize = diesel::delete(sessions::table)
        .filter(sessions::expires_at.le(now))
        .execute(conn)?;

    if rows_affected > 0 {
        info!("Deleted {} expired sessions", rows_affected);
    }
    Ok(rows_affected)
}
