// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Operator and session queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;

use crate::data_models::{OperatorData, SessionData};
use crate::diesel_schema::{operators, sessions};
use crate::error::PersistenceError;

/// Diesel Queryable struct for operator rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = operators)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
struct OperatorRow {
    operator_id: i64,
    login_name: String,
    display_name: String,
    password_hash: String,
    role: String,
    is_disabled: i32,
    created_at: String,
    last_login_at: Option<String>,
}

impl From<OperatorRow> for OperatorData {
    fn from(row: OperatorRow) -> Self {
        Self {
            operator_id: row.operator_id,
            login_name: row.login_name,
            display_name: row.display_name,
            password_hash: row.password_hash,
            role: row.role,
            is_disabled: row.is_disabled != 0,
            created_at: row.created_at,
            last_login_at: row.last_login_at,
        }
    }
}

/// Diesel Queryable struct for session rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = sessions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
struct SessionRow {
    session_id: i64,
    session_token: String,
    csrf_token: String,
    operator_id: i64,
    created_at: String,
    last_activity_at: String,
    expires_at: i64,
}

impl From<SessionRow> for SessionData {
    fn from(row: SessionRow) -> Self {
        Self {
            session_id: row.session_id,
            session_token: row.session_token,
            csrf_token: row.csrf_token,
            operator_id: row.operator_id,
            created_at: row.created_at,
            last_activity_at: row.last_activity_at,
            expires_at: row.expires_at,
        }
    }
}

/// Retrieves an operator by login name.
///
/// The `login_name` is normalized to uppercase for case-insensitive lookup.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the operator is not found.
pub fn get_operator_by_login(
    conn: &mut SqliteConnection,
    login_name: &str,
) -> Result<Option<OperatorData>, PersistenceError> {
    let normalized_login: String = login_name.trim().to_uppercase();
    debug!("Looking up operator by login_name: {}", normalized_login);

    Ok(operators::table
        .filter(operators::login_name.eq(&normalized_login))
        .select(OperatorRow::as_select())
        .first(conn)
        .optional()?
        .map(OperatorData::from))
}

/// Retrieves an operator by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the operator is not found.
pub fn get_operator_by_id(
    conn: &mut SqliteConnection,
    operator_id: i64,
) -> Result<Option<OperatorData>, PersistenceError> {
    debug!("Looking up operator by ID: {}", operator_id);

    Ok(operators::table
        .filter(operators::operator_id.eq(operator_id))
        .select(OperatorRow::as_select())
        .first(conn)
        .optional()?
        .map(OperatorData::from))
}

/// Retrieves a session by token.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the session is not found.
pub fn get_session_by_token(
    conn: &mut SqliteConnection,
    session_token: &str,
) -> Result<Option<SessionData>, PersistenceError> {
    debug!("Looking up session by token");

    Ok(sessions::table
        .filter(sessions::session_token.eq(session_token))
        .select(SessionRow::as_select())
        .first(conn)
        .optional()?
        .map(SessionData::from))
}

/// Lists all operators ordered by login name.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_operators(conn: &mut SqliteConnection) -> Result<Vec<OperatorData>, PersistenceError> {
    Ok(operators::table
        .select(OperatorRow::as_select())
        .order_by(operators::login_name.asc())
        .load::<OperatorRow>(conn)?
        .into_iter()
        .map(OperatorData::from)
        .collect())
}

/// Counts the total number of operators.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_operators(conn: &mut SqliteConnection) -> Result<i64, PersistenceError> {
    let count: i64 = operators::table.count().get_result(conn)?;
    debug!("Total operators: {}", count);
    Ok(count)
}

/// Verifies a password against a stored hash.
///
/// # Errors
///
/// Returns an error if the hash cannot be parsed.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, PersistenceError> {
    bcrypt::verify(password, password_hash)
        .map_err(|e| PersistenceError::Other(format!("Failed to verify password: {e}")))
}
