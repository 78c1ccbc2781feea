// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit event queries.

use cargodesk_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use diesel::SqliteConnection;
use diesel::prelude::*;

use crate::data_models::{ActionData, ActorData, CauseData, StateSnapshotData};
use crate::diesel_schema::audit_events;
use crate::error::PersistenceError;

/// Diesel Queryable struct for full audit event rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = audit_events)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
struct AuditEventRow {
    event_id: i64,
    booking_id: Option<i64>,
    actor_operator_id: Option<i64>,
    actor_login_name: String,
    actor_display_name: String,
    actor_json: String,
    cause_json: String,
    action_json: String,
    before_snapshot_json: String,
    after_snapshot_json: String,
    created_at: String,
}

fn event_from_row(row: AuditEventRow) -> Result<AuditEvent, PersistenceError> {
    let actor_data: ActorData = serde_json::from_str(&row.actor_json)?;
    let cause_data: CauseData = serde_json::from_str(&row.cause_json)?;
    let action_data: ActionData = serde_json::from_str(&row.action_json)?;
    let before_data: StateSnapshotData = serde_json::from_str(&row.before_snapshot_json)?;
    let after_data: StateSnapshotData = serde_json::from_str(&row.after_snapshot_json)?;

    let actor: Actor = match row.actor_operator_id {
        Some(operator_id) => {
            Actor::with_operator(operator_id, row.actor_login_name, row.actor_display_name)
        }
        None => Actor::new(actor_data.id, actor_data.actor_type),
    };

    Ok(AuditEvent {
        event_id: Some(row.event_id),
        booking_id: row.booking_id,
        actor,
        cause: Cause::new(cause_data.id, cause_data.description),
        action: Action::new(action_data.name, action_data.details),
        before: StateSnapshot::new(before_data.data),
        after: StateSnapshot::new(after_data.data),
        recorded_at: Some(row.created_at),
    })
}

/// Retrieves an audit event by ID.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the event does not exist, or an
/// error if it cannot be deserialized.
pub fn get_audit_event(
    conn: &mut SqliteConnection,
    event_id: i64,
) -> Result<AuditEvent, PersistenceError> {
    let row: AuditEventRow = audit_events::table
        .filter(audit_events::event_id.eq(event_id))
        .select(AuditEventRow::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| PersistenceError::NotFound(format!("Audit event {event_id}")))?;

    event_from_row(row)
}

/// Lists the audit timeline of a booking, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or an event cannot be deserialized.
pub fn list_audit_events_for_booking(
    conn: &mut SqliteConnection,
    booking_id: i64,
) -> Result<Vec<AuditEvent>, PersistenceError> {
    audit_events::table
        .filter(audit_events::booking_id.eq(booking_id))
        .order(audit_events::event_id.asc())
        .select(AuditEventRow::as_select())
        .load::<AuditEventRow>(conn)?
        .into_iter()
        .map(event_from_row)
        .collect()
}
