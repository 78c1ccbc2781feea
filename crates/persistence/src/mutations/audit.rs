// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit event persistence.

use cargodesk_audit::AuditEvent;
use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;

use crate::backend::PersistenceBackend;
use crate::data_models::{ActionData, ActorData, CauseData, StateSnapshotData};
use crate::diesel_schema::audit_events;
use crate::error::PersistenceError;

/// Persists an audit event.
///
/// The event's own `booking_id` is used unless `booking_id` overrides it,
/// which is how intake events get scoped to the booking row created in the
/// same transaction.
///
/// # Returns
///
/// The event ID assigned by the database.
///
/// # Errors
///
/// Returns an error if persistence or serialization fails.
pub fn persist_audit_event(
    conn: &mut SqliteConnection,
    event: &AuditEvent,
    booking_id: Option<i64>,
) -> Result<i64, PersistenceError> {
    let actor_json: String = serde_json::to_string(&ActorData {
        id: event.actor.id.clone(),
        actor_type: event.actor.actor_type.clone(),
    })?;
    let cause_json: String = serde_json::to_string(&CauseData {
        id: event.cause.id.clone(),
        description: event.cause.description.clone(),
    })?;
    let action_json: String = serde_json::to_string(&ActionData {
        name: event.action.name.clone(),
        details: event.action.details.clone(),
    })?;
    let before_json: String = serde_json::to_string(&StateSnapshotData {
        data: event.before.data.clone(),
    })?;
    let after_json: String = serde_json::to_string(&StateSnapshotData {
        data: event.after.data.clone(),
    })?;

    let actor_login_name: &str = event
        .actor
        .operator_login_name
        .as_deref()
        .unwrap_or("system");
    let actor_display_name: &str = event
        .actor
        .operator_display_name
        .as_deref()
        .unwrap_or("System");

    diesel::insert_into(audit_events::table)
        .values((
            audit_events::booking_id.eq(booking_id.or(event.booking_id)),
            audit_events::actor_operator_id.eq(event.actor.operator_id),
            audit_events::actor_login_name.eq(actor_login_name),
            audit_events::actor_display_name.eq(actor_display_name),
            audit_events::actor_json.eq(actor_json),
            audit_events::cause_json.eq(cause_json),
            audit_events::action_json.eq(action_json),
            audit_events::before_snapshot_json.eq(before_json),
            audit_events::after_snapshot_json.eq(after_json),
        ))
        .execute(conn)?;

    let event_id: i64 = conn.get_last_insert_rowid()?;
    debug!(event_id, action = %event.action.name, "Persisted audit event");
    Ok(event_id)
}
