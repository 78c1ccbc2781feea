// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking and container row writes, and transition orchestration.

use cargodesk::{ContainerChange, IntakeResult, TransitionResult};
use cargodesk_domain::{Booking, BookingContainer};
use diesel::SqliteConnection;
use diesel::prelude::*;
use diesel::sql_types::Text;
use num_traits::ToPrimitive;
use tracing::{debug, info};

use crate::backend::PersistenceBackend;
use crate::data_models::{DispatchRecord, PersistTransitionResult};
use crate::diesel_schema::{booking_containers, bookings};
use crate::error::PersistenceError;
use crate::mutations::audit::persist_audit_event;
use crate::mutations::dispatch::record_dispatch;
use crate::queries::location_ref_columns;

fn to_stored_count(value: u32, what: &str) -> Result<i32, PersistenceError> {
    value
        .to_i32()
        .ok_or_else(|| PersistenceError::Other(format!("{what} {value} is out of range")))
}

/// Inserts a booking row.
///
/// # Errors
///
/// Returns `PersistenceError::DuplicateEntry` if the booking code is taken,
/// or `ForeignKeyViolation` if the client does not exist.
pub fn insert_booking(
    conn: &mut SqliteConnection,
    booking: &Booking,
) -> Result<i64, PersistenceError> {
    let (from_kind, from_id) = location_ref_columns(booking.default_from.as_ref());
    let (to_kind, to_id) = location_ref_columns(booking.default_to.as_ref());

    diesel::insert_into(bookings::table)
        .values((
            bookings::booking_code.eq(&booking.booking_code),
            bookings::client_id.eq(booking.client_id),
            bookings::expected_container_count.eq(to_stored_count(
                booking.expected_container_count,
                "Expected container count",
            )?),
            bookings::status.eq(booking.status.as_str()),
            bookings::default_from_kind.eq(from_kind),
            bookings::default_from_id.eq(from_id),
            bookings::default_to_kind.eq(to_kind),
            bookings::default_to_id.eq(to_id),
            bookings::acknowledged_by.eq(booking.acknowledged_by.as_deref()),
        ))
        .execute(conn)?;

    let booking_id: i64 = conn.get_last_insert_rowid()?;
    info!(booking_id, booking_code = %booking.booking_code, "Created booking");
    Ok(booking_id)
}

/// Writes the mutable booking header columns.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the booking does not exist.
pub fn update_booking_header(
    conn: &mut SqliteConnection,
    booking: &Booking,
) -> Result<(), PersistenceError> {
    let booking_id: i64 = booking
        .booking_id
        .ok_or_else(|| PersistenceError::Other(String::from("Cannot update an unsaved booking")))?;

    let updated: usize = diesel::update(bookings::table)
        .filter(bookings::booking_id.eq(booking_id))
        .set((
            bookings::expected_container_count.eq(to_stored_count(
                booking.expected_container_count,
                "Expected container count",
            )?),
            bookings::status.eq(booking.status.as_str()),
            bookings::acknowledged_by.eq(booking.acknowledged_by.as_deref()),
            bookings::updated_at.eq(diesel::dsl::sql::<Text>("CURRENT_TIMESTAMP")),
        ))
        .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::NotFound(format!("Booking {booking_id}")));
    }
    Ok(())
}

/// Inserts a new container row on a booking.
///
/// # Errors
///
/// Returns `PersistenceError::DuplicateEntry` if the sequence is taken.
pub fn insert_container(
    conn: &mut SqliteConnection,
    booking_id: i64,
    container: &BookingContainer,
) -> Result<i64, PersistenceError> {
    let (from_kind, from_id) = location_ref_columns(container.from_location.as_ref());
    let (to_kind, to_id) = location_ref_columns(container.to_location.as_ref());

    diesel::insert_into(booking_containers::table)
        .values((
            booking_containers::booking_id.eq(booking_id),
            booking_containers::sequence.eq(to_stored_count(container.sequence, "Sequence")?),
            booking_containers::container_type
                .eq(container.container_type.map(|t| t.as_str())),
            booking_containers::number1.eq(container.number1.as_deref()),
            booking_containers::number2.eq(container.number2.as_deref()),
            booking_containers::from_kind.eq(from_kind),
            booking_containers::from_id.eq(from_id),
            booking_containers::to_kind.eq(to_kind),
            booking_containers::to_id.eq(to_id),
            booking_containers::photo1.eq(container.photo1.as_deref()),
            booking_containers::photo2.eq(container.photo2.as_deref()),
            booking_containers::assignment_status.eq(container.assignment_status.as_str()),
        ))
        .execute(conn)?;

    let container_id: i64 = conn.get_last_insert_rowid()?;
    debug!(booking_id, container_id, sequence = container.sequence, "Inserted container");
    Ok(container_id)
}

/// Writes the detail columns of an existing container row.
///
/// Assignment columns are never touched here; they are written only by
/// dispatch.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the row does not belong to the booking.
pub fn update_container_details(
    conn: &mut SqliteConnection,
    booking_id: i64,
    container: &BookingContainer,
) -> Result<(), PersistenceError> {
    let container_id: i64 = container
        .container_id
        .ok_or_else(|| PersistenceError::Other(String::from("Cannot update an unsaved container")))?;
    let (from_kind, from_id) = location_ref_columns(container.from_location.as_ref());
    let (to_kind, to_id) = location_ref_columns(container.to_location.as_ref());

    let updated: usize = diesel::update(booking_containers::table)
        .filter(booking_containers::container_id.eq(container_id))
        .filter(booking_containers::booking_id.eq(booking_id))
        .set((
            booking_containers::container_type
                .eq(container.container_type.map(|t| t.as_str())),
            booking_containers::number1.eq(container.number1.as_deref()),
            booking_containers::number2.eq(container.number2.as_deref()),
            booking_containers::from_kind.eq(from_kind),
            booking_containers::from_id.eq(from_id),
            booking_containers::to_kind.eq(to_kind),
            booking_containers::to_id.eq(to_id),
            booking_containers::photo1.eq(container.photo1.as_deref()),
            booking_containers::photo2.eq(container.photo2.as_deref()),
            booking_containers::updated_at.eq(diesel::dsl::sql::<Text>("CURRENT_TIMESTAMP")),
        ))
        .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Container {container_id} on booking {booking_id}"
        )));
    }
    debug!(booking_id, container_id, "Updated container details");
    Ok(())
}

/// Persists an accepted booking intake and its audit event.
///
/// # Returns
///
/// `(booking_id, event_id)`.
///
/// # Errors
///
/// Returns an error if either write fails.
pub fn persist_intake(
    conn: &mut SqliteConnection,
    intake: &IntakeResult,
) -> Result<(i64, i64), PersistenceError> {
    let booking_id: i64 = insert_booking(conn, &intake.booking)?;
    let event_id: i64 = persist_audit_event(conn, &intake.audit_event, Some(booking_id))?;
    Ok((booking_id, event_id))
}

/// Persists a workflow transition.
///
/// Writes the booking header, container changes, the dispatch (if any) and
/// the audit event. The caller owns the transaction.
///
/// # Errors
///
/// Returns an error if any write fails; the caller must roll back.
pub fn persist_transition(
    conn: &mut SqliteConnection,
    result: &TransitionResult,
) -> Result<PersistTransitionResult, PersistenceError> {
    let booking_id: i64 = result.new_state.booking_id();

    update_booking_header(conn, &result.new_state.booking)?;

    let mut inserted_container_ids: Vec<i64> = Vec::new();
    for change in &result.container_changes {
        match change {
            ContainerChange::Inserted(container) => {
                inserted_container_ids.push(insert_container(conn, booking_id, container)?);
            }
            ContainerChange::Updated(container) => {
                update_container_details(conn, booking_id, container)?;
            }
        }
    }

    let dispatch: Option<DispatchRecord> = result
        .dispatch
        .as_ref()
        .map(|plan| record_dispatch(conn, booking_id, plan))
        .transpose()?;

    let event_id: i64 = persist_audit_event(conn, &result.audit_event, None)?;

    info!(
        booking_id,
        event_id,
        status = result.new_state.booking.status.as_str(),
        rows = result.container_changes.len(),
        "Persisted transition"
    );

    Ok(PersistTransitionResult {
        event_id,
        inserted_container_ids,
        dispatch,
    })
}
