// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Trip creation and vendor assignment records.
//!
//! A dispatch claims its container with a conditional update before any
//! trip row is written. Two writers racing for the same container cannot
//! both create a trip: the loser sees zero affected rows and aborts.

use cargodesk::DispatchPlan;
use cargodesk_domain::{AssignmentStatus, VehicleAssignment, VendorAssignmentStatus};
use diesel::SqliteConnection;
use diesel::prelude::*;
use diesel::sql_types::{Nullable, Text};
use time::macros::format_description;
use tracing::{debug, info};

use crate::backend::PersistenceBackend;
use crate::data_models::DispatchRecord;
use crate::diesel_schema::{booking_containers, trips, vendor_assignments, vendor_vehicles};
use crate::error::PersistenceError;

/// The assignment columns of a container row.
struct AssignmentColumns<'a> {
    vehicle_source: &'static str,
    owned_vehicle_id: Option<i64>,
    vendor_id: Option<i64>,
    vendor_vehicle_id: Option<i64>,
    vendor_vehicle_number: Option<&'a str>,
    daily_rate_cents: Option<i64>,
    claimed_status: AssignmentStatus,
}

impl<'a> AssignmentColumns<'a> {
    fn from_assignment(assignment: &'a VehicleAssignment) -> Self {
        match assignment {
            VehicleAssignment::Owned { vehicle_id } => Self {
                vehicle_source: assignment.source().as_str(),
                owned_vehicle_id: Some(*vehicle_id),
                vendor_id: None,
                vendor_vehicle_id: None,
                vendor_vehicle_number: None,
                daily_rate_cents: None,
                claimed_status: AssignmentStatus::Assigned,
            },
            VehicleAssignment::Vendor {
                vendor_id,
                vendor_vehicle_id,
                vehicle_number,
                daily_rate,
            } => Self {
                vehicle_source: assignment.source().as_str(),
                owned_vehicle_id: None,
                vendor_id: Some(*vendor_id),
                vendor_vehicle_id: *vendor_vehicle_id,
                vendor_vehicle_number: Some(vehicle_number.as_str()),
                daily_rate_cents: Some(daily_rate.cents()),
                claimed_status: AssignmentStatus::VendorPending,
            },
        }
    }
}

/// Records a planned dispatch.
///
/// Steps, all on the caller's transaction:
/// 1. claim the container (`trip_id IS NULL` guard) and store the assignment
/// 2. insert the trip
/// 3. insert the vendor assignment and mark the vendor vehicle in use
/// 4. link the trip and vendor assignment back onto the container
///
/// # Errors
///
/// Returns `PersistenceError::ContainerAlreadyTripped` if the container
/// already has a trip, or a database error if any write fails.
pub fn record_dispatch(
    conn: &mut SqliteConnection,
    booking_id: i64,
    plan: &DispatchPlan,
) -> Result<DispatchRecord, PersistenceError> {
    let container_id: i64 = plan.container.container_id.ok_or_else(|| {
        PersistenceError::Other(String::from("Cannot dispatch an unsaved container"))
    })?;
    let assignment: &VehicleAssignment = plan.container.assignment.as_ref().ok_or_else(|| {
        PersistenceError::Other(format!("Container {container_id} has no vehicle assignment"))
    })?;
    let columns: AssignmentColumns<'_> = AssignmentColumns::from_assignment(assignment);

    let claimed: usize = diesel::update(booking_containers::table)
        .filter(booking_containers::container_id.eq(container_id))
        .filter(booking_containers::booking_id.eq(booking_id))
        .filter(booking_containers::trip_id.is_null())
        .set((
            booking_containers::vehicle_source.eq(columns.vehicle_source),
            booking_containers::owned_vehicle_id.eq(columns.owned_vehicle_id),
            booking_containers::vendor_id.eq(columns.vendor_id),
            booking_containers::vendor_vehicle_id.eq(columns.vendor_vehicle_id),
            booking_containers::vendor_vehicle_number.eq(columns.vendor_vehicle_number),
            booking_containers::daily_rate_cents.eq(columns.daily_rate_cents),
            booking_containers::assignment_status.eq(columns.claimed_status.as_str()),
            booking_containers::updated_at.eq(diesel::dsl::sql::<Text>("CURRENT_TIMESTAMP")),
        ))
        .execute(conn)?;

    if claimed == 0 {
        return Err(PersistenceError::ContainerAlreadyTripped { container_id });
    }

    let trip_date: String = plan
        .trip
        .trip_date
        .format(format_description!("[year]-[month]-[day]"))
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))?;

    diesel::insert_into(trips::table)
        .values((
            trips::booking_id.eq(booking_id),
            trips::container_id.eq(container_id),
            trips::reference_number.eq(&plan.trip.reference_number),
            trips::trip_date.eq(&trip_date),
            trips::from_name.eq(&plan.trip.from_name),
            trips::to_name.eq(&plan.trip.to_name),
            trips::vehicle_source.eq(plan.trip.vehicle_source.as_str()),
            trips::vehicle_descriptor.eq(&plan.trip.vehicle_descriptor),
        ))
        .execute(conn)?;
    let trip_id: i64 = conn.get_last_insert_rowid()?;

    let vendor_assignment_id: Option<i64> = match &plan.vendor_assignment {
        Some(draft) => {
            diesel::insert_into(vendor_assignments::table)
                .values((
                    vendor_assignments::booking_id.eq(booking_id),
                    vendor_assignments::container_id.eq(container_id),
                    vendor_assignments::vendor_id.eq(draft.vendor_id),
                    vendor_assignments::vendor_vehicle_id.eq(draft.vendor_vehicle_id),
                    vendor_assignments::vehicle_number.eq(&draft.vehicle_number),
                    vendor_assignments::daily_rate_cents.eq(draft.daily_rate.cents()),
                    vendor_assignments::status
                        .eq(VendorAssignmentStatus::PendingConfirmation.as_str()),
                ))
                .execute(conn)?;
            let id: i64 = conn.get_last_insert_rowid()?;

            if let Some(vendor_vehicle_id) = draft.vendor_vehicle_id {
                diesel::update(vendor_vehicles::table)
                    .filter(vendor_vehicles::vendor_vehicle_id.eq(vendor_vehicle_id))
                    .set(vendor_vehicles::status.eq("in_use"))
                    .execute(conn)?;
                debug!(vendor_vehicle_id, "Vendor vehicle marked in use");
            }
            Some(id)
        }
        None => None,
    };

    diesel::update(booking_containers::table)
        .filter(booking_containers::container_id.eq(container_id))
        .set((
            booking_containers::trip_id.eq(Some(trip_id)),
            booking_containers::vendor_assignment_id.eq(vendor_assignment_id),
            booking_containers::assignment_status.eq(plan.container.assignment_status.as_str()),
        ))
        .execute(conn)?;

    info!(
        booking_id,
        container_id,
        trip_id,
        ?vendor_assignment_id,
        reference = %plan.trip.reference_number,
        "Recorded dispatch"
    );

    Ok(DispatchRecord {
        trip_id,
        vendor_assignment_id,
    })
}

/// Moves a vendor assignment from `pending_confirmation` to `confirmed`.
///
/// # Returns
///
/// `true` if this call confirmed the assignment, `false` if it was already
/// confirmed.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the assignment does not exist.
pub fn confirm_vendor_assignment(
    conn: &mut SqliteConnection,
    vendor_assignment_id: i64,
) -> Result<bool, PersistenceError> {
    let updated: usize = diesel::update(vendor_assignments::table)
        .filter(vendor_assignments::vendor_assignment_id.eq(vendor_assignment_id))
        .filter(
            vendor_assignments::status.eq(VendorAssignmentStatus::PendingConfirmation.as_str()),
        )
        .set((
            vendor_assignments::status.eq(VendorAssignmentStatus::Confirmed.as_str()),
            vendor_assignments::confirmed_at
                .eq(diesel::dsl::sql::<Nullable<Text>>("CURRENT_TIMESTAMP")),
        ))
        .execute(conn)?;

    if updated > 0 {
        info!(vendor_assignment_id, "Vendor assignment confirmed");
        return Ok(true);
    }

    let exists: i64 = vendor_assignments::table
        .filter(vendor_assignments::vendor_assignment_id.eq(vendor_assignment_id))
        .count()
        .get_result(conn)?;
    if exists == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Vendor assignment {vendor_assignment_id}"
        )));
    }

    debug!(vendor_assignment_id, "Vendor assignment already confirmed");
    Ok(false)
}
