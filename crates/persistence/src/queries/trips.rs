// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Trip and vendor assignment queries.

use cargodesk_domain::{DailyRate, VehicleSource, VendorAssignmentStatus, parse_iso_date};
use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;

use crate::data_models::{TripData, VendorAssignmentData};
use crate::diesel_schema::{trips, vendor_assignments};
use crate::error::PersistenceError;

/// Diesel Queryable struct for trip rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = trips)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
struct TripRow {
    trip_id: i64,
    booking_id: i64,
    container_id: i64,
    reference_number: String,
    trip_date: String,
    from_name: String,
    to_name: String,
    vehicle_source: String,
    vehicle_descriptor: String,
    status: String,
    created_at: String,
}

impl TryFrom<TripRow> for TripData {
    type Error = PersistenceError;

    fn try_from(row: TripRow) -> Result<Self, Self::Error> {
        Ok(Self {
            trip_id: row.trip_id,
            booking_id: row.booking_id,
            container_id: row.container_id,
            reference_number: row.reference_number,
            trip_date: parse_iso_date(&row.trip_date)
                .map_err(|e| PersistenceError::ReconstructionError(e.to_string()))?,
            from_name: row.from_name,
            to_name: row.to_name,
            vehicle_source: row
                .vehicle_source
                .parse::<VehicleSource>()
                .map_err(|e| PersistenceError::ReconstructionError(e.to_string()))?,
            vehicle_descriptor: row.vehicle_descriptor,
            status: row.status,
            created_at: row.created_at,
        })
    }
}

/// Diesel Queryable struct for vendor assignment rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = vendor_assignments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
struct VendorAssignmentRow {
    vendor_assignment_id: i64,
    booking_id: i64,
    container_id: i64,
    vendor_id: i64,
    vendor_vehicle_id: Option<i64>,
    vehicle_number: String,
    daily_rate_cents: i64,
    status: String,
    created_at: String,
    confirmed_at: Option<String>,
}

impl TryFrom<VendorAssignmentRow> for VendorAssignmentData {
    type Error = PersistenceError;

    fn try_from(row: VendorAssignmentRow) -> Result<Self, Self::Error> {
        Ok(Self {
            vendor_assignment_id: row.vendor_assignment_id,
            booking_id: row.booking_id,
            container_id: row.container_id,
            vendor_id: row.vendor_id,
            vendor_vehicle_id: row.vendor_vehicle_id,
            vehicle_number: row.vehicle_number,
            daily_rate: DailyRate::from_cents(row.daily_rate_cents)
                .map_err(|e| PersistenceError::ReconstructionError(e.to_string()))?,
            status: row
                .status
                .parse::<VendorAssignmentStatus>()
                .map_err(|e| PersistenceError::ReconstructionError(e.to_string()))?,
            created_at: row.created_at,
            confirmed_at: row.confirmed_at,
        })
    }
}

/// Retrieves a trip by ID.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be reconstructed.
pub fn get_trip(
    conn: &mut SqliteConnection,
    trip_id: i64,
) -> Result<Option<TripData>, PersistenceError> {
    debug!(trip_id, "Looking up trip");

    trips::table
        .filter(trips::trip_id.eq(trip_id))
        .select(TripRow::as_select())
        .first(conn)
        .optional()?
        .map(TripData::try_from)
        .transpose()
}

/// Lists the trips of a booking in creation order.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn list_trips_for_booking(
    conn: &mut SqliteConnection,
    booking_id: i64,
) -> Result<Vec<TripData>, PersistenceError> {
    trips::table
        .filter(trips::booking_id.eq(booking_id))
        .order(trips::trip_id.asc())
        .select(TripRow::as_select())
        .load::<TripRow>(conn)?
        .into_iter()
        .map(TripData::try_from)
        .collect()
}

/// Retrieves a vendor assignment by ID.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be reconstructed.
pub fn get_vendor_assignment(
    conn: &mut SqliteConnection,
    vendor_assignment_id: i64,
) -> Result<Option<VendorAssignmentData>, PersistenceError> {
    debug!(vendor_assignment_id, "Looking up vendor assignment");

    vendor_assignments::table
        .filter(vendor_assignments::vendor_assignment_id.eq(vendor_assignment_id))
        .select(VendorAssignmentRow::as_select())
        .first(conn)
        .optional()?
        .map(VendorAssignmentData::try_from)
        .transpose()
}
