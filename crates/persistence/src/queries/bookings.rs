// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking and container queries.

use std::collections::BTreeSet;

use cargodesk::BookingState;
use cargodesk_domain::{
    AssignmentStatus, Booking, BookingContainer, BookingStatus, ContainerType, DailyRate,
    LocationKind, LocationRef, LocationResolver, VehicleAssignment, VehicleSource,
};
use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;

use crate::diesel_schema::{booking_containers, bookings, locations, yards};
use crate::error::PersistenceError;
use crate::queries::location_ref_from_columns;

/// Diesel Queryable struct for booking rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = bookings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
struct BookingRow {
    booking_id: i64,
    booking_code: String,
    client_id: i64,
    expected_container_count: i32,
    status: String,
    default_from_kind: Option<String>,
    default_from_id: Option<i64>,
    default_to_kind: Option<String>,
    default_to_id: Option<i64>,
    acknowledged_by: Option<String>,
}

/// Diesel Queryable struct for container rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = booking_containers)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
struct ContainerRow {
    container_id: i64,
    sequence: i32,
    container_type: Option<String>,
    number1: Option<String>,
    number2: Option<String>,
    from_kind: Option<String>,
    from_id: Option<i64>,
    to_kind: Option<String>,
    to_id: Option<i64>,
    photo1: Option<String>,
    photo2: Option<String>,
    vehicle_source: Option<String>,
    owned_vehicle_id: Option<i64>,
    vendor_id: Option<i64>,
    vendor_vehicle_id: Option<i64>,
    vendor_vehicle_number: Option<String>,
    daily_rate_cents: Option<i64>,
    vendor_assignment_id: Option<i64>,
    trip_id: Option<i64>,
    assignment_status: String,
}

fn reconstruction<E: std::fmt::Display>(err: E) -> PersistenceError {
    PersistenceError::ReconstructionError(err.to_string())
}

fn booking_from_row(row: BookingRow) -> Result<Booking, PersistenceError> {
    Ok(Booking {
        booking_id: Some(row.booking_id),
        booking_code: row.booking_code,
        client_id: row.client_id,
        expected_container_count: u32::try_from(row.expected_container_count)
            .map_err(reconstruction)?,
        status: row.status.parse::<BookingStatus>().map_err(reconstruction)?,
        default_from: location_ref_from_columns(
            row.default_from_kind.as_deref(),
            row.default_from_id,
        )?,
        default_to: location_ref_from_columns(row.default_to_kind.as_deref(), row.default_to_id)?,
        acknowledged_by: row.acknowledged_by,
    })
}

fn assignment_from_row(row: &ContainerRow) -> Result<Option<VehicleAssignment>, PersistenceError> {
    let Some(source) = row.vehicle_source.as_deref() else {
        return Ok(None);
    };
    let missing = |column: &str| {
        PersistenceError::ReconstructionError(format!(
            "container {} has vehicle source '{source}' but no {column}",
            row.container_id
        ))
    };

    match source.parse::<VehicleSource>().map_err(reconstruction)? {
        VehicleSource::Owned => Ok(Some(VehicleAssignment::Owned {
            vehicle_id: row.owned_vehicle_id.ok_or_else(|| missing("owned_vehicle_id"))?,
        })),
        VehicleSource::Vendor => Ok(Some(VehicleAssignment::Vendor {
            vendor_id: row.vendor_id.ok_or_else(|| missing("vendor_id"))?,
            vendor_vehicle_id: row.vendor_vehicle_id,
            vehicle_number: row
                .vendor_vehicle_number
                .clone()
                .ok_or_else(|| missing("vendor_vehicle_number"))?,
            daily_rate: DailyRate::from_cents(
                row.daily_rate_cents
                    .ok_or_else(|| missing("daily_rate_cents"))?,
            )
            .map_err(reconstruction)?,
        })),
    }
}

fn container_from_row(row: ContainerRow) -> Result<BookingContainer, PersistenceError> {
    let assignment: Option<VehicleAssignment> = assignment_from_row(&row)?;
    Ok(BookingContainer {
        container_id: Some(row.container_id),
        sequence: u32::try_from(row.sequence).map_err(reconstruction)?,
        container_type: row
            .container_type
            .as_deref()
            .map(str::parse::<ContainerType>)
            .transpose()
            .map_err(reconstruction)?,
        number1: row.number1,
        number2: row.number2,
        from_location: location_ref_from_columns(row.from_kind.as_deref(), row.from_id)?,
        to_location: location_ref_from_columns(row.to_kind.as_deref(), row.to_id)?,
        photo1: row.photo1,
        photo2: row.photo2,
        assignment,
        vendor_assignment_id: row.vendor_assignment_id,
        trip_id: row.trip_id,
        assignment_status: row
            .assignment_status
            .parse::<AssignmentStatus>()
            .map_err(reconstruction)?,
    })
}

/// Retrieves a booking by id.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be reconstructed.
/// Returns `Ok(None)` if the booking does not exist.
pub fn get_booking(
    conn: &mut SqliteConnection,
    booking_id: i64,
) -> Result<Option<Booking>, PersistenceError> {
    debug!(booking_id, "Looking up booking");

    bookings::table
        .filter(bookings::booking_id.eq(booking_id))
        .select(BookingRow::as_select())
        .first(conn)
        .optional()?
        .map(booking_from_row)
        .transpose()
}

/// Lists bookings, newest first, optionally filtered by status.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn list_bookings(
    conn: &mut SqliteConnection,
    status: Option<BookingStatus>,
) -> Result<Vec<Booking>, PersistenceError> {
    let mut query = bookings::table
        .select(BookingRow::as_select())
        .order(bookings::booking_id.desc())
        .into_boxed();
    if let Some(status) = status {
        query = query.filter(bookings::status.eq(status.as_str()));
    }

    query
        .load::<BookingRow>(conn)?
        .into_iter()
        .map(booking_from_row)
        .collect()
}

/// Retrieves all container rows of a booking in sequence order.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn get_containers_for_booking(
    conn: &mut SqliteConnection,
    booking_id: i64,
) -> Result<Vec<BookingContainer>, PersistenceError> {
    booking_containers::table
        .filter(booking_containers::booking_id.eq(booking_id))
        .order(booking_containers::sequence.asc())
        .select(ContainerRow::as_select())
        .load::<ContainerRow>(conn)?
        .into_iter()
        .map(container_from_row)
        .collect()
}

/// Loads the full booking aggregate.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the booking does not exist.
pub fn load_booking_state(
    conn: &mut SqliteConnection,
    booking_id: i64,
) -> Result<BookingState, PersistenceError> {
    let booking: Booking = get_booking(conn, booking_id)?
        .ok_or_else(|| PersistenceError::NotFound(format!("Booking {booking_id}")))?;
    let containers: Vec<BookingContainer> = get_containers_for_booking(conn, booking_id)?;
    Ok(BookingState::new(booking, containers))
}

/// Checks whether a booking code is already taken.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn booking_code_exists(
    conn: &mut SqliteConnection,
    booking_code: &str,
) -> Result<bool, PersistenceError> {
    let count: i64 = bookings::table
        .filter(bookings::booking_code.eq(booking_code))
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}

/// Builds a resolver holding every place the given references point at.
///
/// Yards pull in their parent locations. References to missing rows are
/// simply absent from the resolver, so they resolve as unresolved.
///
/// # Errors
///
/// Returns an error if a query fails.
pub fn load_location_resolver<'a, I>(
    conn: &mut SqliteConnection,
    references: I,
) -> Result<LocationResolver, PersistenceError>
where
    I: IntoIterator<Item = &'a LocationRef>,
{
    let mut location_ids: BTreeSet<i64> = BTreeSet::new();
    let mut yard_ids: BTreeSet<i64> = BTreeSet::new();
    for reference in references {
        match reference.kind() {
            LocationKind::Location => location_ids.insert(reference.id()),
            LocationKind::Yard => yard_ids.insert(reference.id()),
        };
    }

    let mut resolver: LocationResolver = LocationResolver::new();

    if !yard_ids.is_empty() {
        let yard_rows: Vec<(i64, i64, String)> = yards::table
            .filter(yards::yard_id.eq_any(yard_ids.iter().copied().collect::<Vec<i64>>()))
            .select((yards::yard_id, yards::location_id, yards::name))
            .load(conn)?;
        for (yard_id, location_id, name) in yard_rows {
            location_ids.insert(location_id);
            resolver.insert_yard(yard_id, name, Some(location_id));
        }
    }

    if !location_ids.is_empty() {
        let location_rows: Vec<(i64, String)> = locations::table
            .filter(
                locations::location_id.eq_any(location_ids.iter().copied().collect::<Vec<i64>>()),
            )
            .select((locations::location_id, locations::name))
            .load(conn)?;
        for (location_id, name) in location_rows {
            resolver.insert_location(location_id, name);
        }
    }

    debug!(
        locations = location_ids.len(),
        yards = yard_ids.len(),
        "Loaded location resolver"
    );
    Ok(resolver)
}

/// Builds a resolver for every reference used by a booking aggregate.
///
/// # Errors
///
/// Returns an error if a query fails.
pub fn load_resolver_for_state(
    conn: &mut SqliteConnection,
    state: &BookingState,
) -> Result<LocationResolver, PersistenceError> {
    let references: Vec<LocationRef> = state
        .containers
        .iter()
        .flat_map(|c| [c.from_location, c.to_location])
        .chain([state.booking.default_from, state.booking.default_to])
        .flatten()
        .collect();
    load_location_resolver(conn, references.iter())
}
