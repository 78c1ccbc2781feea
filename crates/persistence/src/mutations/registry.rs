// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Registry writes: clients, places, vehicles and vendors.
//!
//! Uniqueness and parent existence are enforced by the schema and surface as
//! `DuplicateEntry` and `ForeignKeyViolation`.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::info;

use crate::backend::PersistenceBackend;
use crate::diesel_schema::{clients, locations, vehicles, vendor_vehicles, vendors, yards};
use crate::error::PersistenceError;

/// Creates a client.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn create_client(
    conn: &mut SqliteConnection,
    name: &str,
    contact_email: Option<&str>,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(clients::table)
        .values((
            clients::name.eq(name),
            clients::contact_email.eq(contact_email),
        ))
        .execute(conn)?;

    let client_id: i64 = conn.get_last_insert_rowid()?;
    info!(client_id, name, "Created client");
    Ok(client_id)
}

/// Creates a location.
///
/// # Errors
///
/// Returns `PersistenceError::DuplicateEntry` if the name is taken.
pub fn create_location(
    conn: &mut SqliteConnection,
    name: &str,
    address: Option<&str>,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(locations::table)
        .values((locations::name.eq(name), locations::address.eq(address)))
        .execute(conn)?;

    let location_id: i64 = conn.get_last_insert_rowid()?;
    info!(location_id, name, "Created location");
    Ok(location_id)
}

/// Creates a yard under a parent location.
///
/// # Errors
///
/// Returns `PersistenceError::ForeignKeyViolation` if the parent does not
/// exist, or `DuplicateEntry` if the parent already has a yard by that name.
pub fn create_yard(
    conn: &mut SqliteConnection,
    location_id: i64,
    name: &str,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(yards::table)
        .values((yards::location_id.eq(location_id), yards::name.eq(name)))
        .execute(conn)?;

    let yard_id: i64 = conn.get_last_insert_rowid()?;
    info!(yard_id, location_id, name, "Created yard");
    Ok(yard_id)
}

/// Adds a vehicle to the owned fleet.
///
/// # Errors
///
/// Returns `PersistenceError::DuplicateEntry` if the registration is taken.
pub fn create_vehicle(
    conn: &mut SqliteConnection,
    registration_number: &str,
    description: Option<&str>,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(vehicles::table)
        .values((
            vehicles::registration_number.eq(registration_number),
            vehicles::description.eq(description),
        ))
        .execute(conn)?;

    let vehicle_id: i64 = conn.get_last_insert_rowid()?;
    info!(vehicle_id, registration_number, "Created owned vehicle");
    Ok(vehicle_id)
}

/// Creates a vendor.
///
/// # Errors
///
/// Returns `PersistenceError::DuplicateEntry` if the name is taken.
pub fn create_vendor(
    conn: &mut SqliteConnection,
    name: &str,
    contact_email: Option<&str>,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(vendors::table)
        .values((
            vendors::name.eq(name),
            vendors::contact_email.eq(contact_email),
        ))
        .execute(conn)?;

    let vendor_id: i64 = conn.get_last_insert_rowid()?;
    info!(vendor_id, name, "Created vendor");
    Ok(vendor_id)
}

/// Registers a vehicle with a vendor. New vendor vehicles are `available`.
///
/// # Errors
///
/// Returns `PersistenceError::ForeignKeyViolation` if the vendor does not
/// exist, or `DuplicateEntry` if the vendor already has that number.
pub fn create_vendor_vehicle(
    conn: &mut SqliteConnection,
    vendor_id: i64,
    vehicle_number: &str,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(vendor_vehicles::table)
        .values((
            vendor_vehicles::vendor_id.eq(vendor_id),
            vendor_vehicles::vehicle_number.eq(vehicle_number),
        ))
        .execute(conn)?;

    let vendor_vehicle_id: i64 = conn.get_last_insert_rowid()?;
    info!(vendor_vehicle_id, vendor_id, vehicle_number, "Created vendor vehicle");
    Ok(vendor_vehicle_id)
}
