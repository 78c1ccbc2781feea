// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Lookups of registry rows: clients, places, vehicles and vendors.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;

use crate::data_models::{
    ClientData, LocationData, VehicleData, VendorData, VendorVehicleData, YardData,
};
use crate::diesel_schema::{clients, locations, vehicles, vendor_vehicles, vendors, yards};
use crate::error::PersistenceError;

/// Retrieves a client by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_client(
    conn: &mut SqliteConnection,
    client_id: i64,
) -> Result<Option<ClientData>, PersistenceError> {
    debug!(client_id, "Looking up client");

    let row: Option<(i64, String, Option<String>)> = clients::table
        .filter(clients::client_id.eq(client_id))
        .select((clients::client_id, clients::name, clients::contact_email))
        .first(conn)
        .optional()?;

    Ok(row.map(|(client_id, name, contact_email)| ClientData {
        client_id,
        name,
        contact_email,
    }))
}

/// Retrieves a location by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_location(
    conn: &mut SqliteConnection,
    location_id: i64,
) -> Result<Option<LocationData>, PersistenceError> {
    let row: Option<(i64, String, Option<String>)> = locations::table
        .filter(locations::location_id.eq(location_id))
        .select((locations::location_id, locations::name, locations::address))
        .first(conn)
        .optional()?;

    Ok(row.map(|(location_id, name, address)| LocationData {
        location_id,
        name,
        address,
    }))
}

/// Retrieves a yard by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_yard(
    conn: &mut SqliteConnection,
    yard_id: i64,
) -> Result<Option<YardData>, PersistenceError> {
    let row: Option<(i64, i64, String)> = yards::table
        .filter(yards::yard_id.eq(yard_id))
        .select((yards::yard_id, yards::location_id, yards::name))
        .first(conn)
        .optional()?;

    Ok(row.map(|(yard_id, location_id, name)| YardData {
        yard_id,
        location_id,
        name,
    }))
}

/// Retrieves an owned vehicle by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_vehicle(
    conn: &mut SqliteConnection,
    vehicle_id: i64,
) -> Result<Option<VehicleData>, PersistenceError> {
    debug!(vehicle_id, "Looking up owned vehicle");

    let row: Option<(i64, String, Option<String>, i32)> = vehicles::table
        .filter(vehicles::vehicle_id.eq(vehicle_id))
        .select((
            vehicles::vehicle_id,
            vehicles::registration_number,
            vehicles::description,
            vehicles::is_active,
        ))
        .first(conn)
        .optional()?;

    Ok(row.map(
        |(vehicle_id, registration_number, description, is_active)| VehicleData {
            vehicle_id,
            registration_number,
            description,
            is_active: is_active != 0,
        },
    ))
}

/// Retrieves a vendor by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_vendor(
    conn: &mut SqliteConnection,
    vendor_id: i64,
) -> Result<Option<VendorData>, PersistenceError> {
    debug!(vendor_id, "Looking up vendor");

    let row: Option<(i64, String, Option<String>)> = vendors::table
        .filter(vendors::vendor_id.eq(vendor_id))
        .select((vendors::vendor_id, vendors::name, vendors::contact_email))
        .first(conn)
        .optional()?;

    Ok(row.map(|(vendor_id, name, contact_email)| VendorData {
        vendor_id,
        name,
        contact_email,
    }))
}

/// Retrieves a vendor vehicle by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_vendor_vehicle(
    conn: &mut SqliteConnection,
    vendor_vehicle_id: i64,
) -> Result<Option<VendorVehicleData>, PersistenceError> {
    let row: Option<(i64, i64, String, String)> = vendor_vehicles::table
        .filter(vendor_vehicles::vendor_vehicle_id.eq(vendor_vehicle_id))
        .select((
            vendor_vehicles::vendor_vehicle_id,
            vendor_vehicles::vendor_id,
            vendor_vehicles::vehicle_number,
            vendor_vehicles::status,
        ))
        .first(conn)
        .optional()?;

    Ok(row.map(
        |(vendor_vehicle_id, vendor_id, vehicle_number, status)| VendorVehicleData {
            vendor_vehicle_id,
            vendor_id,
            vehicle_number,
            status,
        },
    ))
}
