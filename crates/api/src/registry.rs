// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Registry handlers: clients, places, and vehicles.
//!
//! Writes are Admin-only. Searches are open to every authenticated operator.

use cargodesk_domain::{
    LocationCandidate, VehicleCandidate, normalize_vehicle_number, validate_name,
};
use cargodesk_persistence::Persistence;
use tracing::info;

use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::error::{ApiError, translate_domain_error};
use crate::request_response::{
    CreateClientRequest, CreateLocationRequest, CreateVehicleRequest, CreateVendorRequest,
    CreateVendorVehicleRequest, CreateYardRequest, CreatedResponse, LocationCandidateInfo,
    LocationSearchResponse, VehicleCandidateInfo, VehicleSearchResponse,
};

/// Upper bound on search results.
pub const MAX_SEARCH_RESULTS: i64 = 50;

/// Result count when the caller does not ask for one.
pub const DEFAULT_SEARCH_RESULTS: i64 = 20;

fn optional_text(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Registers a client.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, the name is blank, or the
/// database write fails.
pub fn create_client(
    persistence: &mut Persistence,
    request: &CreateClientRequest,
    actor: &AuthenticatedActor,
) -> Result<CreatedResponse, ApiError> {
    AuthorizationService::require_admin(actor, "create_client")?;
    let name: String = validate_name("name", &request.name).map_err(translate_domain_error)?;

    let id: i64 =
        persistence.create_client(&name, optional_text(request.contact_email.as_deref()))?;
    info!(client_id = id, by = %actor.login_name, "Client registered");
    Ok(CreatedResponse {
        id,
        message: format!("Client '{name}' created"),
    })
}

/// Registers a location.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, the name is blank or
/// taken, or the database write fails.
pub fn create_location(
    persistence: &mut Persistence,
    request: &CreateLocationRequest,
    actor: &AuthenticatedActor,
) -> Result<CreatedResponse, ApiError> {
    AuthorizationService::require_admin(actor, "create_location")?;
    let name: String = validate_name("name", &request.name).map_err(translate_domain_error)?;

    let id: i64 = persistence.create_location(&name, optional_text(request.address.as_deref()))?;
    Ok(CreatedResponse {
        id,
        message: format!("Location '{name}' created"),
    })
}

/// Registers a yard under an existing location.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, the parent location does
/// not exist, the name is blank or taken within the location, or the
/// database write fails.
pub fn create_yard(
    persistence: &mut Persistence,
    request: &CreateYardRequest,
    actor: &AuthenticatedActor,
) -> Result<CreatedResponse, ApiError> {
    AuthorizationService::require_admin(actor, "create_yard")?;
    let name: String = validate_name("name", &request.name).map_err(translate_domain_error)?;
    if persistence.get_location(request.location_id)?.is_none() {
        return Err(ApiError::not_found(
            "Location",
            format!("Location {} does not exist", request.location_id),
        ));
    }

    let id: i64 = persistence.create_yard(request.location_id, &name)?;
    Ok(CreatedResponse {
        id,
        message: format!("Yard '{name}' created"),
    })
}

/// Registers an owned vehicle.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, the registration is blank
/// or already registered, or the database write fails.
pub fn create_vehicle(
    persistence: &mut Persistence,
    request: &CreateVehicleRequest,
    actor: &AuthenticatedActor,
) -> Result<CreatedResponse, ApiError> {
    AuthorizationService::require_admin(actor, "create_vehicle")?;
    let registration: String =
        normalize_vehicle_number(&request.registration_number).map_err(translate_domain_error)?;

    let id: i64 =
        persistence.create_vehicle(&registration, optional_text(request.description.as_deref()))?;
    Ok(CreatedResponse {
        id,
        message: format!("Vehicle {registration} created"),
    })
}

/// Registers a vendor.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, the name is blank, or the
/// database write fails.
pub fn create_vendor(
    persistence: &mut Persistence,
    request: &CreateVendorRequest,
    actor: &AuthenticatedActor,
) -> Result<CreatedResponse, ApiError> {
    AuthorizationService::require_admin(actor, "create_vendor")?;
    let name: String = validate_name("name", &request.name).map_err(translate_domain_error)?;

    let id: i64 =
        persistence.create_vendor(&name, optional_text(request.contact_email.as_deref()))?;
    Ok(CreatedResponse {
        id,
        message: format!("Vendor '{name}' created"),
    })
}

/// Registers a vehicle with a vendor. New vendor vehicles are `available`.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, the vendor does not
/// exist, the plate is blank or already on file for the vendor, or the
/// database write fails.
pub fn create_vendor_vehicle(
    persistence: &mut Persistence,
    vendor_id: i64,
    request: &CreateVendorVehicleRequest,
    actor: &AuthenticatedActor,
) -> Result<CreatedResponse, ApiError> {
    AuthorizationService::require_admin(actor, "create_vendor_vehicle")?;
    let number: String =
        normalize_vehicle_number(&request.vehicle_number).map_err(translate_domain_error)?;
    if persistence.get_vendor(vendor_id)?.is_none() {
        return Err(ApiError::not_found(
            "Vendor",
            format!("Vendor {vendor_id} does not exist"),
        ));
    }

    let id: i64 = persistence.create_vendor_vehicle(vendor_id, &number)?;
    Ok(CreatedResponse {
        id,
        message: format!("Vendor vehicle {number} created"),
    })
}

fn clamp_limit(limit: Option<i64>) -> i64 {
    limit
        .unwrap_or(DEFAULT_SEARCH_RESULTS)
        .clamp(1, MAX_SEARCH_RESULTS)
}

/// Searches locations and yards by name.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn search_locations(
    persistence: &mut Persistence,
    query: &str,
    limit: Option<i64>,
) -> Result<LocationSearchResponse, ApiError> {
    let hits: Vec<LocationCandidate> =
        persistence.search_locations(query.trim(), clamp_limit(limit))?;
    let candidates: Vec<LocationCandidateInfo> = hits
        .into_iter()
        .map(|hit| LocationCandidateInfo {
            value: hit.reference.to_wire(),
            kind: hit.reference.kind().as_str().to_string(),
            id: hit.reference.id(),
            display_name: hit.display_name,
        })
        .collect();
    Ok(LocationSearchResponse { candidates })
}

/// Searches owned and vendor vehicles by plate.
///
/// With `vendor_id`, only that vendor's vehicles are returned.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn search_vehicles(
    persistence: &mut Persistence,
    query: &str,
    vendor_id: Option<i64>,
    limit: Option<i64>,
) -> Result<VehicleSearchResponse, ApiError> {
    let hits: Vec<VehicleCandidate> =
        persistence.search_vehicles(query.trim(), vendor_id, clamp_limit(limit))?;
    let candidates: Vec<VehicleCandidateInfo> = hits
        .into_iter()
        .map(|hit| VehicleCandidateInfo {
            id: hit.id,
            vehicle_type: hit.source.as_str().to_string(),
            vehicle_number: hit.vehicle_number,
            vendor_id: hit.vendor_id,
            label: hit.label,
        })
        .collect();
    Ok(VehicleSearchResponse { candidates })
}
