// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary for the `CargoDesk` dispatch system.
//!
//! This crate sits between the HTTP server and the core. It authenticates
//! operators, validates and normalizes wire input, runs each workflow step
//! in a single persistence transaction, and translates domain and storage
//! failures into [`ApiError`]s the server maps onto status codes.
//!
//! Nothing here knows about HTTP. Handlers take a `&mut Persistence` and
//! plain request structs and return plain response structs.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod auth;
mod error;
mod handlers;
mod notify;
mod registry;
mod request_response;
mod uploads;

#[cfg(test)]
mod tests;

pub use auth::{
    AuthenticatedActor, AuthenticationService, AuthorizationService, IssuedSession, Role,
};
pub use error::{ApiError, AuthError, translate_core_error, translate_domain_error};
pub use handlers::{
    ContainerBatchContext, acknowledge_booking, assign_vehicle, bootstrap_first_admin,
    confirm_vendor_assignment, create_booking, create_operator, get_booking, get_booking_audit,
    get_booking_containers, get_trip, list_booking_trips, list_bookings, login, logout,
    request_container_details, update_containers, whoami,
};
pub use notify::{
    DetailsRequestNotice, LoggingNotifier, NotificationError, VendorAssignmentNotice,
    VendorNotifier,
};
pub use registry::{
    DEFAULT_SEARCH_RESULTS, MAX_SEARCH_RESULTS, create_client, create_location, create_vehicle,
    create_vendor, create_vendor_vehicle, create_yard, search_locations, search_vehicles,
};
pub use request_response::{
    AssignVehicleRequest, AssignVehicleResponse, AuditEventInfo, AuditTimelineResponse,
    BookingInfo, BookingStatusResponse, BootstrapRequest, ConfirmVendorAssignmentResponse,
    ContainerFieldsInput, ContainerInfo, ContainerRowError, ContainerSnapshotResponse,
    CreateBookingRequest, CreateClientRequest, CreateLocationRequest, CreateOperatorRequest,
    CreateVehicleRequest, CreateVendorRequest, CreateVendorVehicleRequest, CreateYardRequest,
    CreatedResponse, ListBookingsResponse, ListTripsResponse, LocationCandidateInfo, LocationSearchResponse,
    LoginRequest, LoginResponse, OperatorInfo, PhotoUpload, RequestDetailsRequest, TripInfo,
    UpdateContainersRequest, UpdateContainersResponse, VehicleCandidateInfo,
    VehicleSearchResponse,
};
pub use uploads::PhotoStore;
