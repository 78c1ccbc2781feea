// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// Operators and sessions

/// API request to create the first Admin while no operator exists.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BootstrapRequest {
    /// Login name (stored uppercase).
    pub login_name: String,
    /// Display name.
    pub display_name: String,
    /// Plain-text password.
    pub password: String,
}

/// API request to log in.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequest {
    /// Login name, case-insensitive.
    pub login_name: String,
    /// Plain-text password.
    pub password: String,
}

/// API response for a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token for subsequent requests.
    pub session_token: String,
    /// Anti-forgery token required on container submissions.
    pub csrf_token: String,
    /// The operator's login name.
    pub login_name: String,
    /// The operator's display name.
    pub display_name: String,
    /// The operator's role.
    pub role: String,
    /// Session expiry in unix seconds.
    pub expires_at: i64,
}

/// API request to create an operator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateOperatorRequest {
    /// Login name (stored uppercase).
    pub login_name: String,
    /// Display name.
    pub display_name: String,
    /// Plain-text password.
    pub password: String,
    /// `Admin` or `Dispatcher`.
    pub role: String,
}

/// An operator as exposed by the API. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorInfo {
    /// The operator's canonical identifier.
    pub operator_id: i64,
    /// Login name.
    pub login_name: String,
    /// Display name.
    pub display_name: String,
    /// Role name.
    pub role: String,
}

// Registry

/// API request to register a client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateClientRequest {
    /// Client name.
    pub name: String,
    /// Where the client takes notifications.
    #[serde(default)]
    pub contact_email: Option<String>,
}

/// API request to register a location.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateLocationRequest {
    /// Unique location name.
    pub name: String,
    /// Street address.
    #[serde(default)]
    pub address: Option<String>,
}

/// API request to register a yard under a location.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateYardRequest {
    /// The parent location.
    pub location_id: i64,
    /// Yard name, unique within the location.
    pub name: String,
}

/// API request to register an owned vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateVehicleRequest {
    /// Unique registration number.
    pub registration_number: String,
    /// Free text such as the model.
    #[serde(default)]
    pub description: Option<String>,
}

/// API request to register a vendor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateVendorRequest {
    /// Vendor name.
    pub name: String,
    /// Where the vendor takes notifications.
    #[serde(default)]
    pub contact_email: Option<String>,
}

/// API request to register a vendor vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateVendorVehicleRequest {
    /// Plate number.
    pub vehicle_number: String,
}

/// API response for any created record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedResponse {
    /// The new record's identifier.
    pub id: i64,
    /// A success message.
    pub message: String,
}

/// A location search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationCandidateInfo {
    /// The `kind|id` value to submit back.
    pub value: String,
    /// `location` or `yard`.
    pub kind: String,
    /// The location or yard identifier.
    pub id: i64,
    /// The name as it resolves.
    pub display_name: String,
}

/// API response for a location search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationSearchResponse {
    /// Matches, locations before yards.
    pub candidates: Vec<LocationCandidateInfo>,
}

/// A vehicle search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleCandidateInfo {
    /// The vehicle or vendor-vehicle identifier.
    pub id: i64,
    /// `owned` or `vendor`.
    pub vehicle_type: String,
    /// Plate or registration number.
    pub vehicle_number: String,
    /// Owning vendor for vendor vehicles.
    pub vendor_id: Option<i64>,
    /// Human readable label.
    pub label: String,
}

/// API response for a vehicle search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleSearchResponse {
    /// Matches, owned vehicles first.
    pub candidates: Vec<VehicleCandidateInfo>,
}

// Bookings

/// API request to accept a new booking.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateBookingRequest {
    /// Client-facing booking code.
    pub booking_code: String,
    /// The requesting client.
    pub client_id: i64,
    /// How many containers the client expects to move.
    pub expected_container_count: i64,
    /// Default pickup as `kind|id`.
    #[serde(default)]
    pub from_location: Option<String>,
    /// Default drop as `kind|id`.
    #[serde(default)]
    pub to_location: Option<String>,
}

/// A booking header as exposed by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingInfo {
    /// The booking identifier.
    pub booking_id: i64,
    /// Client-facing booking code.
    pub booking_code: String,
    /// The requesting client.
    pub client_id: i64,
    /// Expected container count.
    pub expected_container_count: u32,
    /// Current status.
    pub status: String,
    /// Default pickup as `kind|id`.
    pub default_from: Option<String>,
    /// Default drop as `kind|id`.
    pub default_to: Option<String>,
    /// Login of the operator who acknowledged the booking.
    pub acknowledged_by: Option<String>,
}

/// API response listing bookings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListBookingsResponse {
    /// Newest first.
    pub bookings: Vec<BookingInfo>,
}

/// API request to ask the client for container details.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct RequestDetailsRequest {
    /// Optional message for the client.
    #[serde(default)]
    pub note: Option<String>,
}

/// API response for a booking status step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingStatusResponse {
    /// The booking identifier.
    pub booking_id: i64,
    /// Status after the request.
    pub status: String,
    /// True when the step had already been taken and nothing changed.
    pub already_processed: bool,
    /// A human readable outcome.
    pub message: String,
}

/// One container row as submitted. Blank values leave stored data alone.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContainerFieldsInput {
    /// `20ft` or `40ft`.
    #[serde(default)]
    pub container_type: Option<String>,
    /// Primary container number.
    #[serde(default)]
    pub number1: Option<String>,
    /// Second container number, 20ft only.
    #[serde(default)]
    pub number2: Option<String>,
    /// Pickup as `kind|id`.
    #[serde(default)]
    pub from_location: Option<String>,
    /// Drop as `kind|id`.
    #[serde(default)]
    pub to_location: Option<String>,
}

/// An uploaded photo for one container slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoUpload {
    /// The row key: an existing container id or `new_<n>`.
    pub key: String,
    /// Photo slot, 1 or 2.
    pub slot: u8,
    /// Raw file content.
    pub bytes: Vec<u8>,
}

/// API request for a container batch.
///
/// Assembled by the server from a multipart form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UpdateContainersRequest {
    /// The session's anti-forgery token, as submitted.
    pub csrf_token: String,
    /// The expected container total after the batch.
    pub expected_total: i64,
    /// Row payloads keyed by container id or `new_<n>`.
    pub containers: BTreeMap<String, ContainerFieldsInput>,
    /// Uploaded photos.
    pub photos: Vec<PhotoUpload>,
}

/// API response for a container batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateContainersResponse {
    /// The booking identifier.
    pub booking_id: i64,
    /// Status after the batch.
    pub status: String,
    /// Rows inserted or changed.
    pub processed: usize,
    /// True when an identical submission was already applied.
    pub duplicate: bool,
    /// Rows whose photos were rejected; their other fields still saved.
    #[serde(default)]
    pub row_errors: Vec<ContainerRowError>,
    /// A human readable outcome.
    pub message: String,
}

/// A photo failure scoped to one container row of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerRowError {
    /// The row key, e.g. `new_2` or `17`.
    pub key: String,
    /// Why the row's photos were not stored.
    pub message: String,
}

/// One row of the container snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerInfo {
    /// The container identifier.
    pub container_id: i64,
    /// Position within the booking.
    pub sequence: u32,
    /// `20ft` or `40ft`.
    pub container_type: Option<String>,
    /// Primary container number.
    pub number1: Option<String>,
    /// Second container number.
    pub number2: Option<String>,
    /// Pickup as `kind|id`.
    pub from_location: Option<String>,
    /// Resolved pickup name.
    pub from_name: Option<String>,
    /// Drop as `kind|id`.
    pub to_location: Option<String>,
    /// Resolved drop name.
    pub to_name: Option<String>,
    /// Stored first photo path.
    pub photo1: Option<String>,
    /// Stored second photo path.
    pub photo2: Option<String>,
    /// Dispatch progress.
    pub assignment_status: String,
    /// `owned` or `vendor` once a vehicle is chosen.
    pub vehicle_type: Option<String>,
    /// The trip, once dispatched.
    pub trip_id: Option<i64>,
    /// The vendor assignment record, for vendor vehicles.
    pub vendor_assignment_id: Option<i64>,
    /// Whether a vehicle may be assigned now.
    pub is_ready: bool,
    /// Why the row is not ready.
    pub blocking_reasons: Vec<String>,
}

/// API response for the container snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSnapshotResponse {
    /// The booking identifier.
    pub booking_id: i64,
    /// Client-facing booking code.
    pub booking_code: String,
    /// Current status.
    pub status: String,
    /// Expected container count.
    pub expected_container_count: u32,
    /// Rows in sequence order.
    pub containers: Vec<ContainerInfo>,
}

/// API request to assign a vehicle to a container.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "vehicle_type", rename_all = "snake_case")]
pub enum AssignVehicleRequest {
    /// A vehicle from the owned fleet.
    Owned {
        /// The fleet vehicle.
        vehicle_id: i64,
        /// `YYYY-MM-DD`; today when omitted.
        #[serde(default)]
        trip_date: Option<String>,
    },
    /// A vendor vehicle.
    Vendor {
        /// The vendor.
        vendor_id: i64,
        /// Plate number as dispatched.
        vehicle_number: String,
        /// The vendor's registered vehicle, if on file.
        #[serde(default)]
        vendor_vehicle_id: Option<i64>,
        /// Daily rate in currency units.
        daily_rate: f64,
        /// `YYYY-MM-DD`; today when omitted.
        #[serde(default)]
        trip_date: Option<String>,
    },
}

/// API response for a vehicle assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignVehicleResponse {
    /// The booking identifier.
    pub booking_id: i64,
    /// The dispatched container.
    pub container_id: i64,
    /// The created trip.
    pub trip_id: i64,
    /// The trip reference number.
    pub trip_reference: String,
    /// The vendor assignment record, for vendor vehicles.
    pub vendor_assignment_id: Option<i64>,
    /// Booking status after the assignment.
    pub status: String,
}

/// API response for a vendor confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmVendorAssignmentResponse {
    /// The vendor assignment record.
    pub vendor_assignment_id: i64,
    /// Status after the request.
    pub status: String,
    /// True when the record was already confirmed.
    pub already_processed: bool,
}

/// A trip as exposed by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripInfo {
    /// The trip identifier.
    pub trip_id: i64,
    /// The booking served.
    pub booking_id: i64,
    /// The container moved.
    pub container_id: i64,
    /// `{booking_code}-{sequence}`.
    pub reference_number: String,
    /// `YYYY-MM-DD`.
    pub trip_date: String,
    /// Pickup name at dispatch time.
    pub from_name: String,
    /// Drop name at dispatch time.
    pub to_name: String,
    /// `owned` or `vendor`.
    pub vehicle_type: String,
    /// Vehicle description at dispatch time.
    pub vehicle_descriptor: String,
    /// Trip status.
    pub status: String,
}

/// API response listing a booking's trips.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListTripsResponse {
    /// The booking identifier.
    pub booking_id: i64,
    /// Trips in creation order.
    pub trips: Vec<TripInfo>,
}

/// An audit event as exposed by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEventInfo {
    /// The event identifier.
    pub event_id: Option<i64>,
    /// Action name.
    pub action: String,
    /// Action details.
    pub details: Option<String>,
    /// Login (or actor id) the change is attributed to.
    pub actor: String,
    /// Operator display name, when an operator acted.
    pub actor_display_name: Option<String>,
    /// Request identifier.
    pub cause_id: String,
    /// Snapshot before the change.
    pub before: String,
    /// Snapshot after the change.
    pub after: String,
    /// When the event was stored.
    pub recorded_at: Option<String>,
}

/// API response for a booking's audit timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTimelineResponse {
    /// The booking identifier.
    pub booking_id: i64,
    /// Oldest first.
    pub events: Vec<AuditEventInfo>,
}
