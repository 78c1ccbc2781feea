// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions for state-changing and read-only operations.
//!
//! Every workflow handler loads the booking aggregate, applies one command,
//! and persists the result inside a single immediate transaction. Outbound
//! notifications run only after that transaction has committed.

use std::collections::BTreeMap;
use std::str::FromStr;

use cargodesk::{
    BookingState, Command, CoreError, DispatchPlan, IntakeResult, TransitionResult, apply,
    apply_intake,
};
use cargodesk_audit::{Action, AuditEvent, Cause, StateSnapshot};
use cargodesk_domain::{
    Booking, BookingContainer, BookingStatus, ContainerKey, ContainerReadiness, ContainerType,
    ContainerUpdate, DailyRate, LocationRef, LocationResolver, SubmissionFingerprint,
    VehicleAssignment, container_readiness, digest_bytes, normalize_vehicle_number,
    parse_iso_date, validate_booking_code, validate_expected_container_count, validate_name,
    validate_password,
};
use cargodesk_persistence::{
    ClientData, DispatchRecord, OperatorData, PersistTransitionResult, Persistence, TripData,
    VehicleData, VendorAssignmentData, VendorData, VendorVehicleData,
};
use time::{Date, Duration, OffsetDateTime};
use tracing::{debug, info, warn};

use crate::auth::{AuthenticatedActor, AuthenticationService, AuthorizationService, Role};
use crate::error::{ApiError, translate_core_error, translate_domain_error};
use crate::notify::{DetailsRequestNotice, VendorAssignmentNotice, VendorNotifier};
use crate::request_response::{
    AssignVehicleRequest, AssignVehicleResponse, AuditEventInfo, AuditTimelineResponse,
    BookingInfo, BookingStatusResponse, BootstrapRequest, ConfirmVendorAssignmentResponse,
    ContainerFieldsInput, ContainerInfo, ContainerRowError, ContainerSnapshotResponse,
    CreateBookingRequest, CreateOperatorRequest, ListBookingsResponse, ListTripsResponse,
    LoginRequest, LoginResponse, OperatorInfo, PhotoUpload, RequestDetailsRequest, TripInfo,
    UpdateContainersRequest, UpdateContainersResponse,
};
use crate::uploads::PhotoStore;

/// A committed transition together with what was written for it.
struct Applied {
    result: TransitionResult,
    persisted: PersistTransitionResult,
}

enum Outcome {
    Applied(Box<Applied>),
    /// The booking had already moved past the requested step.
    AlreadyProcessed {
        status: String,
    },
}

fn unix_now() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn parse_location(value: Option<&str>) -> Result<Option<LocationRef>, ApiError> {
    value.map_or(Ok(None), |v| {
        LocationRef::parse_wire(v).map_err(translate_domain_error)
    })
}

fn booking_info(booking: &Booking) -> BookingInfo {
    BookingInfo {
        booking_id: booking.id_or_zero(),
        booking_code: booking.booking_code.clone(),
        client_id: booking.client_id,
        expected_container_count: booking.expected_container_count,
        status: booking.status.as_str().to_string(),
        default_from: booking.default_from.as_ref().map(LocationRef::to_wire),
        default_to: booking.default_to.as_ref().map(LocationRef::to_wire),
        acknowledged_by: booking.acknowledged_by.clone(),
    }
}

fn operator_info(operator: &OperatorData) -> OperatorInfo {
    OperatorInfo {
        operator_id: operator.operator_id,
        login_name: operator.login_name.clone(),
        display_name: operator.display_name.clone(),
        role: operator.role.clone(),
    }
}

fn require_booking(persistence: &mut Persistence, booking_id: i64) -> Result<Booking, ApiError> {
    persistence
        .get_booking(booking_id)?
        .ok_or_else(|| ApiError::not_found("Booking", format!("Booking {booking_id} does not exist")))
}

/// Loads the aggregate, applies `command`, and persists the result in one
/// transaction.
fn execute(
    persistence: &mut Persistence,
    booking_id: i64,
    command: Command,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<Outcome, ApiError> {
    persistence.in_transaction::<_, ApiError, _>(|uow| {
        let state: BookingState = uow.load_booking_state(booking_id)?;
        let resolver: LocationResolver = uow.load_resolver(&state)?;
        match apply(&state, &resolver, command, actor.to_audit_actor(), cause) {
            Ok(result) => {
                let persisted: PersistTransitionResult = uow.persist_transition(&result)?;
                Ok(Outcome::Applied(Box::new(Applied { result, persisted })))
            }
            Err(CoreError::AlreadyProcessed { status, .. }) => {
                Ok(Outcome::AlreadyProcessed { status })
            }
            Err(err) => Err(translate_core_error(err)),
        }
    })
}

/// Like [`execute`], for commands where "already processed" is a conflict.
fn execute_strict(
    persistence: &mut Persistence,
    booking_id: i64,
    command: Command,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<Applied, ApiError> {
    match execute(persistence, booking_id, command, actor, cause)? {
        Outcome::Applied(applied) => Ok(*applied),
        Outcome::AlreadyProcessed { status } => Err(ApiError::Conflict {
            message: format!("Booking {booking_id} was already processed (status: {status})"),
        }),
    }
}

// ========================================================================
// Operators and sessions
// ========================================================================

/// Creates the first Admin.
///
/// Only allowed while no operator exists.
///
/// # Errors
///
/// Returns an error if operators already exist, the input is invalid, or
/// the database write fails.
pub fn bootstrap_first_admin(
    persistence: &mut Persistence,
    request: &BootstrapRequest,
) -> Result<OperatorInfo, ApiError> {
    if persistence.count_operators()? > 0 {
        return Err(ApiError::Unauthorized {
            action: String::from("bootstrap_first_admin"),
            required_role: String::from("Bootstrap mode (no operators exist)"),
        });
    }

    let login_name: String =
        validate_name("login_name", &request.login_name).map_err(translate_domain_error)?;
    let display_name: String =
        validate_name("display_name", &request.display_name).map_err(translate_domain_error)?;
    validate_password(&request.password).map_err(translate_domain_error)?;

    let operator_id: i64 = persistence.create_operator(
        &login_name,
        &display_name,
        &request.password,
        Role::Admin.as_str(),
    )?;
    let operator: OperatorData = persistence
        .get_operator_by_id(operator_id)?
        .ok_or_else(|| ApiError::Internal {
            message: String::from("Operator not found after creation"),
        })?;

    info!(login_name = %operator.login_name, "First admin created");
    Ok(operator_info(&operator))
}

/// Verifies credentials and opens a session.
///
/// Expired sessions are purged on every login.
///
/// # Errors
///
/// Returns `ApiError::AuthenticationFailed` for bad credentials.
pub fn login(
    persistence: &mut Persistence,
    request: &LoginRequest,
    session_ttl: Duration,
) -> Result<LoginResponse, ApiError> {
    let purged: usize = persistence.delete_expired_sessions(unix_now())?;
    if purged > 0 {
        debug!(purged, "Purged expired sessions");
    }

    let issued = AuthenticationService::login(
        persistence,
        &request.login_name,
        &request.password,
        session_ttl,
    )?;

    Ok(LoginResponse {
        session_token: issued.session_token,
        csrf_token: issued.csrf_token,
        role: issued.actor.role.as_str().to_string(),
        login_name: issued.actor.login_name,
        display_name: issued.actor.display_name,
        expires_at: issued.expires_at,
    })
}

/// Ends a session.
///
/// # Errors
///
/// Returns an error if the session cannot be deleted.
pub fn logout(persistence: &mut Persistence, session_token: &str) -> Result<(), ApiError> {
    AuthenticationService::logout(persistence, session_token)?;
    Ok(())
}

/// Describes the calling operator.
#[must_use]
pub fn whoami(actor: &AuthenticatedActor) -> OperatorInfo {
    OperatorInfo {
        operator_id: actor.operator_id,
        login_name: actor.login_name.clone(),
        display_name: actor.display_name.clone(),
        role: actor.role.as_str().to_string(),
    }
}

/// Creates an operator.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, the role or password is
/// invalid, the login is taken, or the database write fails.
pub fn create_operator(
    persistence: &mut Persistence,
    request: &CreateOperatorRequest,
    actor: &AuthenticatedActor,
) -> Result<OperatorInfo, ApiError> {
    AuthorizationService::require_admin(actor, "create_operator")?;

    let role: Role = Role::parse(&request.role).map_err(|_| {
        ApiError::invalid(
            "role",
            format!(
                "Invalid role: {}. Must be 'Admin' or 'Dispatcher'",
                request.role
            ),
        )
    })?;
    let login_name: String =
        validate_name("login_name", &request.login_name).map_err(translate_domain_error)?;
    let display_name: String =
        validate_name("display_name", &request.display_name).map_err(translate_domain_error)?;
    validate_password(&request.password).map_err(translate_domain_error)?;

    let operator_id: i64 = persistence.create_operator(
        &login_name,
        &display_name,
        &request.password,
        role.as_str(),
    )?;
    let operator: OperatorData = persistence
        .get_operator_by_id(operator_id)?
        .ok_or_else(|| ApiError::Internal {
            message: String::from("Operator not found after creation"),
        })?;

    info!(
        login_name = %operator.login_name,
        role = role.as_str(),
        by = %actor.login_name,
        "Operator created"
    );
    Ok(operator_info(&operator))
}

// ========================================================================
// Booking intake and workflow
// ========================================================================

/// Accepts a new booking in `pending` status.
///
/// # Errors
///
/// Returns an error if the input is invalid, the client does not exist, a
/// default location does not resolve, the booking code is taken, or the
/// database write fails.
pub fn create_booking(
    persistence: &mut Persistence,
    request: &CreateBookingRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<BookingInfo, ApiError> {
    let booking_code: String = request.booking_code.trim().to_string();
    validate_booking_code(&booking_code).map_err(translate_domain_error)?;
    let expected: u32 = validate_expected_container_count(request.expected_container_count)
        .map_err(translate_domain_error)?;
    let default_from: Option<LocationRef> = parse_location(request.from_location.as_deref())?;
    let default_to: Option<LocationRef> = parse_location(request.to_location.as_deref())?;

    if persistence.get_client(request.client_id)?.is_none() {
        return Err(ApiError::not_found(
            "Client",
            format!("Client {} does not exist", request.client_id),
        ));
    }

    let defaults: Vec<LocationRef> = default_from.into_iter().chain(default_to).collect();
    let resolver: LocationResolver = persistence.load_location_resolver(&defaults)?;
    if let Some(missing) = defaults.iter().find(|r| !resolver.resolve(r).is_resolved()) {
        return Err(ApiError::invalid(
            "location",
            format!("Location {missing} does not exist"),
        ));
    }

    if persistence.booking_code_exists(&booking_code)? {
        return Err(ApiError::Conflict {
            message: format!("Booking code '{booking_code}' already exists"),
        });
    }

    let booking: Booking = Booking::new(
        booking_code,
        request.client_id,
        expected,
        default_from,
        default_to,
    );
    let intake: IntakeResult =
        apply_intake(booking, actor.to_audit_actor(), cause).map_err(translate_core_error)?;
    let (booking_id, _event_id): (i64, i64) =
        persistence.in_transaction::<_, ApiError, _>(|uow| Ok(uow.persist_intake(&intake)?))?;

    let mut booking: Booking = intake.booking;
    booking.booking_id = Some(booking_id);
    info!(booking_id, booking_code = %booking.booking_code, "Booking accepted");
    Ok(booking_info(&booking))
}

/// Takes ownership of a pending booking.
///
/// Acknowledging a booking that has already moved on is reported with
/// `already_processed` set and changes nothing.
///
/// # Errors
///
/// Returns an error if the booking does not exist or the database fails.
pub fn acknowledge_booking(
    persistence: &mut Persistence,
    booking_id: i64,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<BookingStatusResponse, ApiError> {
    match execute(
        persistence,
        booking_id,
        Command::AcknowledgeBooking,
        actor,
        cause,
    )? {
        Outcome::Applied(applied) => {
            info!(booking_id, by = %actor.login_name, "Booking acknowledged");
            Ok(BookingStatusResponse {
                booking_id,
                status: applied.result.new_state.booking.status.as_str().to_string(),
                already_processed: false,
                message: format!("Booking acknowledged by {}", actor.login_name),
            })
        }
        Outcome::AlreadyProcessed { status } => {
            warn!(booking_id, %status, "Booking was already acknowledged");
            Ok(BookingStatusResponse {
                booking_id,
                status,
                already_processed: true,
                message: String::from("Booking was already processed"),
            })
        }
    }
}

/// Moves an acknowledged booking to `awaiting_containers` and asks the
/// client for container details.
///
/// # Errors
///
/// Returns an error if the booking does not exist, is not
/// `being_addressed`, or the database fails. Notification failures are only
/// logged.
pub fn request_container_details(
    persistence: &mut Persistence,
    notifier: &dyn VendorNotifier,
    booking_id: i64,
    request: &RequestDetailsRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<BookingStatusResponse, ApiError> {
    let note: Option<String> = non_blank(request.note.as_deref());
    let applied: Applied = execute_strict(
        persistence,
        booking_id,
        Command::RequestContainerDetails { note: note.clone() },
        actor,
        cause,
    )?;
    let booking: &Booking = &applied.result.new_state.booking;
    info!(booking_id, by = %actor.login_name, "Container details requested");

    match persistence.get_client(booking.client_id) {
        Ok(Some(client)) => {
            let client: ClientData = client;
            let notice: DetailsRequestNotice = DetailsRequestNotice {
                booking_id,
                booking_code: booking.booking_code.clone(),
                client_name: client.name,
                contact_email: client.contact_email,
                note,
            };
            if let Err(e) = notifier.notify_details_request(&notice) {
                warn!(booking_id, "Details request notification failed: {e}");
            }
        }
        Ok(None) => warn!(booking_id, "Client missing, details request not sent"),
        Err(e) => warn!(booking_id, "Could not load client for notification: {e}"),
    }

    Ok(BookingStatusResponse {
        booking_id,
        status: booking.status.as_str().to_string(),
        already_processed: false,
        message: String::from("Container details requested from client"),
    })
}

fn parse_container_rows(
    rows: &BTreeMap<String, ContainerFieldsInput>,
) -> Result<BTreeMap<ContainerKey, ContainerUpdate>, ApiError> {
    let mut updates: BTreeMap<ContainerKey, ContainerUpdate> = BTreeMap::new();
    for (raw_key, fields) in rows {
        let key: ContainerKey = ContainerKey::from_str(raw_key).map_err(translate_domain_error)?;
        let mut update: ContainerUpdate = ContainerUpdate::blank(key);
        update.container_type = match fields.container_type.as_deref() {
            Some(value) => ContainerType::parse_optional(value).map_err(translate_domain_error)?,
            None => None,
        };
        update.number1 = non_blank(fields.number1.as_deref());
        update.number2 = non_blank(fields.number2.as_deref());
        update.from_location = parse_location(fields.from_location.as_deref())?;
        update.to_location = parse_location(fields.to_location.as_deref())?;

        if updates.insert(key, update).is_some() {
            return Err(ApiError::invalid(
                "containers",
                format!("Row {key} was submitted more than once"),
            ));
        }
    }
    Ok(updates)
}

/// A stable hash of everything that determines the batch's effect.
fn submission_fingerprint(booking_id: i64, request: &UpdateContainersRequest) -> String {
    let mut fingerprint: SubmissionFingerprint = SubmissionFingerprint::new(booking_id);
    fingerprint.field("expected_total", &request.expected_total.to_string());

    for (key, fields) in &request.containers {
        for (name, value) in [
            ("container_type", &fields.container_type),
            ("number1", &fields.number1),
            ("number2", &fields.number2),
            ("from_location", &fields.from_location),
            ("to_location", &fields.to_location),
        ] {
            fingerprint.field(
                &format!("{key}.{name}"),
                value.as_deref().map_or("", str::trim),
            );
        }
    }

    let mut photos: Vec<(&str, u8, String)> = request
        .photos
        .iter()
        .map(|p| (p.key.as_str(), p.slot, digest_bytes(&p.bytes)))
        .collect();
    photos.sort();
    for (key, slot, digest) in photos {
        fingerprint.field(&format!("{key}.image{slot}"), &digest);
    }

    fingerprint.finish(&request.csrf_token)
}

fn duplicate_response(
    persistence: &mut Persistence,
    booking_id: i64,
) -> Result<UpdateContainersResponse, ApiError> {
    let booking: Booking = require_booking(persistence, booking_id)?;
    Ok(UpdateContainersResponse {
        booking_id,
        status: booking.status.as_str().to_string(),
        processed: 0,
        duplicate: true,
        row_errors: Vec::new(),
        message: String::from("Submission already processed"),
    })
}

/// Session-scoped settings a container batch runs under.
#[derive(Debug, Clone, Copy)]
pub struct ContainerBatchContext<'a> {
    /// Where uploaded photos are written.
    pub photos: &'a PhotoStore,
    /// The anti-forgery token issued with the operator's session.
    pub session_csrf_token: &'a str,
    /// How long a submission receipt suppresses repeats.
    pub receipt_ttl_secs: i64,
}

/// Stores each row's photos, one row at a time.
///
/// A row whose photo is rejected or cannot be written loses all of its
/// photo fields and is reported; other rows keep theirs.
fn store_row_photos(
    photo_store: &PhotoStore,
    booking_id: i64,
    photos: &[PhotoUpload],
    photo_slots: &[(ContainerKey, u8)],
    updates: &mut BTreeMap<ContainerKey, ContainerUpdate>,
) -> Vec<ContainerRowError> {
    let mut by_key: BTreeMap<ContainerKey, Vec<(&PhotoUpload, u8)>> = BTreeMap::new();
    for (photo, (key, slot)) in photos.iter().zip(photo_slots) {
        by_key.entry(*key).or_default().push((photo, *slot));
    }

    let mut row_errors: Vec<ContainerRowError> = Vec::new();
    for (key, uploads) in by_key {
        let mut stored: Vec<(u8, String)> = Vec::with_capacity(uploads.len());
        let mut failure: Option<ApiError> = None;
        for (photo, slot) in &uploads {
            let field: String = format!("container_{}_image{slot}", photo.key);
            match photo_store.store(booking_id, &field, &photo.bytes) {
                Ok(path) => stored.push((*slot, path)),
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }

        if let Some(e) = failure {
            warn!(booking_id, row = %key, "Dropped photos for container row: {e}");
            row_errors.push(ContainerRowError {
                key: key.to_string(),
                message: e.to_string(),
            });
            continue;
        }

        let update: &mut ContainerUpdate = updates
            .entry(key)
            .or_insert_with(|| ContainerUpdate::blank(key));
        for (slot, path) in stored {
            if slot == 1 {
                update.photo1 = Some(path);
            } else {
                update.photo2 = Some(path);
            }
        }
    }
    row_errors
}

/// Applies a container batch.
///
/// The anti-forgery token must match the session. A repeat of a batch
/// already applied within the receipt window is answered as a success
/// without touching the booking. Photos are stored before the transaction,
/// row by row: a rejected photo drops that row's photos and is listed in
/// `row_errors`, while the row's other fields and every sibling row still
/// save. Row writes, the status recompute, the audit event, and the receipt
/// commit together.
///
/// # Errors
///
/// Returns an error if the token is wrong, the booking does not exist, a
/// row or photo slot is malformed, a tripped row would change, or the
/// database fails.
pub fn update_containers(
    persistence: &mut Persistence,
    booking_id: i64,
    request: &UpdateContainersRequest,
    context: &ContainerBatchContext<'_>,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<UpdateContainersResponse, ApiError> {
    if request.csrf_token.is_empty() || request.csrf_token != context.session_csrf_token {
        warn!(booking_id, by = %actor.login_name, "Rejected container batch: anti-forgery token mismatch");
        return Err(ApiError::Forbidden {
            reason: String::from("Missing or invalid anti-forgery token"),
        });
    }

    require_booking(persistence, booking_id)?;
    let expected_total: u32 = validate_expected_container_count(request.expected_total)
        .map_err(translate_domain_error)?;
    let mut updates: BTreeMap<ContainerKey, ContainerUpdate> =
        parse_container_rows(&request.containers)?;

    let mut photo_slots: Vec<(ContainerKey, u8)> = Vec::with_capacity(request.photos.len());
    for photo in &request.photos {
        let key: ContainerKey = ContainerKey::from_str(&photo.key).map_err(translate_domain_error)?;
        if !matches!(photo.slot, 1 | 2) {
            return Err(ApiError::invalid(
                "image",
                format!("Photo slot {} is not 1 or 2", photo.slot),
            ));
        }
        photo_slots.push((key, photo.slot));
    }

    let fingerprint: String = submission_fingerprint(booking_id, request);
    let now: i64 = unix_now();
    if persistence.has_live_receipt(booking_id, &fingerprint, now)? {
        warn!(booking_id, by = %actor.login_name, "Duplicate container batch ignored");
        return duplicate_response(persistence, booking_id);
    }

    let row_errors: Vec<ContainerRowError> = store_row_photos(
        context.photos,
        booking_id,
        &request.photos,
        &photo_slots,
        &mut updates,
    );

    let command: Command = Command::UpdateContainers {
        expected_total,
        updates: updates.into_values().collect(),
    };
    let receipt_ttl_secs: i64 = context.receipt_ttl_secs;
    let applied: Option<Applied> = persistence.in_transaction::<_, ApiError, _>(|uow| {
        if uow.has_live_receipt(booking_id, &fingerprint, now)? {
            return Ok(None);
        }
        let state: BookingState = uow.load_booking_state(booking_id)?;
        let resolver: LocationResolver = uow.load_resolver(&state)?;
        let result: TransitionResult =
            apply(&state, &resolver, command, actor.to_audit_actor(), cause)
                .map_err(translate_core_error)?;
        let persisted: PersistTransitionResult = uow.persist_transition(&result)?;
        uow.record_receipt(booking_id, &fingerprint, now, receipt_ttl_secs)?;
        Ok(Some(Applied { result, persisted }))
    })?;

    let Some(applied) = applied else {
        warn!(booking_id, "Duplicate container batch ignored after lock");
        return duplicate_response(persistence, booking_id);
    };

    let processed: usize = applied.result.processed_count();
    info!(
        booking_id,
        processed,
        inserted = applied.persisted.inserted_container_ids.len(),
        rejected_photo_rows = row_errors.len(),
        status = applied.result.new_state.booking.status.as_str(),
        "Container batch applied"
    );
    let message: String = if row_errors.is_empty() {
        format!("{processed} container rows saved")
    } else {
        format!(
            "{processed} container rows saved; photos rejected for {} rows",
            row_errors.len()
        )
    };
    Ok(UpdateContainersResponse {
        booking_id,
        status: applied.result.new_state.booking.status.as_str().to_string(),
        processed,
        duplicate: false,
        row_errors,
        message,
    })
}

/// Resolves the request into a domain assignment and a vehicle description.
fn resolve_assignment(
    persistence: &mut Persistence,
    request: &AssignVehicleRequest,
) -> Result<(VehicleAssignment, String, Option<VendorData>), ApiError> {
    match request {
        AssignVehicleRequest::Owned { vehicle_id, .. } => {
            let vehicle: VehicleData = persistence.get_vehicle(*vehicle_id)?.ok_or_else(|| {
                ApiError::not_found("Vehicle", format!("Vehicle {vehicle_id} does not exist"))
            })?;
            if !vehicle.is_active {
                return Err(ApiError::invalid(
                    "vehicle_id",
                    format!("Vehicle {} is not active", vehicle.registration_number),
                ));
            }
            Ok((
                VehicleAssignment::Owned {
                    vehicle_id: vehicle.vehicle_id,
                },
                vehicle.registration_number,
                None,
            ))
        }
        AssignVehicleRequest::Vendor {
            vendor_id,
            vehicle_number,
            vendor_vehicle_id,
            daily_rate,
            ..
        } => {
            let daily_rate: DailyRate =
                DailyRate::from_amount(*daily_rate).map_err(translate_domain_error)?;
            let vehicle_number: String =
                normalize_vehicle_number(vehicle_number).map_err(translate_domain_error)?;
            let vendor: VendorData = persistence.get_vendor(*vendor_id)?.ok_or_else(|| {
                ApiError::not_found("Vendor", format!("Vendor {vendor_id} does not exist"))
            })?;
            if let Some(id) = vendor_vehicle_id {
                let registered: VendorVehicleData =
                    persistence.get_vendor_vehicle(*id)?.ok_or_else(|| {
                        ApiError::not_found(
                            "Vendor vehicle",
                            format!("Vendor vehicle {id} does not exist"),
                        )
                    })?;
                if registered.vendor_id != vendor.vendor_id {
                    return Err(ApiError::invalid(
                        "vendor_vehicle_id",
                        format!(
                            "Vendor vehicle {id} belongs to vendor {}",
                            registered.vendor_id
                        ),
                    ));
                }
            }

            let descriptor: String = format!("{vehicle_number} ({})", vendor.name);
            Ok((
                VehicleAssignment::Vendor {
                    vendor_id: vendor.vendor_id,
                    vendor_vehicle_id: *vendor_vehicle_id,
                    vehicle_number,
                    daily_rate,
                },
                descriptor,
                Some(vendor),
            ))
        }
    }
}

fn notify_vendor(
    notifier: &dyn VendorNotifier,
    vendor: VendorData,
    booking_code: &str,
    plan: &DispatchPlan,
    vendor_assignment_id: i64,
) {
    let Some(draft) = plan.vendor_assignment.as_ref() else {
        return;
    };
    let notice: VendorAssignmentNotice = VendorAssignmentNotice {
        vendor_assignment_id,
        vendor_id: vendor.vendor_id,
        vendor_name: vendor.name,
        contact_email: vendor.contact_email,
        booking_code: booking_code.to_string(),
        trip_reference: plan.trip.reference_number.clone(),
        trip_date: plan.trip.trip_date.to_string(),
        vehicle_number: draft.vehicle_number.clone(),
        daily_rate: draft.daily_rate.to_string(),
    };
    if let Err(e) = notifier.notify_assignment(&notice) {
        warn!(
            vendor_assignment_id,
            vendor_id = notice.vendor_id,
            "Vendor notification failed: {e}"
        );
    }
}

/// Assigns a vehicle to a ready container and creates its trip.
///
/// Vendor vehicles also get a vendor assignment record awaiting the
/// vendor's confirmation, and the vendor is notified after commit.
///
/// # Errors
///
/// Returns an error if the input is invalid, the vehicle or vendor does not
/// exist, the container is not ready or already has a trip, or the database
/// fails. Notification failures are only logged.
pub fn assign_vehicle(
    persistence: &mut Persistence,
    notifier: &dyn VendorNotifier,
    booking_id: i64,
    container_id: i64,
    request: &AssignVehicleRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<AssignVehicleResponse, ApiError> {
    let trip_date_input: Option<&str> = match request {
        AssignVehicleRequest::Owned { trip_date, .. }
        | AssignVehicleRequest::Vendor { trip_date, .. } => trip_date.as_deref(),
    };
    let (assignment, vehicle_descriptor, vendor) = resolve_assignment(persistence, request)?;
    let trip_date: Date = match non_blank(trip_date_input) {
        Some(value) => parse_iso_date(&value).map_err(translate_domain_error)?,
        None => OffsetDateTime::now_utc().date(),
    };

    let Applied { result, persisted } = execute_strict(
        persistence,
        booking_id,
        Command::AssignVehicle {
            container_id,
            assignment,
            vehicle_descriptor,
            trip_date,
        },
        actor,
        cause,
    )?;
    let record: DispatchRecord = persisted.dispatch.ok_or_else(|| ApiError::Internal {
        message: String::from("Assignment produced no trip"),
    })?;
    let plan: &DispatchPlan = result.dispatch.as_ref().ok_or_else(|| ApiError::Internal {
        message: String::from("Assignment produced no dispatch plan"),
    })?;

    info!(
        booking_id,
        container_id,
        trip_id = record.trip_id,
        source = plan.trip.vehicle_source.as_str(),
        by = %actor.login_name,
        "Vehicle assigned"
    );

    if let (Some(vendor), Some(vendor_assignment_id)) = (vendor, record.vendor_assignment_id) {
        notify_vendor(
            notifier,
            vendor,
            &result.new_state.booking.booking_code,
            plan,
            vendor_assignment_id,
        );
    }

    Ok(AssignVehicleResponse {
        booking_id,
        container_id,
        trip_id: record.trip_id,
        trip_reference: plan.trip.reference_number.clone(),
        vendor_assignment_id: record.vendor_assignment_id,
        status: result.new_state.booking.status.as_str().to_string(),
    })
}

/// Records the vendor's confirmation of a dispatched vehicle.
///
/// Confirming twice is reported with `already_processed` set.
///
/// # Errors
///
/// Returns an error if the record does not exist or the database fails.
pub fn confirm_vendor_assignment(
    persistence: &mut Persistence,
    vendor_assignment_id: i64,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<ConfirmVendorAssignmentResponse, ApiError> {
    let changed: bool = persistence.in_transaction::<_, ApiError, _>(|uow| {
        let record: VendorAssignmentData = uow
            .get_vendor_assignment(vendor_assignment_id)?
            .ok_or_else(|| {
                ApiError::not_found(
                    "Vendor assignment",
                    format!("Vendor assignment {vendor_assignment_id} does not exist"),
                )
            })?;
        let changed: bool = uow.confirm_vendor_assignment(vendor_assignment_id)?;
        if changed {
            let event: AuditEvent = AuditEvent::new(
                record.booking_id,
                actor.to_audit_actor(),
                cause,
                Action::new(
                    String::from("ConfirmVendorAssignment"),
                    Some(format!(
                        "Vendor {} confirmed vehicle {} for container {}",
                        record.vendor_id, record.vehicle_number, record.container_id
                    )),
                ),
                StateSnapshot::new(format!(
                    "vendor_assignment={vendor_assignment_id},status={}",
                    record.status.as_str()
                )),
                StateSnapshot::new(format!(
                    "vendor_assignment={vendor_assignment_id},status=confirmed"
                )),
            );
            uow.persist_audit_event(&event)?;
        }
        Ok(changed)
    })?;

    if changed {
        info!(vendor_assignment_id, by = %actor.login_name, "Vendor assignment confirmed");
    } else {
        warn!(vendor_assignment_id, "Vendor assignment was already confirmed");
    }
    Ok(ConfirmVendorAssignmentResponse {
        vendor_assignment_id,
        status: String::from("confirmed"),
        already_processed: !changed,
    })
}

// ========================================================================
// Reads
// ========================================================================

/// Returns one booking header.
///
/// # Errors
///
/// Returns an error if the booking does not exist or the query fails.
pub fn get_booking(persistence: &mut Persistence, booking_id: i64) -> Result<BookingInfo, ApiError> {
    let booking: Booking = require_booking(persistence, booking_id)?;
    Ok(booking_info(&booking))
}

/// Lists bookings, newest first, optionally filtered by status.
///
/// # Errors
///
/// Returns an error if the status is unknown or the query fails.
pub fn list_bookings(
    persistence: &mut Persistence,
    status: Option<&str>,
) -> Result<ListBookingsResponse, ApiError> {
    let status: Option<BookingStatus> = match non_blank(status) {
        Some(value) => Some(BookingStatus::from_str(&value).map_err(translate_domain_error)?),
        None => None,
    };
    let bookings: Vec<BookingInfo> = persistence
        .list_bookings(status)?
        .iter()
        .map(booking_info)
        .collect();
    Ok(ListBookingsResponse { bookings })
}

fn container_info(container: &BookingContainer, resolver: &LocationResolver) -> ContainerInfo {
    let readiness: ContainerReadiness = container_readiness(container, resolver);
    let resolved_name = |reference: Option<&LocationRef>| -> Option<String> {
        resolver
            .resolve_optional(reference)
            .display_name()
            .map(str::to_string)
    };

    ContainerInfo {
        container_id: container.id_or_zero(),
        sequence: container.sequence,
        container_type: container.container_type.map(|t| t.as_str().to_string()),
        number1: container.number1.clone(),
        number2: container.number2.clone(),
        from_location: container.from_location.as_ref().map(LocationRef::to_wire),
        from_name: resolved_name(container.from_location.as_ref()),
        to_location: container.to_location.as_ref().map(LocationRef::to_wire),
        to_name: resolved_name(container.to_location.as_ref()),
        photo1: container.photo1.clone(),
        photo2: container.photo2.clone(),
        assignment_status: container.assignment_status.as_str().to_string(),
        vehicle_type: container
            .assignment
            .as_ref()
            .map(|a| a.source().as_str().to_string()),
        trip_id: container.trip_id,
        vendor_assignment_id: container.vendor_assignment_id,
        is_ready: readiness.is_ready,
        blocking_reasons: readiness.blocking_reasons,
    }
}

/// Returns every container row with resolved location names and readiness.
///
/// # Errors
///
/// Returns an error if the booking does not exist or a query fails.
pub fn get_booking_containers(
    persistence: &mut Persistence,
    booking_id: i64,
) -> Result<ContainerSnapshotResponse, ApiError> {
    require_booking(persistence, booking_id)?;
    let state: BookingState = persistence.load_booking_state(booking_id)?;
    let resolver: LocationResolver = persistence.load_resolver_for_state(&state)?;

    Ok(ContainerSnapshotResponse {
        booking_id,
        booking_code: state.booking.booking_code.clone(),
        status: state.booking.status.as_str().to_string(),
        expected_container_count: state.booking.expected_container_count,
        containers: state
            .containers
            .iter()
            .map(|c| container_info(c, &resolver))
            .collect(),
    })
}

fn trip_info(trip: TripData) -> TripInfo {
    TripInfo {
        trip_id: trip.trip_id,
        booking_id: trip.booking_id,
        container_id: trip.container_id,
        reference_number: trip.reference_number,
        trip_date: trip.trip_date.to_string(),
        from_name: trip.from_name,
        to_name: trip.to_name,
        vehicle_type: trip.vehicle_source.as_str().to_string(),
        vehicle_descriptor: trip.vehicle_descriptor,
        status: trip.status,
    }
}

/// Returns one trip.
///
/// # Errors
///
/// Returns an error if the trip does not exist or the query fails.
pub fn get_trip(persistence: &mut Persistence, trip_id: i64) -> Result<TripInfo, ApiError> {
    persistence
        .get_trip(trip_id)?
        .map(trip_info)
        .ok_or_else(|| ApiError::not_found("Trip", format!("Trip {trip_id} does not exist")))
}

/// Lists a booking's trips in creation order.
///
/// # Errors
///
/// Returns an error if the booking does not exist or the query fails.
pub fn list_booking_trips(
    persistence: &mut Persistence,
    booking_id: i64,
) -> Result<ListTripsResponse, ApiError> {
    require_booking(persistence, booking_id)?;
    let trips: Vec<TripInfo> = persistence
        .list_trips_for_booking(booking_id)?
        .into_iter()
        .map(trip_info)
        .collect();
    Ok(ListTripsResponse { booking_id, trips })
}

/// Returns a booking's audit timeline, oldest first.
///
/// # Errors
///
/// Returns an error if the booking does not exist or the query fails.
pub fn get_booking_audit(
    persistence: &mut Persistence,
    booking_id: i64,
) -> Result<AuditTimelineResponse, ApiError> {
    require_booking(persistence, booking_id)?;
    let events: Vec<AuditEventInfo> = persistence
        .list_audit_events_for_booking(booking_id)?
        .into_iter()
        .map(|event| AuditEventInfo {
            event_id: event.event_id,
            actor: event.actor.attribution().to_string(),
            actor_display_name: event.actor.operator_display_name,
            action: event.action.name,
            details: event.action.details,
            cause_id: event.cause.id,
            before: event.before.data,
            after: event.after.data,
            recorded_at: event.recorded_at,
        })
        .collect();
    Ok(AuditTimelineResponse { booking_id, events })
}
