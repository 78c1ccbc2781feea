// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::Command;
use crate::error::CoreError;
use crate::state::{
    BookingState, ContainerChange, DispatchPlan, IntakeResult, TransitionResult, TripDraft,
    VendorAssignmentDraft,
};
use cargodesk_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use cargodesk_domain::{
    AssignmentStatus, Booking, BookingContainer, BookingStatus, ContainerKey, ContainerReadiness,
    ContainerUpdate, DomainError, LocationResolver, ResolvedLocation, VehicleAssignment,
    evaluate_container_readiness, merge_container_update, new_container_from_update,
    status_after_assignment, status_after_container_update, validate_booking_code,
    validate_expected_container_count,
};
use time::Date;

/// Validates a new booking and produces its intake audit event.
///
/// The audit event is not yet scoped to a booking id; persistence attaches
/// the id once the booking row exists.
///
/// # Errors
///
/// Returns an error if the booking code or expected count is invalid.
pub fn apply_intake(booking: Booking, actor: Actor, cause: Cause) -> Result<IntakeResult, CoreError> {
    validate_booking_code(&booking.booking_code)?;
    validate_expected_container_count(i64::from(booking.expected_container_count))?;

    let mut booking: Booking = booking;
    booking.status = BookingStatus::Pending;
    booking.acknowledged_by = None;

    let action: Action = Action::new(
        String::from("CreateBooking"),
        Some(format!(
            "Booking {} for client {} expecting {} containers",
            booking.booking_code, booking.client_id, booking.expected_container_count
        )),
    );
    let audit_event: AuditEvent = AuditEvent::new_global(
        actor,
        cause,
        action,
        StateSnapshot::new(String::from("status=none")),
        StateSnapshot::new(format!(
            "status={},expected={},containers=0,filled=0,assigned=0",
            booking.status.as_str(),
            booking.expected_container_count
        )),
    );

    Ok(IntakeResult {
        booking,
        audit_event,
    })
}

/// Applies a command to the current booking state, producing a new state and
/// the writes that record it.
///
/// This function is pure: it never performs I/O. The resolver must contain
/// every location and yard the booking's rows reference.
///
/// # Arguments
///
/// * `state` - The current booking aggregate
/// * `resolver` - Display names for the referenced locations
/// * `command` - The command to apply
/// * `actor` - The operator issuing the command
/// * `cause` - The reason for the command
///
/// # Errors
///
/// Returns an error if the command violates a workflow rule. On error the
/// state is unchanged.
pub fn apply(
    state: &BookingState,
    resolver: &LocationResolver,
    command: Command,
    actor: Actor,
    cause: Cause,
) -> Result<TransitionResult, CoreError> {
    let action_name: &'static str = command.action_name();
    let before: StateSnapshot = state.to_snapshot();

    let (new_state, container_changes, dispatch, details): (
        BookingState,
        Vec<ContainerChange>,
        Option<DispatchPlan>,
        String,
    ) = match command {
        Command::AcknowledgeBooking => {
            state
                .booking
                .status
                .validate_acknowledgement(state.booking_id())?;
            let mut new_state: BookingState = state.clone();
            new_state.booking.status = BookingStatus::BeingAddressed;
            new_state.booking.acknowledged_by = Some(actor.attribution().to_string());
            let details: String = format!("Acknowledged by {}", actor.attribution());
            (new_state, Vec::new(), None, details)
        }
        Command::RequestContainerDetails { note } => {
            state.booking.status.validate_details_request()?;
            let mut new_state: BookingState = state.clone();
            new_state.booking.status = BookingStatus::AwaitingContainers;
            let details: String = note.map_or_else(
                || String::from("Container details requested"),
                |n| format!("Container details requested: {n}"),
            );
            (new_state, Vec::new(), None, details)
        }
        Command::UpdateContainers {
            expected_total,
            updates,
        } => {
            let (new_state, changes) = apply_container_updates(state, expected_total, updates)?;
            let details: String = format!(
                "{} container rows written, expected total {expected_total}",
                changes.len()
            );
            (new_state, changes, None, details)
        }
        Command::AssignVehicle {
            container_id,
            assignment,
            vehicle_descriptor,
            trip_date,
        } => {
            let (new_state, plan) = apply_vehicle_assignment(
                state,
                resolver,
                container_id,
                assignment,
                vehicle_descriptor,
                trip_date,
            )?;
            let details: String = format!(
                "Container {container_id} assigned to {} ({}), trip {}",
                plan.trip.vehicle_descriptor,
                plan.trip.vehicle_source.as_str(),
                plan.trip.reference_number
            );
            (new_state, Vec::new(), Some(plan), details)
        }
    };

    let after: StateSnapshot = new_state.to_snapshot();
    let audit_event: AuditEvent = AuditEvent::new(
        state.booking_id(),
        actor,
        cause,
        Action::new(action_name.to_string(), Some(details)),
        before,
        after,
    );

    Ok(TransitionResult {
        new_state,
        container_changes,
        dispatch,
        audit_event,
    })
}

/// Merges a batch of container updates into the aggregate.
///
/// Existing rows are updated in id order, then new rows are appended in
/// `new_<n>` order. Unchanged rows and empty new rows produce no writes.
/// The booking status is recomputed once against the final row set; a
/// booking in dispatch only moves back when the batch adds rows.
fn apply_container_updates(
    state: &BookingState,
    expected_total: u32,
    mut updates: Vec<ContainerUpdate>,
) -> Result<(BookingState, Vec<ContainerChange>), CoreError> {
    let booking_id: i64 = state.booking_id();
    let mut containers: Vec<BookingContainer> = state.containers.clone();
    let mut changes: Vec<ContainerChange> = Vec::new();
    let mut next_sequence: u32 = containers.iter().map(|c| c.sequence).max().unwrap_or(0) + 1;

    updates.sort_by_key(|u| u.key);

    for update in updates {
        match update.key {
            ContainerKey::Existing(container_id) => {
                let index: usize = containers
                    .iter()
                    .position(|c| c.container_id == Some(container_id))
                    .ok_or(DomainError::ContainerNotFound {
                        booking_id,
                        container_id,
                    })?;
                let merged: BookingContainer = merge_container_update(&containers[index], &update);
                if merged == containers[index] {
                    continue;
                }
                if containers[index].is_tripped() {
                    return Err(DomainError::ContainerAlreadyTripped {
                        container_id,
                        trip_id: containers[index].trip_id.unwrap_or(0),
                    }
                    .into());
                }
                containers[index] = merged.clone();
                changes.push(ContainerChange::Updated(merged));
            }
            ContainerKey::New(_) => {
                if update.is_empty() {
                    continue;
                }
                let created: BookingContainer = new_container_from_update(
                    next_sequence,
                    &update,
                    state.booking.default_from,
                    state.booking.default_to,
                );
                next_sequence += 1;
                containers.push(created.clone());
                changes.push(ContainerChange::Inserted(created));
            }
        }
    }

    let mut new_state: BookingState = BookingState {
        booking: state.booking.clone(),
        containers,
    };
    new_state.booking.expected_container_count = expected_total;
    let rows_added: bool = changes
        .iter()
        .any(|change| matches!(change, ContainerChange::Inserted(_)));
    new_state.booking.status = status_after_container_update(
        state.booking.status,
        expected_total,
        &new_state.containers,
        rows_added,
    );

    Ok((new_state, changes))
}

/// Assigns a vehicle to one container and drafts its trip.
fn apply_vehicle_assignment(
    state: &BookingState,
    resolver: &LocationResolver,
    container_id: i64,
    assignment: VehicleAssignment,
    vehicle_descriptor: String,
    trip_date: Date,
) -> Result<(BookingState, DispatchPlan), CoreError> {
    let booking_id: i64 = state.booking_id();
    let index: usize = state
        .containers
        .iter()
        .position(|c| c.container_id == Some(container_id))
        .ok_or(DomainError::ContainerNotFound {
            booking_id,
            container_id,
        })?;
    let current: &BookingContainer = &state.containers[index];

    if current.is_tripped() {
        return Err(DomainError::ContainerAlreadyTripped {
            container_id,
            trip_id: current.trip_id.unwrap_or(0),
        }
        .into());
    }

    let from: ResolvedLocation = resolver.resolve_optional(current.from_location.as_ref());
    let to: ResolvedLocation = resolver.resolve_optional(current.to_location.as_ref());
    let readiness: ContainerReadiness = evaluate_container_readiness(current, &from, &to);
    if !readiness.is_ready {
        return Err(DomainError::ContainerNotReady {
            container_id,
            reasons: readiness.blocking_reasons,
        }
        .into());
    }

    let vendor_assignment: Option<VendorAssignmentDraft> = match &assignment {
        VehicleAssignment::Owned { .. } => None,
        VehicleAssignment::Vendor {
            vendor_id,
            vendor_vehicle_id,
            vehicle_number,
            daily_rate,
        } => Some(VendorAssignmentDraft {
            vendor_id: *vendor_id,
            vendor_vehicle_id: *vendor_vehicle_id,
            vehicle_number: vehicle_number.clone(),
            daily_rate: *daily_rate,
        }),
    };

    let trip: TripDraft = TripDraft {
        reference_number: format!("{}-{:02}", state.booking.booking_code, current.sequence),
        trip_date,
        from_name: from.display_name().unwrap_or_default().to_string(),
        to_name: to.display_name().unwrap_or_default().to_string(),
        vehicle_source: assignment.source(),
        vehicle_descriptor,
    };

    let mut dispatched: BookingContainer = current.clone();
    dispatched.assignment = Some(assignment);
    dispatched.assignment_status = AssignmentStatus::TripCreated;

    let mut new_state: BookingState = state.clone();
    new_state.containers[index] = dispatched.clone();
    new_state.booking.status = status_after_assignment(&new_state.containers);

    Ok((
        new_state,
        DispatchPlan {
            container: dispatched,
            trip,
            vendor_assignment,
        },
    ))
}
