// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{
    create_test_actor, create_test_cause, create_test_resolver, create_test_state,
    ready_container,
};
use crate::{BookingState, Command, CoreError, DispatchPlan, TransitionResult, apply};
use cargodesk_domain::{
    AssignmentStatus, BookingStatus, DailyRate, LocationRef, VehicleAssignment, VehicleSource,
};
use time::macros::date;

fn two_ready_rows() -> BookingState {
    let mut state: BookingState = create_test_state(BookingStatus::ContainersUpdated, 2);
    state.containers.push(ready_container(1, 1));
    state.containers.push(ready_container(2, 2));
    state
}

fn assign(
    state: &BookingState,
    container_id: i64,
    assignment: VehicleAssignment,
) -> Result<TransitionResult, CoreError> {
    apply(
        state,
        &create_test_resolver(),
        Command::AssignVehicle {
            container_id,
            assignment,
            vehicle_descriptor: String::from("TN01AB1234"),
            trip_date: date!(2026 - 10 - 18),
        },
        create_test_actor(),
        create_test_cause(),
    )
}

#[test]
fn test_owned_assignment_drafts_trip() {
    let state: BookingState = two_ready_rows();

    let result: TransitionResult =
        assign(&state, 2, VehicleAssignment::Owned { vehicle_id: 3 }).unwrap();

    let plan: &DispatchPlan = result.dispatch.as_ref().unwrap();
    assert_eq!(plan.trip.reference_number, "BK100-02");
    assert_eq!(plan.trip.from_name, "Chennai Port");
    assert_eq!(plan.trip.to_name, "CFS Yard (Ennore)");
    assert_eq!(plan.trip.vehicle_source, VehicleSource::Owned);
    assert_eq!(plan.trip.trip_date, date!(2026 - 10 - 18));
    assert!(plan.vendor_assignment.is_none());
    assert_eq!(plan.container.assignment_status, AssignmentStatus::TripCreated);
    assert_eq!(
        result.new_state.booking.status,
        BookingStatus::PartiallyFulfilled
    );
    assert_eq!(result.processed_count(), 1);
}

#[test]
fn test_assigning_every_row_confirms_booking() {
    let state: BookingState = two_ready_rows();
    let first: TransitionResult =
        assign(&state, 1, VehicleAssignment::Owned { vehicle_id: 3 }).unwrap();

    let second: TransitionResult = assign(
        &first.new_state,
        2,
        VehicleAssignment::Owned { vehicle_id: 4 },
    )
    .unwrap();

    assert_eq!(second.new_state.booking.status, BookingStatus::Confirmed);
}

#[test]
fn test_vendor_assignment_drafts_vendor_record() {
    let state: BookingState = two_ready_rows();
    let rate: DailyRate = DailyRate::from_amount(2500.0).unwrap();

    let result: TransitionResult = assign(
        &state,
        1,
        VehicleAssignment::Vendor {
            vendor_id: 8,
            vendor_vehicle_id: Some(12),
            vehicle_number: String::from("KA05XY9999"),
            daily_rate: rate,
        },
    )
    .unwrap();

    let plan: &DispatchPlan = result.dispatch.as_ref().unwrap();
    let vendor = plan.vendor_assignment.as_ref().unwrap();
    assert_eq!(vendor.vendor_id, 8);
    assert_eq!(vendor.vendor_vehicle_id, Some(12));
    assert_eq!(vendor.daily_rate, rate);
    assert_eq!(plan.trip.vehicle_source, VehicleSource::Vendor);
}

#[test]
fn test_tripped_container_is_rejected() {
    let mut state: BookingState = two_ready_rows();
    state.containers[0].trip_id = Some(44);
    state.containers[0].assignment = Some(VehicleAssignment::Owned { vehicle_id: 3 });

    let result: Result<TransitionResult, CoreError> =
        assign(&state, 1, VehicleAssignment::Owned { vehicle_id: 3 });

    assert!(matches!(result, Err(CoreError::Conflict(_))));
}

#[test]
fn test_unresolved_location_blocks_assignment() {
    let mut state: BookingState = two_ready_rows();
    state.containers[0].to_location = Some(LocationRef::yard(999));

    let result: Result<TransitionResult, CoreError> =
        assign(&state, 1, VehicleAssignment::Owned { vehicle_id: 3 });

    match result {
        Err(CoreError::NotReady {
            container_id,
            reasons,
        }) => {
            assert_eq!(container_id, 1);
            assert_eq!(reasons.len(), 1);
            assert!(reasons[0].contains("yard|999"));
        }
        other => panic!("expected NotReady, got {other:?}"),
    }
}

#[test]
fn test_missing_number_blocks_assignment() {
    let mut state: BookingState = two_ready_rows();
    state.containers[1].number1 = None;

    let result: Result<TransitionResult, CoreError> =
        assign(&state, 2, VehicleAssignment::Owned { vehicle_id: 3 });

    assert!(matches!(result, Err(CoreError::NotReady { .. })));
}
