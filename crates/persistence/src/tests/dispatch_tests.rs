// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{
    Fixture, TestError, apply_and_persist, booking_with_ready_rows, create_test_cause, setup,
    system_actor,
};
use crate::{
    DispatchRecord, PersistTransitionResult, PersistenceError, TripData, VendorAssignmentData,
};
use cargodesk::{BookingState, Command, CoreError, TransitionResult, apply};
use cargodesk_domain::{
    AssignmentStatus, BookingContainer, BookingStatus, DailyRate, LocationResolver,
    VehicleAssignment, VehicleSource, VendorAssignmentStatus,
};
use time::macros::date;

fn assign_command(container_id: i64, assignment: VehicleAssignment) -> Command {
    Command::AssignVehicle {
        container_id,
        assignment,
        vehicle_descriptor: String::from("TN01AB1234"),
        trip_date: date!(2026 - 10 - 18),
    }
}

#[test]
fn test_owned_dispatch_creates_linked_trip() {
    let mut fixture: Fixture = setup();
    let vehicle_id: i64 = fixture
        .persistence
        .create_vehicle("TN01AB1234", Some("Tata Prima"))
        .unwrap();
    let (booking_id, ids) = booking_with_ready_rows(&mut fixture, "BK300", 2);

    let (_, persisted) = apply_and_persist(
        &mut fixture.persistence,
        booking_id,
        assign_command(ids[0], VehicleAssignment::Owned { vehicle_id }),
    )
    .unwrap();
    let record: DispatchRecord = persisted.dispatch.unwrap();
    assert!(record.vendor_assignment_id.is_none());

    let trip: TripData = fixture
        .persistence
        .get_trip(record.trip_id)
        .unwrap()
        .unwrap();
    assert_eq!(trip.booking_id, booking_id);
    assert_eq!(trip.container_id, ids[0]);
    assert_eq!(trip.reference_number, "BK300-01");
    assert_eq!(trip.trip_date, date!(2026 - 10 - 18));
    assert_eq!(trip.from_name, "Chennai Port");
    assert_eq!(trip.to_name, "CFS Yard (Ennore)");
    assert_eq!(trip.vehicle_source, VehicleSource::Owned);

    let state: BookingState = fixture.persistence.load_booking_state(booking_id).unwrap();
    let container: &BookingContainer = state.container(ids[0]).unwrap();
    assert_eq!(container.trip_id, Some(record.trip_id));
    assert_eq!(container.assignment_status, AssignmentStatus::TripCreated);
    assert_eq!(
        container.assignment,
        Some(VehicleAssignment::Owned { vehicle_id })
    );
    assert_eq!(state.booking.status, BookingStatus::PartiallyFulfilled);
}

#[test]
fn test_all_rows_dispatched_confirms_booking() {
    let mut fixture: Fixture = setup();
    let vehicle_id: i64 = fixture.persistence.create_vehicle("TN01AB1234", None).unwrap();
    let other_id: i64 = fixture.persistence.create_vehicle("TN01AB9999", None).unwrap();
    let (booking_id, ids) = booking_with_ready_rows(&mut fixture, "BK301", 2);

    apply_and_persist(
        &mut fixture.persistence,
        booking_id,
        assign_command(ids[0], VehicleAssignment::Owned { vehicle_id }),
    )
    .unwrap();
    apply_and_persist(
        &mut fixture.persistence,
        booking_id,
        assign_command(
            ids[1],
            VehicleAssignment::Owned {
                vehicle_id: other_id,
            },
        ),
    )
    .unwrap();

    let booking = fixture.persistence.get_booking(booking_id).unwrap().unwrap();
    assert_eq!(booking.status, BookingStatus::Confirmed);
    assert_eq!(
        fixture
            .persistence
            .list_trips_for_booking(booking_id)
            .unwrap()
            .len(),
        2
    );
}

#[test]
fn test_vendor_dispatch_records_pending_assignment() {
    let mut fixture: Fixture = setup();
    let vendor_id: i64 = fixture.persistence.create_vendor("Speedy Haulage", None).unwrap();
    let vendor_vehicle_id: i64 = fixture
        .persistence
        .create_vendor_vehicle(vendor_id, "TN02CD5678")
        .unwrap();
    let (booking_id, ids) = booking_with_ready_rows(&mut fixture, "BK302", 1);

    let (_, persisted) = apply_and_persist(
        &mut fixture.persistence,
        booking_id,
        assign_command(
            ids[0],
            VehicleAssignment::Vendor {
                vendor_id,
                vendor_vehicle_id: Some(vendor_vehicle_id),
                vehicle_number: String::from("TN02CD5678"),
                daily_rate: DailyRate::from_cents(250_000).unwrap(),
            },
        ),
    )
    .unwrap();
    let record: DispatchRecord = persisted.dispatch.unwrap();
    let vendor_assignment_id: i64 = record.vendor_assignment_id.unwrap();

    let assignment: VendorAssignmentData = fixture
        .persistence
        .get_vendor_assignment(vendor_assignment_id)
        .unwrap()
        .unwrap();
    assert_eq!(assignment.status, VendorAssignmentStatus::PendingConfirmation);
    assert_eq!(assignment.daily_rate.cents(), 250_000);
    assert_eq!(assignment.container_id, ids[0]);

    let vehicle = fixture
        .persistence
        .get_vendor_vehicle(vendor_vehicle_id)
        .unwrap()
        .unwrap();
    assert_eq!(vehicle.status, "in_use");

    let rows: Vec<BookingContainer> = fixture
        .persistence
        .get_containers_for_booking(booking_id)
        .unwrap();
    assert_eq!(rows[0].vendor_assignment_id, Some(vendor_assignment_id));
    assert_eq!(rows[0].trip_id, Some(record.trip_id));
}

#[test]
fn test_confirm_vendor_assignment_is_idempotent() {
    let mut fixture: Fixture = setup();
    let vendor_id: i64 = fixture.persistence.create_vendor("Speedy Haulage", None).unwrap();
    let (booking_id, ids) = booking_with_ready_rows(&mut fixture, "BK303", 1);
    let (_, persisted) = apply_and_persist(
        &mut fixture.persistence,
        booking_id,
        assign_command(
            ids[0],
            VehicleAssignment::Vendor {
                vendor_id,
                vendor_vehicle_id: None,
                vehicle_number: String::from("KA05XY0001"),
                daily_rate: DailyRate::from_cents(100).unwrap(),
            },
        ),
    )
    .unwrap();
    let vendor_assignment_id: i64 = persisted.dispatch.unwrap().vendor_assignment_id.unwrap();

    let first: bool = fixture
        .persistence
        .in_transaction::<_, PersistenceError, _>(|uow| {
            uow.confirm_vendor_assignment(vendor_assignment_id)
        })
        .unwrap();
    let second: bool = fixture
        .persistence
        .in_transaction::<_, PersistenceError, _>(|uow| {
            uow.confirm_vendor_assignment(vendor_assignment_id)
        })
        .unwrap();

    assert!(first);
    assert!(!second);
    let assignment: VendorAssignmentData = fixture
        .persistence
        .get_vendor_assignment(vendor_assignment_id)
        .unwrap()
        .unwrap();
    assert_eq!(assignment.status, VendorAssignmentStatus::Confirmed);
    assert!(assignment.confirmed_at.is_some());

    let missing = fixture
        .persistence
        .in_transaction::<_, PersistenceError, _>(|uow| uow.confirm_vendor_assignment(9_999));
    assert!(matches!(missing, Err(PersistenceError::NotFound(_))));
}

#[test]
fn test_reassigning_a_tripped_container_is_a_conflict() {
    let mut fixture: Fixture = setup();
    let vehicle_id: i64 = fixture.persistence.create_vehicle("TN01AB1234", None).unwrap();
    let (booking_id, ids) = booking_with_ready_rows(&mut fixture, "BK304", 1);

    apply_and_persist(
        &mut fixture.persistence,
        booking_id,
        assign_command(ids[0], VehicleAssignment::Owned { vehicle_id }),
    )
    .unwrap();
    let repeat = apply_and_persist(
        &mut fixture.persistence,
        booking_id,
        assign_command(ids[0], VehicleAssignment::Owned { vehicle_id }),
    );

    assert!(matches!(repeat, Err(TestError::Core(CoreError::Conflict(_)))));
    assert_eq!(
        fixture
            .persistence
            .list_trips_for_booking(booking_id)
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn test_stale_plan_loses_the_container_claim() {
    let mut fixture: Fixture = setup();
    let vehicle_id: i64 = fixture.persistence.create_vehicle("TN01AB1234", None).unwrap();
    let (booking_id, ids) = booking_with_ready_rows(&mut fixture, "BK305", 1);

    // Both plans are computed from the same snapshot, as two racing
    // requests would be.
    let stale: BookingState = fixture.persistence.load_booking_state(booking_id).unwrap();
    let resolver: LocationResolver = fixture.persistence.load_resolver_for_state(&stale).unwrap();
    let plan = |state: &BookingState| -> TransitionResult {
        apply(
            state,
            &resolver,
            assign_command(ids[0], VehicleAssignment::Owned { vehicle_id }),
            system_actor(),
            create_test_cause(),
        )
        .unwrap()
    };
    let winner: TransitionResult = plan(&stale);
    let loser: TransitionResult = plan(&stale);

    fixture
        .persistence
        .in_transaction::<PersistTransitionResult, PersistenceError, _>(|uow| {
            uow.persist_transition(&winner)
        })
        .unwrap();
    let result = fixture
        .persistence
        .in_transaction::<PersistTransitionResult, PersistenceError, _>(|uow| {
            uow.persist_transition(&loser)
        });

    assert_eq!(
        result,
        Err(PersistenceError::ContainerAlreadyTripped {
            container_id: ids[0]
        })
    );
    assert_eq!(
        fixture
            .persistence
            .list_trips_for_booking(booking_id)
            .unwrap()
            .len(),
        1
    );
    assert_eq!(
        fixture
            .persistence
            .list_audit_events_for_booking(booking_id)
            .unwrap()
            .len(),
        4
    );
}
