// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use tempfile::TempDir;

use super::helpers::{
    FailingNotifier, RecordingNotifier, TestEnv, batch_context, cause, containers_request,
    setup,
};
use crate::{
    ApiError, AssignVehicleRequest, AssignVehicleResponse, AuditTimelineResponse, BookingInfo,
    ConfirmVendorAssignmentResponse, ContainerFieldsInput, ContainerSnapshotResponse,
    ListTripsResponse, PhotoStore, TripInfo, VendorNotifier, assign_vehicle,
    confirm_vendor_assignment, get_booking, get_booking_audit, get_booking_containers, get_trip,
    list_booking_trips, update_containers,
};

fn owned(env: &TestEnv) -> AssignVehicleRequest {
    AssignVehicleRequest::Owned {
        vehicle_id: env.vehicle_id,
        trip_date: Some(String::from("2026-03-14")),
    }
}

fn vendor(env: &TestEnv, daily_rate: f64) -> AssignVehicleRequest {
    AssignVehicleRequest::Vendor {
        vendor_id: env.vendor_id,
        vehicle_number: String::from(" tn01ef9012 "),
        vendor_vehicle_id: Some(env.vendor_vehicle_id),
        daily_rate,
        trip_date: Some(String::from("2026-03-14")),
    }
}

fn assign(
    env: &mut TestEnv,
    notifier: &dyn VendorNotifier,
    booking_id: i64,
    container_id: i64,
    request: &AssignVehicleRequest,
) -> Result<AssignVehicleResponse, ApiError> {
    assign_vehicle(
        &mut env.persistence,
        notifier,
        booking_id,
        container_id,
        request,
        &env.dispatcher,
        cause(),
    )
}

#[test]
fn test_owned_assignment_creates_trip_and_confirms_booking() {
    let mut env = setup();
    let dir: TempDir = TempDir::new().unwrap();
    let photos: PhotoStore = PhotoStore::new(dir.path());
    let (booking_id, container_id) = env.ready_container("BK-1001", &photos);
    let request: AssignVehicleRequest = owned(&env);

    let response: AssignVehicleResponse = assign(
        &mut env,
        &RecordingNotifier::default(),
        booking_id,
        container_id,
        &request,
    )
    .unwrap();

    assert_eq!(response.trip_reference, "BK-1001-01");
    assert_eq!(response.vendor_assignment_id, None);
    assert_eq!(response.status, "confirmed");

    let trip: TripInfo = get_trip(&mut env.persistence, response.trip_id).unwrap();
    assert_eq!(trip.trip_date, "2026-03-14");
    assert_eq!(trip.vehicle_type, "owned");
    assert_eq!(trip.vehicle_descriptor, "TN01AB1234");
    assert_eq!(trip.from_name, "Chennai Port");
    assert_eq!(trip.to_name, "CFS Yard (Ennore)");

    let view: ContainerSnapshotResponse =
        get_booking_containers(&mut env.persistence, booking_id).unwrap();
    assert_eq!(view.containers[0].trip_id, Some(response.trip_id));
    assert_eq!(view.containers[0].vehicle_type.as_deref(), Some("owned"));
    assert_eq!(view.containers[0].assignment_status, "trip_created");
}

#[test]
fn test_vendor_assignment_notifies_vendor() {
    let mut env = setup();
    let dir: TempDir = TempDir::new().unwrap();
    let photos: PhotoStore = PhotoStore::new(dir.path());
    let (booking_id, container_id) = env.ready_container("BK-1001", &photos);
    let notifier: RecordingNotifier = RecordingNotifier::default();
    let request: AssignVehicleRequest = vendor(&env, 4500.0);

    let response: AssignVehicleResponse =
        assign(&mut env, &notifier, booking_id, container_id, &request).unwrap();

    assert!(response.vendor_assignment_id.is_some());
    let trip: TripInfo = get_trip(&mut env.persistence, response.trip_id).unwrap();
    assert_eq!(trip.vehicle_type, "vendor");
    assert_eq!(trip.vehicle_descriptor, "TN01EF9012 (Rapid Movers)");

    let sent = notifier.assignments.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(Some(sent[0].vendor_assignment_id), response.vendor_assignment_id);
    assert_eq!(sent[0].vehicle_number, "TN01EF9012");
    assert_eq!(sent[0].trip_reference, "BK-1001-01");
    assert_eq!(sent[0].contact_email.as_deref(), Some("dispatch@rapid.example"));
}

#[test]
fn test_failed_vendor_notice_keeps_assignment() {
    let mut env = setup();
    let dir: TempDir = TempDir::new().unwrap();
    let photos: PhotoStore = PhotoStore::new(dir.path());
    let (booking_id, container_id) = env.ready_container("BK-1001", &photos);
    let request: AssignVehicleRequest = vendor(&env, 4500.0);

    let response: AssignVehicleResponse =
        assign(&mut env, &FailingNotifier, booking_id, container_id, &request).unwrap();

    let trips: ListTripsResponse = list_booking_trips(&mut env.persistence, booking_id).unwrap();
    assert_eq!(trips.trips.len(), 1);
    assert_eq!(trips.trips[0].trip_id, response.trip_id);
}

#[test]
fn test_non_positive_rate_is_rejected() {
    let mut env = setup();
    let dir: TempDir = TempDir::new().unwrap();
    let photos: PhotoStore = PhotoStore::new(dir.path());
    let (booking_id, container_id) = env.ready_container("BK-1001", &photos);
    let request: AssignVehicleRequest = vendor(&env, 0.0);

    let result = assign(
        &mut env,
        &RecordingNotifier::default(),
        booking_id,
        container_id,
        &request,
    );

    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "daily_rate"
    ));
    assert!(
        list_booking_trips(&mut env.persistence, booking_id)
            .unwrap()
            .trips
            .is_empty()
    );
}

#[test]
fn test_vendor_vehicle_must_belong_to_vendor() {
    let mut env = setup();
    let dir: TempDir = TempDir::new().unwrap();
    let photos: PhotoStore = PhotoStore::new(dir.path());
    let (booking_id, container_id) = env.ready_container("BK-1001", &photos);
    let other_vendor: i64 = env.persistence.create_vendor("Slow Haulage", None).unwrap();
    let request: AssignVehicleRequest = AssignVehicleRequest::Vendor {
        vendor_id: other_vendor,
        vehicle_number: String::from("TN01EF9012"),
        vendor_vehicle_id: Some(env.vendor_vehicle_id),
        daily_rate: 3000.0,
        trip_date: None,
    };

    let result = assign(
        &mut env,
        &RecordingNotifier::default(),
        booking_id,
        container_id,
        &request,
    );

    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "vendor_vehicle_id"
    ));
}

#[test]
fn test_second_assignment_is_a_conflict() {
    let mut env = setup();
    let dir: TempDir = TempDir::new().unwrap();
    let photos: PhotoStore = PhotoStore::new(dir.path());
    let (booking_id, container_id) = env.ready_container("BK-1001", &photos);
    let first: AssignVehicleRequest = owned(&env);
    let second: AssignVehicleRequest = vendor(&env, 4500.0);
    let notifier: RecordingNotifier = RecordingNotifier::default();

    assign(&mut env, &notifier, booking_id, container_id, &first).unwrap();
    let result = assign(&mut env, &notifier, booking_id, container_id, &second);

    assert!(matches!(result, Err(ApiError::Conflict { .. })));
    assert!(notifier.assignments.lock().unwrap().is_empty());
    assert_eq!(
        list_booking_trips(&mut env.persistence, booking_id)
            .unwrap()
            .trips
            .len(),
        1
    );
}

#[test]
fn test_incomplete_container_is_not_ready() {
    let mut env = setup();
    let booking: BookingInfo = env.booking("BK-1001", 1);
    let dir: TempDir = TempDir::new().unwrap();
    let photos: PhotoStore = PhotoStore::new(dir.path());
    let type_only: ContainerFieldsInput = ContainerFieldsInput {
        container_type: Some(String::from("40ft")),
        ..ContainerFieldsInput::default()
    };
    update_containers(
        &mut env.persistence,
        booking.booking_id,
        &containers_request(1, &[("new_1", type_only)]),
        &batch_context(&photos),
        &env.dispatcher,
        cause(),
    )
    .unwrap();
    let container_id: i64 = get_booking_containers(&mut env.persistence, booking.booking_id)
        .unwrap()
        .containers[0]
        .container_id;
    let assignment: AssignVehicleRequest = owned(&env);

    let result = assign(
        &mut env,
        &RecordingNotifier::default(),
        booking.booking_id,
        container_id,
        &assignment,
    );

    assert!(matches!(result, Err(ApiError::DomainRuleViolation { .. })));
}

#[test]
fn test_unknown_container_is_not_found() {
    let mut env = setup();
    let booking: BookingInfo = env.booking("BK-1001", 1);
    let request: AssignVehicleRequest = owned(&env);

    let result = assign(
        &mut env,
        &RecordingNotifier::default(),
        booking.booking_id,
        999,
        &request,
    );

    assert!(matches!(result, Err(ApiError::ResourceNotFound { .. })));
}

#[test]
fn test_bad_trip_date_is_rejected() {
    let mut env = setup();
    let dir: TempDir = TempDir::new().unwrap();
    let photos: PhotoStore = PhotoStore::new(dir.path());
    let (booking_id, container_id) = env.ready_container("BK-1001", &photos);
    let request: AssignVehicleRequest = AssignVehicleRequest::Owned {
        vehicle_id: env.vehicle_id,
        trip_date: Some(String::from("14/03/2026")),
    };

    let result = assign(
        &mut env,
        &RecordingNotifier::default(),
        booking_id,
        container_id,
        &request,
    );

    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "trip_date"
    ));
}

#[test]
fn test_confirm_vendor_assignment_is_idempotent() {
    let mut env = setup();
    let dir: TempDir = TempDir::new().unwrap();
    let photos: PhotoStore = PhotoStore::new(dir.path());
    let (booking_id, container_id) = env.ready_container("BK-1001", &photos);
    let request: AssignVehicleRequest = vendor(&env, 4500.0);
    let response: AssignVehicleResponse = assign(
        &mut env,
        &RecordingNotifier::default(),
        booking_id,
        container_id,
        &request,
    )
    .unwrap();
    let vendor_assignment_id: i64 = response.vendor_assignment_id.unwrap();

    let first: ConfirmVendorAssignmentResponse = confirm_vendor_assignment(
        &mut env.persistence,
        vendor_assignment_id,
        &env.dispatcher,
        cause(),
    )
    .unwrap();
    let second: ConfirmVendorAssignmentResponse = confirm_vendor_assignment(
        &mut env.persistence,
        vendor_assignment_id,
        &env.dispatcher,
        cause(),
    )
    .unwrap();

    assert!(!first.already_processed);
    assert!(second.already_processed);
    assert_eq!(second.status, "confirmed");

    let audit: AuditTimelineResponse = get_booking_audit(&mut env.persistence, booking_id).unwrap();
    let confirmations: usize = audit
        .events
        .iter()
        .filter(|e| e.action == "ConfirmVendorAssignment")
        .count();
    assert_eq!(confirmations, 1);
    assert_eq!(
        get_booking(&mut env.persistence, booking_id).unwrap().status,
        "confirmed"
    );
}

#[test]
fn test_confirm_unknown_assignment_is_not_found() {
    let mut env = setup();

    let result = confirm_vendor_assignment(&mut env.persistence, 77, &env.admin, cause());

    assert!(matches!(result, Err(ApiError::ResourceNotFound { .. })));
}
