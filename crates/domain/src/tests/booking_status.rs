// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    BookingContainer, BookingStatus, DomainError, VehicleAssignment, status_after_assignment,
    status_after_container_update,
};

fn filled(sequence: u32) -> BookingContainer {
    let mut container: BookingContainer = BookingContainer::empty(sequence);
    container.number1 = Some(format!("MSCU000000{sequence}"));
    container
}

fn assigned(sequence: u32) -> BookingContainer {
    let mut container: BookingContainer = filled(sequence);
    container.assignment = Some(VehicleAssignment::Owned { vehicle_id: 1 });
    container
}

#[test]
fn test_status_parse_and_display() {
    assert_eq!(
        "awaiting_containers".parse::<BookingStatus>(),
        Ok(BookingStatus::AwaitingContainers)
    );
    assert_eq!(BookingStatus::PartiallyFulfilled.to_string(), "partially_fulfilled");
    assert!(matches!(
        "done".parse::<BookingStatus>(),
        Err(DomainError::InvalidBookingStatus(_))
    ));
}

#[test]
fn test_only_confirmed_is_terminal() {
    assert!(BookingStatus::Confirmed.is_terminal());
    assert!(!BookingStatus::PartiallyFulfilled.is_terminal());
}

#[test]
fn test_acknowledge_requires_pending() {
    assert!(BookingStatus::Pending.validate_acknowledgement(1).is_ok());
    assert_eq!(
        BookingStatus::BeingAddressed.validate_acknowledgement(1),
        Err(DomainError::BookingAlreadyProcessed {
            booking_id: 1,
            status: String::from("being_addressed"),
        })
    );
}

#[test]
fn test_details_request_requires_being_addressed() {
    assert!(BookingStatus::BeingAddressed.validate_details_request().is_ok());
    assert!(matches!(
        BookingStatus::Pending.validate_details_request(),
        Err(DomainError::InvalidStatusTransition { .. })
    ));
    assert!(BookingStatus::Confirmed.validate_details_request().is_err());
}

#[test]
fn test_update_reaching_expected_count() {
    let containers: Vec<BookingContainer> = vec![filled(1), filled(2)];
    assert_eq!(
        status_after_container_update(BookingStatus::AwaitingContainers, 2, &containers, true),
        BookingStatus::ContainersUpdated
    );
}

#[test]
fn test_update_below_expected_count() {
    let containers: Vec<BookingContainer> = vec![filled(1), BookingContainer::empty(2)];
    assert_eq!(
        status_after_container_update(BookingStatus::BeingAddressed, 3, &containers, true),
        BookingStatus::AwaitingContainers
    );
}

#[test]
fn test_update_with_nothing_filled_keeps_status() {
    let containers: Vec<BookingContainer> = vec![BookingContainer::empty(1)];
    assert_eq!(
        status_after_container_update(BookingStatus::BeingAddressed, 1, &containers, false),
        BookingStatus::BeingAddressed
    );
}

#[test]
fn test_zero_expected_with_filled_rows_is_awaiting() {
    let containers: Vec<BookingContainer> = vec![filled(1)];
    assert_eq!(
        status_after_container_update(BookingStatus::BeingAddressed, 0, &containers, true),
        BookingStatus::AwaitingContainers
    );
}

#[test]
fn test_recompute_is_idempotent() {
    let containers: Vec<BookingContainer> = vec![filled(1), filled(2)];
    let first: BookingStatus =
        status_after_container_update(BookingStatus::BeingAddressed, 2, &containers, true);
    let second: BookingStatus = status_after_container_update(first, 2, &containers, false);
    assert_eq!(first, second);
}

#[test]
fn test_more_filled_rows_than_expected_is_updated() {
    let containers: Vec<BookingContainer> = vec![filled(1), filled(2), filled(3)];
    assert_eq!(
        status_after_container_update(BookingStatus::AwaitingContainers, 2, &containers, true),
        BookingStatus::ContainersUpdated
    );
}

#[test]
fn test_dispatching_booking_keeps_status_without_new_rows() {
    let containers: Vec<BookingContainer> = vec![assigned(1), filled(2)];
    assert_eq!(
        status_after_container_update(BookingStatus::PartiallyFulfilled, 2, &containers, false),
        BookingStatus::PartiallyFulfilled
    );
    assert_eq!(
        status_after_container_update(BookingStatus::Confirmed, 2, &containers, false),
        BookingStatus::Confirmed
    );
}

#[test]
fn test_new_rows_move_confirmed_booking_back() {
    let containers: Vec<BookingContainer> = vec![assigned(1), assigned(2), filled(3)];
    assert_eq!(
        status_after_container_update(BookingStatus::Confirmed, 3, &containers, true),
        BookingStatus::ContainersUpdated
    );
}

#[test]
fn test_assignment_partial_then_confirmed() {
    let partial: Vec<BookingContainer> = vec![assigned(1), filled(2)];
    assert_eq!(
        status_after_assignment(&partial),
        BookingStatus::PartiallyFulfilled
    );

    let full: Vec<BookingContainer> = vec![assigned(1), assigned(2)];
    assert_eq!(status_after_assignment(&full), BookingStatus::Confirmed);
}

#[test]
fn test_assignment_with_no_rows_is_not_confirmed() {
    assert_eq!(status_after_assignment(&[]), BookingStatus::PartiallyFulfilled);
}
