// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{create_test_actor, create_test_cause};
use crate::{CoreError, IntakeResult, apply_intake};
use cargodesk_domain::{Booking, BookingStatus, DomainError, LocationRef};

#[test]
fn test_intake_produces_pending_booking_and_event() {
    let booking: Booking = Booking::new(
        String::from("BK-7"),
        3,
        2,
        Some(LocationRef::location(1)),
        Some(LocationRef::yard(2)),
    );

    let result: IntakeResult =
        apply_intake(booking, create_test_actor(), create_test_cause()).unwrap();

    assert_eq!(result.booking.status, BookingStatus::Pending);
    assert_eq!(result.audit_event.action.name, "CreateBooking");
    assert_eq!(result.audit_event.booking_id, None);
    assert!(result.audit_event.after.data.starts_with("status=pending"));
}

#[test]
fn test_intake_rejects_bad_booking_code() {
    let booking: Booking = Booking::new(String::from("BK 7"), 3, 2, None, None);

    let result: Result<IntakeResult, CoreError> =
        apply_intake(booking, create_test_actor(), create_test_cause());

    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(DomainError::InvalidBookingCode(_)))
    ));
}

#[test]
fn test_intake_rejects_oversized_expected_count() {
    let booking: Booking = Booking::new(String::from("BK-8"), 3, 10_000, None, None);

    let result: Result<IntakeResult, CoreError> =
        apply_intake(booking, create_test_actor(), create_test_cause());

    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(
            DomainError::InvalidExpectedContainerCount(10_000)
        ))
    ));
}
