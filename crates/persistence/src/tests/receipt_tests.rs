// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{Fixture, create_booking, setup};
use crate::PersistenceError;

fn record(
    fixture: &mut Fixture,
    booking_id: i64,
    hash: &str,
    now: i64,
) -> Result<(), PersistenceError> {
    fixture
        .persistence
        .in_transaction(|uow| uow.record_receipt(booking_id, hash, now, 60))
}

#[test]
fn test_receipt_is_live_until_expiry() {
    let mut fixture: Fixture = setup();
    let booking_id: i64 = create_booking(&mut fixture, "BK400", 1);

    assert!(!fixture.persistence.has_live_receipt(booking_id, "abc", 1_000).unwrap());
    record(&mut fixture, booking_id, "abc", 1_000).unwrap();

    assert!(fixture.persistence.has_live_receipt(booking_id, "abc", 1_059).unwrap());
    assert!(!fixture.persistence.has_live_receipt(booking_id, "abc", 1_060).unwrap());
    assert!(!fixture.persistence.has_live_receipt(booking_id, "other", 1_010).unwrap());
}

#[test]
fn test_receipts_are_scoped_to_booking() {
    let mut fixture: Fixture = setup();
    let first: i64 = create_booking(&mut fixture, "BK401", 1);
    let second: i64 = create_booking(&mut fixture, "BK402", 1);

    record(&mut fixture, first, "same-hash", 1_000).unwrap();
    record(&mut fixture, second, "same-hash", 1_000).unwrap();

    assert!(fixture.persistence.has_live_receipt(first, "same-hash", 1_001).unwrap());
    assert!(fixture.persistence.has_live_receipt(second, "same-hash", 1_001).unwrap());
}

#[test]
fn test_live_duplicate_is_rejected_and_expired_one_is_replaced() {
    let mut fixture: Fixture = setup();
    let booking_id: i64 = create_booking(&mut fixture, "BK403", 1);
    record(&mut fixture, booking_id, "abc", 1_000).unwrap();

    let duplicate = record(&mut fixture, booking_id, "abc", 1_030);
    assert!(matches!(duplicate, Err(PersistenceError::DuplicateEntry(_))));

    record(&mut fixture, booking_id, "abc", 2_000).unwrap();
    assert!(fixture.persistence.has_live_receipt(booking_id, "abc", 2_030).unwrap());
}
