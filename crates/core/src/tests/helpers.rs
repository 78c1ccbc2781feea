// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::BookingState;
use cargodesk_audit::{Actor, Cause};
use cargodesk_domain::{
    Booking, BookingContainer, BookingStatus, ContainerKey, ContainerUpdate, LocationRef,
    LocationResolver,
};

pub fn create_test_actor() -> Actor {
    Actor::with_operator(1, String::from("DISPATCH"), String::from("Dispatch Desk"))
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("req-456"), String::from("Operator request"))
}

pub fn create_test_booking(status: BookingStatus, expected: u32) -> Booking {
    let mut booking: Booking = Booking::new(String::from("BK100"), 1, expected, None, None);
    booking.booking_id = Some(10);
    booking.status = status;
    booking
}

pub fn create_test_state(status: BookingStatus, expected: u32) -> BookingState {
    BookingState::new(create_test_booking(status, expected), Vec::new())
}

/// A stored row that is ready for assignment.
pub fn ready_container(container_id: i64, sequence: u32) -> BookingContainer {
    let mut container: BookingContainer = BookingContainer::empty(sequence);
    container.container_id = Some(container_id);
    container.number1 = Some(format!("MSKU123456{sequence}"));
    container.from_location = Some(LocationRef::location(5));
    container.to_location = Some(LocationRef::yard(9));
    container
}

pub fn create_test_resolver() -> LocationResolver {
    let mut resolver: LocationResolver = LocationResolver::new();
    resolver.insert_location(5, "Chennai Port");
    resolver.insert_location(6, "Ennore");
    resolver.insert_yard(9, "CFS Yard", Some(6));
    resolver
}

pub fn new_row_update(index: u32, number: &str) -> ContainerUpdate {
    let mut update: ContainerUpdate = ContainerUpdate::blank(ContainerKey::New(index));
    update.number1 = Some(String::from(number));
    update.from_location = Some(LocationRef::location(5));
    update.to_location = Some(LocationRef::yard(9));
    update
}
