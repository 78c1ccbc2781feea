// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use cargodesk::{BookingState, Command, CoreError, IntakeResult, TransitionResult, apply, apply_intake};
use cargodesk_audit::{Actor, Cause};
use cargodesk_domain::{Booking, ContainerKey, ContainerUpdate, LocationRef, LocationResolver};

use crate::{PersistTransitionResult, Persistence, PersistenceError};

/// Either side of a failed apply-and-persist round.
#[derive(Debug)]
pub enum TestError {
    Core(CoreError),
    Persistence(PersistenceError),
}

impl From<CoreError> for TestError {
    fn from(err: CoreError) -> Self {
        Self::Core(err)
    }
}

impl From<PersistenceError> for TestError {
    fn from(err: PersistenceError) -> Self {
        Self::Persistence(err)
    }
}

/// A database seeded with one client and a few places.
pub struct Fixture {
    pub persistence: Persistence,
    pub client_id: i64,
    pub port_id: i64,
    pub ennore_id: i64,
    pub yard_id: i64,
}

pub fn setup() -> Fixture {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let client_id: i64 = persistence
        .create_client("Acme Exports", Some("ops@acme.example"))
        .unwrap();
    let port_id: i64 = persistence
        .create_location("Chennai Port", Some("Rajaji Salai"))
        .unwrap();
    let ennore_id: i64 = persistence.create_location("Ennore", None).unwrap();
    let yard_id: i64 = persistence.create_yard(ennore_id, "CFS Yard").unwrap();

    Fixture {
        persistence,
        client_id,
        port_id,
        ennore_id,
        yard_id,
    }
}

pub fn system_actor() -> Actor {
    Actor::new(String::from("test-runner"), String::from("system"))
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("test-req"), String::from("Test request"))
}

/// Accepts and stores a pending booking, returning its id.
pub fn create_booking(fixture: &mut Fixture, code: &str, expected: u32) -> i64 {
    let booking: Booking = Booking::new(
        String::from(code),
        fixture.client_id,
        expected,
        Some(LocationRef::location(fixture.port_id)),
        Some(LocationRef::yard(fixture.yard_id)),
    );
    let intake: IntakeResult = apply_intake(booking, system_actor(), create_test_cause()).unwrap();
    let (booking_id, _event_id) = fixture
        .persistence
        .in_transaction::<_, PersistenceError, _>(|uow| uow.persist_intake(&intake))
        .unwrap();
    booking_id
}

/// Loads the booking, applies `command` and persists the result in one
/// transaction.
pub fn apply_and_persist(
    persistence: &mut Persistence,
    booking_id: i64,
    command: Command,
) -> Result<(TransitionResult, PersistTransitionResult), TestError> {
    persistence.in_transaction(|uow| {
        let state: BookingState = uow.load_booking_state(booking_id)?;
        let resolver: LocationResolver = uow.load_resolver(&state)?;
        let result: TransitionResult = apply(
            &state,
            &resolver,
            command,
            system_actor(),
            create_test_cause(),
        )?;
        let persisted: PersistTransitionResult = uow.persist_transition(&result)?;
        Ok((result, persisted))
    })
}

pub fn new_row(index: u32, number: &str, from: LocationRef, to: LocationRef) -> ContainerUpdate {
    let mut update: ContainerUpdate = ContainerUpdate::blank(ContainerKey::New(index));
    update.number1 = Some(String::from(number));
    update.from_location = Some(from);
    update.to_location = Some(to);
    update
}

/// Moves a fresh booking to `AwaitingContainers` and adds ready rows.
///
/// Returns the booking id and the inserted container ids.
pub fn booking_with_ready_rows(fixture: &mut Fixture, code: &str, rows: u32) -> (i64, Vec<i64>) {
    let booking_id: i64 = create_booking(fixture, code, rows);
    apply_and_persist(
        &mut fixture.persistence,
        booking_id,
        Command::AcknowledgeBooking,
    )
    .unwrap();

    let from: LocationRef = LocationRef::location(fixture.port_id);
    let to: LocationRef = LocationRef::yard(fixture.yard_id);
    let updates: Vec<ContainerUpdate> = (1..=rows)
        .map(|i| new_row(i, &format!("MSKU100000{i}"), from, to))
        .collect();
    let (_, persisted) = apply_and_persist(
        &mut fixture.persistence,
        booking_id,
        Command::UpdateContainers {
            expected_total: rows,
            updates,
        },
    )
    .unwrap();

    (booking_id, persisted.inserted_container_ids)
}
