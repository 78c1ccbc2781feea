// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the `CargoDesk` dispatch system.
//!
//! Built on Diesel with the `SQLite` backend. Migrations are embedded and
//! applied on open; foreign key enforcement is verified before the adapter
//! is handed out.
//!
//! ## Layout
//!
//! - `queries`: read-only lookups
//! - `mutations`: writes, none of which open transactions themselves
//! - `unit_of_work`: the immediate-transaction scope workflow writes run in
//!
//! ## Testing
//!
//! `Persistence::new_in_memory()` opens a uniquely named shared in-memory
//! database, so every test gets an isolated schema.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;
mod unit_of_work;

#[cfg(test)]
mod tests;

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use cargodesk::BookingState;
use cargodesk_audit::AuditEvent;
use cargodesk_domain::{
    Booking, BookingContainer, BookingStatus, LocationCandidate, LocationRef, LocationResolver,
    VehicleCandidate,
};
use diesel::SqliteConnection;

pub use data_models::{
    ClientData, DispatchRecord, LocationData, OperatorData, PersistTransitionResult, SessionData,
    TripData, VehicleData, VendorAssignmentData, VendorData, VendorVehicleData, YardData,
};
pub use error::PersistenceError;
pub use unit_of_work::UnitOfWork;

use backend::PersistenceBackend;

/// Atomic counter for generating unique in-memory database names.
///
/// Each call to `new_in_memory()` receives a unique sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Persistence adapter owning one `SQLite` connection.
pub struct Persistence {
    conn: SqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String = format!("file:memdb_test_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        conn.verify_foreign_key_enforcement()?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        conn.verify_foreign_key_enforcement()?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::ForeignKeyEnforcementNotEnabled` if it is off.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        self.conn.verify_foreign_key_enforcement()
    }

    /// Runs `f` inside a `BEGIN IMMEDIATE` transaction.
    ///
    /// The transaction commits if `f` returns `Ok` and rolls back otherwise.
    ///
    /// # Errors
    ///
    /// Returns the closure's error, or a converted `PersistenceError` if the
    /// transaction itself fails.
    pub fn in_transaction<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut UnitOfWork<'_>) -> Result<T, E>,
        E: From<PersistenceError>,
    {
        unit_of_work::run_in_transaction(&mut self.conn, f)
    }

    // Operators and sessions

    /// Creates a new operator with a bcrypt-hashed password.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::DuplicateEntry` if the login name is taken.
    pub fn create_operator(
        &mut self,
        login_name: &str,
        display_name: &str,
        password: &str,
        role: &str,
    ) -> Result<i64, PersistenceError> {
        mutations::operators::create_operator(
            &mut self.conn,
            login_name,
            display_name,
            password,
            role,
        )
    }

    /// Retrieves an operator by login name (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_operator_by_login(
        &mut self,
        login_name: &str,
    ) -> Result<Option<OperatorData>, PersistenceError> {
        queries::operators::get_operator_by_login(&mut self.conn, login_name)
    }

    /// Retrieves an operator by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_operator_by_id(
        &mut self,
        operator_id: i64,
    ) -> Result<Option<OperatorData>, PersistenceError> {
        queries::operators::get_operator_by_id(&mut self.conn, operator_id)
    }

    /// Lists all operators.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_operators(&mut self) -> Result<Vec<OperatorData>, PersistenceError> {
        queries::operators::list_operators(&mut self.conn)
    }

    /// Counts all operators.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_operators(&mut self) -> Result<i64, PersistenceError> {
        queries::operators::count_operators(&mut self.conn)
    }

    /// Verifies a password against a stored bcrypt hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the hash cannot be parsed.
    pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, PersistenceError> {
        queries::operators::verify_password(password, password_hash)
    }

    /// Records a successful login.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn update_last_login(&mut self, operator_id: i64) -> Result<(), PersistenceError> {
        mutations::operators::update_last_login(&mut self.conn, operator_id)
    }

    /// Creates a session. `expires_at` is in unix seconds.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_session(
        &mut self,
        session_token: &str,
        csrf_token: &str,
        operator_id: i64,
        expires_at: i64,
    ) -> Result<i64, PersistenceError> {
        mutations::operators::create_session(
            &mut self.conn,
            session_token,
            csrf_token,
            operator_id,
            expires_at,
        )
    }

    /// Retrieves a session by token.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_session_by_token(
        &mut self,
        session_token: &str,
    ) -> Result<Option<SessionData>, PersistenceError> {
        queries::operators::get_session_by_token(&mut self.conn, session_token)
    }

    /// Touches a session's last activity timestamp.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn update_session_activity(&mut self, session_id: i64) -> Result<(), PersistenceError> {
        mutations::operators::update_session_activity(&mut self.conn, session_id)
    }

    /// Deletes a session by token.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete_session(&mut self, session_token: &str) -> Result<(), PersistenceError> {
        mutations::operators::delete_session(&mut self.conn, session_token)
    }

    /// Deletes sessions that expired at or before `now` (unix seconds).
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete_expired_sessions(&mut self, now: i64) -> Result<usize, PersistenceError> {
        mutations::operators::delete_expired_sessions(&mut self.conn, now)
    }

    // Registry

    /// Creates a client.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_client(
        &mut self,
        name: &str,
        contact_email: Option<&str>,
    ) -> Result<i64, PersistenceError> {
        mutations::registry::create_client(&mut self.conn, name, contact_email)
    }

    /// Creates a location.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::DuplicateEntry` if the name is taken.
    pub fn create_location(
        &mut self,
        name: &str,
        address: Option<&str>,
    ) -> Result<i64, PersistenceError> {
        mutations::registry::create_location(&mut self.conn, name, address)
    }

    /// Creates a yard under an existing location.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::ForeignKeyViolation` if the parent is missing.
    pub fn create_yard(&mut self, location_id: i64, name: &str) -> Result<i64, PersistenceError> {
        mutations::registry::create_yard(&mut self.conn, location_id, name)
    }

    /// Adds an owned vehicle.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::DuplicateEntry` if the registration is taken.
    pub fn create_vehicle(
        &mut self,
        registration_number: &str,
        description: Option<&str>,
    ) -> Result<i64, PersistenceError> {
        mutations::registry::create_vehicle(&mut self.conn, registration_number, description)
    }

    /// Creates a vendor.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::DuplicateEntry` if the name is taken.
    pub fn create_vendor(
        &mut self,
        name: &str,
        contact_email: Option<&str>,
    ) -> Result<i64, PersistenceError> {
        mutations::registry::create_vendor(&mut self.conn, name, contact_email)
    }

    /// Registers a vehicle with a vendor.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::ForeignKeyViolation` if the vendor is missing.
    pub fn create_vendor_vehicle(
        &mut self,
        vendor_id: i64,
        vehicle_number: &str,
    ) -> Result<i64, PersistenceError> {
        mutations::registry::create_vendor_vehicle(&mut self.conn, vendor_id, vehicle_number)
    }

    /// Retrieves a client.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_client(&mut self, client_id: i64) -> Result<Option<ClientData>, PersistenceError> {
        queries::registry::get_client(&mut self.conn, client_id)
    }

    /// Retrieves a location.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_location(
        &mut self,
        location_id: i64,
    ) -> Result<Option<LocationData>, PersistenceError> {
        queries::registry::get_location(&mut self.conn, location_id)
    }

    /// Retrieves a yard.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_yard(&mut self, yard_id: i64) -> Result<Option<YardData>, PersistenceError> {
        queries::registry::get_yard(&mut self.conn, yard_id)
    }

    /// Retrieves an owned vehicle.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_vehicle(&mut self, vehicle_id: i64) -> Result<Option<VehicleData>, PersistenceError> {
        queries::registry::get_vehicle(&mut self.conn, vehicle_id)
    }

    /// Retrieves a vendor.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_vendor(&mut self, vendor_id: i64) -> Result<Option<VendorData>, PersistenceError> {
        queries::registry::get_vendor(&mut self.conn, vendor_id)
    }

    /// Retrieves a vendor vehicle.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_vendor_vehicle(
        &mut self,
        vendor_vehicle_id: i64,
    ) -> Result<Option<VendorVehicleData>, PersistenceError> {
        queries::registry::get_vendor_vehicle(&mut self.conn, vendor_vehicle_id)
    }

    /// Searches locations and yards by name.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub fn search_locations(
        &mut self,
        query: &str,
        limit: i64,
    ) -> Result<Vec<LocationCandidate>, PersistenceError> {
        queries::search::search_locations(&mut self.conn, query, limit)
    }

    /// Searches the owned and vendor vehicle pools.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub fn search_vehicles(
        &mut self,
        query: &str,
        vendor_id: Option<i64>,
        limit: i64,
    ) -> Result<Vec<VehicleCandidate>, PersistenceError> {
        queries::search::search_vehicles(&mut self.conn, query, vendor_id, limit)
    }

    // Bookings

    /// Retrieves a booking header.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_booking(&mut self, booking_id: i64) -> Result<Option<Booking>, PersistenceError> {
        queries::bookings::get_booking(&mut self.conn, booking_id)
    }

    /// Lists bookings, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_bookings(
        &mut self,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>, PersistenceError> {
        queries::bookings::list_bookings(&mut self.conn, status)
    }

    /// Checks whether a booking code is taken.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn booking_code_exists(&mut self, booking_code: &str) -> Result<bool, PersistenceError> {
        queries::bookings::booking_code_exists(&mut self.conn, booking_code)
    }

    /// Retrieves the container rows of a booking.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_containers_for_booking(
        &mut self,
        booking_id: i64,
    ) -> Result<Vec<BookingContainer>, PersistenceError> {
        queries::bookings::get_containers_for_booking(&mut self.conn, booking_id)
    }

    /// Loads a booking aggregate outside of any transaction.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the booking does not exist.
    pub fn load_booking_state(&mut self, booking_id: i64) -> Result<BookingState, PersistenceError> {
        queries::bookings::load_booking_state(&mut self.conn, booking_id)
    }

    /// Loads display names for every place the aggregate references.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub fn load_resolver_for_state(
        &mut self,
        state: &BookingState,
    ) -> Result<LocationResolver, PersistenceError> {
        queries::bookings::load_resolver_for_state(&mut self.conn, state)
    }

    /// Loads display names for the given references.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub fn load_location_resolver(
        &mut self,
        references: &[LocationRef],
    ) -> Result<LocationResolver, PersistenceError> {
        queries::bookings::load_location_resolver(&mut self.conn, references)
    }

    // Trips

    /// Retrieves a trip.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_trip(&mut self, trip_id: i64) -> Result<Option<TripData>, PersistenceError> {
        queries::trips::get_trip(&mut self.conn, trip_id)
    }

    /// Lists a booking's trips.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_trips_for_booking(
        &mut self,
        booking_id: i64,
    ) -> Result<Vec<TripData>, PersistenceError> {
        queries::trips::list_trips_for_booking(&mut self.conn, booking_id)
    }

    /// Retrieves a vendor assignment.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_vendor_assignment(
        &mut self,
        vendor_assignment_id: i64,
    ) -> Result<Option<VendorAssignmentData>, PersistenceError> {
        queries::trips::get_vendor_assignment(&mut self.conn, vendor_assignment_id)
    }

    // Audit and receipts

    /// Persists a standalone audit event.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence or serialization fails.
    pub fn persist_audit_event(&mut self, event: &AuditEvent) -> Result<i64, PersistenceError> {
        mutations::audit::persist_audit_event(&mut self.conn, event, None)
    }

    /// Retrieves an audit event by ID.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the event does not exist.
    pub fn get_audit_event(&mut self, event_id: i64) -> Result<AuditEvent, PersistenceError> {
        queries::audit::get_audit_event(&mut self.conn, event_id)
    }

    /// Lists a booking's audit timeline, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_audit_events_for_booking(
        &mut self,
        booking_id: i64,
    ) -> Result<Vec<AuditEvent>, PersistenceError> {
        queries::audit::list_audit_events_for_booking(&mut self.conn, booking_id)
    }

    /// Checks for an unexpired submission receipt.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn has_live_receipt(
        &mut self,
        booking_id: i64,
        content_hash: &str,
        now: i64,
    ) -> Result<bool, PersistenceError> {
        queries::receipts::has_live_receipt(&mut self.conn, booking_id, content_hash, now)
    }
}
