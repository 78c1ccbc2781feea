// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Transactional scope for workflow writes.
//!
//! A `UnitOfWork` is only ever handed out inside
//! `SqliteConnection::immediate_transaction`, so the write lock is held
//! from the first read of the aggregate until commit. Returning an error
//! from the closure rolls everything back.

use cargodesk::{BookingState, IntakeResult, TransitionResult};
use cargodesk_audit::AuditEvent;
use cargodesk_domain::LocationResolver;
use diesel::SqliteConnection;

use crate::data_models::{PersistTransitionResult, VendorAssignmentData};
use crate::error::PersistenceError;
use crate::{mutations, queries};

/// Why a transaction did not commit.
enum TransactionFailure<E> {
    /// `BEGIN`, `COMMIT` or `ROLLBACK` itself failed.
    Database(diesel::result::Error),
    /// The closure returned an error.
    Aborted(E),
}

impl<E> From<diesel::result::Error> for TransactionFailure<E> {
    fn from(err: diesel::result::Error) -> Self {
        Self::Database(err)
    }
}

/// Runs `f` inside an immediate transaction on `conn`.
///
/// # Errors
///
/// Returns the closure's error, or a `PersistenceError` converted into `E`
/// if the transaction could not be started or committed.
pub(crate) fn run_in_transaction<T, E, F>(conn: &mut SqliteConnection, f: F) -> Result<T, E>
where
    F: FnOnce(&mut UnitOfWork<'_>) -> Result<T, E>,
    E: From<PersistenceError>,
{
    conn.immediate_transaction::<T, TransactionFailure<E>, _>(|conn| {
        let mut uow: UnitOfWork<'_> = UnitOfWork { conn };
        f(&mut uow).map_err(TransactionFailure::Aborted)
    })
    .map_err(|failure| match failure {
        TransactionFailure::Database(err) => E::from(PersistenceError::from(err)),
        TransactionFailure::Aborted(err) => err,
    })
}

/// A handle on an open immediate transaction.
pub struct UnitOfWork<'c> {
    conn: &'c mut SqliteConnection,
}

impl UnitOfWork<'_> {
    /// The underlying connection, for queries without a wrapper here.
    pub fn connection(&mut self) -> &mut SqliteConnection {
        self.conn
    }

    /// Loads a booking aggregate under the write lock.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the booking does not exist.
    pub fn load_booking_state(&mut self, booking_id: i64) -> Result<BookingState, PersistenceError> {
        queries::bookings::load_booking_state(self.conn, booking_id)
    }

    /// Loads display names for every place the aggregate references.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub fn load_resolver(
        &mut self,
        state: &BookingState,
    ) -> Result<LocationResolver, PersistenceError> {
        queries::bookings::load_resolver_for_state(self.conn, state)
    }

    /// Persists a workflow transition.
    ///
    /// # Errors
    ///
    /// Returns an error if any write fails.
    pub fn persist_transition(
        &mut self,
        result: &TransitionResult,
    ) -> Result<PersistTransitionResult, PersistenceError> {
        mutations::bookings::persist_transition(self.conn, result)
    }

    /// Persists an accepted intake, returning `(booking_id, event_id)`.
    ///
    /// # Errors
    ///
    /// Returns an error if either write fails.
    pub fn persist_intake(&mut self, intake: &IntakeResult) -> Result<(i64, i64), PersistenceError> {
        mutations::bookings::persist_intake(self.conn, intake)
    }

    /// Persists a standalone audit event.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn persist_audit_event(&mut self, event: &AuditEvent) -> Result<i64, PersistenceError> {
        mutations::audit::persist_audit_event(self.conn, event, None)
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
        queries::receipts::has_live_receipt(self.conn, booking_id, content_hash, now)
    }

    /// Records a submission receipt.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn record_receipt(
        &mut self,
        booking_id: i64,
        content_hash: &str,
        now: i64,
        ttl_secs: i64,
    ) -> Result<(), PersistenceError> {
        mutations::receipts::record_receipt(self.conn, booking_id, content_hash, now, ttl_secs)
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
        queries::trips::get_vendor_assignment(self.conn, vendor_assignment_id)
    }

    /// Confirms a vendor assignment. Returns `false` if it was already confirmed.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the assignment does not exist.
    pub fn confirm_vendor_assignment(
        &mut self,
        vendor_assignment_id: i64,
    ) -> Result<bool, PersistenceError> {
        mutations::dispatch::confirm_vendor_assignment(self.conn, vendor_assignment_id)
    }
}
