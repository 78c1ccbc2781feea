// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use cargodesk_audit::{AuditEvent, StateSnapshot};
use cargodesk_domain::{
    Booking, BookingContainer, DailyRate, VehicleSource, count_assigned_containers,
    count_filled_containers,
};
use time::Date;

/// A booking together with all of its container rows.
///
/// This is the aggregate every workflow command is applied to. Rows are
/// kept in sequence order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingState {
    /// The booking header.
    pub booking: Booking,
    /// All container rows on the booking.
    pub containers: Vec<BookingContainer>,
}

impl BookingState {
    /// Creates a state from a booking and its rows.
    #[must_use]
    pub fn new(booking: Booking, mut containers: Vec<BookingContainer>) -> Self {
        containers.sort_by_key(|c| c.sequence);
        Self {
            booking,
            containers,
        }
    }

    /// The booking identifier, or `0` when the booking is not yet stored.
    #[must_use]
    pub fn booking_id(&self) -> i64 {
        self.booking.booking_id.unwrap_or(0)
    }

    /// Finds a row by its identifier.
    #[must_use]
    pub fn container(&self, container_id: i64) -> Option<&BookingContainer> {
        self.containers
            .iter()
            .find(|c| c.container_id == Some(container_id))
    }

    /// Converts the state to a snapshot for audit purposes.
    #[must_use]
    pub fn to_snapshot(&self) -> StateSnapshot {
        StateSnapshot::new(format!(
            "status={},expected={},containers={},filled={},assigned={}",
            self.booking.status.as_str(),
            self.booking.expected_container_count,
            self.containers.len(),
            count_filled_containers(&self.containers),
            count_assigned_containers(&self.containers)
        ))
    }
}

/// A row write produced by a container batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerChange {
    /// A new row to insert.
    Inserted(BookingContainer),
    /// An existing row whose details changed.
    Updated(BookingContainer),
}

impl ContainerChange {
    /// The row as it should be stored.
    #[must_use]
    pub const fn container(&self) -> &BookingContainer {
        match self {
            Self::Inserted(c) | Self::Updated(c) => c,
        }
    }
}

/// The trip to record for a dispatched container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripDraft {
    /// `{booking_code}-{sequence:02}`.
    pub reference_number: String,
    /// The day the trip runs.
    pub trip_date: Date,
    /// Pickup name at the time of dispatch.
    pub from_name: String,
    /// Drop name at the time of dispatch.
    pub to_name: String,
    /// The pool the vehicle came from.
    pub vehicle_source: VehicleSource,
    /// Human readable vehicle description.
    pub vehicle_descriptor: String,
}

/// The vendor assignment record to create for a vendor vehicle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorAssignmentDraft {
    /// The vendor supplying the vehicle.
    pub vendor_id: i64,
    /// The vendor's registered vehicle, if known.
    pub vendor_vehicle_id: Option<i64>,
    /// The plate number as dispatched.
    pub vehicle_number: String,
    /// The agreed daily rate.
    pub daily_rate: DailyRate,
}

/// Everything needed to dispatch one container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchPlan {
    /// The container row with its assignment applied.
    pub container: BookingContainer,
    /// The trip to create.
    pub trip: TripDraft,
    /// The vendor record to create, for vendor vehicles.
    pub vendor_assignment: Option<VendorAssignmentDraft>,
}

/// The result of a successful state transition.
///
/// Transitions are atomic: they either succeed completely or fail without side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// The new state after the transition.
    pub new_state: BookingState,
    /// Container rows to insert or update.
    pub container_changes: Vec<ContainerChange>,
    /// The dispatch to record, for vehicle assignments.
    pub dispatch: Option<DispatchPlan>,
    /// The audit event recording this transition.
    pub audit_event: AuditEvent,
}

impl TransitionResult {
    /// How many container rows this transition writes.
    #[must_use]
    pub fn processed_count(&self) -> usize {
        self.container_changes.len() + usize::from(self.dispatch.is_some())
    }
}

/// The result of accepting a new booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeResult {
    /// The validated pending booking.
    pub booking: Booking,
    /// The audit event recording the intake.
    pub audit_event: AuditEvent,
}
