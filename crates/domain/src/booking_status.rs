// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking status lifecycle and aggregate derivation.
//!
//! Operators move a booking out of `pending` and may ask for container
//! details. Every other status is derived from the container rows: the
//! filled count after a details update, and the assigned count after a
//! vehicle assignment.

use crate::error::DomainError;
use crate::types::BookingContainer;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Booking workflow states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Newly received, not yet acknowledged.
    Pending,
    /// Acknowledged by an operator.
    BeingAddressed,
    /// Container details were requested or are incomplete.
    AwaitingContainers,
    /// Enough container rows are filled to start assigning.
    ContainersUpdated,
    /// Some containers have vehicles, others do not.
    PartiallyFulfilled,
    /// Every container row has a vehicle.
    Confirmed,
}

impl BookingStatus {
    /// Returns the string representation of the status.
    ///
    /// This is used for persistence and API serialization.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::BeingAddressed => "being_addressed",
            Self::AwaitingContainers => "awaiting_containers",
            Self::ContainersUpdated => "containers_updated",
            Self::PartiallyFulfilled => "partially_fulfilled",
            Self::Confirmed => "confirmed",
        }
    }

    /// Whether this is the end of the forward lifecycle.
    ///
    /// Adding container rows to a confirmed booking re-derives its status.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed)
    }

    /// Whether vehicles have started going out against this booking.
    #[must_use]
    pub const fn is_dispatching(&self) -> bool {
        matches!(self, Self::PartiallyFulfilled | Self::Confirmed)
    }

    /// Validates that the booking may be acknowledged.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::BookingAlreadyProcessed` unless the booking is pending.
    pub fn validate_acknowledgement(&self, booking_id: i64) -> Result<(), DomainError> {
        if matches!(self, Self::Pending) {
            Ok(())
        } else {
            Err(DomainError::BookingAlreadyProcessed {
                booking_id,
                status: self.as_str().to_string(),
            })
        }
    }

    /// Validates that container details may be requested.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidStatusTransition` unless the booking is
    /// being addressed.
    pub fn validate_details_request(&self) -> Result<(), DomainError> {
        if matches!(self, Self::BeingAddressed) {
            Ok(())
        } else {
            Err(DomainError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: Self::AwaitingContainers.as_str().to_string(),
                reason: "details can only be requested while the booking is being addressed"
                    .to_string(),
            })
        }
    }
}

impl FromStr for BookingStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "being_addressed" => Ok(Self::BeingAddressed),
            "awaiting_containers" => Ok(Self::AwaitingContainers),
            "containers_updated" => Ok(Self::ContainersUpdated),
            "partially_fulfilled" => Ok(Self::PartiallyFulfilled),
            "confirmed" => Ok(Self::Confirmed),
            _ => Err(DomainError::InvalidBookingStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Counts rows that carry a container number or type.
#[must_use]
pub fn count_filled_containers(containers: &[BookingContainer]) -> usize {
    containers.iter().filter(|c| c.is_filled()).count()
}

/// Counts rows with an owned or vendor vehicle assignment.
#[must_use]
pub fn count_assigned_containers(containers: &[BookingContainer]) -> usize {
    containers.iter().filter(|c| c.has_assignment()).count()
}

/// Derives the booking status after a container details update.
///
/// - a booking already in dispatch (`PartiallyFulfilled` or `Confirmed`)
///   keeps its status unless the batch added rows
/// - filled rows reaching a non-zero expected count yields `ContainersUpdated`
/// - otherwise, any filled row yields `AwaitingContainers`
/// - no filled rows leaves the status unchanged
#[must_use]
pub fn status_after_container_update(
    current: BookingStatus,
    expected_container_count: u32,
    containers: &[BookingContainer],
    rows_added: bool,
) -> BookingStatus {
    if !rows_added && current.is_dispatching() {
        return current;
    }
    let filled: usize = count_filled_containers(containers);
    let expected: usize = usize::try_from(expected_container_count).unwrap_or(usize::MAX);
    if expected > 0 && filled >= expected {
        BookingStatus::ContainersUpdated
    } else if filled > 0 {
        BookingStatus::AwaitingContainers
    } else {
        current
    }
}

/// Derives the booking status after a vehicle assignment.
///
/// A booking is confirmed only when every row has a vehicle.
#[must_use]
pub fn status_after_assignment(containers: &[BookingContainer]) -> BookingStatus {
    let assigned: usize = count_assigned_containers(containers);
    if !containers.is_empty() && assigned == containers.len() {
        BookingStatus::Confirmed
    } else {
        BookingStatus::PartiallyFulfilled
    }
}
