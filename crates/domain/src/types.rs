// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::booking_status::BookingStatus;
use crate::error::DomainError;
use crate::location::LocationRef;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Physical container size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContainerType {
    /// A twenty foot container. Two may travel on a single vehicle.
    #[serde(rename = "20ft")]
    Twenty,
    /// A forty foot container. Carries a single container number.
    #[serde(rename = "40ft")]
    Forty,
}

impl ContainerType {
    /// Returns the string representation used for persistence and the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Twenty => "20ft",
            Self::Forty => "40ft",
        }
    }

    /// Parses an optional form value.
    ///
    /// Empty input means "not provided" and yields `None`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidContainerType` if the value is not recognized.
    pub fn parse_optional(value: &str) -> Result<Option<Self>, DomainError> {
        let trimmed: &str = value.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        trimmed.parse().map(Some)
    }

    /// Whether this type carries a second container number.
    #[must_use]
    pub const fn allows_second_number(&self) -> bool {
        matches!(self, Self::Twenty)
    }
}

impl FromStr for ContainerType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "20ft" | "20" => Ok(Self::Twenty),
            "40ft" | "40" => Ok(Self::Forty),
            _ => Err(DomainError::InvalidContainerType(s.to_string())),
        }
    }
}

impl std::fmt::Display for ContainerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-container progress through the dispatch workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    /// No vehicle has been chosen.
    Unassigned,
    /// A vendor vehicle was chosen and awaits vendor confirmation.
    VendorPending,
    /// A vehicle was chosen and the trip is being recorded.
    Assigned,
    /// A trip exists for the container. Terminal.
    TripCreated,
}

impl AssignmentStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unassigned => "unassigned",
            Self::VendorPending => "vendor_pending",
            Self::Assigned => "assigned",
            Self::TripCreated => "trip_created",
        }
    }
}

impl FromStr for AssignmentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unassigned" => Ok(Self::Unassigned),
            "vendor_pending" => Ok(Self::VendorPending),
            "assigned" => Ok(Self::Assigned),
            "trip_created" => Ok(Self::TripCreated),
            _ => Err(DomainError::InvalidAssignmentStatus(s.to_string())),
        }
    }
}

/// Where a vehicle comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleSource {
    /// The company's own fleet.
    Owned,
    /// A vehicle supplied by a third-party vendor.
    Vendor,
}

impl VehicleSource {
    /// Returns the string representation of the source.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Owned => "owned",
            Self::Vendor => "vendor",
        }
    }
}

impl FromStr for VehicleSource {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "owned" => Ok(Self::Owned),
            "vendor" => Ok(Self::Vendor),
            _ => Err(DomainError::InvalidVehicleSource(s.to_string())),
        }
    }
}

/// Lifecycle of a vendor assignment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VendorAssignmentStatus {
    /// Sent to the vendor, not yet confirmed.
    PendingConfirmation,
    /// The vendor confirmed the vehicle.
    Confirmed,
}

impl VendorAssignmentStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PendingConfirmation => "pending_confirmation",
            Self::Confirmed => "confirmed",
        }
    }
}

impl FromStr for VendorAssignmentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_confirmation" => Ok(Self::PendingConfirmation),
            "confirmed" => Ok(Self::Confirmed),
            _ => Err(DomainError::InvalidVendorAssignmentStatus(s.to_string())),
        }
    }
}

/// A vendor's daily charge, held in minor currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DailyRate {
    cents: i64,
}

impl DailyRate {
    /// Builds a rate from a decimal amount as entered by the operator.
    ///
    /// The amount is rounded to two decimal places.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidDailyRate` if the amount is not finite
    /// or does not round to a positive value.
    pub fn from_amount(amount: f64) -> Result<Self, DomainError> {
        if !amount.is_finite() {
            return Err(DomainError::InvalidDailyRate(format!(
                "{amount} is not a number"
            )));
        }
        let scaled: f64 = (amount * 100.0).round();
        if scaled < 1.0 || scaled > 1e15 {
            return Err(DomainError::InvalidDailyRate(format!(
                "{amount} must be greater than zero"
            )));
        }
        // Bounds were checked above so the cast cannot truncate.
        #[allow(clippy::cast_possible_truncation)]
        let cents: i64 = scaled as i64;
        Ok(Self { cents })
    }

    /// Builds a rate from stored minor units.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidDailyRate` if the value is not positive.
    pub fn from_cents(cents: i64) -> Result<Self, DomainError> {
        if cents <= 0 {
            return Err(DomainError::InvalidDailyRate(format!(
                "{cents} cents must be greater than zero"
            )));
        }
        Ok(Self { cents })
    }

    /// The rate in minor currency units.
    #[must_use]
    pub const fn cents(&self) -> i64 {
        self.cents
    }
}

impl std::fmt::Display for DailyRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}", self.cents / 100, self.cents % 100)
    }
}

/// The vehicle chosen for a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VehicleAssignment {
    /// A vehicle from the owned fleet.
    Owned {
        /// The fleet vehicle identifier.
        vehicle_id: i64,
    },
    /// A vehicle supplied by a vendor.
    Vendor {
        /// The vendor identifier.
        vendor_id: i64,
        /// The vendor's registered vehicle, if the plate is on file.
        vendor_vehicle_id: Option<i64>,
        /// The plate number as dispatched.
        vehicle_number: String,
        /// What the vendor charges per day.
        daily_rate: DailyRate,
    },
}

impl VehicleAssignment {
    /// The pool the assigned vehicle came from.
    #[must_use]
    pub const fn source(&self) -> VehicleSource {
        match self {
            Self::Owned { .. } => VehicleSource::Owned,
            Self::Vendor { .. } => VehicleSource::Vendor,
        }
    }
}

/// A customer request to move containers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    /// Canonical identifier. `None` until persisted.
    pub booking_id: Option<i64>,
    /// Human facing booking code, used as the trip reference prefix.
    pub booking_code: String,
    /// The customer placing the booking.
    pub client_id: i64,
    /// How many containers the booking is expected to carry.
    pub expected_container_count: u32,
    /// Current workflow status.
    pub status: BookingStatus,
    /// Default pickup location for new container rows.
    pub default_from: Option<LocationRef>,
    /// Default drop location for new container rows.
    pub default_to: Option<LocationRef>,
    /// Login of the operator who acknowledged the booking.
    pub acknowledged_by: Option<String>,
}

impl Booking {
    /// Creates a new pending booking.
    #[must_use]
    pub const fn new(
        booking_code: String,
        client_id: i64,
        expected_container_count: u32,
        default_from: Option<LocationRef>,
        default_to: Option<LocationRef>,
    ) -> Self {
        Self {
            booking_id: None,
            booking_code,
            client_id,
            expected_container_count,
            status: BookingStatus::Pending,
            default_from,
            default_to,
            acknowledged_by: None,
        }
    }

    /// Returns the persisted identifier, or `0` if not yet persisted.
    #[must_use]
    pub fn id_or_zero(&self) -> i64 {
        self.booking_id.unwrap_or(0)
    }
}

/// One physical container slot within a booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingContainer {
    /// Canonical identifier. `None` until persisted.
    pub container_id: Option<i64>,
    /// 1-based position within the booking.
    pub sequence: u32,
    /// Container size, if known.
    pub container_type: Option<ContainerType>,
    /// Primary container number.
    pub number1: Option<String>,
    /// Second container number, only meaningful for 20ft units.
    pub number2: Option<String>,
    /// Pickup location.
    pub from_location: Option<LocationRef>,
    /// Drop location.
    pub to_location: Option<LocationRef>,
    /// Stored path of the first photo.
    pub photo1: Option<String>,
    /// Stored path of the second photo.
    pub photo2: Option<String>,
    /// The chosen vehicle, once assigned.
    pub assignment: Option<VehicleAssignment>,
    /// The vendor assignment record for vendor-sourced vehicles.
    pub vendor_assignment_id: Option<i64>,
    /// The trip recorded for this container.
    pub trip_id: Option<i64>,
    /// Per-container workflow status.
    pub assignment_status: AssignmentStatus,
}

impl BookingContainer {
    /// Creates an empty, unassigned container row at the given position.
    #[must_use]
    pub const fn empty(sequence: u32) -> Self {
        Self {
            container_id: None,
            sequence,
            container_type: None,
            number1: None,
            number2: None,
            from_location: None,
            to_location: None,
            photo1: None,
            photo2: None,
            assignment: None,
            vendor_assignment_id: None,
            trip_id: None,
            assignment_status: AssignmentStatus::Unassigned,
        }
    }

    /// Whether the row carries enough detail to count toward the expected total.
    ///
    /// A row is filled once it has a container number or a container type.
    #[must_use]
    pub const fn is_filled(&self) -> bool {
        self.number1.is_some() || self.container_type.is_some()
    }

    /// Whether a vehicle has been chosen for this row.
    #[must_use]
    pub const fn has_assignment(&self) -> bool {
        self.assignment.is_some()
    }

    /// Whether a trip has been recorded for this row.
    #[must_use]
    pub const fn is_tripped(&self) -> bool {
        self.trip_id.is_some() || matches!(self.assignment_status, AssignmentStatus::TripCreated)
    }

    /// Returns the persisted identifier, or `0` if not yet persisted.
    #[must_use]
    pub fn id_or_zero(&self) -> i64 {
        self.container_id.unwrap_or(0)
    }
}

/// A vehicle offered by the search, tagged with its pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleCandidate {
    /// The vehicle or vendor-vehicle identifier.
    pub id: i64,
    /// Plate or registration number.
    pub vehicle_number: String,
    /// The pool the vehicle belongs to.
    pub source: VehicleSource,
    /// Owning vendor for vendor vehicles.
    pub vendor_id: Option<i64>,
    /// Human readable label.
    pub label: String,
}

/// A pickable place offered by the location search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationCandidate {
    /// The typed reference to submit back.
    pub reference: LocationRef,
    /// The display name as it would be resolved.
    pub display_name: String,
}
