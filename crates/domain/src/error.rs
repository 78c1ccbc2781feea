// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Booking code is empty or malformed.
    InvalidBookingCode(String),
    /// A display name is empty or invalid.
    InvalidName {
        /// The field that failed validation.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
    /// Container type string is not recognized.
    InvalidContainerType(String),
    /// Container update key is neither an existing id nor `new_<n>`.
    InvalidContainerKey(String),
    /// Location reference could not be parsed.
    InvalidLocationReference(String),
    /// Vendor daily rate is missing, non-finite, or not positive.
    InvalidDailyRate(String),
    /// Vehicle number or registration is empty or invalid.
    InvalidVehicleNumber(String),
    /// Expected container count is outside the accepted range.
    InvalidExpectedContainerCount(i64),
    /// Password does not satisfy the minimum policy.
    InvalidPassword(String),
    /// A date string could not be parsed.
    DateParseError {
        /// The rejected input.
        date_string: String,
        /// The parser message.
        error: String,
    },
    /// Booking status string is not recognized.
    InvalidBookingStatus(String),
    /// Assignment status string is not recognized.
    InvalidAssignmentStatus(String),
    /// Vehicle source string is not recognized.
    InvalidVehicleSource(String),
    /// Vendor assignment status string is not recognized.
    InvalidVendorAssignmentStatus(String),
    /// The requested transition is not permitted from the current status.
    InvalidStatusTransition {
        /// The current status.
        from: String,
        /// The attempted target status.
        to: String,
        /// Why the transition was refused.
        reason: String,
    },
    /// The booking has already left the pending state.
    BookingAlreadyProcessed {
        /// The booking identifier.
        booking_id: i64,
        /// The current status.
        status: String,
    },
    /// The container does not belong to the booking.
    ContainerNotFound {
        /// The booking identifier.
        booking_id: i64,
        /// The container identifier.
        container_id: i64,
    },
    /// The container already has a trip and is append-only.
    ContainerAlreadyTripped {
        /// The container identifier.
        container_id: i64,
        /// The trip already recorded for it.
        trip_id: i64,
    },
    /// The container is not ready for a vehicle assignment.
    ContainerNotReady {
        /// The container identifier.
        container_id: i64,
        /// Human readable blocking reasons.
        reasons: Vec<String>,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBookingCode(msg) => write!(f, "Invalid booking code: {msg}"),
            Self::InvalidName { field, reason } => write!(f, "Invalid {field}: {reason}"),
            Self::InvalidContainerType(value) => {
                write!(f, "Invalid container type '{value}': expected 20ft or 40ft")
            }
            Self::InvalidContainerKey(key) => {
                write!(f, "Invalid container key '{key}': expected an id or new_<n>")
            }
            Self::InvalidLocationReference(value) => {
                write!(f, "Invalid location reference '{value}'")
            }
            Self::InvalidDailyRate(msg) => write!(f, "Invalid daily rate: {msg}"),
            Self::InvalidVehicleNumber(msg) => write!(f, "Invalid vehicle number: {msg}"),
            Self::InvalidExpectedContainerCount(count) => {
                write!(f, "Invalid expected container count: {count}")
            }
            Self::InvalidPassword(msg) => write!(f, "Invalid password: {msg}"),
            Self::DateParseError { date_string, error } => {
                write!(f, "Failed to parse date '{date_string}': {error}")
            }
            Self::InvalidBookingStatus(status) => write!(f, "Invalid booking status: {status}"),
            Self::InvalidAssignmentStatus(status) => {
                write!(f, "Invalid assignment status: {status}")
            }
            Self::InvalidVehicleSource(source) => write!(f, "Invalid vehicle source: {source}"),
            Self::InvalidVendorAssignmentStatus(status) => {
                write!(f, "Invalid vendor assignment status: {status}")
            }
            Self::InvalidStatusTransition { from, to, reason } => {
                write!(f, "Cannot transition from {from} to {to}: {reason}")
            }
            Self::BookingAlreadyProcessed { booking_id, status } => {
                write!(f, "Booking {booking_id} is already processed (status: {status})")
            }
            Self::ContainerNotFound {
                booking_id,
                container_id,
            } => write!(
                f,
                "Container {container_id} not found on booking {booking_id}"
            ),
            Self::ContainerAlreadyTripped {
                container_id,
                trip_id,
            } => write!(
                f,
                "Container {container_id} already has trip {trip_id} and cannot be modified"
            ),
            Self::ContainerNotReady {
                container_id,
                reasons,
            } => write!(
                f,
                "Container {container_id} is not ready for assignment: {}",
                reasons.join("; ")
            ),
        }
    }
}

impl std::error::Error for DomainError {}
