// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use cargodesk_domain::DomainError;

/// Errors that can occur during state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A domain rule was violated.
    DomainViolation(DomainError),
    /// The booking already moved past the requested step.
    AlreadyProcessed {
        /// The booking identifier.
        booking_id: i64,
        /// The status the booking is in.
        status: String,
    },
    /// The request conflicts with recorded state.
    Conflict(String),
    /// The container cannot receive a vehicle yet.
    NotReady {
        /// The container identifier.
        container_id: i64,
        /// Why the container is blocked.
        reasons: Vec<String>,
    },
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainViolation(err) => write!(f, "Domain violation: {err}"),
            Self::AlreadyProcessed { booking_id, status } => {
                write!(f, "Booking {booking_id} already processed (status: {status})")
            }
            Self::Conflict(msg) => write!(f, "Conflict: {msg}"),
            Self::NotReady {
                container_id,
                reasons,
            } => write!(
                f,
                "Container {container_id} is not ready: {}",
                reasons.join("; ")
            ),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::BookingAlreadyProcessed { booking_id, status } => {
                Self::AlreadyProcessed { booking_id, status }
            }
            DomainError::ContainerAlreadyTripped { .. } => Self::Conflict(err.to_string()),
            DomainError::ContainerNotReady {
                container_id,
                reasons,
            } => Self::NotReady {
                container_id,
                reasons,
            },
            other => Self::DomainViolation(other),
        }
    }
}
