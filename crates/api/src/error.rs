// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use cargodesk::CoreError;
use cargodesk_domain::DomainError;
use cargodesk_persistence::PersistenceError;
use thiserror::Error;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Authentication failed.
    #[error("Authentication failed: {reason}")]
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed.
    #[error("Unauthorized: '{action}' requires {required_role} role")]
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
}

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API contract.
/// The server maps each variant onto one HTTP status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Authentication failed.
    #[error("Authentication failed: {reason}")]
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// The actor does not have permission.
    #[error("Unauthorized: '{action}' requires {required_role} role")]
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// The anti-forgery token is missing or does not match the session.
    #[error("Forbidden: {reason}")]
    Forbidden {
        /// Why the request was refused.
        reason: String,
    },
    /// Invalid input was provided.
    #[error("Invalid input for field '{field}': {message}")]
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// The request is well formed but breaks a workflow rule.
    #[error("Domain rule violation ({rule}): {message}")]
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// The request conflicts with recorded state.
    #[error("Conflict: {message}")]
    Conflict {
        /// A human-readable description of the conflict.
        message: String,
    },
    /// A requested resource was not found.
    #[error("{resource_type} not found: {message}")]
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// A database or file operation failed.
    #[error("Storage failure: {message}")]
    Storage {
        /// A description of the failure.
        message: String,
    },
    /// An internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl ApiError {
    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn not_found(resource_type: &str, message: impl Into<String>) -> Self {
        Self::ResourceNotFound {
            resource_type: resource_type.to_string(),
            message: message.into(),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
        }
    }
}

impl From<PersistenceError> for ApiError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::NotFound(msg) => Self::ResourceNotFound {
                resource_type: String::from("Record"),
                message: msg,
            },
            PersistenceError::DuplicateEntry(msg) => Self::Conflict {
                message: format!("Already exists: {msg}"),
            },
            PersistenceError::ForeignKeyViolation(msg) => Self::InvalidInput {
                field: String::from("reference"),
                message: format!("Referenced record does not exist: {msg}"),
            },
            PersistenceError::ContainerAlreadyTripped { container_id } => Self::Conflict {
                message: format!("Container {container_id} already has a trip"),
            },
            PersistenceError::OperatorNotFound(msg)
            | PersistenceError::SessionNotFound(msg)
            | PersistenceError::SessionExpired(msg) => Self::AuthenticationFailed { reason: msg },
            other => Self::Storage {
                message: other.to_string(),
            },
        }
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::InvalidBookingCode(msg) => ApiError::invalid("booking_code", msg),
        DomainError::InvalidName { field, reason } => ApiError::invalid(field, reason),
        DomainError::InvalidContainerType(value) => ApiError::invalid(
            "container_type",
            format!("Unknown container type '{value}'. Must be '20ft' or '40ft'"),
        ),
        DomainError::InvalidContainerKey(key) => ApiError::invalid(
            "containers",
            format!("'{key}' is neither a container id nor new_<n>"),
        ),
        DomainError::InvalidLocationReference(value) => ApiError::invalid(
            "location",
            format!("'{value}' is not a valid location reference"),
        ),
        DomainError::InvalidDailyRate(msg) => ApiError::invalid("daily_rate", msg),
        DomainError::InvalidVehicleNumber(msg) => ApiError::invalid("vehicle_number", msg),
        DomainError::InvalidExpectedContainerCount(count) => ApiError::invalid(
            "expected_container_count",
            format!("Invalid expected container count: {count}"),
        ),
        DomainError::InvalidPassword(msg) => ApiError::invalid("password", msg),
        DomainError::DateParseError { date_string, error } => ApiError::invalid(
            "trip_date",
            format!("Failed to parse date '{date_string}': {error}"),
        ),
        DomainError::InvalidBookingStatus(value) => {
            ApiError::invalid("status", format!("Unknown booking status '{value}'"))
        }
        DomainError::InvalidVehicleSource(value) => {
            ApiError::invalid("vehicle_type", format!("Unknown vehicle type '{value}'"))
        }
        DomainError::InvalidAssignmentStatus(value)
        | DomainError::InvalidVendorAssignmentStatus(value) => ApiError::Internal {
            message: format!("Stored status '{value}' is not recognized"),
        },
        DomainError::InvalidStatusTransition { from, to, reason } => {
            ApiError::DomainRuleViolation {
                rule: String::from("status_transition"),
                message: format!("Cannot move from {from} to {to}: {reason}"),
            }
        }
        DomainError::BookingAlreadyProcessed { booking_id, status } => ApiError::Conflict {
            message: format!("Booking {booking_id} was already processed (status: {status})"),
        },
        DomainError::ContainerNotFound {
            booking_id,
            container_id,
        } => ApiError::not_found(
            "Container",
            format!("Container {container_id} does not belong to booking {booking_id}"),
        ),
        DomainError::ContainerAlreadyTripped {
            container_id,
            trip_id,
        } => ApiError::Conflict {
            message: format!("Container {container_id} already has trip {trip_id}"),
        },
        DomainError::ContainerNotReady {
            container_id,
            reasons,
        } => ApiError::DomainRuleViolation {
            rule: String::from("container_ready"),
            message: format!(
                "Container {container_id} is not ready: {}",
                reasons.join("; ")
            ),
        },
    }
}

/// Translates a core error into an API error.
///
/// This translation is explicit and ensures core errors are not leaked directly.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::AlreadyProcessed { booking_id, status } => ApiError::Conflict {
            message: format!("Booking {booking_id} was already processed (status: {status})"),
        },
        CoreError::Conflict(message) => ApiError::Conflict { message },
        CoreError::NotReady {
            container_id,
            reasons,
        } => ApiError::DomainRuleViolation {
            rule: String::from("container_ready"),
            message: format!(
                "Container {container_id} is not ready: {}",
                reasons.join("; ")
            ),
        },
    }
}
