// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

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

mod booking_status;
mod container_update;
mod error;
mod location;
mod readiness;
mod submission;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use booking_status::{
    BookingStatus, count_assigned_containers, count_filled_containers, status_after_assignment,
    status_after_container_update,
};
pub use container_update::{
    ContainerKey, ContainerUpdate, merge_container_update, new_container_from_update,
    normalize_container_number,
};
pub use error::DomainError;
pub use location::{LocationKind, LocationRef, LocationResolver, ResolvedLocation};
pub use readiness::{ContainerReadiness, container_readiness, evaluate_container_readiness};
pub use submission::{SubmissionFingerprint, digest_bytes};

// Re-export public types
pub use types::{
    AssignmentStatus, Booking, BookingContainer, ContainerType, DailyRate, LocationCandidate,
    VehicleAssignment, VehicleCandidate, VehicleSource, VendorAssignmentStatus,
};
pub use validation::{
    MAX_BOOKING_CODE_LEN, MAX_EXPECTED_CONTAINERS, MIN_PASSWORD_LEN, normalize_vehicle_number,
    parse_iso_date, validate_booking_code, validate_expected_container_count, validate_name,
    validate_password,
};
