// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Container readiness for vehicle assignment.
//!
//! Readiness is always computed from the current row and resolver output.
//! It is never stored.

use crate::location::{LocationResolver, ResolvedLocation};
use crate::types::BookingContainer;

/// Whether a container may receive a vehicle, and if not, why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerReadiness {
    /// True when nothing blocks assignment.
    pub is_ready: bool,
    /// Operator facing reasons, empty when ready.
    pub blocking_reasons: Vec<String>,
}

fn location_reason(label: &str, resolved: &ResolvedLocation) -> Option<String> {
    match resolved {
        ResolvedLocation::Resolved(_) => None,
        ResolvedLocation::Absent => Some(format!("{label} location is missing")),
        ResolvedLocation::Unresolved(reference) => Some(format!(
            "{label} location {reference} does not exist"
        )),
    }
}

/// Evaluates readiness from already resolved endpoints.
///
/// A container is ready when it has a container number and both endpoints
/// resolve to known places. Whether a trip already exists is checked
/// separately by the assignment step.
#[must_use]
pub fn evaluate_container_readiness(
    container: &BookingContainer,
    from: &ResolvedLocation,
    to: &ResolvedLocation,
) -> ContainerReadiness {
    let mut blocking_reasons: Vec<String> = Vec::new();

    if container.number1.is_none() {
        blocking_reasons.push(String::from("Container number is missing"));
    }
    if let Some(reason) = location_reason("From", from) {
        blocking_reasons.push(reason);
    }
    if let Some(reason) = location_reason("To", to) {
        blocking_reasons.push(reason);
    }

    ContainerReadiness {
        is_ready: blocking_reasons.is_empty(),
        blocking_reasons,
    }
}

/// Resolves both endpoints and evaluates readiness.
#[must_use]
pub fn container_readiness(
    container: &BookingContainer,
    resolver: &LocationResolver,
) -> ContainerReadiness {
    let from: ResolvedLocation = resolver.resolve_optional(container.from_location.as_ref());
    let to: ResolvedLocation = resolver.resolve_optional(container.to_location.as_ref());
    evaluate_container_readiness(container, &from, &to)
}
