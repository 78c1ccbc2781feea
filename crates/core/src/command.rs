// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use cargodesk_domain::{ContainerUpdate, VehicleAssignment};
use time::Date;

/// A command represents operator intent against one booking, as data only.
///
/// Commands are the only way to request booking state changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Take ownership of a pending booking.
    AcknowledgeBooking,
    /// Ask the client for container details.
    RequestContainerDetails {
        /// Optional message passed on to the client.
        note: Option<String>,
    },
    /// Apply a batch of container detail updates.
    UpdateContainers {
        /// The expected container total after this update.
        expected_total: u32,
        /// The per-row updates, in any order.
        updates: Vec<ContainerUpdate>,
    },
    /// Choose a vehicle for a container and dispatch a trip.
    AssignVehicle {
        /// The targeted container.
        container_id: i64,
        /// The chosen vehicle.
        assignment: VehicleAssignment,
        /// Human readable vehicle description for the trip record.
        vehicle_descriptor: String,
        /// The day the trip runs.
        trip_date: Date,
    },
}

impl Command {
    /// The audit action name for this command.
    #[must_use]
    pub const fn action_name(&self) -> &'static str {
        match self {
            Self::AcknowledgeBooking => "AcknowledgeBooking",
            Self::RequestContainerDetails { .. } => "RequestContainerDetails",
            Self::UpdateContainers { .. } => "UpdateContainers",
            Self::AssignVehicle { .. } => "AssignVehicle",
        }
    }
}
