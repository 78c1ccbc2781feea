// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use cargodesk_domain::{DailyRate, VehicleSource, VendorAssignmentStatus};
use serde::{Deserialize, Serialize};
use time::Date;

/// Serializable representation of an Actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorData {
    pub id: String,
    pub actor_type: String,
}

/// Serializable representation of a Cause.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CauseData {
    pub id: String,
    pub description: String,
}

/// Serializable representation of an Action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionData {
    pub name: String,
    pub details: Option<String>,
}

/// Serializable representation of a `StateSnapshot`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshotData {
    pub data: String,
}

/// A stored operator account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorData {
    pub operator_id: i64,
    pub login_name: String,
    pub display_name: String,
    pub password_hash: String,
    pub role: String,
    pub is_disabled: bool,
    pub created_at: String,
    pub last_login_at: Option<String>,
}

/// A stored login session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionData {
    pub session_id: i64,
    pub session_token: String,
    pub csrf_token: String,
    pub operator_id: i64,
    pub created_at: String,
    pub last_activity_at: String,
    /// Unix seconds.
    pub expires_at: i64,
}

/// A customer account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientData {
    pub client_id: i64,
    pub name: String,
    pub contact_email: Option<String>,
}

/// A top-level location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationData {
    pub location_id: i64,
    pub name: String,
    pub address: Option<String>,
}

/// A yard within a location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YardData {
    pub yard_id: i64,
    pub location_id: i64,
    pub name: String,
}

/// A vehicle in the owned fleet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleData {
    pub vehicle_id: i64,
    pub registration_number: String,
    pub description: Option<String>,
    pub is_active: bool,
}

/// A third-party vehicle supplier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorData {
    pub vendor_id: i64,
    pub name: String,
    pub contact_email: Option<String>,
}

/// A vehicle registered to a vendor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorVehicleData {
    pub vendor_vehicle_id: i64,
    pub vendor_id: i64,
    pub vehicle_number: String,
    pub status: String,
}

/// A dispatched trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripData {
    pub trip_id: i64,
    pub booking_id: i64,
    pub container_id: i64,
    pub reference_number: String,
    pub trip_date: Date,
    pub from_name: String,
    pub to_name: String,
    pub vehicle_source: VehicleSource,
    pub vehicle_descriptor: String,
    pub status: String,
    pub created_at: String,
}

/// A vendor assignment awaiting or holding vendor confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorAssignmentData {
    pub vendor_assignment_id: i64,
    pub booking_id: i64,
    pub container_id: i64,
    pub vendor_id: i64,
    pub vendor_vehicle_id: Option<i64>,
    pub vehicle_number: String,
    pub daily_rate: DailyRate,
    pub status: VendorAssignmentStatus,
    pub created_at: String,
    pub confirmed_at: Option<String>,
}

/// Ids assigned while recording a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchRecord {
    pub trip_id: i64,
    pub vendor_assignment_id: Option<i64>,
}

/// Ids assigned while persisting a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistTransitionResult {
    /// The audit event id.
    pub event_id: i64,
    /// Ids of inserted container rows, in insertion order.
    pub inserted_container_ids: Vec<i64>,
    /// Ids from the recorded dispatch, if any.
    pub dispatch: Option<DispatchRecord>,
}
