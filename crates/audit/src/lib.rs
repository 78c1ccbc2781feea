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
    clippy::all
)]

#[cfg(test)]
mod tests;

/// Represents the entity performing an action.
///
/// Actions taken through the HTTP surface carry the operator that was
/// authenticated for the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// The unique identifier for this actor.
    pub id: String,
    /// The type of actor (e.g., "operator", "system").
    pub actor_type: String,
    /// The operator's canonical identifier, when the actor is an operator.
    pub operator_id: Option<i64>,
    /// The operator's login name, when the actor is an operator.
    pub operator_login_name: Option<String>,
    /// The operator's display name, when the actor is an operator.
    pub operator_display_name: Option<String>,
}

impl Actor {
    /// Creates a new Actor without operator attribution.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this actor
    /// * `actor_type` - The type of actor
    #[must_use]
    pub const fn new(id: String, actor_type: String) -> Self {
        Self {
            id,
            actor_type,
            operator_id: None,
            operator_login_name: None,
            operator_display_name: None,
        }
    }

    /// Creates an Actor attributed to an authenticated operator.
    ///
    /// # Arguments
    ///
    /// * `operator_id` - The operator's canonical identifier
    /// * `login_name` - The operator's login name
    /// * `display_name` - The operator's display name
    #[must_use]
    pub fn with_operator(operator_id: i64, login_name: String, display_name: String) -> Self {
        Self {
            id: login_name.clone(),
            actor_type: String::from("operator"),
            operator_id: Some(operator_id),
            operator_login_name: Some(login_name),
            operator_display_name: Some(display_name),
        }
    }

    /// The login that should appear in operator facing attribution.
    #[must_use]
    pub fn attribution(&self) -> &str {
        self.operator_login_name.as_deref().unwrap_or(&self.id)
    }
}

/// Represents the reason or trigger for an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cause {
    /// A unique identifier for this cause (e.g., request ID).
    pub id: String,
    /// A description of the cause.
    pub description: String,
}

impl Cause {
    /// Creates a new Cause.
    #[must_use]
    pub const fn new(id: String, description: String) -> Self {
        Self { id, description }
    }
}

/// Represents the specific action performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    /// The name of the action (e.g., "`AcknowledgeBooking`").
    pub name: String,
    /// Optional additional details about the action.
    pub details: Option<String>,
}

impl Action {
    /// Creates a new Action.
    #[must_use]
    pub const fn new(name: String, details: Option<String>) -> Self {
        Self { name, details }
    }
}

/// A textual snapshot of the affected booking at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateSnapshot {
    /// A string representation of the state.
    pub data: String,
}

impl StateSnapshot {
    /// Creates a new `StateSnapshot`.
    #[must_use]
    pub const fn new(data: String) -> Self {
        Self { data }
    }
}

/// An immutable audit event representing a state transition.
///
/// Every successful workflow transition produces exactly one audit event,
/// recorded in the same transaction as the change it describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// The persisted identifier. `None` until stored.
    pub event_id: Option<i64>,
    /// The booking this event belongs to, if any.
    pub booking_id: Option<i64>,
    /// The actor who initiated this state change.
    pub actor: Actor,
    /// The cause or reason for this state change.
    pub cause: Cause,
    /// The action that was performed.
    pub action: Action,
    /// The state before the transition.
    pub before: StateSnapshot,
    /// The state after the transition.
    pub after: StateSnapshot,
    /// When the event was stored, as reported by the database.
    pub recorded_at: Option<String>,
}

impl AuditEvent {
    /// Creates a new `AuditEvent` scoped to a booking.
    ///
    /// # Arguments
    ///
    /// * `booking_id` - The affected booking
    /// * `actor` - The actor who initiated the change
    /// * `cause` - The reason for the change
    /// * `action` - The action that was performed
    /// * `before` - The state before the transition
    /// * `after` - The state after the transition
    #[must_use]
    pub const fn new(
        booking_id: i64,
        actor: Actor,
        cause: Cause,
        action: Action,
        before: StateSnapshot,
        after: StateSnapshot,
    ) -> Self {
        Self {
            event_id: None,
            booking_id: Some(booking_id),
            actor,
            cause,
            action,
            before,
            after,
            recorded_at: None,
        }
    }

    /// Creates a new `AuditEvent` that is not scoped to a booking.
    ///
    /// Used for operator and registry administration.
    #[must_use]
    pub const fn new_global(
        actor: Actor,
        cause: Cause,
        action: Action,
        before: StateSnapshot,
        after: StateSnapshot,
    ) -> Self {
        Self {
            event_id: None,
            booking_id: None,
            actor,
            cause,
            action,
            before,
            after,
            recorded_at: None,
        }
    }
}
