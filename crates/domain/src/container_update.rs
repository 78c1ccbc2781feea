// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Merging submitted container details into stored rows.
//!
//! Submitted values never blank out stored ones: an empty field in the
//! form means "leave as is". Photos are replaced only when a new upload
//! was stored for that slot.

use crate::error::DomainError;
use crate::location::LocationRef;
use crate::types::{BookingContainer, ContainerType};
use std::str::FromStr;

/// Identifies which row an update targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContainerKey {
    /// An existing container row.
    Existing(i64),
    /// A row to create, ordered by its client supplied index.
    New(u32),
}

impl FromStr for ContainerKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed: &str = s.trim();
        if let Some(index) = trimmed.strip_prefix("new_") {
            return index
                .parse::<u32>()
                .map(Self::New)
                .map_err(|_| DomainError::InvalidContainerKey(s.to_string()));
        }
        match trimmed.parse::<i64>() {
            Ok(id) if id > 0 => Ok(Self::Existing(id)),
            _ => Err(DomainError::InvalidContainerKey(s.to_string())),
        }
    }
}

impl std::fmt::Display for ContainerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Existing(id) => write!(f, "{id}"),
            Self::New(index) => write!(f, "new_{index}"),
        }
    }
}

/// Submitted details for one container row.
///
/// `None` means the field was left empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerUpdate {
    /// The targeted row.
    pub key: ContainerKey,
    /// Container size.
    pub container_type: Option<ContainerType>,
    /// Primary container number.
    pub number1: Option<String>,
    /// Second container number.
    pub number2: Option<String>,
    /// Pickup location.
    pub from_location: Option<LocationRef>,
    /// Drop location.
    pub to_location: Option<LocationRef>,
    /// Stored path of a newly uploaded first photo.
    pub photo1: Option<String>,
    /// Stored path of a newly uploaded second photo.
    pub photo2: Option<String>,
}

impl ContainerUpdate {
    /// Creates an update with every field left empty.
    #[must_use]
    pub const fn blank(key: ContainerKey) -> Self {
        Self {
            key,
            container_type: None,
            number1: None,
            number2: None,
            from_location: None,
            to_location: None,
            photo1: None,
            photo2: None,
        }
    }

    /// Whether no field carries a value.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.container_type.is_none()
            && self.number1.is_none()
            && self.number2.is_none()
            && self.from_location.is_none()
            && self.to_location.is_none()
            && self.photo1.is_none()
            && self.photo2.is_none()
    }
}

/// Normalizes a container number: trimmed, uppercase, `None` when empty.
#[must_use]
pub fn normalize_container_number(value: &str) -> Option<String> {
    let trimmed: &str = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_uppercase())
    }
}

/// Applies an update on top of a stored row.
///
/// A resulting 40ft type clears the second number.
#[must_use]
pub fn merge_container_update(
    existing: &BookingContainer,
    update: &ContainerUpdate,
) -> BookingContainer {
    let mut merged: BookingContainer = existing.clone();

    if update.container_type.is_some() {
        merged.container_type = update.container_type;
    }
    if let Some(number) = update.number1.as_deref().and_then(normalize_container_number) {
        merged.number1 = Some(number);
    }
    if let Some(number) = update.number2.as_deref().and_then(normalize_container_number) {
        merged.number2 = Some(number);
    }
    if update.from_location.is_some() {
        merged.from_location = update.from_location;
    }
    if update.to_location.is_some() {
        merged.to_location = update.to_location;
    }
    if update.photo1.is_some() {
        merged.photo1.clone_from(&update.photo1);
    }
    if update.photo2.is_some() {
        merged.photo2.clone_from(&update.photo2);
    }

    if merged
        .container_type
        .is_some_and(|t| !t.allows_second_number())
    {
        merged.number2 = None;
    }

    merged
}

/// Builds a fresh row from an update for a `new_<n>` key.
///
/// Endpoints left empty fall back to the booking defaults.
#[must_use]
pub fn new_container_from_update(
    sequence: u32,
    update: &ContainerUpdate,
    default_from: Option<LocationRef>,
    default_to: Option<LocationRef>,
) -> BookingContainer {
    let mut base: BookingContainer = BookingContainer::empty(sequence);
    base.from_location = default_from;
    base.to_location = default_to;
    merge_container_update(&base, update)
}
