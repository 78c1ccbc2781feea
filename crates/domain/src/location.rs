// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Typed location references and display resolution.
//!
//! Pickup and drop points are either top-level locations or yards that
//! belong to a location. On the wire a reference is written `kind|id`,
//! where `kind` is `location` or `yard`. A bare numeric id is accepted
//! as a location for older clients.
//!
//! Resolution never fails: a reference whose target is missing resolves
//! to `ResolvedLocation::Unresolved`, which readiness treats as blocking.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The two kinds of place a container can move between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationKind {
    /// A top-level location.
    Location,
    /// A yard within a location.
    Yard,
}

impl LocationKind {
    /// Returns the string representation used on the wire and in storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Location => "location",
            Self::Yard => "yard",
        }
    }

    /// Parses a stored kind, falling back to `Location` for unknown values.
    #[must_use]
    pub fn from_stored(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("yard") {
            Self::Yard
        } else {
            Self::Location
        }
    }
}

/// A typed pointer at a location or a yard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocationRef {
    kind: LocationKind,
    id: i64,
}

impl LocationRef {
    /// Creates a reference to a top-level location.
    #[must_use]
    pub const fn location(id: i64) -> Self {
        Self {
            kind: LocationKind::Location,
            id,
        }
    }

    /// Creates a reference to a yard.
    #[must_use]
    pub const fn yard(id: i64) -> Self {
        Self {
            kind: LocationKind::Yard,
            id,
        }
    }

    /// Creates a reference from its parts.
    #[must_use]
    pub const fn new(kind: LocationKind, id: i64) -> Self {
        Self { kind, id }
    }

    /// Returns the kind of place referenced.
    #[must_use]
    pub const fn kind(&self) -> LocationKind {
        self.kind
    }

    /// Returns the referenced identifier.
    #[must_use]
    pub const fn id(&self) -> i64 {
        self.id
    }

    /// Parses a wire value.
    ///
    /// - empty input yields `Ok(None)`
    /// - `yard|N` yields a yard reference
    /// - `location|N`, a bare `N`, or an unrecognized kind with a numeric id
    ///   yield a location reference
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidLocationReference` if the id is not a
    /// positive integer.
    pub fn parse_wire(value: &str) -> Result<Option<Self>, DomainError> {
        let trimmed: &str = value.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        let (kind, raw_id): (LocationKind, &str) = match trimmed.split_once('|') {
            Some((kind, id)) => (LocationKind::from_stored(kind), id.trim()),
            None => (LocationKind::Location, trimmed),
        };

        match raw_id.parse::<i64>() {
            Ok(id) if id > 0 => Ok(Some(Self { kind, id })),
            _ => Err(DomainError::InvalidLocationReference(value.to_string())),
        }
    }

    /// Formats the reference as `kind|id`.
    #[must_use]
    pub fn to_wire(&self) -> String {
        format!("{}|{}", self.kind.as_str(), self.id)
    }
}

impl std::fmt::Display for LocationRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}|{}", self.kind.as_str(), self.id)
    }
}

/// The outcome of resolving an optional reference to a display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedLocation {
    /// No reference was set.
    Absent,
    /// The reference points at a known place.
    Resolved(String),
    /// The reference points at a place that does not exist.
    Unresolved(LocationRef),
}

impl ResolvedLocation {
    /// Returns the display name when resolved.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        match self {
            Self::Resolved(name) => Some(name.as_str()),
            Self::Absent | Self::Unresolved(_) => None,
        }
    }

    /// Whether the reference resolved to a known place.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct YardEntry {
    name: String,
    location_id: Option<i64>,
}

/// Maps location and yard references to display names.
///
/// Persistence loads the entries a booking needs; resolution itself is pure.
/// Yards display as `Yard (Parent)` when their parent location is known.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationResolver {
    locations: HashMap<i64, String>,
    yards: HashMap<i64, YardEntry>,
}

impl LocationResolver {
    /// Creates an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a top-level location.
    pub fn insert_location(&mut self, location_id: i64, name: impl Into<String>) {
        self.locations.insert(location_id, name.into());
    }

    /// Registers a yard and its parent location.
    pub fn insert_yard(&mut self, yard_id: i64, name: impl Into<String>, location_id: Option<i64>) {
        self.yards.insert(
            yard_id,
            YardEntry {
                name: name.into(),
                location_id,
            },
        );
    }

    /// Resolves a reference to its display name.
    #[must_use]
    pub fn resolve(&self, reference: &LocationRef) -> ResolvedLocation {
        let name: Option<String> = match reference.kind() {
            LocationKind::Location => self.locations.get(&reference.id()).cloned(),
            LocationKind::Yard => self.yards.get(&reference.id()).map(|yard| {
                match yard
                    .location_id
                    .and_then(|parent| self.locations.get(&parent))
                {
                    Some(parent) => format!("{} ({parent})", yard.name),
                    None => yard.name.clone(),
                }
            }),
        };

        name.map_or(ResolvedLocation::Unresolved(*reference), ResolvedLocation::Resolved)
    }

    /// Resolves an optional reference, yielding `Absent` for `None`.
    #[must_use]
    pub fn resolve_optional(&self, reference: Option<&LocationRef>) -> ResolvedLocation {
        reference.map_or(ResolvedLocation::Absent, |r| self.resolve(r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> LocationResolver {
        let mut resolver: LocationResolver = LocationResolver::new();
        resolver.insert_location(1, "Chennai Port");
        resolver.insert_location(2, "Ennore");
        resolver.insert_yard(10, "North Yard", Some(1));
        resolver.insert_yard(11, "Orphan Yard", Some(99));
        resolver
    }

    #[test]
    fn test_parse_wire_empty_is_none() {
        assert_eq!(LocationRef::parse_wire(""), Ok(None));
        assert_eq!(LocationRef::parse_wire("   "), Ok(None));
    }

    #[test]
    fn test_parse_wire_kinds() {
        assert_eq!(
            LocationRef::parse_wire("yard|10"),
            Ok(Some(LocationRef::yard(10)))
        );
        assert_eq!(
            LocationRef::parse_wire("location|2"),
            Ok(Some(LocationRef::location(2)))
        );
        assert_eq!(
            LocationRef::parse_wire("7"),
            Ok(Some(LocationRef::location(7)))
        );
    }

    #[test]
    fn test_parse_wire_unknown_kind_falls_back_to_location() {
        assert_eq!(
            LocationRef::parse_wire("depot|3"),
            Ok(Some(LocationRef::location(3)))
        );
    }

    #[test]
    fn test_parse_wire_rejects_non_numeric_id() {
        assert!(matches!(
            LocationRef::parse_wire("yard|abc"),
            Err(DomainError::InvalidLocationReference(_))
        ));
        assert!(LocationRef::parse_wire("location|0").is_err());
        assert!(LocationRef::parse_wire("nope").is_err());
    }

    #[test]
    fn test_wire_format() {
        assert_eq!(LocationRef::yard(10).to_wire(), "yard|10");
        assert_eq!(LocationRef::location(4).to_string(), "location|4");
    }

    #[test]
    fn test_resolve_location_and_yard() {
        let resolver: LocationResolver = resolver();
        assert_eq!(
            resolver.resolve(&LocationRef::location(2)),
            ResolvedLocation::Resolved(String::from("Ennore"))
        );
        assert_eq!(
            resolver.resolve(&LocationRef::yard(10)),
            ResolvedLocation::Resolved(String::from("North Yard (Chennai Port)"))
        );
    }

    #[test]
    fn test_resolve_yard_with_missing_parent_uses_yard_name() {
        assert_eq!(
            resolver().resolve(&LocationRef::yard(11)),
            ResolvedLocation::Resolved(String::from("Orphan Yard"))
        );
    }

    #[test]
    fn test_resolve_dangling_reference_is_unresolved() {
        let resolved: ResolvedLocation = resolver().resolve(&LocationRef::yard(999));
        assert_eq!(resolved, ResolvedLocation::Unresolved(LocationRef::yard(999)));
        assert!(!resolved.is_resolved());
        assert_eq!(resolved.display_name(), None);
    }

    #[test]
    fn test_resolve_optional_absent() {
        assert_eq!(resolver().resolve_optional(None), ResolvedLocation::Absent);
    }
}
