// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries.
//!
//! Every function takes a `&mut SqliteConnection` so it can run either on
//! the adapter's connection or inside a unit of work.

pub mod audit;
pub mod bookings;
pub mod operators;
pub mod receipts;
pub mod registry;
pub mod search;
pub mod trips;

use cargodesk_domain::{LocationKind, LocationRef};

use crate::error::PersistenceError;

/// Rebuilds an optional location reference from its two storage columns.
///
/// Both columns must be set or both must be empty.
pub(crate) fn location_ref_from_columns(
    kind: Option<&str>,
    id: Option<i64>,
) -> Result<Option<LocationRef>, PersistenceError> {
    match (kind, id) {
        (Some(kind), Some(id)) => Ok(Some(LocationRef::new(LocationKind::from_stored(kind), id))),
        (None, None) => Ok(None),
        (kind, id) => Err(PersistenceError::ReconstructionError(format!(
            "incomplete location reference: kind={kind:?}, id={id:?}"
        ))),
    }
}

/// Splits an optional location reference into its two storage columns.
pub(crate) fn location_ref_columns(
    reference: Option<&LocationRef>,
) -> (Option<&'static str>, Option<i64>) {
    reference.map_or((None, None), |r| (Some(r.kind().as_str()), Some(r.id())))
}
