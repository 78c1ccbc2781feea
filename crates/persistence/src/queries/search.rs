// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Candidate searches for the location and vehicle pickers.
//!
//! Both searches match a case-insensitive substring of the display text.
//! An empty query returns the first `limit` rows of each pool.

use cargodesk_domain::{LocationCandidate, LocationRef, VehicleCandidate, VehicleSource};
use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;

use crate::diesel_schema::{locations, vehicles, vendor_vehicles, vendors, yards};
use crate::error::PersistenceError;

/// Builds a `LIKE` pattern matching `query` anywhere, with wildcards escaped.
fn contains_pattern(query: &str) -> String {
    let mut pattern: String = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for ch in query.trim().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Searches locations and yards by name.
///
/// Yards also match on their parent location's name. Locations are listed
/// before yards, each group ordered by name.
///
/// # Errors
///
/// Returns an error if a query fails.
pub fn search_locations(
    conn: &mut SqliteConnection,
    query: &str,
    limit: i64,
) -> Result<Vec<LocationCandidate>, PersistenceError> {
    let pattern: String = contains_pattern(query);
    debug!(query, limit, "Searching locations");

    let location_rows: Vec<(i64, String)> = locations::table
        .filter(locations::name.like(&pattern).escape('\\'))
        .order(locations::name.asc())
        .select((locations::location_id, locations::name))
        .limit(limit)
        .load(conn)?;

    let yard_rows: Vec<(i64, String, String)> = yards::table
        .inner_join(locations::table)
        .filter(
            yards::name
                .like(&pattern)
                .escape('\\')
                .or(locations::name.like(&pattern).escape('\\')),
        )
        .order((yards::name.asc(), locations::name.asc()))
        .select((yards::yard_id, yards::name, locations::name))
        .limit(limit)
        .load(conn)?;

    let mut candidates: Vec<LocationCandidate> = location_rows
        .into_iter()
        .map(|(location_id, name)| LocationCandidate {
            reference: LocationRef::location(location_id),
            display_name: name,
        })
        .collect();
    candidates.extend(
        yard_rows
            .into_iter()
            .map(|(yard_id, yard_name, parent_name)| LocationCandidate {
                reference: LocationRef::yard(yard_id),
                display_name: format!("{yard_name} ({parent_name})"),
            }),
    );

    Ok(candidates)
}

/// Searches vehicles across the owned and vendor pools.
///
/// With a `vendor_id` only that vendor's vehicles are searched. Without one,
/// active owned vehicles are listed first, then vendor vehicles.
///
/// # Errors
///
/// Returns an error if a query fails.
pub fn search_vehicles(
    conn: &mut SqliteConnection,
    query: &str,
    vendor_id: Option<i64>,
    limit: i64,
) -> Result<Vec<VehicleCandidate>, PersistenceError> {
    let pattern: String = contains_pattern(&query.to_uppercase());
    debug!(query, ?vendor_id, limit, "Searching vehicles");

    let mut candidates: Vec<VehicleCandidate> = Vec::new();

    if vendor_id.is_none() {
        let owned_rows: Vec<(i64, String, Option<String>)> = vehicles::table
            .filter(vehicles::is_active.eq(1))
            .filter(vehicles::registration_number.like(&pattern).escape('\\'))
            .order(vehicles::registration_number.asc())
            .select((
                vehicles::vehicle_id,
                vehicles::registration_number,
                vehicles::description,
            ))
            .limit(limit)
            .load(conn)?;

        candidates.extend(owned_rows.into_iter().map(
            |(vehicle_id, registration_number, description)| VehicleCandidate {
                id: vehicle_id,
                label: description.map_or_else(
                    || format!("{registration_number} (owned)"),
                    |d| format!("{registration_number} (owned, {d})"),
                ),
                vehicle_number: registration_number,
                source: VehicleSource::Owned,
                vendor_id: None,
            },
        ));
    }

    let mut vendor_query = vendor_vehicles::table
        .inner_join(vendors::table)
        .filter(vendor_vehicles::vehicle_number.like(pattern).escape('\\'))
        .order(vendor_vehicles::vehicle_number.asc())
        .select((
            vendor_vehicles::vendor_vehicle_id,
            vendor_vehicles::vendor_id,
            vendor_vehicles::vehicle_number,
            vendors::name,
        ))
        .limit(limit)
        .into_boxed();
    if let Some(vendor_id) = vendor_id {
        vendor_query = vendor_query.filter(vendor_vehicles::vendor_id.eq(vendor_id));
    }
    let vendor_rows: Vec<(i64, i64, String, String)> = vendor_query.load(conn)?;

    candidates.extend(vendor_rows.into_iter().map(
        |(vendor_vehicle_id, vendor_id, vehicle_number, vendor_name)| VehicleCandidate {
            id: vendor_vehicle_id,
            label: format!("{vehicle_number} ({vendor_name})"),
            vehicle_number,
            source: VehicleSource::Vendor,
            vendor_id: Some(vendor_id),
        },
    ));

    Ok(candidates)
}
