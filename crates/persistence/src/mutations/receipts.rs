// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Submission receipt writes.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;

use crate::diesel_schema::submission_receipts;
use crate::error::PersistenceError;

/// Records a processed submission and purges expired receipts.
///
/// An expired receipt for the same `(booking_id, content_hash)` is removed by
/// the purge first, so re-recording after expiry does not collide.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `booking_id` - The booking the submission targeted
/// * `content_hash` - The submission fingerprint
/// * `now` - The current time in unix seconds
/// * `ttl_secs` - How long the receipt suppresses repeats
///
/// # Errors
///
/// Returns `PersistenceError::DuplicateEntry` if a live receipt already exists.
pub fn record_receipt(
    conn: &mut SqliteConnection,
    booking_id: i64,
    content_hash: &str,
    now: i64,
    ttl_secs: i64,
) -> Result<(), PersistenceError> {
    let purged: usize = diesel::delete(submission_receipts::table)
        .filter(submission_receipts::expires_at.le(now))
        .execute(conn)?;

    diesel::insert_into(submission_receipts::table)
        .values((
            submission_receipts::booking_id.eq(booking_id),
            submission_receipts::content_hash.eq(content_hash),
            submission_receipts::recorded_at.eq(now),
            submission_receipts::expires_at.eq(now.saturating_add(ttl_secs)),
        ))
        .execute(conn)?;

    debug!(booking_id, purged, "Recorded submission receipt");
    Ok(())
}
