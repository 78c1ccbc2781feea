// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Submission receipt lookups.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;

use crate::diesel_schema::submission_receipts;
use crate::error::PersistenceError;

/// Checks whether an unexpired receipt exists for `(booking_id, content_hash)`.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `booking_id` - The booking the submission targeted
/// * `content_hash` - The submission fingerprint
/// * `now` - The current time in unix seconds
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn has_live_receipt(
    conn: &mut SqliteConnection,
    booking_id: i64,
    content_hash: &str,
    now: i64,
) -> Result<bool, PersistenceError> {
    let count: i64 = submission_receipts::table
        .filter(submission_receipts::booking_id.eq(booking_id))
        .filter(submission_receipts::content_hash.eq(content_hash))
        .filter(submission_receipts::expires_at.gt(now))
        .count()
        .get_result(conn)?;

    debug!(booking_id, live = count > 0, "Checked submission receipt");
    Ok(count > 0)
}
