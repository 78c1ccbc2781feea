// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Container photo storage.
//!
//! Photos are written outside the database transaction. A batch that later
//! rolls back leaves its files behind; names carry a timestamp and a random
//! suffix so orphans never collide with later uploads.

use std::path::{Path, PathBuf};

use image::ImageFormat;
use time::OffsetDateTime;
use tracing::{debug, error};

use crate::error::ApiError;

/// Writes sniffed JPEG and PNG images under a per-booking directory.
#[derive(Debug, Clone)]
pub struct PhotoStore {
    root: PathBuf,
}

impl PhotoStore {
    /// Creates a store rooted at `root`. The directory is created lazily.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The upload root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Stores one photo for a booking.
    ///
    /// The format is sniffed from the bytes; the declared file name and
    /// content type are ignored.
    ///
    /// Returns the stored path relative to the upload root, e.g.
    /// `booking_7/1760745600123456789_9f2c01ab.jpg`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` for empty data or a format other
    /// than JPEG or PNG, and `ApiError::Storage` if the file cannot be written.
    pub fn store(&self, booking_id: i64, field: &str, bytes: &[u8]) -> Result<String, ApiError> {
        let extension: &str = sniff_extension(field, bytes)?;

        let directory: String = format!("booking_{booking_id}");
        let file_name: String = format!(
            "{}_{:08x}.{extension}",
            OffsetDateTime::now_utc().unix_timestamp_nanos(),
            rand::random::<u32>()
        );
        let target_dir: PathBuf = self.root.join(&directory);

        std::fs::create_dir_all(&target_dir).map_err(|e| {
            error!(booking_id, path = %target_dir.display(), "Failed to create upload directory: {e}");
            ApiError::Storage {
                message: format!("Failed to store {field}"),
            }
        })?;
        let target: PathBuf = target_dir.join(&file_name);
        std::fs::write(&target, bytes).map_err(|e| {
            error!(booking_id, path = %target.display(), "Failed to write upload: {e}");
            ApiError::Storage {
                message: format!("Failed to store {field}"),
            }
        })?;

        debug!(booking_id, field, size = bytes.len(), "Stored container photo");
        Ok(format!("{directory}/{file_name}"))
    }
}

fn sniff_extension(field: &str, bytes: &[u8]) -> Result<&'static str, ApiError> {
    if bytes.is_empty() {
        return Err(ApiError::invalid(field, "Uploaded file is empty"));
    }
    match image::guess_format(bytes) {
        Ok(ImageFormat::Jpeg) => Ok("jpg"),
        Ok(ImageFormat::Png) => Ok("png"),
        _ => Err(ApiError::invalid(field, "Only JPEG and PNG images are accepted")),
    }
}
