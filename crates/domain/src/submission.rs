// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Content fingerprints for duplicate submission detection.
//!
//! A fingerprint covers the booking, every submitted field in the order it
//! is fed, the digest of every uploaded image, and the session's
//! anti-forgery token. Each field is length prefixed so that adjacent
//! values cannot run into each other.

use sha2::{Digest, Sha256};

/// Incremental builder for a submission fingerprint.
#[derive(Debug, Clone)]
pub struct SubmissionFingerprint {
    hasher: Sha256,
}

impl SubmissionFingerprint {
    /// Starts a fingerprint scoped to one booking.
    #[must_use]
    pub fn new(booking_id: i64) -> Self {
        let mut fingerprint: Self = Self {
            hasher: Sha256::new(),
        };
        fingerprint.field("booking", &booking_id.to_string());
        fingerprint
    }

    /// Feeds a named text field.
    pub fn field(&mut self, name: &str, value: &str) {
        self.bytes(name, value.as_bytes());
    }

    /// Feeds a named binary field.
    pub fn bytes(&mut self, name: &str, value: &[u8]) {
        for part in [name.as_bytes(), value] {
            self.hasher.update((part.len() as u64).to_be_bytes());
            self.hasher.update(part);
        }
    }

    /// Completes the fingerprint with the anti-forgery token and returns it
    /// as lowercase hex.
    #[must_use]
    pub fn finish(mut self, anti_forgery_token: &str) -> String {
        self.field("csrf", anti_forgery_token);
        format!("{:x}", self.hasher.finalize())
    }
}

/// Returns the lowercase hex SHA-256 digest of an uploaded file.
#[must_use]
pub fn digest_bytes(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}
