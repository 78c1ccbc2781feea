// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Multipart decoding for container batches.
//!
//! A batch form carries:
//! - `payload`: JSON object mapping row keys (`<container_id>` or `new_<n>`)
//!   to container fields
//! - `csrf_token`: the session's anti-forgery token
//! - `expected_total`: the client's expected container count
//! - `container_<key>_image1` / `container_<key>_image2`: optional photos

use std::collections::BTreeMap;

use axum::extract::Multipart;
use cargodesk_api::{ContainerFieldsInput, PhotoUpload, UpdateContainersRequest};
use tracing::debug;

use crate::HttpError;

/// Decodes a container batch form.
///
/// Empty file parts are skipped; browsers send them for untouched inputs.
pub async fn read_container_batch(
    mut multipart: Multipart,
) -> Result<UpdateContainersRequest, HttpError> {
    let mut request: UpdateContainersRequest = UpdateContainersRequest::default();
    let mut expected_total: Option<i64> = None;

    while let Some(field) = multipart.next_field().await.map_err(HttpError::from)? {
        let name: String = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "payload" => {
                let text: String = field.text().await.map_err(HttpError::from)?;
                if !text.trim().is_empty() {
                    request.containers =
                        serde_json::from_str::<BTreeMap<String, ContainerFieldsInput>>(&text)
                            .map_err(|e| HttpError::bad_request(format!("Invalid payload: {e}")))?;
                }
            }
            "csrf_token" => {
                let token: String = field.text().await.map_err(HttpError::from)?;
                request.csrf_token = token.trim().to_string();
            }
            "expected_total" => {
                let text: String = field.text().await.map_err(HttpError::from)?;
                let value: i64 = text.trim().parse().map_err(|_| {
                    HttpError::bad_request(format!("Invalid expected_total '{}'", text.trim()))
                })?;
                expected_total = Some(value);
            }
            _ => {
                let Some((key, slot)) = photo_field(&name) else {
                    debug!(field = %name, "Ignoring unknown form field");
                    continue;
                };
                let bytes = field.bytes().await.map_err(HttpError::from)?;
                if bytes.is_empty() {
                    continue;
                }
                request.photos.push(PhotoUpload {
                    key,
                    slot,
                    bytes: bytes.to_vec(),
                });
            }
        }
    }

    request.expected_total =
        expected_total.ok_or_else(|| HttpError::bad_request("Missing expected_total"))?;
    Ok(request)
}

/// Splits `container_<key>_image<slot>` into its key and slot.
fn photo_field(name: &str) -> Option<(String, u8)> {
    let rest: &str = name.strip_prefix("container_")?;
    let (key, slot) = rest.rsplit_once("_image")?;
    if key.is_empty() {
        return None;
    }
    slot.parse::<u8>().ok().map(|slot| (key.to_string(), slot))
}

#[cfg(test)]
mod tests {
    use super::photo_field;

    #[test]
    fn test_photo_field_names() {
        assert_eq!(
            photo_field("container_new_2_image1"),
            Some((String::from("new_2"), 1))
        );
        assert_eq!(photo_field("container_41_image2"), Some((String::from("41"), 2)));
        assert_eq!(photo_field("container__image1"), None);
        assert_eq!(photo_field("container_41_imageX"), None);
        assert_eq!(photo_field("payload"), None);
    }
}
