// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use time::Date;
use time::macros::format_description;

/// Maximum accepted length for booking codes.
pub const MAX_BOOKING_CODE_LEN: usize = 32;

/// Maximum accepted number of containers on a single booking.
pub const MAX_EXPECTED_CONTAINERS: i64 = 500;

/// Minimum accepted operator password length.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Validates a booking code.
///
/// # Errors
///
/// Returns an error if the code is empty, too long, or contains anything
/// other than ASCII letters, digits, `-` and `_`.
pub fn validate_booking_code(code: &str) -> Result<(), DomainError> {
    if code.is_empty() {
        return Err(DomainError::InvalidBookingCode(String::from(
            "Booking code cannot be empty",
        )));
    }
    if code.len() > MAX_BOOKING_CODE_LEN {
        return Err(DomainError::InvalidBookingCode(format!(
            "Booking code must be at most {MAX_BOOKING_CODE_LEN} characters"
        )));
    }
    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(DomainError::InvalidBookingCode(format!(
            "Booking code '{code}' contains invalid characters"
        )));
    }
    Ok(())
}

/// Validates a required display name and returns it trimmed.
///
/// # Errors
///
/// Returns `DomainError::InvalidName` if the value is blank.
pub fn validate_name(field: &'static str, value: &str) -> Result<String, DomainError> {
    let trimmed: &str = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidName {
            field,
            reason: String::from("cannot be empty"),
        });
    }
    Ok(trimmed.to_string())
}

/// Validates and normalizes a vehicle plate number.
///
/// Plates are stored uppercase with surrounding whitespace removed.
///
/// # Errors
///
/// Returns `DomainError::InvalidVehicleNumber` if the value is blank.
pub fn normalize_vehicle_number(value: &str) -> Result<String, DomainError> {
    let trimmed: &str = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidVehicleNumber(String::from(
            "Vehicle number cannot be empty",
        )));
    }
    Ok(trimmed.to_uppercase())
}

/// Validates an expected container count.
///
/// # Errors
///
/// Returns an error if the count is negative or above the accepted maximum.
pub fn validate_expected_container_count(count: i64) -> Result<u32, DomainError> {
    if !(0..=MAX_EXPECTED_CONTAINERS).contains(&count) {
        return Err(DomainError::InvalidExpectedContainerCount(count));
    }
    u32::try_from(count).map_err(|_| DomainError::InvalidExpectedContainerCount(count))
}

/// Validates an operator password.
///
/// # Errors
///
/// Returns `DomainError::InvalidPassword` if the password is too short.
pub fn validate_password(password: &str) -> Result<(), DomainError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(DomainError::InvalidPassword(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Parses an ISO `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns `DomainError::DateParseError` if the input is malformed.
pub fn parse_iso_date(value: &str) -> Result<Date, DomainError> {
    let format = format_description!("[year]-[month]-[day]");
    Date::parse(value.trim(), &format).map_err(|e| DomainError::DateParseError {
        date_string: value.to_string(),
        error: e.to_string(),
    })
}
