// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Outbound notifications to vendors and clients.
//!
//! Notifications are sent after the workflow change has committed. A failed
//! notification is logged and never undoes or fails the change.

use thiserror::Error;
use tracing::info;

/// A vendor vehicle has been dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorAssignmentNotice {
    /// The vendor assignment record.
    pub vendor_assignment_id: i64,
    /// The vendor supplying the vehicle.
    pub vendor_id: i64,
    /// Vendor name.
    pub vendor_name: String,
    /// Where the vendor takes notifications, if known.
    pub contact_email: Option<String>,
    /// The booking being served.
    pub booking_code: String,
    /// The trip reference number.
    pub trip_reference: String,
    /// The day the trip runs, `YYYY-MM-DD`.
    pub trip_date: String,
    /// Plate number as dispatched.
    pub vehicle_number: String,
    /// Agreed daily rate.
    pub daily_rate: String,
}

/// A client is asked for container details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailsRequestNotice {
    /// The booking.
    pub booking_id: i64,
    /// Booking code as the client knows it.
    pub booking_code: String,
    /// Client name.
    pub client_name: String,
    /// Where the client takes notifications, if known.
    pub contact_email: Option<String>,
    /// Free text from the operator.
    pub note: Option<String>,
}

/// A notification could not be delivered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotificationError {
    /// The channel is down or unreachable.
    #[error("Notification channel unavailable: {0}")]
    Unavailable(String),
    /// The channel refused the message.
    #[error("Notification rejected: {0}")]
    Rejected(String),
}

/// Delivers workflow notifications to outside parties.
pub trait VendorNotifier: Send + Sync {
    /// Tells a vendor their vehicle was dispatched.
    ///
    /// # Errors
    ///
    /// Returns an error if the notice could not be delivered.
    fn notify_assignment(&self, notice: &VendorAssignmentNotice) -> Result<(), NotificationError>;

    /// Asks a client for container details.
    ///
    /// # Errors
    ///
    /// Returns an error if the notice could not be delivered.
    fn notify_details_request(&self, notice: &DetailsRequestNotice)
    -> Result<(), NotificationError>;
}

/// Records notices in the log instead of sending them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingNotifier;

impl VendorNotifier for LoggingNotifier {
    fn notify_assignment(&self, notice: &VendorAssignmentNotice) -> Result<(), NotificationError> {
        info!(
            vendor_assignment_id = notice.vendor_assignment_id,
            vendor_id = notice.vendor_id,
            vendor = %notice.vendor_name,
            contact = notice.contact_email.as_deref().unwrap_or("-"),
            booking_code = %notice.booking_code,
            trip = %notice.trip_reference,
            trip_date = %notice.trip_date,
            vehicle_number = %notice.vehicle_number,
            daily_rate = %notice.daily_rate,
            "Vendor assignment notice"
        );
        Ok(())
    }

    fn notify_details_request(
        &self,
        notice: &DetailsRequestNotice,
    ) -> Result<(), NotificationError> {
        info!(
            booking_id = notice.booking_id,
            booking_code = %notice.booking_code,
            client = %notice.client_name,
            contact = notice.contact_email.as_deref().unwrap_or("-"),
            note = notice.note.as_deref().unwrap_or(""),
            "Container details request"
        );
        Ok(())
    }
}
