// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Shared fixtures for API tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use cargodesk_audit::Cause;
use cargodesk_persistence::{OperatorData, Persistence};

use crate::{
    AuthenticatedActor, BookingInfo, ContainerBatchContext, ContainerFieldsInput,
    CreateBookingRequest, DetailsRequestNotice, NotificationError, PhotoStore,
    UpdateContainersRequest, VendorAssignmentNotice, VendorNotifier, create_booking,
    get_booking_containers, update_containers,
};

pub const CSRF: &str = "csrf-token-for-tests";
pub const RECEIPT_TTL_SECS: i64 = 3600;
pub const PASSWORD: &str = "correct-horse-battery";

/// A seeded database with one operator per role and a small registry.
pub struct TestEnv {
    pub persistence: Persistence,
    pub admin: AuthenticatedActor,
    pub dispatcher: AuthenticatedActor,
    pub client_id: i64,
    pub port_id: i64,
    pub yard_id: i64,
    pub vehicle_id: i64,
    pub vendor_id: i64,
    pub vendor_vehicle_id: i64,
}

fn seed_operator(persistence: &mut Persistence, login: &str, role: &str) -> AuthenticatedActor {
    let id: i64 = persistence
        .create_operator(login, &format!("{login} display"), PASSWORD, role)
        .unwrap();
    let operator: OperatorData = persistence.get_operator_by_id(id).unwrap().unwrap();
    AuthenticatedActor::from_operator(&operator).unwrap()
}

pub fn setup() -> TestEnv {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let admin: AuthenticatedActor = seed_operator(&mut persistence, "admin", "Admin");
    let dispatcher: AuthenticatedActor = seed_operator(&mut persistence, "desk", "Dispatcher");

    let client_id: i64 = persistence
        .create_client("Coastal Imports", Some("ops@coastal.example"))
        .unwrap();
    let port_id: i64 = persistence
        .create_location("Chennai Port", Some("Rajaji Salai"))
        .unwrap();
    let ennore_id: i64 = persistence.create_location("Ennore", None).unwrap();
    let yard_id: i64 = persistence.create_yard(ennore_id, "CFS Yard").unwrap();
    let vehicle_id: i64 = persistence
        .create_vehicle("TN01AB1234", Some("Tata Prima"))
        .unwrap();
    let vendor_id: i64 = persistence
        .create_vendor("Rapid Movers", Some("dispatch@rapid.example"))
        .unwrap();
    let vendor_vehicle_id: i64 = persistence
        .create_vendor_vehicle(vendor_id, "TN01EF9012")
        .unwrap();

    TestEnv {
        persistence,
        admin,
        dispatcher,
        client_id,
        port_id,
        yard_id,
        vehicle_id,
        vendor_id,
        vendor_vehicle_id,
    }
}

pub fn cause() -> Cause {
    Cause::new(String::from("test-req"), String::from("Test request"))
}

impl TestEnv {
    /// Creates a pending booking running from the port to the yard.
    pub fn booking(&mut self, code: &str, expected: i64) -> BookingInfo {
        let request: CreateBookingRequest = CreateBookingRequest {
            booking_code: code.to_string(),
            client_id: self.client_id,
            expected_container_count: expected,
            from_location: Some(format!("location|{}", self.port_id)),
            to_location: Some(format!("yard|{}", self.yard_id)),
        };
        create_booking(&mut self.persistence, &request, &self.dispatcher, cause()).unwrap()
    }

    /// Creates a booking with one filled container and returns
    /// `(booking_id, container_id)`.
    pub fn ready_container(&mut self, code: &str, photos: &PhotoStore) -> (i64, i64) {
        let booking: BookingInfo = self.booking(code, 1);
        let request: UpdateContainersRequest =
            containers_request(1, &[("new_1", row("20ft", "msku1234567"))]);
        update_containers(
            &mut self.persistence,
            booking.booking_id,
            &request,
            &batch_context(photos),
            &self.dispatcher,
            cause(),
        )
        .unwrap();

        let container_id: i64 = get_booking_containers(&mut self.persistence, booking.booking_id)
            .unwrap()
            .containers[0]
            .container_id;
        (booking.booking_id, container_id)
    }
}

pub fn batch_context(photos: &PhotoStore) -> ContainerBatchContext<'_> {
    ContainerBatchContext {
        photos,
        session_csrf_token: CSRF,
        receipt_ttl_secs: RECEIPT_TTL_SECS,
    }
}

pub fn row(container_type: &str, number1: &str) -> ContainerFieldsInput {
    ContainerFieldsInput {
        container_type: Some(container_type.to_string()),
        number1: Some(number1.to_string()),
        ..ContainerFieldsInput::default()
    }
}

pub fn containers_request(
    expected_total: i64,
    rows: &[(&str, ContainerFieldsInput)],
) -> UpdateContainersRequest {
    let containers: BTreeMap<String, ContainerFieldsInput> = rows
        .iter()
        .map(|(key, fields)| ((*key).to_string(), fields.clone()))
        .collect();
    UpdateContainersRequest {
        csrf_token: CSRF.to_string(),
        expected_total,
        containers,
        photos: Vec::new(),
    }
}

/// Keeps every notice it is handed.
#[derive(Default)]
pub struct RecordingNotifier {
    pub assignments: Mutex<Vec<VendorAssignmentNotice>>,
    pub details_requests: Mutex<Vec<DetailsRequestNotice>>,
}

impl VendorNotifier for RecordingNotifier {
    fn notify_assignment(&self, notice: &VendorAssignmentNotice) -> Result<(), NotificationError> {
        self.assignments.lock().unwrap().push(notice.clone());
        Ok(())
    }

    fn notify_details_request(
        &self,
        notice: &DetailsRequestNotice,
    ) -> Result<(), NotificationError> {
        self.details_requests.lock().unwrap().push(notice.clone());
        Ok(())
    }
}

/// Fails every delivery.
pub struct FailingNotifier;

impl VendorNotifier for FailingNotifier {
    fn notify_assignment(&self, _: &VendorAssignmentNotice) -> Result<(), NotificationError> {
        Err(NotificationError::Unavailable(String::from("smtp down")))
    }

    fn notify_details_request(&self, _: &DetailsRequestNotice) -> Result<(), NotificationError> {
        Err(NotificationError::Rejected(String::from("mailbox full")))
    }
}
