// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod form;
mod session;

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, Multipart, Path, Query, State as AxumState, multipart::MultipartError,
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use cargodesk_api::{
    ApiError, AssignVehicleRequest, AssignVehicleResponse, AuditTimelineResponse, BookingInfo,
    BookingStatusResponse, BootstrapRequest, ConfirmVendorAssignmentResponse,
    ContainerBatchContext, ContainerSnapshotResponse, CreateBookingRequest, CreateClientRequest,
    CreateLocationRequest, CreateOperatorRequest, CreateVehicleRequest, CreateVendorRequest,
    CreateVendorVehicleRequest, CreateYardRequest, CreatedResponse, ListBookingsResponse,
    ListTripsResponse, LocationSearchResponse, LoggingNotifier, LoginRequest, LoginResponse,
    OperatorInfo, PhotoStore, RequestDetailsRequest, TripInfo, UpdateContainersRequest,
    UpdateContainersResponse, VehicleSearchResponse, VendorNotifier,
};
use cargodesk_audit::Cause;
use cargodesk_persistence::Persistence;
use clap::Parser;
use serde::{Deserialize, Serialize};
use time::Duration;
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::form::read_container_batch;
use crate::session::SessionOperator;

/// Largest accepted request body. Container batches carry photos.
const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

/// Header a caller may use to correlate audit events with its own logs.
const REQUEST_ID_HEADER: &str = "x-request-id";

/// `CargoDesk` Server - HTTP server for the container booking back office
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Address to bind the server to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Directory container photos are written under
    #[arg(long, default_value = "uploads")]
    upload_dir: PathBuf,

    /// How long a container batch fingerprint blocks resubmission
    #[arg(long, default_value_t = 3600)]
    receipt_ttl_secs: u32,

    /// How long a login session stays valid
    #[arg(long, default_value_t = 12)]
    session_ttl_hours: u16,
}

/// Application state shared across handlers.
///
/// `SQLite` allows one writer at a time, so the persistence adapter sits
/// behind a single async mutex.
#[derive(Clone)]
struct AppState {
    /// The persistence layer.
    persistence: Arc<Mutex<Persistence>>,
    /// Where container photos are written.
    photos: PhotoStore,
    /// Outbound vendor and client notifications.
    notifier: Arc<dyn VendorNotifier>,
    /// Resubmission window for container batches.
    receipt_ttl_secs: i64,
    /// Session lifetime.
    session_ttl: Duration,
}

/// Query parameters for location search.
#[derive(Debug, Deserialize)]
struct LocationSearchQuery {
    /// Search text.
    #[serde(default)]
    q: String,
    /// Maximum number of results.
    limit: Option<i64>,
}

/// Query parameters for vehicle search.
#[derive(Debug, Deserialize)]
struct VehicleSearchQuery {
    /// Search text.
    #[serde(default)]
    q: String,
    /// Restrict results to this vendor's vehicles.
    vendor_id: Option<i64>,
    /// Maximum number of results.
    limit: Option<i64>,
}

/// Query parameters for listing bookings.
#[derive(Debug, Deserialize)]
struct ListBookingsQuery {
    /// Booking status filter.
    status: Option<String>,
}

/// Generic acknowledgement body.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MessageResponse {
    /// Human readable outcome.
    message: String,
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
#[derive(Debug)]
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
}

impl HttpError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match err {
            ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized { .. } | ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            ApiError::DomainRuleViolation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Storage { .. } | ApiError::Internal { .. } => {
                error!(error = %err, "Request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<MultipartError> for HttpError {
    fn from(err: MultipartError) -> Self {
        Self {
            status: err.status(),
            message: err.body_text(),
        }
    }
}

/// Builds the audit cause for a request.
///
/// Uses the caller's `X-Request-Id` when present.
fn request_cause(headers: &HeaderMap, description: &str) -> Cause {
    let id: String = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map_or_else(
            || format!("req-{:016x}", rand::random::<u64>()),
            str::to_string,
        );
    Cause::new(id, description.to_string())
}

// ========================================================================
// Operators and sessions
// ========================================================================

/// Handler for POST `/auth/bootstrap`.
///
/// Creates the first Admin. Only works on an empty operator table.
async fn handle_bootstrap(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<BootstrapRequest>,
) -> Result<(StatusCode, Json<OperatorInfo>), HttpError> {
    info!(login_name = %req.login_name, "Handling bootstrap request");
    let mut persistence = app_state.persistence.lock().await;
    let operator: OperatorInfo = cargodesk_api::bootstrap_first_admin(&mut persistence, &req)?;
    Ok((StatusCode::CREATED, Json(operator)))
}

/// Handler for POST `/auth/login`.
async fn handle_login(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: LoginResponse =
        cargodesk_api::login(&mut persistence, &req, app_state.session_ttl)?;
    Ok(Json(response))
}

/// Handler for POST `/auth/logout`.
async fn handle_logout(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, session): SessionOperator,
) -> Result<Json<MessageResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    cargodesk_api::logout(&mut persistence, &session.session_token)?;
    info!(login_name = %actor.login_name, "Operator logged out");
    Ok(Json(MessageResponse {
        message: String::from("Logged out"),
    }))
}

/// Handler for GET `/auth/me`.
async fn handle_whoami(SessionOperator(actor, _): SessionOperator) -> Json<OperatorInfo> {
    Json(cargodesk_api::whoami(&actor))
}

/// Handler for POST `/operators`.
async fn handle_create_operator(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _): SessionOperator,
    Json(req): Json<CreateOperatorRequest>,
) -> Result<(StatusCode, Json<OperatorInfo>), HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let operator: OperatorInfo = cargodesk_api::create_operator(&mut persistence, &req, &actor)?;
    Ok((StatusCode::CREATED, Json(operator)))
}

// ========================================================================
// Registry
// ========================================================================

/// Handler for POST `/clients`.
async fn handle_create_client(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _): SessionOperator,
    Json(req): Json<CreateClientRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let created: CreatedResponse = cargodesk_api::create_client(&mut persistence, &req, &actor)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Handler for POST `/locations`.
async fn handle_create_location(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _): SessionOperator,
    Json(req): Json<CreateLocationRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let created: CreatedResponse =
        cargodesk_api::create_location(&mut persistence, &req, &actor)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Handler for POST `/yards`.
async fn handle_create_yard(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _): SessionOperator,
    Json(req): Json<CreateYardRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let created: CreatedResponse = cargodesk_api::create_yard(&mut persistence, &req, &actor)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Handler for POST `/vehicles`.
async fn handle_create_vehicle(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _): SessionOperator,
    Json(req): Json<CreateVehicleRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let created: CreatedResponse = cargodesk_api::create_vehicle(&mut persistence, &req, &actor)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Handler for POST `/vendors`.
async fn handle_create_vendor(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _): SessionOperator,
    Json(req): Json<CreateVendorRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let created: CreatedResponse = cargodesk_api::create_vendor(&mut persistence, &req, &actor)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Handler for POST `/vendors/{vendor_id}/vehicles`.
async fn handle_create_vendor_vehicle(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _): SessionOperator,
    Path(vendor_id): Path<i64>,
    Json(req): Json<CreateVendorVehicleRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let created: CreatedResponse =
        cargodesk_api::create_vendor_vehicle(&mut persistence, vendor_id, &req, &actor)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Handler for GET `/locations/search`.
async fn handle_search_locations(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(_, _): SessionOperator,
    Query(query): Query<LocationSearchQuery>,
) -> Result<Json<LocationSearchResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: LocationSearchResponse =
        cargodesk_api::search_locations(&mut persistence, &query.q, query.limit)?;
    Ok(Json(response))
}

/// Handler for GET `/vehicles/search`.
async fn handle_search_vehicles(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(_, _): SessionOperator,
    Query(query): Query<VehicleSearchQuery>,
) -> Result<Json<VehicleSearchResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: VehicleSearchResponse = cargodesk_api::search_vehicles(
        &mut persistence,
        &query.q,
        query.vendor_id,
        query.limit,
    )?;
    Ok(Json(response))
}

// ========================================================================
// Bookings
// ========================================================================

/// Handler for POST `/bookings`.
async fn handle_create_booking(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _): SessionOperator,
    headers: HeaderMap,
    Json(req): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingInfo>), HttpError> {
    info!(booking_code = %req.booking_code, by = %actor.login_name, "Handling create_booking request");
    let cause: Cause = request_cause(&headers, "Booking intake");
    let mut persistence = app_state.persistence.lock().await;
    let booking: BookingInfo =
        cargodesk_api::create_booking(&mut persistence, &req, &actor, cause)?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// Handler for GET `/bookings`.
async fn handle_list_bookings(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(_, _): SessionOperator,
    Query(query): Query<ListBookingsQuery>,
) -> Result<Json<ListBookingsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: ListBookingsResponse =
        cargodesk_api::list_bookings(&mut persistence, query.status.as_deref())?;
    Ok(Json(response))
}

/// Handler for GET `/bookings/{booking_id}`.
async fn handle_get_booking(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(_, _): SessionOperator,
    Path(booking_id): Path<i64>,
) -> Result<Json<BookingInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let booking: BookingInfo = cargodesk_api::get_booking(&mut persistence, booking_id)?;
    Ok(Json(booking))
}

/// Handler for POST `/bookings/{booking_id}/acknowledge`.
///
/// A repeated acknowledgement answers 200 with `already_processed` set.
async fn handle_acknowledge(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _): SessionOperator,
    headers: HeaderMap,
    Path(booking_id): Path<i64>,
) -> Result<Json<BookingStatusResponse>, HttpError> {
    info!(booking_id, by = %actor.login_name, "Handling acknowledge request");
    let cause: Cause = request_cause(&headers, "Acknowledge booking");
    let mut persistence = app_state.persistence.lock().await;
    let response: BookingStatusResponse =
        cargodesk_api::acknowledge_booking(&mut persistence, booking_id, &actor, cause)?;
    Ok(Json(response))
}

/// Handler for POST `/bookings/{booking_id}/request_details`.
async fn handle_request_details(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _): SessionOperator,
    headers: HeaderMap,
    Path(booking_id): Path<i64>,
    req: Option<Json<RequestDetailsRequest>>,
) -> Result<Json<BookingStatusResponse>, HttpError> {
    info!(booking_id, by = %actor.login_name, "Handling request_details request");
    let req: RequestDetailsRequest = req.map(|Json(r)| r).unwrap_or_default();
    let cause: Cause = request_cause(&headers, "Request container details");
    let mut persistence = app_state.persistence.lock().await;
    let response: BookingStatusResponse = cargodesk_api::request_container_details(
        &mut persistence,
        app_state.notifier.as_ref(),
        booking_id,
        &req,
        &actor,
        cause,
    )?;
    Ok(Json(response))
}

/// Handler for GET `/bookings/{booking_id}/containers`.
async fn handle_get_containers(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(_, _): SessionOperator,
    Path(booking_id): Path<i64>,
) -> Result<Json<ContainerSnapshotResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: ContainerSnapshotResponse =
        cargodesk_api::get_booking_containers(&mut persistence, booking_id)?;
    Ok(Json(response))
}

/// Handler for POST `/bookings/{booking_id}/containers`.
///
/// Takes a multipart form; see [`form::read_container_batch`].
async fn handle_update_containers(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, session): SessionOperator,
    headers: HeaderMap,
    Path(booking_id): Path<i64>,
    multipart: Multipart,
) -> Result<Json<UpdateContainersResponse>, HttpError> {
    let req: UpdateContainersRequest = read_container_batch(multipart).await?;
    info!(
        booking_id,
        rows = req.containers.len(),
        photos = req.photos.len(),
        by = %actor.login_name,
        "Handling container batch"
    );

    let cause: Cause = request_cause(&headers, "Container details batch");
    let mut persistence = app_state.persistence.lock().await;
    let context: ContainerBatchContext<'_> = ContainerBatchContext {
        photos: &app_state.photos,
        session_csrf_token: &session.csrf_token,
        receipt_ttl_secs: app_state.receipt_ttl_secs,
    };
    let response: UpdateContainersResponse = cargodesk_api::update_containers(
        &mut persistence,
        booking_id,
        &req,
        &context,
        &actor,
        cause,
    )?;
    Ok(Json(response))
}

/// Handler for POST `/bookings/{booking_id}/containers/{container_id}/assign`.
async fn handle_assign_vehicle(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _): SessionOperator,
    headers: HeaderMap,
    Path((booking_id, container_id)): Path<(i64, i64)>,
    Json(req): Json<AssignVehicleRequest>,
) -> Result<Json<AssignVehicleResponse>, HttpError> {
    info!(booking_id, container_id, by = %actor.login_name, "Handling vehicle assignment");
    let cause: Cause = request_cause(&headers, "Vehicle assignment");
    let mut persistence = app_state.persistence.lock().await;
    let response: AssignVehicleResponse = cargodesk_api::assign_vehicle(
        &mut persistence,
        app_state.notifier.as_ref(),
        booking_id,
        container_id,
        &req,
        &actor,
        cause,
    )?;
    Ok(Json(response))
}

/// Handler for GET `/bookings/{booking_id}/trips`.
async fn handle_list_trips(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(_, _): SessionOperator,
    Path(booking_id): Path<i64>,
) -> Result<Json<ListTripsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: ListTripsResponse =
        cargodesk_api::list_booking_trips(&mut persistence, booking_id)?;
    Ok(Json(response))
}

/// Handler for GET `/bookings/{booking_id}/audit`.
async fn handle_get_audit(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(_, _): SessionOperator,
    Path(booking_id): Path<i64>,
) -> Result<Json<AuditTimelineResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: AuditTimelineResponse =
        cargodesk_api::get_booking_audit(&mut persistence, booking_id)?;
    Ok(Json(response))
}

/// Handler for GET `/trips/{trip_id}`.
async fn handle_get_trip(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(_, _): SessionOperator,
    Path(trip_id): Path<i64>,
) -> Result<Json<TripInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let trip: TripInfo = cargodesk_api::get_trip(&mut persistence, trip_id)?;
    Ok(Json(trip))
}

/// Handler for POST `/vendor_assignments/{vendor_assignment_id}/confirm`.
async fn handle_confirm_vendor_assignment(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _): SessionOperator,
    headers: HeaderMap,
    Path(vendor_assignment_id): Path<i64>,
) -> Result<Json<ConfirmVendorAssignmentResponse>, HttpError> {
    let cause: Cause = request_cause(&headers, "Vendor confirmation");
    let mut persistence = app_state.persistence.lock().await;
    let response: ConfirmVendorAssignmentResponse = cargodesk_api::confirm_vendor_assignment(
        &mut persistence,
        vendor_assignment_id,
        &actor,
        cause,
    )?;
    Ok(Json(response))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/auth/bootstrap", post(handle_bootstrap))
        .route("/auth/login", post(handle_login))
        .route("/auth/logout", post(handle_logout))
        .route("/auth/me", get(handle_whoami))
        .route("/operators", post(handle_create_operator))
        .route("/clients", post(handle_create_client))
        .route("/locations", post(handle_create_location))
        .route("/locations/search", get(handle_search_locations))
        .route("/yards", post(handle_create_yard))
        .route("/vehicles", post(handle_create_vehicle))
        .route("/vehicles/search", get(handle_search_vehicles))
        .route("/vendors", post(handle_create_vendor))
        .route("/vendors/{vendor_id}/vehicles", post(handle_create_vendor_vehicle))
        .route(
            "/bookings",
            post(handle_create_booking).get(handle_list_bookings),
        )
        .route("/bookings/{booking_id}", get(handle_get_booking))
        .route("/bookings/{booking_id}/acknowledge", post(handle_acknowledge))
        .route(
            "/bookings/{booking_id}/request_details",
            post(handle_request_details),
        )
        .route(
            "/bookings/{booking_id}/containers",
            get(handle_get_containers).post(handle_update_containers),
        )
        .route(
            "/bookings/{booking_id}/containers/{container_id}/assign",
            post(handle_assign_vehicle),
        )
        .route("/bookings/{booking_id}/trips", get(handle_list_trips))
        .route("/bookings/{booking_id}/audit", get(handle_get_audit))
        .route("/trips/{trip_id}", get(handle_get_trip))
        .route(
            "/vendor_assignments/{vendor_assignment_id}/confirm",
            post(handle_confirm_vendor_assignment),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing CargoDesk Server");

    let persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    info!(upload_dir = %args.upload_dir.display(), "Photos are stored on disk");
    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        photos: PhotoStore::new(args.upload_dir),
        notifier: Arc::new(LoggingNotifier),
        receipt_ttl_secs: i64::from(args.receipt_ttl_secs),
        session_ttl: Duration::hours(i64::from(args.session_ttl_hours)),
    };

    let app: Router = build_router(app_state);

    let listener = tokio::net::TcpListener::bind((args.host.as_str(), args.port)).await?;
    info!("Server listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::{
        body::{Body, to_bytes},
        http::Request,
    };
    use serde_json::{Value, json};
    use tempfile::TempDir;
    use tower::ServiceExt;

    const PASSWORD: &str = "correct-horse-battery";
    const BOUNDARY: &str = "cargodesk-test-boundary";
    const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    /// A router over a fresh database with an Admin already bootstrapped.
    struct TestServer {
        app: Router,
        state: AppState,
        _uploads: TempDir,
    }

    /// The tokens a login hands back.
    struct Login {
        token: String,
        csrf: String,
    }

    fn create_test_server() -> TestServer {
        let uploads: TempDir = TempDir::new().unwrap();
        let mut persistence: Persistence =
            Persistence::new_in_memory().expect("Failed to create in-memory persistence");
        cargodesk_api::bootstrap_first_admin(
            &mut persistence,
            &BootstrapRequest {
                login_name: String::from("admin"),
                display_name: String::from("Yard Admin"),
                password: String::from(PASSWORD),
            },
        )
        .unwrap();
        persistence
            .create_operator("desk", "Day Desk", PASSWORD, "Dispatcher")
            .unwrap();

        let state: AppState = AppState {
            persistence: Arc::new(Mutex::new(persistence)),
            photos: PhotoStore::new(uploads.path()),
            notifier: Arc::new(LoggingNotifier),
            receipt_ttl_secs: 3600,
            session_ttl: Duration::hours(1),
        };
        TestServer {
            app: build_router(state.clone()),
            state,
            _uploads: uploads,
        }
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response: Response = app.clone().oneshot(request).await.unwrap();
        let status: StatusCode = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn json_request(method: &str, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get_request(uri: &str, token: &str) -> Request<Body> {
        Request::builder()
            .method("GET")
            .uri(uri)
            .header("authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    }

    /// Builds a `multipart/form-data` body by hand.
    fn multipart_body(text_parts: &[(&str, String)], files: &[(&str, &[u8])]) -> Vec<u8> {
        let mut body: Vec<u8> = Vec::new();
        for (name, value) in text_parts {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        for (name, bytes) in files {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{name}.bin\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn multipart_request(uri: &str, token: &str, body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("authorization", format!("Bearer {token}"))
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn login(app: &Router, login_name: &str) -> Login {
        let (status, body) = send(
            app,
            json_request(
                "POST",
                "/auth/login",
                None,
                &json!({ "login_name": login_name, "password": PASSWORD }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        Login {
            token: body["session_token"].as_str().unwrap().to_string(),
            csrf: body["csrf_token"].as_str().unwrap().to_string(),
        }
    }

    async fn create(app: &Router, token: &str, uri: &str, body: &Value) -> i64 {
        let (status, response) = send(app, json_request("POST", uri, Some(token), body)).await;
        assert_eq!(status, StatusCode::CREATED, "{uri} failed: {response}");
        response["id"]
            .as_i64()
            .or_else(|| response["booking_id"].as_i64())
            .unwrap()
    }

    /// Registry ids created by [`seed_registry`].
    struct Registry {
        client_id: i64,
        port_id: i64,
        yard_id: i64,
        vehicle_id: i64,
        vendor_id: i64,
    }

    async fn seed_registry(app: &Router, admin: &str) -> Registry {
        let client_id: i64 = create(app, admin, "/clients", &json!({ "name": "Coastal Imports" })).await;
        let port_id: i64 = create(app, admin, "/locations", &json!({ "name": "Chennai Port" })).await;
        let ennore_id: i64 = create(app, admin, "/locations", &json!({ "name": "Ennore" })).await;
        let yard_id: i64 = create(
            app,
            admin,
            "/yards",
            &json!({ "location_id": ennore_id, "name": "CFS Yard" }),
        )
        .await;
        let vehicle_id: i64 = create(
            app,
            admin,
            "/vehicles",
            &json!({ "registration_number": "TN01AB1234", "description": "Tata Prima" }),
        )
        .await;
        let vendor_id: i64 = create(app, admin, "/vendors", &json!({ "name": "Rapid Movers" })).await;
        Registry {
            client_id,
            port_id,
            yard_id,
            vehicle_id,
            vendor_id,
        }
    }

    async fn create_booking(app: &Router, token: &str, registry: &Registry, code: &str) -> i64 {
        create(
            app,
            token,
            "/bookings",
            &json!({
                "booking_code": code,
                "client_id": registry.client_id,
                "expected_container_count": 1,
                "from_location": format!("location|{}", registry.port_id),
                "to_location": format!("yard|{}", registry.yard_id),
            }),
        )
        .await
    }

    fn batch_body(csrf: &str, with_photo: bool) -> Vec<u8> {
        let payload: Value = json!({
            "new_1": { "container_type": "20ft", "number1": "msku1234567" }
        });
        let text_parts: Vec<(&str, String)> = vec![
            ("payload", payload.to_string()),
            ("csrf_token", csrf.to_string()),
            ("expected_total", String::from("1")),
        ];
        let files: Vec<(&str, &[u8])> = if with_photo {
            vec![
                ("container_new_1_image1", PNG_BYTES),
                ("container_new_1_image2", b"".as_slice()),
            ]
        } else {
            Vec::new()
        };
        multipart_body(&text_parts, &files)
    }

    #[tokio::test]
    async fn test_login_and_whoami() {
        let server: TestServer = create_test_server();
        let session: Login = login(&server.app, "admin").await;

        let (status, body) = send(&server.app, get_request("/auth/me", &session.token)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["login_name"], "ADMIN");
        assert_eq!(body["role"], "Admin");
    }

    #[tokio::test]
    async fn test_wrong_password_is_unauthorized() {
        let server: TestServer = create_test_server();

        let (status, body) = send(
            &server.app,
            json_request(
                "POST",
                "/auth/login",
                None,
                &json!({ "login_name": "admin", "password": "wrong-password" }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], true);
    }

    #[tokio::test]
    async fn test_missing_or_bad_token_is_unauthorized() {
        let server: TestServer = create_test_server();
        let anonymous: Request<Body> = Request::builder()
            .uri("/auth/me")
            .body(Body::empty())
            .unwrap();

        let (missing, _) = send(&server.app, anonymous).await;
        let (bogus, body) = send(&server.app, get_request("/auth/me", "not-a-session")).await;

        assert_eq!(missing, StatusCode::UNAUTHORIZED);
        assert_eq!(bogus, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], true);
    }

    #[tokio::test]
    async fn test_logout_ends_session() {
        let server: TestServer = create_test_server();
        let session: Login = login(&server.app, "desk").await;

        let (status, _) = send(
            &server.app,
            json_request("POST", "/auth/logout", Some(&session.token), &json!({})),
        )
        .await;
        let (after, _) = send(&server.app, get_request("/auth/me", &session.token)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(after, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_bootstrap_is_refused_once_operators_exist() {
        let server: TestServer = create_test_server();

        let (status, _) = send(
            &server.app,
            json_request(
                "POST",
                "/auth/bootstrap",
                None,
                &json!({ "login_name": "intruder", "display_name": "X", "password": PASSWORD }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_dispatcher_cannot_write_registry() {
        let server: TestServer = create_test_server();
        let desk: Login = login(&server.app, "desk").await;

        let (status, body) = send(
            &server.app,
            json_request(
                "POST",
                "/clients",
                Some(&desk.token),
                &json!({ "name": "Harbour Foods" }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], true);
    }

    #[tokio::test]
    async fn test_unknown_booking_is_not_found() {
        let server: TestServer = create_test_server();
        let desk: Login = login(&server.app, "desk").await;

        let (status, _) = send(&server.app, get_request("/bookings/4040", &desk.token)).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_details_request_before_acknowledge_is_unprocessable() {
        let server: TestServer = create_test_server();
        let admin: Login = login(&server.app, "admin").await;
        let registry: Registry = seed_registry(&server.app, &admin.token).await;
        let booking_id: i64 = create_booking(&server.app, &admin.token, &registry, "BK-9").await;

        let (status, _) = send(
            &server.app,
            json_request(
                "POST",
                &format!("/bookings/{booking_id}/request_details"),
                Some(&admin.token),
                &json!({}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_booking_fulfillment_over_http() {
        let server: TestServer = create_test_server();
        let admin: Login = login(&server.app, "admin").await;
        let desk: Login = login(&server.app, "desk").await;
        let registry: Registry = seed_registry(&server.app, &admin.token).await;
        let booking_id: i64 = create_booking(&server.app, &desk.token, &registry, "BK-1001").await;
        let base: String = format!("/bookings/{booking_id}");

        // Acknowledge twice
        let ack_uri: String = format!("{base}/acknowledge");
        let (status, first) = send(
            &server.app,
            json_request("POST", &ack_uri, Some(&desk.token), &json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["status"], "being_addressed");
        let (status, second) = send(
            &server.app,
            json_request("POST", &ack_uri, Some(&admin.token), &json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(second["already_processed"], true);

        // Container batch with a forged token, then the real one, then a resubmission
        let containers_uri: String = format!("{base}/containers");
        let (forged, _) = send(
            &server.app,
            multipart_request(&containers_uri, &desk.token, batch_body("forged", true)),
        )
        .await;
        assert_eq!(forged, StatusCode::FORBIDDEN);

        let (status, applied) = send(
            &server.app,
            multipart_request(&containers_uri, &desk.token, batch_body(&desk.csrf, true)),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{applied}");
        assert_eq!(applied["processed"], 1);
        assert_eq!(applied["duplicate"], false);
        assert_eq!(applied["row_errors"], json!([]));
        assert_eq!(applied["status"], "containers_updated");

        let (status, repeated) = send(
            &server.app,
            multipart_request(&containers_uri, &desk.token, batch_body(&desk.csrf, true)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(repeated["duplicate"], true);

        // Snapshot
        let (status, snapshot) = send(&server.app, get_request(&containers_uri, &desk.token)).await;
        assert_eq!(status, StatusCode::OK);
        let containers = snapshot["containers"].as_array().unwrap();
        assert_eq!(containers.len(), 1);
        assert_eq!(containers[0]["number1"], "MSKU1234567");
        assert_eq!(containers[0]["is_ready"], true);
        assert!(containers[0]["photo1"].as_str().unwrap().ends_with(".png"));
        assert_eq!(containers[0]["photo2"], Value::Null);
        let container_id: i64 = containers[0]["container_id"].as_i64().unwrap();

        // Assignment, then a second attempt on the same row
        let assign_uri: String = format!("{base}/containers/{container_id}/assign");
        let (status, assigned) = send(
            &server.app,
            json_request(
                "POST",
                &assign_uri,
                Some(&desk.token),
                &json!({
                    "vehicle_type": "owned",
                    "vehicle_id": registry.vehicle_id,
                    "trip_date": "2026-03-14",
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{assigned}");
        assert_eq!(assigned["status"], "confirmed");
        assert_eq!(assigned["trip_reference"], "BK-1001-01");

        let (status, _) = send(
            &server.app,
            json_request(
                "POST",
                &assign_uri,
                Some(&desk.token),
                &json!({
                    "vehicle_type": "vendor",
                    "vendor_id": registry.vendor_id,
                    "vehicle_number": "TN09ZZ0001",
                    "daily_rate": 4500.0,
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        // Trips and audit
        let trip_id: i64 = assigned["trip_id"].as_i64().unwrap();
        let (status, trip) = send(&server.app, get_request(&format!("/trips/{trip_id}"), &desk.token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(trip["vehicle_descriptor"], "TN01AB1234");
        assert_eq!(trip["to_name"], "CFS Yard (Ennore)");

        let (_, trips) = send(&server.app, get_request(&format!("{base}/trips"), &desk.token)).await;
        assert_eq!(trips["trips"].as_array().unwrap().len(), 1);

        let (_, audit) = send(&server.app, get_request(&format!("{base}/audit"), &desk.token)).await;
        let actions: Vec<&str> = audit["events"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["action"].as_str().unwrap())
            .collect();
        assert_eq!(
            actions,
            vec!["CreateBooking", "AcknowledgeBooking", "UpdateContainers", "AssignVehicle"]
        );
    }

    #[tokio::test]
    async fn test_vendor_assignment_and_confirmation() {
        let server: TestServer = create_test_server();
        let admin: Login = login(&server.app, "admin").await;
        let registry: Registry = seed_registry(&server.app, &admin.token).await;
        let booking_id: i64 = create_booking(&server.app, &admin.token, &registry, "BK-2002").await;
        let base: String = format!("/bookings/{booking_id}");
        send(
            &server.app,
            multipart_request(
                &format!("{base}/containers"),
                &admin.token,
                batch_body(&admin.csrf, false),
            ),
        )
        .await;
        let container_id: i64 = {
            let mut persistence = server.state.persistence.lock().await;
            cargodesk_api::get_booking_containers(&mut persistence, booking_id)
                .unwrap()
                .containers[0]
                .container_id
        };
        let assign_uri: String = format!("{base}/containers/{container_id}/assign");

        let (zero_rate, body) = send(
            &server.app,
            json_request(
                "POST",
                &assign_uri,
                Some(&admin.token),
                &json!({
                    "vehicle_type": "vendor",
                    "vendor_id": registry.vendor_id,
                    "vehicle_number": "TN09ZZ0001",
                    "daily_rate": 0,
                }),
            ),
        )
        .await;
        assert_eq!(zero_rate, StatusCode::BAD_REQUEST, "{body}");

        let (status, assigned) = send(
            &server.app,
            json_request(
                "POST",
                &assign_uri,
                Some(&admin.token),
                &json!({
                    "vehicle_type": "vendor",
                    "vendor_id": registry.vendor_id,
                    "vehicle_number": "tn09zz0001",
                    "daily_rate": 4500.5,
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{assigned}");
        let vendor_assignment_id: i64 = assigned["vendor_assignment_id"].as_i64().unwrap();

        let confirm_uri: String = format!("/vendor_assignments/{vendor_assignment_id}/confirm");
        let (_, first) = send(
            &server.app,
            json_request("POST", &confirm_uri, Some(&admin.token), &json!({})),
        )
        .await;
        let (_, second) = send(
            &server.app,
            json_request("POST", &confirm_uri, Some(&admin.token), &json!({})),
        )
        .await;
        assert_eq!(first["already_processed"], false);
        assert_eq!(second["already_processed"], true);
        assert_eq!(second["status"], "confirmed");
    }

    #[tokio::test]
    async fn test_batch_without_expected_total_is_rejected() {
        let server: TestServer = create_test_server();
        let admin: Login = login(&server.app, "admin").await;
        let registry: Registry = seed_registry(&server.app, &admin.token).await;
        let booking_id: i64 = create_booking(&server.app, &admin.token, &registry, "BK-3003").await;
        let body: Vec<u8> = multipart_body(&[("csrf_token", admin.csrf.clone())], &[]);

        let (status, response) = send(
            &server.app,
            multipart_request(&format!("/bookings/{booking_id}/containers"), &admin.token, body),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["message"], "Missing expected_total");
    }

    #[tokio::test]
    async fn test_searches_require_session() {
        let server: TestServer = create_test_server();
        let admin: Login = login(&server.app, "admin").await;
        seed_registry(&server.app, &admin.token).await;

        let (status, locations) = send(
            &server.app,
            get_request("/locations/search?q=yard", &admin.token),
        )
        .await;
        let anonymous: Request<Body> = Request::builder()
            .uri("/vehicles/search?q=tn")
            .body(Body::empty())
            .unwrap();
        let (unauthenticated, _) = send(&server.app, anonymous).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(locations["candidates"][0]["display_name"], "CFS Yard (Ennore)");
        assert_eq!(unauthenticated, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_request_cause_prefers_caller_id() {
        let mut headers: HeaderMap = HeaderMap::new();
        let generated: Cause = request_cause(&headers, "Acknowledge booking");
        headers.insert(REQUEST_ID_HEADER, "abc-123".parse().unwrap());
        let supplied: Cause = request_cause(&headers, "Acknowledge booking");

        assert!(generated.id.starts_with("req-"));
        assert_eq!(supplied.id, "abc-123");
        assert_eq!(supplied.description, "Acknowledge booking");
    }
}
