// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Session extraction for authenticated routes.
//!
//! Requests authenticate with `Authorization: Bearer <session token>`. The
//! extractor hands the handler both the operator and the session row, since
//! container batches must echo the session's anti-forgery token.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use cargodesk_api::{AuthenticatedActor, AuthenticationService};
use cargodesk_persistence::SessionData;
use tracing::{debug, warn};

use crate::{AppState, ErrorResponse};

/// An authenticated operator and the session it arrived with.
pub struct SessionOperator(pub AuthenticatedActor, pub SessionData);

impl FromRequestParts<AppState> for SessionOperator {
    type Rejection = SessionError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header: &str = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| {
                debug!("Missing Authorization header");
                SessionError::MissingAuthorizationHeader
            })?
            .to_str()
            .map_err(|_| {
                warn!("Invalid Authorization header encoding");
                SessionError::InvalidAuthorizationHeader
            })?;

        let token: &str = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                warn!("Authorization header is not a bearer token");
                SessionError::InvalidAuthorizationHeader
            })?;

        let mut persistence = state.persistence.lock().await;
        let (actor, session) = AuthenticationService::validate_session(&mut persistence, token)
            .map_err(|e| {
                warn!(error = %e, "Session validation failed");
                SessionError::InvalidSession(e.to_string())
            })?;
        drop(persistence);

        debug!(login_name = %actor.login_name, role = actor.role.as_str(), "Session validated");
        Ok(Self(actor, session))
    }
}

/// Why a request could not be tied to a session.
#[derive(Debug)]
pub enum SessionError {
    /// No `Authorization` header was sent.
    MissingAuthorizationHeader,
    /// The header is not a readable bearer token.
    InvalidAuthorizationHeader,
    /// The token is unknown, expired, or belongs to a disabled operator.
    InvalidSession(String),
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let message: String = match self {
            Self::MissingAuthorizationHeader => String::from("Missing Authorization header"),
            Self::InvalidAuthorizationHeader => String::from(
                "Invalid Authorization header format. Expected: 'Bearer <token>'",
            ),
            Self::InvalidSession(reason) => format!("Session validation failed: {reason}"),
        };
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message,
        });
        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}
