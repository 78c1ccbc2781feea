// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and authorization types and services.

use cargodesk_audit::Actor;
use cargodesk_persistence::{OperatorData, Persistence, PersistenceError, SessionData};
use time::{Duration, OffsetDateTime};
use tracing::{debug, info, warn};

use crate::error::AuthError;

/// Operator roles for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Manages operators and the registry of clients, places, and vehicles.
    /// Admins may also run every workflow action.
    Admin,
    /// Runs the booking workflow: acknowledgement, container details, and
    /// vehicle assignment.
    Dispatcher,
}

impl Role {
    /// Returns the stored role name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Dispatcher => "Dispatcher",
        }
    }

    /// Parses a stored role name.
    ///
    /// # Errors
    ///
    /// Returns an error if the role is not recognized.
    pub fn parse(value: &str) -> Result<Self, AuthError> {
        match value {
            "Admin" => Ok(Self::Admin),
            "Dispatcher" => Ok(Self::Dispatcher),
            _ => Err(AuthError::AuthenticationFailed {
                reason: format!("Invalid role: {value}"),
            }),
        }
    }
}

/// An authenticated operator with an associated role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The operator's canonical identifier.
    pub operator_id: i64,
    /// The operator's login name.
    pub login_name: String,
    /// The operator's display name.
    pub display_name: String,
    /// The role assigned to this operator.
    pub role: Role,
}

impl AuthenticatedActor {
    /// Builds an authenticated actor from a stored operator.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored role is not recognized.
    pub fn from_operator(operator: &OperatorData) -> Result<Self, AuthError> {
        Ok(Self {
            operator_id: operator.operator_id,
            login_name: operator.login_name.clone(),
            display_name: operator.display_name.clone(),
            role: Role::parse(&operator.role)?,
        })
    }

    /// Converts this actor into an audit `Actor` carrying the operator
    /// attribution snapshot.
    #[must_use]
    pub fn to_audit_actor(&self) -> Actor {
        Actor::with_operator(
            self.operator_id,
            self.login_name.clone(),
            self.display_name.clone(),
        )
    }
}

/// Authorization service for enforcing role-based access control.
pub struct AuthorizationService;

impl AuthorizationService {
    /// Checks that the actor is an Admin.
    ///
    /// Registry writes and operator management are Admin-only.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Unauthorized` naming `action` otherwise.
    pub fn require_admin(actor: &AuthenticatedActor, action: &str) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin => Ok(()),
            Role::Dispatcher => Err(AuthError::Unauthorized {
                action: action.to_string(),
                required_role: String::from("Admin"),
            }),
        }
    }
}

/// A freshly issued session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedSession {
    /// The bearer token.
    pub session_token: String,
    /// The per-session anti-forgery token.
    pub csrf_token: String,
    /// Expiry in unix seconds.
    pub expires_at: i64,
    /// The authenticated operator.
    pub actor: AuthenticatedActor,
}

/// Authentication service for session-based authentication.
pub struct AuthenticationService;

impl AuthenticationService {
    /// Verifies credentials and opens a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the operator is unknown or disabled, the password
    /// does not match, or the session cannot be stored.
    pub fn login(
        persistence: &mut Persistence,
        login_name: &str,
        password: &str,
        session_ttl: Duration,
    ) -> Result<IssuedSession, AuthError> {
        let operator: OperatorData = persistence
            .get_operator_by_login(login_name)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Invalid login name or password"),
            })?;

        if operator.is_disabled {
            warn!(login_name = %operator.login_name, "Login refused for disabled operator");
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Operator is disabled"),
            });
        }

        let password_ok: bool = Persistence::verify_password(password, &operator.password_hash)
            .map_err(Self::map_persistence_error)?;
        if !password_ok {
            warn!(login_name = %operator.login_name, "Login refused: wrong password");
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Invalid login name or password"),
            });
        }

        let actor: AuthenticatedActor = AuthenticatedActor::from_operator(&operator)?;
        let session_token: String = generate_token();
        let csrf_token: String = generate_token();
        let expires_at: i64 = (OffsetDateTime::now_utc() + session_ttl).unix_timestamp();

        persistence
            .create_session(&session_token, &csrf_token, operator.operator_id, expires_at)
            .map_err(Self::map_persistence_error)?;
        persistence
            .update_last_login(operator.operator_id)
            .map_err(Self::map_persistence_error)?;

        info!(login_name = %actor.login_name, role = actor.role.as_str(), "Operator logged in");
        Ok(IssuedSession {
            session_token,
            csrf_token,
            expires_at,
            actor,
        })
    }

    /// Validates a bearer token.
    ///
    /// Expired sessions are deleted on sight.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is unknown or expired, or if its
    /// operator is missing or disabled.
    pub fn validate_session(
        persistence: &mut Persistence,
        session_token: &str,
    ) -> Result<(AuthenticatedActor, SessionData), AuthError> {
        let session: SessionData = persistence
            .get_session_by_token(session_token)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Invalid session token"),
            })?;

        let now: i64 = OffsetDateTime::now_utc().unix_timestamp();
        if session.expires_at <= now {
            debug!(session_id = session.session_id, "Removing expired session");
            persistence
                .delete_session(session_token)
                .map_err(Self::map_persistence_error)?;
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Session expired"),
            });
        }

        let operator: OperatorData = persistence
            .get_operator_by_id(session.operator_id)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Operator not found"),
            })?;
        if operator.is_disabled {
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Operator is disabled"),
            });
        }

        persistence
            .update_session_activity(session.session_id)
            .map_err(Self::map_persistence_error)?;

        let actor: AuthenticatedActor = AuthenticatedActor::from_operator(&operator)?;
        Ok((actor, session))
    }

    /// Ends a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be deleted.
    pub fn logout(persistence: &mut Persistence, session_token: &str) -> Result<(), AuthError> {
        persistence
            .delete_session(session_token)
            .map_err(Self::map_persistence_error)
    }

    fn map_persistence_error(err: PersistenceError) -> AuthError {
        match err {
            PersistenceError::SessionExpired(msg) | PersistenceError::SessionNotFound(msg) => {
                AuthError::AuthenticationFailed { reason: msg }
            }
            _ => AuthError::AuthenticationFailed {
                reason: format!("Database error: {err}"),
            },
        }
    }
}

/// 256 random bits as lowercase hex.
fn generate_token() -> String {
    let parts: [u64; 4] = [
        rand::random::<u64>(),
        rand::random::<u64>(),
        rand::random::<u64>(),
        rand::random::<u64>(),
    ];
    parts.iter().map(|p| format!("{p:016x}")).collect()
}
