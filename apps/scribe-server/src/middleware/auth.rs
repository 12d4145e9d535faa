//! Session identity extractors.
//!
//! The session token is read from the session cookie first and from an
//! `Authorization: Bearer` header second.

use actix_web::{
    FromRequest, HttpRequest, HttpResponse, ResponseError, dev::Payload, http::StatusCode,
    http::header, web,
};
use std::fmt;
use std::future::{Ready, ready};
use uuid::Uuid;

use scribe_core::ports::{AuthError, TokenClaims};

use crate::state::AppState;

/// Where unauthenticated visitors are sent.
pub const LOGIN_PATH: &str = "/auth/login/";

/// Authenticated user identity extractor.
///
/// Handlers that take an `Identity` are login-only: anonymous requests are
/// redirected to the login page with `next` pointing back at them.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
    pub roles: Vec<String>,
}

impl Identity {
    /// Check if the user has a specific role.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_staff(&self) -> bool {
        self.has_role("staff")
    }
}

impl From<TokenClaims> for Identity {
    fn from(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.user_id,
            roles: claims.roles,
        }
    }
}

/// Authentication failure; renders as a redirect to the login page.
#[derive(Debug)]
pub struct AuthenticationError {
    pub reason: AuthError,
    /// Path (and query) the visitor was trying to reach.
    pub next: String,
}

impl fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reason)
    }
}

impl ResponseError for AuthenticationError {
    fn status_code(&self) -> StatusCode {
        StatusCode::FOUND
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::Found()
            .insert_header((header::LOCATION, login_redirect(&self.next)))
            .finish()
    }
}

/// `/auth/login/?next=<path>`
pub fn login_redirect(next: &str) -> String {
    format!("{LOGIN_PATH}?next={}", urlencoding::encode(next))
}

/// Only same-site absolute paths are accepted as post-login destinations.
pub fn safe_next(next: Option<&str>) -> Option<&str> {
    next.filter(|path| path.starts_with('/') && !path.starts_with("//") && !path.contains('\\'))
}

fn session_token(req: &HttpRequest, cookie_name: &str) -> Option<String> {
    if let Some(cookie) = req.cookie(cookie_name) {
        return Some(cookie.value().to_string());
    }
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
}

fn authenticate(req: &HttpRequest) -> Result<Identity, AuthError> {
    let Some(state) = req.app_data::<web::Data<AppState>>() else {
        tracing::error!("AppState not found in app data");
        return Err(AuthError::InvalidToken(
            "Server configuration error".to_string(),
        ));
    };

    let token = session_token(req, &state.session.cookie_name).ok_or(AuthError::MissingAuth)?;
    let claims = state.tokens.validate_token(&token)?;
    Ok(Identity::from(claims))
}

fn requested_path(req: &HttpRequest) -> String {
    req.uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| req.path().to_string())
}

impl FromRequest for Identity {
    type Error = AuthenticationError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).map_err(|reason| {
            tracing::debug!(reason = %reason, path = %req.path(), "Login required");
            AuthenticationError {
                reason,
                next: requested_path(req),
            }
        }))
    }
}

/// Optional identity extractor - doesn't fail if not authenticated.
pub struct OptionalIdentity(pub Option<Identity>);

impl OptionalIdentity {
    pub fn user_id(&self) -> Option<Uuid> {
        self.0.as_ref().map(|identity| identity.user_id)
    }
}

impl FromRequest for OptionalIdentity {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(OptionalIdentity(authenticate(req).ok())))
    }
}
