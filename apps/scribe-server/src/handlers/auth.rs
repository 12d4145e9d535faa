//! Signup, login and logout.

use actix_web::cookie::{Cookie, SameSite, time::Duration};
use actix_web::{HttpResponse, http::header, web};
use serde::Deserialize;

use scribe_core::ValidationErrors;
use scribe_core::domain::User;
use scribe_core::error::RepoError;
use scribe_core::forms::SignupForm;
use scribe_shared::ApiResponse;
use scribe_shared::dto::LoginFormView;

use super::views::credentials_form;
use crate::middleware::auth::{LOGIN_PATH, safe_next};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Response header carrying the session token for non-browser clients.
pub const SESSION_TOKEN_HEADER: &str = "X-Session-Token";

const USERNAME_TAKEN: &str = "A user with that username already exists.";

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// Issue a session for `user` and redirect to `location`.
fn start_session(state: &AppState, user: &User, location: &str) -> AppResult<HttpResponse> {
    let roles = state.session.roles_for(&user.username);
    let token = state
        .tokens
        .generate_token(user.id, &user.username, roles)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let cookie = Cookie::build(state.session.cookie_name.clone(), token.clone())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(state.tokens.expiration_seconds()))
        .finish();

    Ok(HttpResponse::Found()
        .cookie(cookie)
        .insert_header((SESSION_TOKEN_HEADER, token))
        .insert_header((header::LOCATION, location))
        .finish())
}

/// POST /auth/signup/
pub async fn signup(
    state: web::Data<AppState>,
    form: web::Form<SignupForm>,
) -> AppResult<HttpResponse> {
    let username = form.clean()?;

    if state.users().find_by_username(&username).await?.is_some() {
        return Err(ValidationErrors::field("username", USERNAME_TAKEN).into());
    }

    let password_hash = state
        .passwords
        .hash(&form.password)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let user = match state.users().insert(User::new(username, password_hash)).await {
        Ok(user) => user,
        Err(RepoError::Constraint(_)) => {
            return Err(ValidationErrors::field("username", USERNAME_TAKEN).into());
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(user_id = %user.id, username = %user.username, "User signed up");
    start_session(&state, &user, "/")
}

/// GET /auth/login/
pub async fn login_form(query: web::Query<NextQuery>) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::ok(LoginFormView {
        form: credentials_form(LOGIN_PATH),
        next: safe_next(query.next.as_deref()).map(str::to_string),
    }))
}

/// POST /auth/login/
pub async fn login(
    state: web::Data<AppState>,
    form: web::Form<LoginForm>,
) -> AppResult<HttpResponse> {
    let user = state
        .users()
        .find_by_username(form.username.trim())
        .await?
        .ok_or(AppError::Unauthorized)?;

    let valid = state
        .passwords
        .verify(&form.password, &user.password_hash)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    if !valid {
        tracing::info!(username = %user.username, "Rejected login");
        return Err(AppError::Unauthorized);
    }

    let location = safe_next(form.next.as_deref()).unwrap_or("/");
    tracing::info!(user_id = %user.id, "User logged in");
    start_session(&state, &user, location)
}

/// GET /auth/logout/
pub async fn logout(state: web::Data<AppState>) -> HttpResponse {
    let mut cookie = Cookie::build(state.session.cookie_name.clone(), "")
        .path("/")
        .finish();
    cookie.make_removal();

    HttpResponse::Found()
        .cookie(cookie)
        .insert_header((header::LOCATION, "/"))
        .finish()
}
