//! services/client/src/views/auth.rs
//!
//! Login, signup and logout flows.

use studysmarter_core::domain::{AuthGrant, Session};
use studysmarter_core::ports::PortError;
use tracing::{error, info, warn};

use crate::error::{ClientError, FieldErrors};
use crate::views::state::{AppState, Route};

//=========================================================================================
// Forms
//=========================================================================================

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// A completed login or signup and where to go next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthOutcome {
    pub session: Session,
    pub next: Route,
}

fn required(errors: &mut FieldErrors, field: &'static str, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.add(field, message);
    }
}

/// Turns a port failure into the message the auth forms display.
fn auth_error(e: PortError) -> ClientError {
    match e {
        PortError::Rejected { message, .. } => ClientError::Auth(message),
        PortError::InvalidResponse(message) => ClientError::Auth(message),
        PortError::Network(_) => ClientError::Auth("Network error".to_string()),
        other => ClientError::Port(other),
    }
}

/// A refused signup is reported against the form, like a client-side check.
fn signup_error(e: PortError) -> ClientError {
    match e {
        PortError::Rejected { message, .. } => {
            let mut errors = FieldErrors::default();
            errors.add("form", message);
            ClientError::Validation(errors)
        }
        other => auth_error(other),
    }
}

fn finish(state: &AppState, grant: AuthGrant) -> Result<AuthOutcome, ClientError> {
    state.prefs.save_grant(&grant)?;
    let session = state
        .prefs
        .session()?
        .ok_or_else(|| ClientError::Internal("session was not stored".to_string()))?;
    Ok(AuthOutcome {
        session,
        next: Route::Dashboard,
    })
}

//=========================================================================================
// Flows
//=========================================================================================

pub async fn login(state: &AppState, form: &LoginForm) -> Result<AuthOutcome, ClientError> {
    let mut errors = FieldErrors::default();
    required(&mut errors, "email", &form.email, "Email is required");
    required(&mut errors, "password", &form.password, "Password is required");
    errors.into_result()?;

    let grant = state
        .api
        .login(form.email.trim(), &form.password)
        .await
        .map_err(|e| {
            error!("Login failed: {}", e);
            auth_error(e)
        })?;
    info!(username = ?grant.username, "Login succeeded.");
    finish(state, grant)
}

pub async fn signup(state: &AppState, form: &SignupForm) -> Result<AuthOutcome, ClientError> {
    let mut errors = FieldErrors::default();
    required(&mut errors, "username", &form.username, "Username is required");
    required(&mut errors, "email", &form.email, "Email is required");
    required(&mut errors, "password", &form.password, "Password is required");
    errors.into_result()?;

    let grant = state
        .api
        .signup(form.username.trim(), form.email.trim(), &form.password)
        .await
        .map_err(|e| {
            error!("Signup failed: {}", e);
            signup_error(e)
        })?;
    info!(username = ?grant.username, "Signup succeeded.");
    finish(state, grant)
}

/// Logs out. The local session is cleared whether or not the server call succeeds.
pub async fn logout(state: &AppState) -> Result<Route, ClientError> {
    if let Some(token) = state.prefs.token()? {
        if let Err(e) = state.api.logout(&token).await {
            warn!("Logout API error: {}", e);
        }
    }
    state.prefs.clear_session()?;
    info!("Logged out.");
    Ok(Route::Login)
}

/// The current session, or `NotAuthenticated` (redirect to login).
pub fn require_session(state: &AppState) -> Result<Session, ClientError> {
    state.prefs.session()?.ok_or(ClientError::NotAuthenticated)
}
