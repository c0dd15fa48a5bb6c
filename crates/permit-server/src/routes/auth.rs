//! Authentication route handlers.
//!
//! Registration, login and logout. Failures redirect back to the form with a
//! `message` query parameter.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use permit_core::PermitType;

use crate::error::Result;
use crate::middleware::{sign_in, sign_out};
use crate::services::{AuthError, AuthService, Registration};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub permit_type: String,
}

/// Query parameters for message display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub message: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub message: Option<String>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub message: Option<String>,
    pub permit_types: Vec<&'static str>,
}

fn redirect_with_message(path: &str, message: &str) -> Response {
    Redirect::to(&format!("{path}?message={}", urlencoding::encode(message))).into_response()
}

fn log_auth_failure(action: &str, email: &str, err: &AuthError) {
    match err {
        AuthError::Store(_) | AuthError::PasswordHash => {
            tracing::error!(action, email = %email, error = %err, "Authentication error");
        }
        _ => tracing::warn!(action, email = %email, error = %err, "Authentication rejected"),
    }
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    LoginTemplate {
        message: query.message,
    }
}

/// Handle login form submission.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let auth = AuthService::new(state.store.as_ref());

    match auth.login(&form.email, &form.password).await {
        Ok(user) => {
            sign_in(&session, user.identity()).await?;
            tracing::info!(user_id = %user.id, "Member logged in");
            Ok(Redirect::to("/members").into_response())
        }
        Err(e) => {
            log_auth_failure("login", &form.email, &e);
            Ok(redirect_with_message("/login", &e.user_message()))
        }
    }
}

/// Log out and return home.
pub async fn logout(session: Session) -> Result<Redirect> {
    sign_out(&session).await?;
    Ok(Redirect::to("/"))
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    RegisterTemplate {
        message: query.message,
        permit_types: PermitType::ALL.iter().map(|permit| permit.label()).collect(),
    }
}

/// Handle registration form submission.
pub async fn register(State(state): State<AppState>, Form(form): Form<RegisterForm>) -> Response {
    let auth = AuthService::new(state.store.as_ref());

    let registration = Registration {
        first_name: &form.first_name,
        last_name: &form.last_name,
        email: &form.email,
        password: &form.password,
        permit_type: &form.permit_type,
    };

    match auth.register(&registration).await {
        Ok(user_id) => {
            tracing::info!(user_id = %user_id, permit_type = %form.permit_type, "Member registered");
            redirect_with_message("/login", "Registration complete. Please log in.")
        }
        Err(e) => {
            log_auth_failure("register", &form.email, &e);
            redirect_with_message("/register", &e.user_message())
        }
    }
}
