//! Unified error handling.
//!
//! Handlers return `Result<T, AppError>` for pages or `Result<T, JsonError>`
//! for the checkout API. Both log before responding and never put store or
//! provider error text in the body.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Serialize;
use thiserror::Error;

use permit_core::{GatewayError, RenewalError};

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Workflow rejected or failed the request.
    #[error(transparent)]
    Renewal(#[from] RenewalError),

    /// Session store failure.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Malformed request body.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// HTTP status for this error
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Renewal(err) => match err {
                RenewalError::NotAuthenticated => StatusCode::UNAUTHORIZED,
                RenewalError::UserNotFound(_) => StatusCode::NOT_FOUND,
                RenewalError::MissingPrice | RenewalError::Validation(_) => StatusCode::BAD_REQUEST,
                RenewalError::PaymentsUnavailable => StatusCode::SERVICE_UNAVAILABLE,
                RenewalError::Gateway(gateway) => match gateway {
                    GatewayError::Card(_) | GatewayError::InvalidRequest(_) => {
                        StatusCode::BAD_REQUEST
                    }
                    GatewayError::ProviderApi(_) => StatusCode::BAD_GATEWAY,
                    GatewayError::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
                },
                RenewalError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Message safe to show the user
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::Renewal(err) => err.user_message(),
            Self::Session(_) => "An error occurred processing your request.",
            Self::BadRequest(_) => "Invalid request.",
        }
    }

    fn log(&self) {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "Request error");
        } else {
            tracing::warn!(error = %self, status = status.as_u16(), "Request rejected");
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if matches!(self, Self::Renewal(RenewalError::NotAuthenticated)) {
            return Redirect::to("/login").into_response();
        }

        self.log();
        (self.status(), self.user_message()).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// [`AppError`] rendered as `{"error": ...}` for fetch callers
#[derive(Debug)]
pub struct JsonError(pub AppError);

impl<E: Into<AppError>> From<E> for JsonError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for JsonError {
    fn into_response(self) -> Response {
        self.0.log();
        (
            self.0.status(),
            Json(ErrorResponse {
                error: self.0.user_message().to_owned(),
            }),
        )
            .into_response()
    }
}
