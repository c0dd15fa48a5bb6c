//! Checkout API and Stripe webhook intake.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, ErrorResponse, JsonError};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Amount as posted by checkout.js; either a JSON number or a numeric string
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Number(serde_json::Number),
    Text(String),
}

impl RawAmount {
    fn into_raw(self) -> String {
        match self {
            Self::Number(number) => number.to_string(),
            Self::Text(text) => text,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub amount: Option<RawAmount>,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Serialize)]
pub struct CreatePaymentResponse {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

// ============================================================================
// Handlers
// ============================================================================

/// Create a hosted checkout session and return only its id
pub async fn create_stripe_payment(
    State(state): State<AppState>,
    payload: Result<Json<CreatePaymentRequest>, JsonRejection>,
) -> Result<Json<CreatePaymentResponse>, JsonError> {
    let Json(payload) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let amount = payload.amount.map(RawAmount::into_raw).unwrap_or_default();

    let session = state
        .workflow
        .start_payment(&amount, &payload.email, &payload.first_name, &payload.last_name)
        .await?;

    Ok(Json(CreatePaymentResponse { id: session.id }))
}

fn webhook_error(status: StatusCode, error: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

/// Stripe webhook handler
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<WebhookAck>, (StatusCode, Json<ErrorResponse>)> {
    let secret = state.webhook_secret.as_ref().ok_or_else(|| {
        tracing::warn!("Webhook received but STRIPE_WEBHOOK_SECRET is not set");
        webhook_error(StatusCode::SERVICE_UNAVAILABLE, "Webhooks not configured")
    })?;

    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| webhook_error(StatusCode::BAD_REQUEST, "Missing Stripe signature"))?;

    let event = state
        .webhooks
        .parse_event(&body, signature, secret.expose_secret())
        .map_err(|e| {
            tracing::warn!(error = %e, "Webhook signature failed");
            webhook_error(StatusCode::BAD_REQUEST, e.user_message())
        })?;

    let outcome = state.webhooks.handle(event).await.map_err(|e| {
        tracing::error!(error = %e, "Webhook processing error");
        let status = if e.is_retryable() {
            StatusCode::INTERNAL_SERVER_ERROR
        } else {
            StatusCode::BAD_REQUEST
        };
        webhook_error(status, e.user_message())
    })?;

    tracing::debug!(outcome = ?outcome, "Webhook handled");

    Ok(Json(WebhookAck { received: true }))
}
