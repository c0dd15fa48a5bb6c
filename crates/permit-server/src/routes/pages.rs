//! Static page handlers: home and the Stripe landing pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::Query;
use serde::Deserialize;
use tower_sessions::Session;

use crate::middleware::load_state;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub logged_in: bool,
}

/// Shown after Stripe reports a completed payment.
#[derive(Template, WebTemplate)]
#[template(path = "payment_success.html")]
pub struct PaymentSuccessTemplate {}

/// Shown when the payer leaves the hosted checkout page.
#[derive(Template, WebTemplate)]
#[template(path = "payment_cancelled.html")]
pub struct PaymentCancelledTemplate {}

/// Query Stripe appends to the success URL.
#[derive(Debug, Deserialize)]
pub struct SuccessQuery {
    pub session_id: Option<String>,
}

pub async fn home(session: Session) -> HomeTemplate {
    let logged_in = load_state(&session)
        .await
        .is_ok_and(|state| state.is_authenticated());

    HomeTemplate { logged_in }
}

pub async fn payment_success(Query(query): Query<SuccessQuery>) -> PaymentSuccessTemplate {
    tracing::info!(session_id = ?query.session_id, "Payer returned from checkout");
    PaymentSuccessTemplate {}
}

pub async fn payment_cancelled() -> PaymentCancelledTemplate {
    tracing::info!("Payer cancelled checkout");
    PaymentCancelledTemplate {}
}
