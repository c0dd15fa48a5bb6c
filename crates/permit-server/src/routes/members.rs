//! Members area: renewal price and checkout pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;

use permit_core::{CheckoutView, MembersView};

use crate::error::Result;
use crate::middleware::{RequireMember, save_state};
use crate::state::AppState;

/// Members page template.
#[derive(Template, WebTemplate)]
#[template(path = "members.html")]
pub struct MembersTemplate {
    pub view: MembersView,
    pub payments_enabled: bool,
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout.html")]
pub struct CheckoutTemplate {
    pub view: CheckoutView,
    pub payments_enabled: bool,
}

/// Price the member's renewal and remember it for checkout.
pub async fn members(
    State(state): State<AppState>,
    mut member: RequireMember,
) -> Result<MembersTemplate> {
    let view = state.workflow.enter_members_area(&mut member.state).await?;
    save_state(&member.session, &member.state).await?;

    Ok(MembersTemplate {
        view,
        payments_enabled: state.workflow.payments_enabled(),
    })
}

/// Checkout page; requires a members-page visit earlier in the session.
pub async fn checkout(
    State(state): State<AppState>,
    member: RequireMember,
) -> Result<CheckoutTemplate> {
    let view = state.workflow.prepare_checkout(&member.state).await?;

    Ok(CheckoutTemplate {
        view,
        payments_enabled: state.workflow.payments_enabled(),
    })
}
