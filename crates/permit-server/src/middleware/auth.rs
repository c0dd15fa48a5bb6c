//! Authentication gate and session helpers.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use permit_core::{SESSION_KEY, SessionIdentity, SessionState};

/// Extractor that requires a logged-in member.
///
/// Unauthenticated requests are redirected to `/login` before the handler
/// runs. Handlers that change `state` must call [`save_state`] to keep it.
///
/// # Example
///
/// ```rust,ignore
/// async fn members(member: RequireMember) -> impl IntoResponse {
///     member.state.identity().map(|id| id.email.clone())
/// }
/// ```
pub struct RequireMember {
    pub state: SessionState,
    pub session: Session,
}

/// Rejection when the gate refuses a request.
pub enum AuthRejection {
    /// No authenticated identity in the session.
    RedirectToLogin,
    /// The session layer is not installed.
    MissingSessionLayer,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::MissingSessionLayer => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireMember
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(AuthRejection::MissingSessionLayer)?;

        let state = match load_state(&session).await {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(error = %e, "Unreadable session, treating as logged out");
                SessionState::new()
            }
        };

        if !state.is_authenticated() {
            return Err(AuthRejection::RedirectToLogin);
        }

        Ok(Self { state, session })
    }
}

/// Read the typed session state, empty if none was stored.
///
/// # Errors
///
/// Returns an error if the session store fails or the record is corrupt.
pub async fn load_state(session: &Session) -> Result<SessionState, tower_sessions::session::Error> {
    Ok(session
        .get::<SessionState>(SESSION_KEY)
        .await?
        .unwrap_or_default())
}

/// Persist the typed session state.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn save_state(
    session: &Session,
    state: &SessionState,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(SESSION_KEY, state).await
}

/// Start an authenticated session under a fresh id.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn sign_in(
    session: &Session,
    identity: SessionIdentity,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    save_state(session, &SessionState::authenticated(identity)).await
}

/// Drop the session and its cookie (logout).
///
/// # Errors
///
/// Returns an error if the session store cannot delete the record.
pub async fn sign_out(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
