//! Authentication extractors.
//!
//! The session stores the customer's bearer token; the customer record is
//! resolved through the commerce backend on each request and memoized in
//! the request extensions so several extractors can ask for it.

use axum::{extract::FromRequestParts, http::request::Parts};
use larkspur_core::User;
use tower_sessions::Session;

use crate::commerce::AuthToken;
use crate::models::session_keys;
use crate::state::AppState;

/// Customer resolved for the current request.
#[derive(Clone)]
struct ResolvedUser(Option<User>);

/// Extractor that optionally gets the signed-in customer.
///
/// Never rejects. A missing session, an unknown token or a backend failure
/// all read as "nobody is signed in".
pub struct OptionalUser(pub Option<User>);

impl FromRequestParts<AppState> for OptionalUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(ResolvedUser(user)) = parts.extensions.get::<ResolvedUser>() {
            return Ok(Self(user.clone()));
        }

        let user = match parts.extensions.get::<Session>() {
            Some(session) => resolve_user(session, state).await,
            None => None,
        };
        parts.extensions.insert(ResolvedUser(user.clone()));

        Ok(Self(user))
    }
}

async fn resolve_user(session: &Session, state: &AppState) -> Option<User> {
    let token = session
        .get::<String>(session_keys::AUTH_TOKEN)
        .await
        .ok()
        .flatten()?;

    match state.sdk().current_user(&AuthToken::new(token)).await {
        Ok(Some(user)) => Some(user),
        Ok(None) => {
            // Token expired or was revoked upstream
            if let Err(e) = session.remove::<String>(session_keys::AUTH_TOKEN).await {
                tracing::warn!("Failed to drop stale auth token: {e}");
            }
            None
        }
        Err(e) => {
            tracing::warn!("Failed to resolve current user: {e}");
            None
        }
    }
}

/// Store the customer's bearer token in the session.
///
/// Cycles the session id first so a pre-login session cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_auth_token(
    session: &Session,
    token: &AuthToken,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::AUTH_TOKEN, token.expose()).await
}

/// Remove the customer's bearer token from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_auth_token(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<String>(session_keys::AUTH_TOKEN).await?;
    Ok(())
}
