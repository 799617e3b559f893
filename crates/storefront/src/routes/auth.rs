//! Authentication route handlers.

use axum::response::{IntoResponse, Redirect, Response};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, clear_sentry_user};
use crate::i18n::{Locale, Message};
use crate::middleware::clear_auth_token;
use crate::routes::paths;
use crate::shell::notifications::{self, Notification};

/// Sign the customer out and return to the cart.
///
/// The cart stays: the checkout token is not tied to the customer.
#[instrument(skip(session))]
pub async fn logout(session: Session, locale: Locale) -> Result<Response> {
    clear_auth_token(&session).await?;
    clear_sentry_user();
    notifications::push(&session, Notification::info(locale.text(Message::SignedOut))).await;
    Ok(Redirect::to(paths::CART).into_response())
}
