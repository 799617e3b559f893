//! Cart route handlers.
//!
//! The checkout token is kept in the session. Every mutation goes to the
//! commerce backend and redirects back to `/cart`, which re-reads the cart;
//! the handlers never patch a cart locally.

use askama::Template;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use larkspur_core::{CartState, CheckoutToken, VariantId};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::commerce::SdkError;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::i18n::{Locale, Message};
use crate::models::session_keys;
use crate::routes::paths;
use crate::shell::notifications::{self, Notification};
use crate::shell::{Page, Shell, ShellContext, ShellPage};
use crate::state::AppState;
use crate::views::cart::{self as cart_view, CartMutation, CartPage};

// =============================================================================
// Session Helpers
// =============================================================================

/// Get the checkout token from the session.
pub async fn checkout_token(session: &Session) -> Option<CheckoutToken> {
    session
        .get::<CheckoutToken>(session_keys::CHECKOUT_TOKEN)
        .await
        .ok()
        .flatten()
}

/// Set the checkout token in the session.
async fn set_checkout_token(
    session: &Session,
    token: &CheckoutToken,
) -> std::result::Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CHECKOUT_TOKEN, token).await
}

/// Read the cart behind `token`.
///
/// A failed read is logged and shown as a cart that has not loaded, which
/// renders as the empty state.
pub async fn load_cart(state: &AppState, token: Option<&CheckoutToken>) -> CartState {
    match state.sdk().cart(token).await {
        Ok(cart) => cart,
        Err(e) => {
            tracing::warn!("Failed to fetch cart: {e}");
            CartState::default()
        }
    }
}

// =============================================================================
// Forms
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub variant_id: VariantId,
    pub quantity: Option<u32>,
}

/// Update quantity form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub variant_id: VariantId,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub variant_id: VariantId,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page body.
#[derive(Template)]
#[template(path = "cart/show.html")]
pub struct CartTemplate {
    pub page: CartPage,
    pub locale: Locale,
    pub title: &'static str,
}

impl CartTemplate {
    fn text(&self, message: Message) -> &'static str {
        self.locale.text(message)
    }
}

impl Page for CartTemplate {
    fn title(&self) -> &str {
        self.title
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the cart page.
#[instrument(skip(state, session, ctx))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    ctx: ShellContext,
) -> Result<ShellPage> {
    let token = checkout_token(&session).await;
    let cart = load_cart(&state, token.as_ref()).await;

    let checkout = match &token {
        Some(token) => state.sdk().checkout(token).await.unwrap_or_else(|e| {
            tracing::warn!("Failed to fetch checkout: {e}");
            None
        }),
        None => None,
    };

    let page = CartTemplate {
        page: cart_view::compose(&cart, checkout.as_ref(), ctx.user.as_ref(), &ctx.view()),
        locale: ctx.locale,
        title: ctx.locale.text(Message::CartTitle),
    };

    Ok(Shell::new(ctx, state.config().render_mode)
        .wrap(&page)
        .await?)
}

/// Add a variant to the cart.
///
/// Creates a checkout on the first add and stores its token in the session.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    locale: Locale,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let quantity = form.quantity.unwrap_or(1);
    if quantity == 0 {
        return Err(AppError::BadRequest("quantity must be at least 1".to_string()));
    }

    let current = checkout_token(&session).await;
    match state
        .sdk()
        .add_item(current.as_ref(), &form.variant_id, quantity)
        .await
    {
        Ok(token) => {
            if current.as_ref() != Some(&token) {
                set_checkout_token(&session, &token).await?;
            }
            add_breadcrumb("cart", "Added item", Some(&[("variant_id", form.variant_id.as_str())]));
            notifications::push(&session, Notification::success(locale.text(Message::ItemAdded)))
                .await;
        }
        Err(e) => report_failure(&session, locale, e).await?,
    }

    Ok(Redirect::to(paths::CART).into_response())
}

/// Set the quantity of a cart line. A quantity of zero removes it.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    locale: Locale,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let mutation = CartMutation::SetQuantity {
        variant: form.variant_id,
        quantity: form.quantity,
    };
    apply(&state, &session, locale, mutation).await
}

/// Remove a line from the cart.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    locale: Locale,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    let mutation = CartMutation::Remove {
        variant: form.variant_id,
    };
    apply(&state, &session, locale, mutation).await
}

async fn apply(
    state: &AppState,
    session: &Session,
    locale: Locale,
    mutation: CartMutation,
) -> Result<Response> {
    let Some(token) = checkout_token(session).await else {
        // Nothing to change; the cart page shows the empty state
        return Ok(Redirect::to(paths::CART).into_response());
    };

    match mutation.apply(state.sdk(), &token).await {
        Ok(()) => {
            notifications::push(session, Notification::info(locale.text(Message::CartUpdated)))
                .await;
        }
        Err(e) => report_failure(session, locale, e).await?,
    }

    Ok(Redirect::to(paths::CART).into_response())
}

/// Turn a failed mutation into a notification.
///
/// Shopper-facing failures (stock limits, unknown lines) become a toast and
/// the cart is shown as it is. Anything else is an error response.
async fn report_failure(
    session: &Session,
    locale: Locale,
    error: SdkError,
) -> std::result::Result<(), AppError> {
    match error {
        SdkError::UserError(message) => {
            tracing::info!("Cart mutation rejected: {message}");
            notifications::push(session, Notification::error(message)).await;
            Ok(())
        }
        SdkError::NotFound(what) => {
            tracing::warn!("Cart mutation target missing: {what}");
            notifications::push(
                session,
                Notification::error(locale.text(Message::CartUpdateFailed)),
            )
            .await;
            Ok(())
        }
        other => Err(other.into()),
    }
}
