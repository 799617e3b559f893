//! Checkout route handlers.
//!
//! Payment and shipping steps are handled by the commerce backend's own
//! checkout; this application renders the login gate in front of it and a
//! summary page for signed-in customers.

use askama::Template;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use larkspur_core::Email;
use secrecy::SecretString;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::commerce::SdkError;
use crate::error::{AppError, Result, set_sentry_user};
use crate::i18n::{Locale, Message};
use crate::middleware::set_auth_token;
use crate::routes::cart::{checkout_token, load_cart};
use crate::routes::paths;
use crate::shell::notifications::{self, Notification};
use crate::shell::{Page, Shell, ShellContext, ShellPage};
use crate::state::AppState;
use crate::views::checkout_login::{
    self as login_view, CheckoutLoginPage, LoginForm as LoginView, OVERLAY_PARAM, Overlay,
    SignInAttempt,
};

/// Where the password reset email sends the customer, relative to the
/// shop's base URL.
const RESET_PASSWORD_PATH: &str = "reset-password/";

// =============================================================================
// Form and Query Types
// =============================================================================

/// Query parameters for the login page.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub overlay: Option<String>,
}

/// Sign-in form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Password reset form data.
#[derive(Debug, Deserialize)]
pub struct PasswordResetForm {
    pub email: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Checkout login page body.
#[derive(Template)]
#[template(path = "checkout/login.html")]
pub struct CheckoutLoginTemplate {
    pub form: LoginView,
    pub locale: Locale,
    pub title: &'static str,
}

impl CheckoutLoginTemplate {
    fn text(&self, message: Message) -> &'static str {
        self.locale.text(message)
    }
}

impl Page for CheckoutLoginTemplate {
    fn title(&self) -> &str {
        self.title
    }
}

/// Checkout summary page body.
#[derive(Template)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub locale: Locale,
    pub title: &'static str,
    /// `None` for a guest.
    pub customer: Option<String>,
    pub item_count: u32,
    pub total: String,
    pub cart_href: &'static str,
}

impl CheckoutTemplate {
    fn text(&self, message: Message) -> &'static str {
        self.locale.text(message)
    }
}

impl Page for CheckoutTemplate {
    fn title(&self) -> &str {
        self.title
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the checkout summary for a guest or a signed-in customer.
#[instrument(skip(state, session, ctx))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    ctx: ShellContext,
) -> Result<ShellPage> {
    let token = checkout_token(&session).await;
    let cart = load_cart(&state, token.as_ref()).await;

    let page = CheckoutTemplate {
        locale: ctx.locale,
        title: ctx.locale.text(Message::CheckoutTitle),
        customer: ctx.user.as_ref().map(|user| user.display_name().to_string()),
        item_count: cart.item_count(),
        total: cart
            .total_price
            .as_ref()
            .map(|price| price.display(ctx.price_display).to_string())
            .unwrap_or_default(),
        cart_href: paths::CART,
    };

    Ok(Shell::new(ctx, state.config().render_mode)
        .wrap(&page)
        .await?)
}

/// Display the checkout login page.
///
/// A signed-in customer is sent on to checkout.
#[instrument(skip(state, ctx))]
pub async fn login_page(
    State(state): State<AppState>,
    Query(query): Query<LoginQuery>,
    ctx: ShellContext,
) -> Result<Response> {
    let overlay = Overlay::from_param(query.overlay.as_deref());
    render_login(&state, ctx, overlay, SignInAttempt::default(), StatusCode::OK).await
}

/// Handle sign-in form submission.
#[instrument(skip(state, session, ctx))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    ctx: ShellContext,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let Ok(email) = Email::parse(&form.email) else {
        let attempt = SignInAttempt {
            email: form.email,
            error: Some(Message::InvalidEmail),
        };
        let status = StatusCode::UNPROCESSABLE_ENTITY;
        return render_login(&state, ctx, Overlay::None, attempt, status).await;
    };

    let password = SecretString::from(form.password);
    match state.sdk().sign_in(&email, &password).await {
        Ok(signed_in) => {
            set_auth_token(&session, &signed_in.token).await?;
            set_sentry_user(&signed_in.user.id, Some(signed_in.user.email.as_str()));
            tracing::info!(user_id = %signed_in.user.id, "Customer signed in");
            notifications::push(
                &session,
                Notification::success(ctx.locale.text(Message::SignedIn)),
            )
            .await;
            Ok(Redirect::to(paths::CHECKOUT).into_response())
        }
        Err(SdkError::InvalidCredentials | SdkError::UserError(_)) => {
            tracing::info!("Sign-in rejected");
            let attempt = SignInAttempt {
                email: email.to_string(),
                error: Some(Message::InvalidCredentials),
            };
            render_login(&state, ctx, Overlay::None, attempt, StatusCode::UNAUTHORIZED).await
        }
        Err(e) => Err(e.into()),
    }
}

/// Request a password reset email.
///
/// Answers the same way whether or not the address has an account.
#[instrument(skip(state, session))]
pub async fn password_reset(
    State(state): State<AppState>,
    session: Session,
    locale: Locale,
    Form(form): Form<PasswordResetForm>,
) -> Result<Response> {
    let overlay_url = format!("{}?{OVERLAY_PARAM}=password", paths::CHECKOUT_LOGIN);

    let Ok(email) = Email::parse(&form.email) else {
        notifications::push(&session, Notification::error(locale.text(Message::InvalidEmail)))
            .await;
        return Ok(Redirect::to(&overlay_url).into_response());
    };

    let redirect_url = state
        .config()
        .base_url
        .join(RESET_PASSWORD_PATH)
        .map_err(|e| AppError::Internal(format!("reset URL: {e}")))?;

    match state
        .sdk()
        .request_password_reset(&email, redirect_url.as_str())
        .await
    {
        Ok(()) => {
            let sent = Notification::success(locale.text(Message::ResetLinkSent));
            notifications::push(&session, sent).await;
            Ok(Redirect::to(paths::CHECKOUT_LOGIN).into_response())
        }
        Err(SdkError::UserError(message)) => {
            notifications::push(&session, Notification::error(message)).await;
            Ok(Redirect::to(&overlay_url).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

async fn render_login(
    state: &AppState,
    ctx: ShellContext,
    overlay: Overlay,
    attempt: SignInAttempt,
    status: StatusCode,
) -> Result<Response> {
    match login_view::compose(ctx.user.as_ref(), overlay, attempt, &ctx.view()) {
        CheckoutLoginPage::Redirect(to) => Ok(Redirect::to(&to).into_response()),
        CheckoutLoginPage::Form(form) => {
            let page = CheckoutLoginTemplate {
                form: *form,
                locale: ctx.locale,
                title: ctx.locale.text(Message::SignInTitle),
            };
            let html = Shell::new(ctx, state.config().render_mode)
                .wrap(&page)
                .await?;
            Ok((status, html).into_response())
        }
    }
}
