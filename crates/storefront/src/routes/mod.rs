//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                         - Redirect to the cart
//! GET  /health                   - Health check
//!
//! # Cart
//! GET  /cart                     - Cart page
//! POST /cart/add                 - Add a variant (creates the checkout if needed)
//! POST /cart/update              - Set a line's quantity
//! POST /cart/remove              - Remove a line
//!
//! # Checkout
//! GET  /checkout                 - Checkout summary (guest or customer)
//! GET  /checkout/login           - Guest or sign-in choice
//! POST /checkout/login           - Sign in
//! POST /checkout/password-reset  - Request a password reset email
//!
//! # Auth
//! POST /auth/logout              - Sign out
//! ```
//!
//! Mutations answer with `303 See Other` back to a page (post/redirect/get)
//! and report their outcome as a flash notification.

pub mod auth;
pub mod cart;
pub mod checkout;

use axum::{
    Router,
    handler::Handler,
    response::Redirect,
    routing::{get, post},
};

use crate::middleware::{auth_rate_limiter, cart_rate_limiter};
use crate::state::AppState;

/// Paths the views link to.
pub mod paths {
    pub const CART: &str = "/cart";
    pub const CHECKOUT: &str = "/checkout";
    pub const CHECKOUT_LOGIN: &str = "/checkout/login";
    pub const PASSWORD_RESET: &str = "/checkout/password-reset";
    pub const LOGOUT: &str = "/auth/logout";
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    let mutations = Router::new()
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .layer(cart_rate_limiter());

    Router::new().route("/", get(cart::show)).merge(mutations)
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show))
        .route(
            "/login",
            get(checkout::login_page).post(checkout::login.layer(auth_rate_limiter())),
        )
        .route(
            "/password-reset",
            post(checkout::password_reset.layer(auth_rate_limiter())),
        )
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/logout", post(auth::logout))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to(paths::CART) }))
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
        .nest("/auth", auth_routes())
}
