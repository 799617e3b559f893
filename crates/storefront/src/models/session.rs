//! Session keys.
//!
//! The session only holds opaque handles into the commerce backend (the
//! checkout token and the customer's bearer token) plus queued
//! notifications. Everything else is re-read from the backend per request.

/// Session keys for storefront state.
pub mod keys {
    /// Key for the token of the checkout backing the shopper's cart.
    pub const CHECKOUT_TOKEN: &str = "checkout_token";

    /// Key for the signed-in customer's bearer token.
    pub const AUTH_TOKEN: &str = "auth_token";

    /// Key for notifications waiting to be shown on the next page.
    pub const NOTIFICATIONS: &str = "notifications";
}
