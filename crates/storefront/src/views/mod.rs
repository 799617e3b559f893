//! Page view models.
//!
//! Views are pure functions from backend state to plain structs; the
//! templates only lay those structs out. Everything a page decides (which
//! rows, which summary lines, where a button goes) is decided here and
//! tested here.

pub mod cart;
pub mod checkout_login;

use larkspur_core::PriceDisplay;
use url::Url;

use crate::i18n::Locale;
use crate::routes::paths;

/// Where the storefront's buttons lead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Links {
    /// The shop's home page, outside this application.
    pub base: String,
    pub cart: String,
    pub checkout: String,
    pub checkout_login: String,
}

impl Links {
    #[must_use]
    pub fn new(base_url: &Url) -> Self {
        Self {
            base: base_url.to_string(),
            cart: paths::CART.to_string(),
            checkout: paths::CHECKOUT.to_string(),
            checkout_login: paths::CHECKOUT_LOGIN.to_string(),
        }
    }
}

/// What a view needs besides the backend state.
#[derive(Debug, Clone)]
pub struct ViewContext {
    pub links: Links,
    pub locale: Locale,
    pub price_display: PriceDisplay,
}

/// A call to action rendered as a link styled as a button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub href: String,
    /// Value of the `data-test` attribute.
    pub testing_context: &'static str,
    pub label: &'static str,
}
