//! Checkout and customer identity.

use serde::{Deserialize, Serialize};

use super::email::Email;
use super::id::{CheckoutToken, ShippingMethodId, UserId};

/// The checkout backing a cart; only the parts the storefront reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutState {
    pub token: CheckoutToken,
    pub shipping_method: Option<ShippingMethod>,
}

impl CheckoutState {
    /// True once the shopper has picked a shipping method the backend
    /// has acknowledged (i.e. it carries an id).
    #[must_use]
    pub fn has_shipping_method(&self) -> bool {
        self.shipping_method
            .as_ref()
            .is_some_and(|method| method.id.is_some())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingMethod {
    pub id: Option<ShippingMethodId>,
    pub name: Option<String>,
}

/// An authenticated customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: Email,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl User {
    /// First name when known, otherwise the email address.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.first_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| self.email.as_str())
    }
}
