//! GraphQL documents and response shapes for the Saleor API.
//!
//! Response types deserialize exactly what the documents select. Shapes that
//! line up with `larkspur_core` types reuse them directly; the rest are
//! converted in `super::convert_*`.

use larkspur_core::{
    CheckoutToken, LineId, Money, ProductSummary, SelectedAttribute, ShippingMethod, TaxedMoney,
    User, VariantId, VariantPricing,
};
use serde::Deserialize;

use crate::commerce::GraphQLError;

const MONEY: &str = "fragment Money on Money { amount currency }";
const TAXED_MONEY: &str =
    "fragment TaxedMoney on TaxedMoney { gross { ...Money } net { ...Money } }";
const USER: &str = "fragment UserDetails on User { id email firstName lastName }";
const ERRORS: &str = "field message code";

pub fn checkout_query() -> String {
    format!(
        "query Checkout($token: UUID!) {{
  checkout(token: $token) {{
    token
    shippingMethod {{ id name }}
    subtotalPrice {{ ...TaxedMoney }}
    totalPrice {{ ...TaxedMoney }}
    shippingPrice {{ ...TaxedMoney }}
    discount {{ ...Money }}
    lines {{
      id
      quantity
      totalPrice {{ ...TaxedMoney }}
      variant {{
        id
        name
        sku
        quantityAvailable
        pricing {{ price {{ ...TaxedMoney }} }}
        attributes {{
          attribute {{ id name }}
          values {{ id name value }}
        }}
        product {{
          id
          name
          thumbnail {{ url alt }}
        }}
      }}
    }}
  }}
}}
{TAXED_MONEY}
{MONEY}"
    )
}

pub fn me_query() -> String {
    format!("query Me {{ me {{ ...UserDetails }} }}\n{USER}")
}

pub fn token_create_mutation() -> String {
    format!(
        "mutation TokenCreate($email: String!, $password: String!) {{
  tokenCreate(email: $email, password: $password) {{
    token
    user {{ ...UserDetails }}
    errors {{ {ERRORS} }}
  }}
}}
{USER}"
    )
}

pub fn request_password_reset_mutation() -> String {
    format!(
        "mutation RequestPasswordReset($email: String!, $redirectUrl: String!, $channel: String!) {{
  requestPasswordReset(email: $email, redirectUrl: $redirectUrl, channel: $channel) {{
    errors {{ {ERRORS} }}
  }}
}}"
    )
}

pub fn checkout_create_mutation() -> String {
    format!(
        "mutation CheckoutCreate($channel: String!, $lines: [CheckoutLineInput!]!) {{
  checkoutCreate(input: {{ channel: $channel, lines: $lines }}) {{
    checkout {{ token }}
    errors {{ {ERRORS} }}
  }}
}}"
    )
}

pub fn checkout_lines_add_mutation() -> String {
    format!(
        "mutation CheckoutLinesAdd($token: UUID!, $lines: [CheckoutLineInput!]!) {{
  checkoutLinesAdd(token: $token, lines: $lines) {{
    checkout {{ token }}
    errors {{ {ERRORS} }}
  }}
}}"
    )
}

pub fn checkout_lines_update_mutation() -> String {
    format!(
        "mutation CheckoutLinesUpdate($token: UUID!, $lines: [CheckoutLineUpdateInput!]!) {{
  checkoutLinesUpdate(token: $token, lines: $lines) {{
    checkout {{ token }}
    errors {{ {ERRORS} }}
  }}
}}"
    )
}

// =============================================================================
// Response shapes
// =============================================================================

/// Top-level GraphQL response envelope.
#[derive(Debug, Deserialize)]
pub struct GraphQLResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQLError>,
}

/// Error entry in a mutation payload.
#[derive(Debug, Clone, Deserialize)]
pub struct MutationError {
    pub field: Option<String>,
    pub message: Option<String>,
    pub code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutData {
    pub checkout: Option<RawCheckout>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCheckout {
    pub token: CheckoutToken,
    pub shipping_method: Option<ShippingMethod>,
    pub subtotal_price: Option<TaxedMoney>,
    pub total_price: Option<TaxedMoney>,
    pub shipping_price: Option<TaxedMoney>,
    pub discount: Option<Money>,
    #[serde(default)]
    pub lines: Vec<Option<RawLine>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLine {
    pub id: Option<LineId>,
    pub quantity: i64,
    pub total_price: Option<TaxedMoney>,
    pub variant: RawVariant,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVariant {
    pub id: VariantId,
    #[serde(default)]
    pub name: String,
    pub sku: Option<String>,
    pub quantity_available: Option<i64>,
    pub pricing: Option<VariantPricing>,
    #[serde(default)]
    pub attributes: Vec<SelectedAttribute>,
    pub product: Option<ProductSummary>,
}

#[derive(Debug, Deserialize)]
pub struct MeData {
    pub me: Option<User>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenCreateData {
    pub token_create: Option<TokenCreatePayload>,
}

#[derive(Debug, Deserialize)]
pub struct TokenCreatePayload {
    pub token: Option<String>,
    pub user: Option<User>,
    #[serde(default)]
    pub errors: Vec<MutationError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestPasswordResetData {
    pub request_password_reset: Option<ErrorsOnly>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorsOnly {
    #[serde(default)]
    pub errors: Vec<MutationError>,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutTokenOnly {
    pub token: CheckoutToken,
}

/// Payload shared by the checkout line mutations.
#[derive(Debug, Deserialize)]
pub struct CheckoutMutationPayload {
    pub checkout: Option<CheckoutTokenOnly>,
    #[serde(default)]
    pub errors: Vec<MutationError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutCreateData {
    pub checkout_create: Option<CheckoutMutationPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutLinesAddData {
    pub checkout_lines_add: Option<CheckoutMutationPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutLinesUpdateData {
    pub checkout_lines_update: Option<CheckoutMutationPayload>,
}
