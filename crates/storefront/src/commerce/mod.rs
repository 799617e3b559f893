//! Commerce backend seam.
//!
//! Everything the storefront shows about carts, checkouts and customers comes
//! from a [`CommerceSdk`]. The view layer holds no state of its own: it reads
//! through this trait, asks it for changes, and re-reads once they land.
//!
//! # Backends
//!
//! - [`SaleorClient`] - Saleor GraphQL API over `reqwest`, scoped to one
//!   sales channel
//! - [`MemoryCommerce`] - in-process catalog and carts for local runs and tests
//!
//! # Example
//!
//! ```rust,ignore
//! let sdk: Arc<dyn CommerceSdk> = Arc::new(MemoryCommerce::new("USD"));
//!
//! let token = sdk.add_item(None, &variant_id, 2).await?;
//! sdk.update_item_quantity(&token, &variant_id, 1).await?;
//! let cart = sdk.cart(Some(&token)).await?;
//! ```

mod memory;
mod saleor;

pub use memory::{CatalogError, MemoryCatalog, MemoryCommerce, MemoryCustomer};
pub use saleor::SaleorClient;

use async_trait::async_trait;
use larkspur_core::{CartState, CheckoutState, CheckoutToken, Email, User, VariantId};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Errors that can occur when talking to the commerce backend.
#[derive(Debug, Error)]
pub enum SdkError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("Unexpected status {0}")]
    Status(u16),

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Email/password pair was rejected.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// User error from a mutation (e.g. insufficient stock).
    #[error("User error: {0}")]
    UserError(String),
}

/// A GraphQL error returned by the backend.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct GraphQLError {
    /// Error message.
    #[serde(default)]
    pub message: String,
    /// Path to the error in the response.
    #[serde(default)]
    pub path: Vec<serde_json::Value>,
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    if errors.is_empty() {
        return "(no error details provided)".to_string();
    }

    errors
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let path = e
                .path
                .iter()
                .map(|p| match p {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(".");

            match (e.message.is_empty(), path.is_empty()) {
                (true, true) => format!("[error {}]: (no details)", i + 1),
                (false, true) => e.message.clone(),
                (true, false) => format!("path: {path}"),
                (false, false) => format!("{} path: {path}", e.message),
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Bearer token identifying a signed-in customer.
///
/// Wrapped in `SecretString` so it never shows up in `Debug` output or logs.
#[derive(Debug, Clone)]
pub struct AuthToken(SecretString);

impl AuthToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

/// Result of a successful sign-in.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub token: AuthToken,
    pub user: User,
}

/// The commerce operations the storefront consumes.
///
/// Implementations own all cart, checkout and customer state. Mutations are
/// fire-and-forget from the caller's side: no retries, no cancellation.
#[async_trait]
pub trait CommerceSdk: Send + Sync {
    /// Resolve a bearer token to the customer it belongs to.
    ///
    /// Returns `Ok(None)` for unknown or expired tokens.
    async fn current_user(&self, token: &AuthToken) -> Result<Option<User>, SdkError>;

    /// Exchange an email/password pair for a bearer token.
    async fn sign_in(&self, email: &Email, password: &SecretString) -> Result<SignedIn, SdkError>;

    /// Ask the backend to email a password reset link.
    async fn request_password_reset(&self, email: &Email, redirect_url: &str)
    -> Result<(), SdkError>;

    /// Checkout details for a cart. `Ok(None)` when the token is unknown.
    async fn checkout(&self, token: &CheckoutToken) -> Result<Option<CheckoutState>, SdkError>;

    /// Cart contents and totals. A missing or unknown token is an empty,
    /// loaded cart.
    async fn cart(&self, token: Option<&CheckoutToken>) -> Result<CartState, SdkError>;

    /// Add units of a variant, creating the cart when there is none yet.
    ///
    /// Returns the token of the cart the item landed in.
    async fn add_item(
        &self,
        token: Option<&CheckoutToken>,
        variant: &VariantId,
        quantity: u32,
    ) -> Result<CheckoutToken, SdkError>;

    /// Drop every unit of a variant from the cart.
    async fn remove_item(&self, token: &CheckoutToken, variant: &VariantId)
    -> Result<(), SdkError>;

    /// Set the quantity of a variant already in the cart. Zero removes it.
    async fn update_item_quantity(
        &self,
        token: &CheckoutToken,
        variant: &VariantId,
        quantity: u32,
    ) -> Result<(), SdkError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error(message: &str, path: &[&str]) -> GraphQLError {
        GraphQLError {
            message: message.to_string(),
            path: path
                .iter()
                .map(|p| serde_json::Value::String((*p).to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_sdk_error_display() {
        let err = SdkError::NotFound("checkout abc".to_string());
        assert_eq!(err.to_string(), "Not found: checkout abc");
    }

    #[test]
    fn test_graphql_error_formatting() {
        let err = SdkError::GraphQL(vec![
            error("Field not found", &[]),
            error("Invalid token", &["checkout"]),
        ]);
        assert_eq!(
            err.to_string(),
            "GraphQL errors: Field not found; Invalid token path: checkout"
        );
    }

    #[test]
    fn test_graphql_error_no_details() {
        let err = SdkError::GraphQL(vec![error("", &[])]);
        assert_eq!(err.to_string(), "GraphQL errors: [error 1]: (no details)");
    }

    #[test]
    fn test_graphql_error_empty_vec() {
        let err = SdkError::GraphQL(vec![]);
        assert_eq!(
            err.to_string(),
            "GraphQL errors: (no error details provided)"
        );
    }

    #[test]
    fn test_auth_token_debug_is_redacted() {
        let token = AuthToken::new("eyJhbGciOiJIUzI1NiJ9.secret");
        let debug = format!("{token:?}");
        assert!(!debug.contains("eyJhbGci"));
        assert_eq!(token.expose(), "eyJhbGciOiJIUzI1NiJ9.secret");
    }
}
