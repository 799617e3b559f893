//! Saleor GraphQL API client.
//!
//! Talks to a Saleor instance with `reqwest` and plain JSON documents.
//! Checkouts are created in the configured sales channel. Customer lookups
//! by bearer token are cached with `moka` for a minute so a page render does
//! not cost an extra round trip for every extractor that asks.

mod queries;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use larkspur_core::{CartLine, CartState, CheckoutState, CheckoutToken, Email, ProductVariant, User, VariantId};
use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, instrument};
use url::Url;

use super::{AuthToken, CommerceSdk, SdkError, SignedIn};
use crate::config::CommerceConfig;
use queries::{
    CheckoutCreateData, CheckoutData, CheckoutLinesAddData, CheckoutLinesUpdateData,
    CheckoutMutationPayload, GraphQLResponse, MeData, MutationError, RawCheckout, RawLine,
    RequestPasswordResetData, TokenCreateData,
};

const USER_CACHE_TTL: Duration = Duration::from_secs(60);

/// Client for the Saleor GraphQL API.
#[derive(Clone)]
pub struct SaleorClient {
    inner: Arc<SaleorClientInner>,
}

struct SaleorClientInner {
    client: reqwest::Client,
    endpoint: Url,
    channel: String,
    users: Cache<String, User>,
}

impl SaleorClient {
    /// Create a client for `endpoint`, scoped to `channel`.
    #[must_use]
    pub fn new(endpoint: Url, channel: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(SaleorClientInner {
                client: reqwest::Client::new(),
                endpoint,
                channel: channel.into(),
                users: Cache::builder()
                    .max_capacity(10_000)
                    .time_to_live(USER_CACHE_TTL)
                    .build(),
            }),
        }
    }

    /// Create a client from configuration. `None` when no API URL is set.
    #[must_use]
    pub fn from_config(config: &CommerceConfig) -> Option<Self> {
        config
            .api_url
            .clone()
            .map(|endpoint| Self::new(endpoint, config.channel.clone()))
    }

    /// Execute a GraphQL document.
    async fn execute<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
        auth: Option<&AuthToken>,
    ) -> Result<T, SdkError> {
        let mut request = self
            .inner
            .client
            .post(self.inner.endpoint.clone())
            .json(&json!({ "query": query, "variables": variables }));
        if let Some(token) = auth {
            request = request.bearer_auth(token.expose());
        }

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(SdkError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;
        if !status.is_success() {
            debug!(status = status.as_u16(), body = %body, "Saleor request failed");
            return Err(SdkError::Status(status.as_u16()));
        }

        let envelope: GraphQLResponse<T> = serde_json::from_str(&body)?;
        if !envelope.errors.is_empty() {
            return Err(SdkError::GraphQL(envelope.errors));
        }
        envelope
            .data
            .ok_or_else(|| SdkError::GraphQL(Vec::new()))
    }

    async fn fetch_checkout(&self, token: &CheckoutToken) -> Result<Option<RawCheckout>, SdkError> {
        let data: CheckoutData = self
            .execute(
                &queries::checkout_query(),
                json!({ "token": token.as_str() }),
                None,
            )
            .await?;
        Ok(data.checkout)
    }

    async fn update_lines(
        &self,
        token: &CheckoutToken,
        variant: &VariantId,
        quantity: u32,
    ) -> Result<(), SdkError> {
        let data: CheckoutLinesUpdateData = self
            .execute(
                &queries::checkout_lines_update_mutation(),
                json!({
                    "token": token.as_str(),
                    "lines": [{ "variantId": variant.as_str(), "quantity": quantity }],
                }),
                None,
            )
            .await?;
        checkout_payload(data.checkout_lines_update).map(|_| ())
    }
}

#[async_trait]
impl CommerceSdk for SaleorClient {
    async fn current_user(&self, token: &AuthToken) -> Result<Option<User>, SdkError> {
        if let Some(user) = self.inner.users.get(token.expose()).await {
            return Ok(Some(user));
        }

        let data: MeData = self
            .execute(&queries::me_query(), json!({}), Some(token))
            .await?;
        if let Some(user) = &data.me {
            self.inner
                .users
                .insert(token.expose().to_owned(), user.clone())
                .await;
        }
        Ok(data.me)
    }

    #[instrument(skip(self, email, password), fields(email = %email))]
    async fn sign_in(&self, email: &Email, password: &SecretString) -> Result<SignedIn, SdkError> {
        let data: TokenCreateData = self
            .execute(
                &queries::token_create_mutation(),
                json!({ "email": email.as_str(), "password": password.expose_secret() }),
                None,
            )
            .await?;
        let payload = data
            .token_create
            .ok_or_else(|| SdkError::GraphQL(Vec::new()))?;

        if payload
            .errors
            .iter()
            .any(|e| e.code.as_deref() == Some("INVALID_CREDENTIALS"))
        {
            return Err(SdkError::InvalidCredentials);
        }
        first_error(&payload.errors)?;

        match (payload.token, payload.user) {
            (Some(token), Some(user)) => {
                let token = AuthToken::new(token);
                self.inner
                    .users
                    .insert(token.expose().to_owned(), user.clone())
                    .await;
                Ok(SignedIn { token, user })
            }
            _ => Err(SdkError::InvalidCredentials),
        }
    }

    #[instrument(skip(self, email), fields(email = %email))]
    async fn request_password_reset(
        &self,
        email: &Email,
        redirect_url: &str,
    ) -> Result<(), SdkError> {
        let data: RequestPasswordResetData = self
            .execute(
                &queries::request_password_reset_mutation(),
                json!({
                    "email": email.as_str(),
                    "redirectUrl": redirect_url,
                    "channel": self.inner.channel,
                }),
                None,
            )
            .await?;
        data.request_password_reset
            .map_or(Ok(()), |payload| first_error(&payload.errors))
    }

    async fn checkout(&self, token: &CheckoutToken) -> Result<Option<CheckoutState>, SdkError> {
        Ok(self.fetch_checkout(token).await?.map(|raw| CheckoutState {
            token: raw.token,
            shipping_method: raw.shipping_method,
        }))
    }

    async fn cart(&self, token: Option<&CheckoutToken>) -> Result<CartState, SdkError> {
        let Some(token) = token else {
            return Ok(CartState::empty());
        };
        Ok(self
            .fetch_checkout(token)
            .await?
            .map_or_else(CartState::empty, convert_checkout))
    }

    #[instrument(skip(self))]
    async fn add_item(
        &self,
        token: Option<&CheckoutToken>,
        variant: &VariantId,
        quantity: u32,
    ) -> Result<CheckoutToken, SdkError> {
        let lines = json!([{ "variantId": variant.as_str(), "quantity": quantity }]);

        let payload = match token {
            Some(token) => {
                let data: CheckoutLinesAddData = self
                    .execute(
                        &queries::checkout_lines_add_mutation(),
                        json!({ "token": token.as_str(), "lines": lines }),
                        None,
                    )
                    .await?;
                data.checkout_lines_add
            }
            None => {
                let data: CheckoutCreateData = self
                    .execute(
                        &queries::checkout_create_mutation(),
                        json!({ "channel": self.inner.channel, "lines": lines }),
                        None,
                    )
                    .await?;
                data.checkout_create
            }
        };

        checkout_payload(payload)?
            .ok_or_else(|| SdkError::NotFound("checkout in mutation response".to_string()))
    }

    #[instrument(skip(self))]
    async fn remove_item(&self, token: &CheckoutToken, variant: &VariantId) -> Result<(), SdkError> {
        // Saleor drops a line whose quantity is set to zero.
        self.update_lines(token, variant, 0).await
    }

    #[instrument(skip(self))]
    async fn update_item_quantity(
        &self,
        token: &CheckoutToken,
        variant: &VariantId,
        quantity: u32,
    ) -> Result<(), SdkError> {
        self.update_lines(token, variant, quantity).await
    }
}

// =============================================================================
// Conversions
// =============================================================================

/// Turn the first mutation error into `SdkError::UserError`.
fn first_error(errors: &[MutationError]) -> Result<(), SdkError> {
    errors.first().map_or(Ok(()), |error| {
        let message = error
            .message
            .clone()
            .or_else(|| error.code.clone())
            .unwrap_or_else(|| "Request was rejected".to_string());
        Err(SdkError::UserError(match &error.field {
            Some(field) => format!("{field}: {message}"),
            None => message,
        }))
    })
}

fn checkout_payload(
    payload: Option<CheckoutMutationPayload>,
) -> Result<Option<CheckoutToken>, SdkError> {
    let payload = payload.ok_or_else(|| SdkError::GraphQL(Vec::new()))?;
    first_error(&payload.errors)?;
    Ok(payload.checkout.map(|checkout| checkout.token))
}

fn convert_line(raw: RawLine) -> CartLine {
    let variant = raw.variant;
    CartLine {
        id: raw.id,
        quantity: u32::try_from(raw.quantity).unwrap_or(0),
        total_price: raw.total_price,
        variant: ProductVariant {
            id: variant.id,
            name: variant.name,
            sku: variant.sku,
            quantity_available: variant
                .quantity_available
                .and_then(|n| u32::try_from(n).ok()),
            pricing: variant.pricing,
            attributes: variant.attributes,
            product: variant.product,
        },
    }
}

/// Map a Saleor checkout to the cart the view layer reads.
///
/// Saleor reports a zero discount when no voucher applies; that becomes
/// "absent". Shipping is kept as reported since a free method is still a
/// selected method.
fn convert_checkout(raw: RawCheckout) -> CartState {
    let shipping_price = raw.shipping_price.map(|price| price.gross);
    let discount = raw.discount.filter(|money| !money.amount.is_zero());

    CartState {
        loaded: true,
        items: Some(raw.lines.into_iter().flatten().map(convert_line).collect()),
        subtotal_price: raw.subtotal_price,
        total_price: raw.total_price,
        shipping_price,
        discount,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn raw_checkout(json: &str) -> RawCheckout {
        let data: GraphQLResponse<CheckoutData> = serde_json::from_str(json).unwrap();
        data.data.unwrap().checkout.unwrap()
    }

    const CHECKOUT: &str = r#"{"data": {"checkout": {
        "token": "4f8a3c9e-6a0d-4c47-9b7f-1c2d3e4f5a6b",
        "shippingMethod": null,
        "subtotalPrice": {"gross": {"amount": 30.0, "currency": "USD"}, "net": {"amount": 25.0, "currency": "USD"}},
        "totalPrice": {"gross": {"amount": 30.0, "currency": "USD"}, "net": {"amount": 25.0, "currency": "USD"}},
        "shippingPrice": {"gross": {"amount": 0.0, "currency": "USD"}, "net": {"amount": 0.0, "currency": "USD"}},
        "discount": {"amount": 0.0, "currency": "USD"},
        "lines": [
            {"id": "Q2hlY2tvdXRMaW5lOjE=", "quantity": 3, "totalPrice": null, "variant": {
                "id": "UHJvZHVjdFZhcmlhbnQ6MQ==", "name": "S", "sku": null,
                "quantityAvailable": -2, "pricing": null, "attributes": [], "product": null
            }},
            null
        ]
    }}}"#;

    #[test]
    fn test_convert_checkout_drops_zero_discount_keeps_shipping() {
        let cart = convert_checkout(raw_checkout(CHECKOUT));
        assert!(cart.loaded);
        assert!(
            cart.shipping_price
                .as_ref()
                .is_some_and(|price| price.amount.is_zero())
        );
        assert!(cart.discount.is_none());
        assert_eq!(cart.lines().len(), 1);
    }

    #[test]
    fn test_convert_line_clamps_negative_stock() {
        let cart = convert_checkout(raw_checkout(CHECKOUT));
        let line = &cart.lines()[0];
        assert_eq!(line.variant.quantity_available, None);
        assert_eq!(line.max_quantity(), 3);
    }

    #[test]
    fn test_first_error_formats_field() {
        let err = first_error(&[MutationError {
            field: Some("quantity".to_string()),
            message: Some("Insufficient stock".to_string()),
            code: Some("INSUFFICIENT_STOCK".to_string()),
        }])
        .unwrap_err();
        assert_eq!(err.to_string(), "User error: quantity: Insufficient stock");
    }

    #[test]
    fn test_first_error_empty_is_ok() {
        assert!(first_error(&[]).is_ok());
    }

    #[test]
    fn test_envelope_errors_are_surfaced() {
        let envelope: GraphQLResponse<MeData> = serde_json::from_str(
            r#"{"data": null, "errors": [{"message": "Signature has expired", "path": ["me"]}]}"#,
        )
        .unwrap();
        assert_eq!(envelope.errors.len(), 1);
        assert_eq!(envelope.errors[0].message, "Signature has expired");
    }

    #[test]
    fn test_from_config_requires_api_url() {
        let mut config = CommerceConfig {
            api_url: None,
            channel: "default-channel".to_string(),
            demo_catalog: None,
        };
        assert!(SaleorClient::from_config(&config).is_none());

        config.api_url = Some(Url::parse("https://demo.saleor.io/graphql/").unwrap());
        assert!(SaleorClient::from_config(&config).is_some());
    }
}
