//! In-process commerce backend.
//!
//! Holds a fixed catalog of variants, a handful of demo customers, and carts
//! in a `moka` cache that forgets carts after a week without activity.
//! Concurrent writes to one cart are last-write-wins.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use larkspur_core::{
    CartLine, CartState, CheckoutState, CheckoutToken, Email, LineId, Money, ProductVariant,
    ShippingMethod, TaxedMoney, User, VariantId,
};
use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::{AuthToken, CommerceSdk, SdkError, SignedIn};

const CART_IDLE_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);
const SESSION_IDLE_TTL: Duration = Duration::from_secs(24 * 60 * 60);
const MAX_CARTS: u64 = 10_000;

/// Catalog file format for [`MemoryCommerce::load`].
#[derive(Debug, Clone, Deserialize)]
pub struct MemoryCatalog {
    #[serde(default = "default_currency")]
    pub currency: String,
    pub variants: Vec<ProductVariant>,
    #[serde(default)]
    pub customers: Vec<MemoryCustomer>,
}

/// A customer who can sign in to the in-memory backend.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone, Deserialize)]
pub struct MemoryCustomer {
    pub user: User,
    pub password: String,
}

impl std::fmt::Debug for MemoryCustomer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCustomer")
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Stored sign-in credentials.
struct Credentials {
    user: User,
    password: SecretString,
}

fn default_currency() -> String {
    "USD".to_string()
}

/// Errors loading a catalog file.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// In-memory implementation of [`CommerceSdk`].
///
/// Cheaply cloneable; clones share the same carts and sessions.
#[derive(Clone)]
pub struct MemoryCommerce {
    inner: Arc<MemoryCommerceInner>,
}

struct MemoryCommerceInner {
    currency: String,
    variants: HashMap<VariantId, ProductVariant>,
    customers: HashMap<Email, Credentials>,
    sessions: Cache<String, User>,
    carts: Cache<CheckoutToken, MemoryCart>,
}

#[derive(Debug, Clone, Default)]
struct MemoryCart {
    lines: Vec<MemoryLine>,
    shipping: Option<(ShippingMethod, Money)>,
    discount: Option<Money>,
}

#[derive(Debug, Clone)]
struct MemoryLine {
    id: LineId,
    variant: VariantId,
    quantity: u32,
}

impl MemoryCommerce {
    /// Create an empty backend pricing everything in `currency`.
    #[must_use]
    pub fn new(currency: impl Into<String>) -> Self {
        Self::from_catalog(MemoryCatalog {
            currency: currency.into(),
            variants: Vec::new(),
            customers: Vec::new(),
        })
    }

    /// Create a backend from a parsed catalog.
    #[must_use]
    pub fn from_catalog(catalog: MemoryCatalog) -> Self {
        let variants = catalog
            .variants
            .into_iter()
            .map(|variant| (variant.id.clone(), variant))
            .collect();
        let customers = catalog
            .customers
            .into_iter()
            .map(|customer| {
                (
                    customer.user.email.clone(),
                    Credentials {
                        user: customer.user,
                        password: SecretString::from(customer.password),
                    },
                )
            })
            .collect();

        Self {
            inner: Arc::new(MemoryCommerceInner {
                currency: catalog.currency,
                variants,
                customers,
                sessions: Cache::builder().time_to_idle(SESSION_IDLE_TTL).build(),
                carts: Cache::builder()
                    .max_capacity(MAX_CARTS)
                    .time_to_idle(CART_IDLE_TTL)
                    .build(),
            }),
        }
    }

    /// Load a JSON catalog from disk.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        let catalog: MemoryCatalog = serde_json::from_str(&raw)?;
        info!(
            path = %path.display(),
            variants = catalog.variants.len(),
            customers = catalog.customers.len(),
            "Loaded demo catalog"
        );
        Ok(Self::from_catalog(catalog))
    }

    /// Add a variant to the catalog. Only valid before the backend is shared.
    #[must_use]
    pub fn with_variant(mut self, variant: ProductVariant) -> Self {
        if let Some(inner) = Arc::get_mut(&mut self.inner) {
            inner.variants.insert(variant.id.clone(), variant);
        }
        self
    }

    /// Register a customer. Only valid before the backend is shared.
    #[must_use]
    pub fn with_customer(mut self, user: User, password: &str) -> Self {
        if let Some(inner) = Arc::get_mut(&mut self.inner) {
            inner.customers.insert(
                user.email.clone(),
                Credentials {
                    user,
                    password: SecretString::from(password.to_owned()),
                },
            );
        }
        self
    }

    /// Pick a shipping method for a cart.
    ///
    /// # Errors
    ///
    /// Returns `SdkError::NotFound` if the cart does not exist.
    pub async fn select_shipping_method(
        &self,
        token: &CheckoutToken,
        method: ShippingMethod,
        price: Money,
    ) -> Result<(), SdkError> {
        let mut cart = self.load_cart(token).await?;
        cart.shipping = Some((method, price));
        self.inner.carts.insert(token.clone(), cart).await;
        Ok(())
    }

    /// Apply a flat discount to a cart.
    ///
    /// # Errors
    ///
    /// Returns `SdkError::NotFound` if the cart does not exist.
    pub async fn apply_discount(&self, token: &CheckoutToken, amount: Money) -> Result<(), SdkError> {
        let mut cart = self.load_cart(token).await?;
        cart.discount = Some(amount);
        self.inner.carts.insert(token.clone(), cart).await;
        Ok(())
    }

    /// Tokens of every cart currently held.
    #[must_use]
    pub fn checkout_tokens(&self) -> Vec<CheckoutToken> {
        self.inner
            .carts
            .iter()
            .map(|(token, _)| (*token).clone())
            .collect()
    }

    async fn load_cart(&self, token: &CheckoutToken) -> Result<MemoryCart, SdkError> {
        self.inner
            .carts
            .get(token)
            .await
            .ok_or_else(|| SdkError::NotFound(format!("checkout {token}")))
    }

    fn variant(&self, id: &VariantId) -> Result<&ProductVariant, SdkError> {
        self.inner
            .variants
            .get(id)
            .ok_or_else(|| SdkError::NotFound(format!("variant {id}")))
    }

    fn check_stock(variant: &ProductVariant, quantity: u32) -> Result<(), SdkError> {
        match variant.quantity_available {
            Some(available) if quantity > available => Err(SdkError::UserError(format!(
                "Only {available} of {} left in stock",
                variant.name
            ))),
            _ => Ok(()),
        }
    }

    /// Price a stored cart into the shape the view layer reads.
    fn price_cart(&self, cart: &MemoryCart) -> CartState {
        let zero = TaxedMoney::untaxed(Money::zero(self.inner.currency.clone()));

        let items: Vec<CartLine> = cart
            .lines
            .iter()
            .filter_map(|line| {
                let variant = self.inner.variants.get(&line.variant)?;
                let total_price = variant.unit_price().map(|unit| {
                    TaxedMoney::new(unit.gross.times(line.quantity), unit.net.times(line.quantity))
                });
                Some(CartLine {
                    id: Some(line.id.clone()),
                    variant: variant.clone(),
                    quantity: line.quantity,
                    total_price,
                })
            })
            .collect();

        let subtotal = items
            .iter()
            .filter_map(|line| line.total_price.as_ref())
            .fold(zero, |acc, price| {
                TaxedMoney::new(
                    Money::new(acc.gross.amount + price.gross.amount, acc.gross.currency),
                    Money::new(acc.net.amount + price.net.amount, acc.net.currency),
                )
            });

        let shipping_price = cart.shipping.as_ref().map(|(_, price)| price.clone());
        let adjustment = shipping_price.as_ref().map_or(rust_decimal::Decimal::ZERO, |p| p.amount)
            - cart.discount.as_ref().map_or(rust_decimal::Decimal::ZERO, |d| d.amount);
        let total = TaxedMoney::new(
            Money::new(
                (subtotal.gross.amount + adjustment).max(rust_decimal::Decimal::ZERO),
                subtotal.gross.currency.clone(),
            ),
            Money::new(
                (subtotal.net.amount + adjustment).max(rust_decimal::Decimal::ZERO),
                subtotal.net.currency.clone(),
            ),
        );

        CartState {
            loaded: true,
            items: Some(items),
            subtotal_price: Some(subtotal),
            total_price: Some(total),
            shipping_price,
            discount: cart.discount.clone(),
        }
    }
}

#[async_trait]
impl CommerceSdk for MemoryCommerce {
    async fn current_user(&self, token: &AuthToken) -> Result<Option<User>, SdkError> {
        Ok(self.inner.sessions.get(token.expose()).await)
    }

    #[instrument(skip(self, email, password), fields(email = %email))]
    async fn sign_in(&self, email: &Email, password: &SecretString) -> Result<SignedIn, SdkError> {
        let customer = self
            .inner
            .customers
            .get(email)
            .filter(|c| c.password.expose_secret() == password.expose_secret())
            .ok_or(SdkError::InvalidCredentials)?;

        let token = Uuid::new_v4().to_string();
        self.inner
            .sessions
            .insert(token.clone(), customer.user.clone())
            .await;

        Ok(SignedIn {
            token: AuthToken::new(token),
            user: customer.user.clone(),
        })
    }

    async fn request_password_reset(
        &self,
        email: &Email,
        redirect_url: &str,
    ) -> Result<(), SdkError> {
        // No mail transport here; known or not, the caller sees the same result.
        debug!(
            email = %email,
            redirect_url,
            known = self.inner.customers.contains_key(email),
            "Password reset requested"
        );
        Ok(())
    }

    async fn checkout(&self, token: &CheckoutToken) -> Result<Option<CheckoutState>, SdkError> {
        Ok(self.inner.carts.get(token).await.map(|cart| CheckoutState {
            token: token.clone(),
            shipping_method: cart.shipping.map(|(method, _)| method),
        }))
    }

    async fn cart(&self, token: Option<&CheckoutToken>) -> Result<CartState, SdkError> {
        let Some(token) = token else {
            return Ok(CartState::empty());
        };
        Ok(match self.inner.carts.get(token).await {
            Some(cart) => self.price_cart(&cart),
            None => CartState::empty(),
        })
    }

    #[instrument(skip(self))]
    async fn add_item(
        &self,
        token: Option<&CheckoutToken>,
        variant: &VariantId,
        quantity: u32,
    ) -> Result<CheckoutToken, SdkError> {
        let product_variant = self.variant(variant)?;

        let (token, mut cart) = match token {
            Some(token) => match self.inner.carts.get(token).await {
                Some(cart) => (token.clone(), cart),
                None => (token.clone(), MemoryCart::default()),
            },
            None => (
                CheckoutToken::new(Uuid::new_v4().to_string()),
                MemoryCart::default(),
            ),
        };

        if let Some(line) = cart.lines.iter_mut().find(|l| &l.variant == variant) {
            let wanted = line.quantity.saturating_add(quantity);
            Self::check_stock(product_variant, wanted)?;
            line.quantity = wanted;
        } else {
            Self::check_stock(product_variant, quantity)?;
            cart.lines.push(MemoryLine {
                id: LineId::new(Uuid::new_v4().to_string()),
                variant: variant.clone(),
                quantity,
            });
        }

        self.inner.carts.insert(token.clone(), cart).await;
        Ok(token)
    }

    #[instrument(skip(self))]
    async fn remove_item(&self, token: &CheckoutToken, variant: &VariantId) -> Result<(), SdkError> {
        let mut cart = self.load_cart(token).await?;
        cart.lines.retain(|line| &line.variant != variant);
        self.inner.carts.insert(token.clone(), cart).await;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn update_item_quantity(
        &self,
        token: &CheckoutToken,
        variant: &VariantId,
        quantity: u32,
    ) -> Result<(), SdkError> {
        if quantity == 0 {
            return self.remove_item(token, variant).await;
        }

        let mut cart = self.load_cart(token).await?;
        let line = cart
            .lines
            .iter_mut()
            .find(|line| &line.variant == variant)
            .ok_or_else(|| SdkError::NotFound(format!("line for variant {variant}")))?;
        Self::check_stock(self.variant(variant)?, quantity)?;
        line.quantity = quantity;

        self.inner.carts.insert(token.clone(), cart).await;
        Ok(())
    }
}
