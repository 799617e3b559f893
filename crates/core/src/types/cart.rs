//! Cart, line item and variant types as reported by the commerce backend.
//!
//! These mirror the backend's shapes closely: most fields are optional
//! because the backend omits them while a mutation is still settling or when
//! the merchant has not filled them in. The storefront never mutates these
//! values, it only reads them and asks the backend for changes.

use serde::{Deserialize, Serialize};

use super::id::{AttributeId, AttributeValueId, LineId, ProductId, VariantId};
use super::money::{Money, TaxedMoney};

/// Cart state as seen by the view layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartState {
    /// Whether the backend has answered at least once.
    pub loaded: bool,
    pub items: Option<Vec<CartLine>>,
    pub subtotal_price: Option<TaxedMoney>,
    pub total_price: Option<TaxedMoney>,
    /// Raw shipping cost; only meaningful once a shipping method is chosen.
    pub shipping_price: Option<Money>,
    pub discount: Option<Money>,
}

impl CartState {
    /// A cart that has loaded and holds nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            loaded: true,
            ..Self::default()
        }
    }

    /// Lines in the cart, or an empty slice when the backend sent none.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        self.items.as_deref().unwrap_or_default()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines().iter().map(|line| line.quantity).sum()
    }
}

/// One product variant in the cart with its requested quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Absent until the backend has assigned one (e.g. an optimistic add).
    pub id: Option<LineId>,
    pub variant: ProductVariant,
    pub quantity: u32,
    pub total_price: Option<TaxedMoney>,
}

impl CartLine {
    /// Upper bound for the quantity selector.
    ///
    /// Uses the stock on hand when the backend reports a positive figure and
    /// falls back to the current quantity otherwise, so the selector never
    /// offers zero and never drops below what the shopper already has.
    #[must_use]
    pub fn max_quantity(&self) -> u32 {
        self.variant
            .quantity_available
            .filter(|&available| available > 0)
            .unwrap_or(self.quantity)
    }
}

/// A purchasable configuration of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    pub id: VariantId,
    #[serde(default)]
    pub name: String,
    pub sku: Option<String>,
    pub quantity_available: Option<u32>,
    pub pricing: Option<VariantPricing>,
    #[serde(default)]
    pub attributes: Vec<SelectedAttribute>,
    pub product: Option<ProductSummary>,
}

impl ProductVariant {
    /// Unit price, if the backend priced this variant for the channel.
    #[must_use]
    pub fn unit_price(&self) -> Option<&TaxedMoney> {
        self.pricing.as_ref().and_then(|p| p.price.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantPricing {
    pub price: Option<TaxedMoney>,
}

/// The parts of a product the cart needs to draw a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: Option<ProductId>,
    pub name: Option<String>,
    pub thumbnail: Option<Thumbnail>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub url: Option<String>,
    pub alt: Option<String>,
}

/// An attribute with the values selected for a variant (e.g. Size: M).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedAttribute {
    pub attribute: Attribute,
    #[serde(default)]
    pub values: Vec<AttributeValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub id: AttributeId,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeValue {
    pub id: Option<AttributeValueId>,
    pub name: Option<String>,
    pub value: Option<String>,
}
