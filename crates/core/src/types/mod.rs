//! Core types for Larkspur.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod checkout;
pub mod email;
pub mod id;
pub mod money;

pub use cart::{
    Attribute, AttributeValue, CartLine, CartState, ProductSummary, ProductVariant,
    SelectedAttribute, Thumbnail, VariantPricing,
};
pub use checkout::{CheckoutState, ShippingMethod, User};
pub use email::{Email, EmailError};
pub use id::*;
pub use money::{Money, PriceDisplay, TaxedMoney, currency_symbol};
