//! Monetary amounts, with and without tax breakdown.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An amount of money in a single currency.
///
/// `currency` is the ISO 4217 code exactly as the commerce backend reports
/// it, so channels in currencies we have no symbol for still render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency: String,
}

impl Money {
    #[must_use]
    pub fn new(amount: Decimal, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }

    /// Zero in the given currency.
    #[must_use]
    pub fn zero(currency: impl Into<String>) -> Self {
        Self::new(Decimal::ZERO, currency)
    }

    /// Multiply by a quantity, keeping the currency.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self::new(self.amount * Decimal::from(quantity), self.currency.clone())
    }
}

impl fmt::Display for Money {
    /// Symbol-prefixed for currencies with a well-known symbol (`$12.50`),
    /// code-suffixed otherwise (`12.50 PLN`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let amount = self.amount.round_dp(2);
        match currency_symbol(&self.currency) {
            Some(symbol) => write!(f, "{symbol}{amount:.2}"),
            None => write!(f, "{amount:.2} {}", self.currency),
        }
    }
}

/// A monetary value expressed both tax-inclusive (`gross`) and
/// tax-exclusive (`net`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxedMoney {
    pub gross: Money,
    pub net: Money,
}

impl TaxedMoney {
    #[must_use]
    pub const fn new(gross: Money, net: Money) -> Self {
        Self { gross, net }
    }

    /// Wrap a raw amount that carries no tax breakdown: gross and net are
    /// both the given amount.
    #[must_use]
    pub fn untaxed(money: Money) -> Self {
        Self {
            gross: money.clone(),
            net: money,
        }
    }

    /// Pick the side to show to the shopper.
    #[must_use]
    pub const fn display(&self, mode: PriceDisplay) -> &Money {
        match mode {
            PriceDisplay::Gross => &self.gross,
            PriceDisplay::Net => &self.net,
        }
    }
}

/// Which side of a [`TaxedMoney`] the storefront shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceDisplay {
    #[default]
    Gross,
    Net,
}

/// Well-known currency symbols.
#[must_use]
pub fn currency_symbol(code: &str) -> Option<&'static str> {
    match code {
        "USD" | "CAD" | "AUD" | "NZD" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        "JPY" => Some("¥"),
        _ => None,
    }
}
