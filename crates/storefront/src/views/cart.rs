//! Cart page view.
//!
//! [`compose`] turns the backend's cart, the checkout behind it and the
//! signed-in customer into either the populated cart or the empty state.
//! Row actions are returned as [`CartMutation`] values; applying one goes
//! through the commerce backend and the page is composed again from a fresh
//! read, so nothing here holds state between requests.

use larkspur_core::{
    CartLine, CartState, CheckoutState, CheckoutToken, Money, TaxedMoney, User, VariantId,
};

use super::{Button, ViewContext};
use crate::commerce::{CommerceSdk, SdkError};
use crate::i18n::Message;

pub const TITLE_TEST_ID: &str = "cartPageTitle";
pub const CHECKOUT_BUTTON_TEST_ID: &str = "proceedToCheckoutButton";
pub const CONTINUE_SHOPPING_TEST_ID: &str = "cartPageContinueShoppingButton";

/// What the cart page shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartPage {
    Empty(EmptyCart),
    Populated(PopulatedCart),
}

impl CartPage {
    #[must_use]
    pub const fn populated(&self) -> Option<&PopulatedCart> {
        match self {
            Self::Populated(cart) => Some(cart),
            Self::Empty(_) => None,
        }
    }

    #[must_use]
    pub const fn empty_state(&self) -> Option<&EmptyCart> {
        match self {
            Self::Empty(empty) => Some(empty),
            Self::Populated(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub text: &'static str,
    pub testing_context: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyCart {
    pub title: &'static str,
    pub message: &'static str,
    pub continue_shopping: Button,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopulatedCart {
    pub title: Heading,
    /// Column labels, in display order.
    pub header: [&'static str; 4],
    pub rows: Vec<CartRowView>,
    pub summary: CartSummary,
    pub checkout_button: Button,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartRowView {
    /// Stable key: `id-{line id}`, or `idx-{position}` before the backend
    /// has assigned an id.
    pub key: String,
    pub index: usize,
    pub variant_id: VariantId,
    pub product_id: String,
    pub name: String,
    pub variant_name: String,
    pub sku: String,
    pub quantity: u32,
    pub max_quantity: u32,
    pub thumbnail: ThumbnailView,
    pub unit_price: String,
    pub total_price: String,
    pub attributes: Vec<AttributeView>,
}

impl CartRowView {
    /// Remove this row's variant.
    #[must_use]
    pub fn remove(&self) -> CartMutation {
        CartMutation::Remove {
            variant: self.variant_id.clone(),
        }
    }

    /// Set this row's quantity.
    #[must_use]
    pub fn change_quantity(&self, quantity: u32) -> CartMutation {
        CartMutation::SetQuantity {
            variant: self.variant_id.clone(),
            quantity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailView {
    pub url: String,
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeView {
    pub id: String,
    pub name: String,
    pub values: Vec<AttributeValueView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeValueView {
    pub id: String,
    pub name: String,
    pub value: String,
}

impl AttributeView {
    /// Value names joined for display, e.g. "Red, Blue".
    #[must_use]
    pub fn value_names(&self) -> String {
        self.values
            .iter()
            .map(|v| v.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A priced line in the cart footer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryLine {
    pub price: TaxedMoney,
    pub display: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSummary {
    pub subtotal: String,
    pub shipping: Option<SummaryLine>,
    pub discount: Option<SummaryLine>,
    pub total: String,
}

/// A change the shopper asked for on one cart row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartMutation {
    Remove { variant: VariantId },
    SetQuantity { variant: VariantId, quantity: u32 },
}

impl CartMutation {
    /// Send the change to the commerce backend.
    ///
    /// # Errors
    ///
    /// Returns the backend's error unchanged.
    pub async fn apply(&self, sdk: &dyn CommerceSdk, token: &CheckoutToken) -> Result<(), SdkError> {
        match self {
            Self::Remove { variant } => sdk.remove_item(token, variant).await,
            Self::SetQuantity { variant, quantity } => {
                sdk.update_item_quantity(token, variant, *quantity).await
            }
        }
    }
}

/// Compose the cart page.
///
/// The populated view is shown only once the cart has loaded and holds at
/// least one line. Shipping appears only when the checkout has a shipping
/// method with an id and the cart reports a shipping price; the discount
/// appears only when there is one. Both are shown untaxed (gross equals
/// net). The checkout button leads to checkout for a signed-in customer and
/// to the checkout login page otherwise.
#[must_use]
pub fn compose(
    cart: &CartState,
    checkout: Option<&CheckoutState>,
    user: Option<&User>,
    ctx: &ViewContext,
) -> CartPage {
    let locale = ctx.locale;

    if !cart.loaded || cart.lines().is_empty() {
        return CartPage::Empty(EmptyCart {
            title: locale.text(Message::CartEmptyTitle),
            message: locale.text(Message::CartEmptyMessage),
            continue_shopping: Button {
                href: ctx.links.base.clone(),
                testing_context: CONTINUE_SHOPPING_TEST_ID,
                label: locale.text(Message::ContinueShopping),
            },
        });
    }

    let rows = cart
        .lines()
        .iter()
        .enumerate()
        .map(|(index, line)| compose_row(index, line, ctx))
        .collect();

    let shipping = cart
        .shipping_price
        .as_ref()
        .filter(|_| checkout.is_some_and(CheckoutState::has_shipping_method))
        .map(|price| untaxed_line(price, ctx, false));
    let discount = cart
        .discount
        .as_ref()
        .map(|discount| untaxed_line(discount, ctx, true));

    let checkout_href = if user.is_some() {
        &ctx.links.checkout
    } else {
        &ctx.links.checkout_login
    };

    CartPage::Populated(PopulatedCart {
        title: Heading {
            text: locale.text(Message::CartTitle),
            testing_context: TITLE_TEST_ID,
        },
        header: [
            locale.text(Message::ColumnProducts),
            locale.text(Message::ColumnPrice),
            locale.text(Message::ColumnQuantity),
            locale.text(Message::ColumnTotalPrice),
        ],
        rows,
        summary: CartSummary {
            subtotal: format_taxed(cart.subtotal_price.as_ref(), ctx),
            shipping,
            discount,
            total: format_taxed(cart.total_price.as_ref(), ctx),
        },
        checkout_button: Button {
            href: checkout_href.clone(),
            testing_context: CHECKOUT_BUTTON_TEST_ID,
            label: locale.text(Message::ProceedToCheckout),
        },
    })
}

fn compose_row(index: usize, line: &CartLine, ctx: &ViewContext) -> CartRowView {
    let variant = &line.variant;
    let product = variant.product.as_ref();
    let thumbnail = product.and_then(|p| p.thumbnail.as_ref());

    CartRowView {
        key: line
            .id
            .as_ref()
            .map_or_else(|| format!("idx-{index}"), |id| format!("id-{id}")),
        index,
        variant_id: variant.id.clone(),
        product_id: product
            .and_then(|p| p.id.as_ref())
            .map(ToString::to_string)
            .unwrap_or_default(),
        name: product.and_then(|p| p.name.clone()).unwrap_or_default(),
        variant_name: variant.name.clone(),
        sku: variant.sku.clone().unwrap_or_default(),
        quantity: line.quantity,
        max_quantity: line.max_quantity(),
        thumbnail: ThumbnailView {
            url: thumbnail.and_then(|t| t.url.clone()).unwrap_or_default(),
            alt: thumbnail.and_then(|t| t.alt.clone()).unwrap_or_default(),
        },
        unit_price: format_taxed(variant.unit_price(), ctx),
        total_price: format_taxed(line.total_price.as_ref(), ctx),
        attributes: variant
            .attributes
            .iter()
            .map(|selected| AttributeView {
                id: selected.attribute.id.to_string(),
                name: selected.attribute.name.clone().unwrap_or_default(),
                values: selected
                    .values
                    .iter()
                    .map(|value| AttributeValueView {
                        id: value.id.as_ref().map(ToString::to_string).unwrap_or_default(),
                        name: value.name.clone().unwrap_or_default(),
                        value: value.value.clone().unwrap_or_default(),
                    })
                    .collect(),
            })
            .collect(),
    }
}

fn format_taxed(price: Option<&TaxedMoney>, ctx: &ViewContext) -> String {
    price.map_or_else(String::new, |p| p.display(ctx.price_display).to_string())
}

fn untaxed_line(money: &Money, ctx: &ViewContext, negative: bool) -> SummaryLine {
    let price = TaxedMoney::untaxed(money.clone());
    let shown = price.display(ctx.price_display).to_string();
    SummaryLine {
        display: if negative { format!("-{shown}") } else { shown },
        price,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use larkspur_core::{
        Email, LineId, PriceDisplay, ProductId, ProductSummary, ProductVariant, ShippingMethod,
        ShippingMethodId, Thumbnail, UserId, VariantPricing,
    };
    use rust_decimal::Decimal;

    use super::*;
    use crate::i18n::Locale;
    use crate::views::Links;

    fn ctx() -> ViewContext {
        ViewContext {
            links: Links::new(&url::Url::parse("https://shop.example.com/").unwrap()),
            locale: Locale::En,
            price_display: PriceDisplay::Gross,
        }
    }

    fn usd(amount: i64) -> Money {
        Money::new(Decimal::new(amount, 2), "USD")
    }

    fn line(id: Option<&str>, variant: &str, quantity: u32, available: Option<u32>) -> CartLine {
        CartLine {
            id: id.map(LineId::new),
            quantity,
            total_price: Some(TaxedMoney::new(usd(1230), usd(1000))),
            variant: ProductVariant {
                id: VariantId::new(variant),
                name: "M".to_string(),
                sku: Some("TEE-M".to_string()),
                quantity_available: available,
                pricing: Some(VariantPricing {
                    price: Some(TaxedMoney::new(usd(615), usd(500))),
                }),
                attributes: Vec::new(),
                product: Some(ProductSummary {
                    id: Some(ProductId::new("UHJvZHVjdDox")),
                    name: Some("Linen tee".to_string()),
                    thumbnail: Some(Thumbnail {
                        url: Some("https://cdn.example.com/tee.png".to_string()),
                        alt: None,
                    }),
                }),
            },
        }
    }

    fn cart(lines: Vec<CartLine>) -> CartState {
        CartState {
            loaded: true,
            items: Some(lines),
            subtotal_price: Some(TaxedMoney::new(usd(2460), usd(2000))),
            total_price: Some(TaxedMoney::new(usd(2460), usd(2000))),
            shipping_price: None,
            discount: None,
        }
    }

    fn checkout(method_id: Option<&str>) -> CheckoutState {
        CheckoutState {
            token: CheckoutToken::new("7c2f2d84-9a51-4c7e-8f0e-3b6a1d2c4e5f"),
            shipping_method: Some(ShippingMethod {
                id: method_id.map(ShippingMethodId::new),
                name: Some("Courier".to_string()),
            }),
        }
    }

    fn user() -> User {
        User {
            id: UserId::new("VXNlcjox"),
            email: Email::parse("ada@example.com").unwrap(),
            first_name: Some("Ada".to_string()),
            last_name: None,
        }
    }

    fn populated(page: &CartPage) -> &PopulatedCart {
        page.populated().unwrap()
    }

    #[test]
    fn test_one_row_per_line_with_unique_keys() {
        let state = cart(vec![
            line(Some("L1"), "V1", 1, Some(5)),
            line(None, "V2", 2, Some(5)),
            line(Some("L3"), "V3", 1, Some(5)),
        ]);
        let page = compose(&state, None, None, &ctx());
        let keys: Vec<_> = populated(&page).rows.iter().map(|r| r.key.as_str()).collect();

        assert_eq!(keys, ["id-L1", "idx-1", "id-L3"]);
    }

    #[test]
    fn test_shipping_requires_method_id_and_price() {
        let mut state = cart(vec![line(Some("L1"), "V1", 1, None)]);
        state.shipping_price = Some(usd(799));

        let without_id = compose(&state, Some(&checkout(None)), None, &ctx());
        assert!(populated(&without_id).summary.shipping.is_none());

        let without_checkout = compose(&state, None, None, &ctx());
        assert!(populated(&without_checkout).summary.shipping.is_none());

        let with_id = compose(&state, Some(&checkout(Some("U2hpcDox"))), None, &ctx());
        let shipping = populated(&with_id).summary.shipping.clone().unwrap();
        assert_eq!(shipping.price.gross, usd(799));
        assert_eq!(shipping.price.net, usd(799));
        assert_eq!(shipping.display, "$7.99");

        state.shipping_price = None;
        let without_price = compose(&state, Some(&checkout(Some("U2hpcDox"))), None, &ctx());
        assert!(populated(&without_price).summary.shipping.is_none());
    }

    #[test]
    fn test_discount_only_when_present() {
        let mut state = cart(vec![line(Some("L1"), "V1", 1, None)]);
        let page = compose(&state, None, None, &ctx());
        assert!(populated(&page).summary.discount.is_none());

        state.discount = Some(usd(500));
        let page = compose(&state, None, None, &ctx());
        let discount = populated(&page).summary.discount.clone().unwrap();
        assert_eq!(discount.price.gross, discount.price.net);
        assert_eq!(discount.price.gross, usd(500));
        assert_eq!(discount.display, "-$5.00");
    }

    #[test]
    fn test_empty_state_when_not_loaded_or_no_items() {
        let mut state = cart(vec![line(Some("L1"), "V1", 1, None)]);
        state.loaded = false;
        assert!(compose(&state, None, None, &ctx()).empty_state().is_some());

        let page = compose(&cart(Vec::new()), None, None, &ctx());
        let empty = page.empty_state().unwrap();
        assert_eq!(empty.continue_shopping.href, "https://shop.example.com/");
        assert_eq!(empty.continue_shopping.testing_context, "cartPageContinueShoppingButton");

        let absent = CartState {
            items: None,
            ..CartState::empty()
        };
        assert!(compose(&absent, None, None, &ctx()).empty_state().is_some());
    }

    #[test]
    fn test_checkout_button_depends_on_user() {
        let state = cart(vec![line(Some("L1"), "V1", 1, None)]);

        let guest = compose(&state, None, None, &ctx());
        assert_eq!(populated(&guest).checkout_button.href, "/checkout/login");

        let signed_in = compose(&state, None, Some(&user()), &ctx());
        let button = &populated(&signed_in).checkout_button;
        assert_eq!(button.href, "/checkout");
        assert_eq!(button.testing_context, "proceedToCheckoutButton");
        assert_eq!(button.label, "PROCEED TO CHECKOUT");
    }

    #[test]
    fn test_max_quantity_falls_back_to_quantity() {
        let state = cart(vec![
            line(Some("L1"), "V1", 3, None),
            line(Some("L2"), "V2", 2, Some(0)),
            line(Some("L3"), "V3", 1, Some(9)),
        ]);
        let page = compose(&state, None, None, &ctx());
        let max: Vec<_> = populated(&page).rows.iter().map(|r| r.max_quantity).collect();
        assert_eq!(max, [3, 2, 9]);
    }

    #[test]
    fn test_absent_fields_render_empty() {
        let mut bare = line(None, "V1", 1, None);
        bare.total_price = None;
        bare.variant.pricing = None;
        bare.variant.product = None;
        bare.variant.sku = None;

        let page = compose(&cart(vec![bare]), None, None, &ctx());
        let row = &populated(&page).rows[0];
        assert_eq!(row.product_id, "");
        assert_eq!(row.name, "");
        assert_eq!(row.unit_price, "");
        assert_eq!(row.total_price, "");
        assert_eq!(row.thumbnail, ThumbnailView { url: String::new(), alt: String::new() });
    }

    #[test]
    fn test_row_prices_follow_display_mode() {
        let state = cart(vec![line(Some("L1"), "V1", 2, None)]);
        let gross = compose(&state, None, None, &ctx());
        assert_eq!(populated(&gross).rows[0].unit_price, "$6.15");

        let net_ctx = ViewContext {
            price_display: PriceDisplay::Net,
            ..ctx()
        };
        let net = compose(&state, None, None, &net_ctx);
        assert_eq!(populated(&net).rows[0].unit_price, "$5.00");
        assert_eq!(populated(&net).summary.subtotal, "$20.00");
    }

    #[test]
    fn test_row_actions_target_variant() {
        let state = cart(vec![line(Some("L1"), "V1", 2, None)]);
        let page = compose(&state, None, None, &ctx());
        let row = &populated(&page).rows[0];

        assert_eq!(
            row.remove(),
            CartMutation::Remove {
                variant: VariantId::new("V1")
            }
        );
        assert_eq!(
            row.change_quantity(4),
            CartMutation::SetQuantity {
                variant: VariantId::new("V1"),
                quantity: 4
            }
        );
    }

    #[tokio::test]
    async fn test_mutation_applies_through_sdk() {
        use crate::commerce::MemoryCommerce;

        let mut variant = line(None, "V1", 1, Some(10)).variant;
        variant.quantity_available = Some(10);
        let sdk = MemoryCommerce::new("USD").with_variant(variant);
        let token = sdk.add_item(None, &VariantId::new("V1"), 1).await.unwrap();

        CartMutation::SetQuantity {
            variant: VariantId::new("V1"),
            quantity: 3,
        }
        .apply(&sdk, &token)
        .await
        .unwrap();
        assert_eq!(sdk.cart(Some(&token)).await.unwrap().item_count(), 3);

        CartMutation::Remove {
            variant: VariantId::new("V1"),
        }
        .apply(&sdk, &token)
        .await
        .unwrap();
        assert!(sdk.cart(Some(&token)).await.unwrap().lines().is_empty());
    }
}
