//! Cart page and cart mutations, end to end over the demo catalog.

use axum::http::StatusCode;
use larkspur_core::{Money, ShippingMethod, ShippingMethodId};
use larkspur_integration_tests::{
    DEMO_EMAIL, DEMO_PASSWORD, TEA_VARIANT, TEE_VARIANT, TestApp, demo_commerce,
};
use larkspur_storefront::shell::RenderMode;
use rust_decimal::Decimal;

#[tokio::test]
async fn test_new_visitor_sees_empty_cart() {
    let mut app = TestApp::new(RenderMode::Interactive);

    let page = app.get("/cart").await;

    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Your bag is empty"));
    assert!(page.body.contains("data-test=\"cartPageContinueShoppingButton\""));
    assert!(page.body.contains("href=\"http://shop.example.com/\""));
    assert!(!page.body.contains("data-test=\"cartPageTitle\""));
}

#[tokio::test]
async fn test_root_redirects_to_cart() {
    let mut app = TestApp::new(RenderMode::Interactive);

    let response = app.get("/").await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/cart"));
}

#[tokio::test]
async fn test_add_item_shows_populated_cart() {
    let mut app = TestApp::new(RenderMode::Interactive);

    let added = app
        .post("/cart/add", &[("variant_id", TEE_VARIANT), ("quantity", "2")])
        .await;
    assert_eq!(added.status, StatusCode::SEE_OTHER);
    assert_eq!(added.location(), Some("/cart"));

    let page = app.follow(&added).await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("data-test=\"cartPageTitle\""));
    assert!(page.body.contains("My Cart"));
    assert!(page.body.contains("Larkspur Tee"));
    assert!(page.body.contains("Size: M"));
    assert!(page.body.contains("value=\"2\""));
    assert!(page.body.contains("$24.60"));
    assert!(page.body.contains("$49.20"));
    assert!(page.body.contains("Added to your cart"));
}

#[tokio::test]
async fn test_guest_checkout_button_goes_to_login() {
    let mut app = TestApp::new(RenderMode::Interactive);
    app.post("/cart/add", &[("variant_id", TEE_VARIANT)]).await;

    let page = app.get("/cart").await;

    assert!(page.body.contains("data-test=\"proceedToCheckoutButton\""));
    assert!(page.body.contains("href=\"/checkout/login\""));
}

#[tokio::test]
async fn test_signed_in_checkout_button_goes_to_checkout() {
    let mut app = TestApp::new(RenderMode::Interactive);
    app.post("/cart/add", &[("variant_id", TEE_VARIANT)]).await;
    let signed_in = app
        .post(
            "/checkout/login",
            &[("email", DEMO_EMAIL), ("password", DEMO_PASSWORD)],
        )
        .await;
    assert_eq!(signed_in.status, StatusCode::SEE_OTHER);

    let page = app.get("/cart").await;

    assert!(page.body.contains("data-test=\"proceedToCheckoutButton\""));
    assert!(page.body.contains("href=\"/checkout\""));
    assert!(!page.body.contains("href=\"/checkout/login\""));
}

#[tokio::test]
async fn test_update_quantity() {
    let mut app = TestApp::new(RenderMode::Interactive);
    app.post("/cart/add", &[("variant_id", TEE_VARIANT)]).await;

    let updated = app
        .post("/cart/update", &[("variant_id", TEE_VARIANT), ("quantity", "3")])
        .await;
    let page = app.follow(&updated).await;

    assert!(page.body.contains("value=\"3\""));
    assert!(page.body.contains("$73.80"));
    assert!(page.body.contains("Your cart has been updated"));
}

#[tokio::test]
async fn test_update_beyond_stock_is_reported() {
    let mut app = TestApp::new(RenderMode::Interactive);
    app.post("/cart/add", &[("variant_id", TEA_VARIANT)]).await;

    let updated = app
        .post("/cart/update", &[("variant_id", TEA_VARIANT), ("quantity", "5")])
        .await;
    let page = app.follow(&updated).await;

    assert!(page.body.contains("toast--error"));
    assert!(page.body.contains("left in stock"));
    assert!(page.body.contains("value=\"1\""));
}

#[tokio::test]
async fn test_update_to_zero_removes_line() {
    let mut app = TestApp::new(RenderMode::Interactive);
    app.post("/cart/add", &[("variant_id", TEE_VARIANT)]).await;

    let updated = app
        .post("/cart/update", &[("variant_id", TEE_VARIANT), ("quantity", "0")])
        .await;
    let page = app.follow(&updated).await;

    assert!(page.body.contains("data-test=\"cartPageContinueShoppingButton\""));
}

#[tokio::test]
async fn test_remove_last_line_shows_empty_state() {
    let mut app = TestApp::new(RenderMode::Interactive);
    app.post("/cart/add", &[("variant_id", TEE_VARIANT)]).await;
    app.post("/cart/add", &[("variant_id", TEA_VARIANT)]).await;

    let removed = app.post("/cart/remove", &[("variant_id", TEE_VARIANT)]).await;
    let page = app.follow(&removed).await;
    assert!(page.body.contains("Loose Leaf Tea"));
    assert!(!page.body.contains("Larkspur Tee"));

    let removed = app.post("/cart/remove", &[("variant_id", TEA_VARIANT)]).await;
    let page = app.follow(&removed).await;
    assert!(page.body.contains("Your bag is empty"));
}

#[tokio::test]
async fn test_unknown_variant_is_reported_not_fatal() {
    let mut app = TestApp::new(RenderMode::Interactive);

    let added = app
        .post("/cart/add", &[("variant_id", "UHJvZHVjdFZhcmlhbnQ6OTk5")])
        .await;
    assert_eq!(added.status, StatusCode::SEE_OTHER);

    let page = app.follow(&added).await;
    assert!(page.body.contains("toast--error"));
}

#[tokio::test]
async fn test_zero_quantity_add_is_rejected() {
    let mut app = TestApp::new(RenderMode::Interactive);

    let added = app
        .post("/cart/add", &[("variant_id", TEE_VARIANT), ("quantity", "0")])
        .await;

    assert_eq!(added.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_mutation_without_cart_redirects() {
    let mut app = TestApp::new(RenderMode::Interactive);

    let removed = app.post("/cart/remove", &[("variant_id", TEE_VARIANT)]).await;

    assert_eq!(removed.status, StatusCode::SEE_OTHER);
    assert_eq!(removed.location(), Some("/cart"));
}

#[tokio::test]
async fn test_shipping_and_discount_lines_render() {
    let sdk = demo_commerce();
    let mut app = TestApp::with_sdk(RenderMode::Interactive, sdk.clone());

    let page = app
        .post("/cart/add", &[("variant_id", TEE_VARIANT), ("quantity", "1")])
        .await;
    let page = app.follow(&page).await;
    assert!(!page.body.contains("data-test=\"shippingPrice\""));
    assert!(!page.body.contains("data-test=\"discountPrice\""));

    let tokens = sdk.checkout_tokens();
    let [token] = tokens.as_slice() else {
        panic!("expected one cart, found {}", tokens.len());
    };
    let standard = ShippingMethod {
        id: Some(ShippingMethodId::new("U2hpcHBpbmdNZXRob2Q6MQ==")),
        name: Some("Standard".to_string()),
    };
    sdk.select_shipping_method(token, standard, Money::new(Decimal::new(500, 2), "USD"))
        .await
        .unwrap_or_else(|e| panic!("select shipping: {e}"));
    sdk.apply_discount(token, Money::new(Decimal::new(200, 2), "USD"))
        .await
        .unwrap_or_else(|e| panic!("apply discount: {e}"));

    let page = app.get("/cart").await;

    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("<dd data-test=\"shippingPrice\">$5.00</dd>"));
    assert!(page.body.contains("<dd data-test=\"discountPrice\">-$2.00</dd>"));
    assert!(page.body.contains("data-test=\"totalPrice\">$27.60</dd>"));
}
