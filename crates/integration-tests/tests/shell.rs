//! Page shell: layer order, router selection, locale and response headers.

use axum::http::StatusCode;
use larkspur_integration_tests::TestApp;
use larkspur_storefront::shell::RenderMode;

const LAYERS: [&str; 7] = [
    "theme",
    "notifications",
    "locale",
    "router",
    "query-params",
    "sdk",
    "app",
];

#[tokio::test]
async fn test_layers_wrap_page_in_order() {
    let mut app = TestApp::new(RenderMode::Interactive);

    let page = app.get("/cart").await;

    let positions: Vec<usize> = LAYERS
        .iter()
        .map(|name| {
            page.body
                .find(&format!("data-layer=\"{name}\""))
                .unwrap_or_else(|| panic!("missing layer {name}"))
        })
        .collect();
    assert!(positions.windows(2).all(|pair| pair.first() < pair.last()));

    let main = page.body.find("<main id=\"main\">");
    assert!(main.is_some_and(|main| positions.last().is_some_and(|&app| app < main)));
}

#[tokio::test]
async fn test_interactive_mode_uses_history_router() {
    let mut app = TestApp::new(RenderMode::Interactive);

    let page = app.get("/cart").await;

    assert!(page.body.contains("data-router=\"history\""));
    assert!(page.body.contains("/static/derived/router."));
}

#[tokio::test]
async fn test_static_mode_ships_no_router() {
    let mut app = TestApp::new(RenderMode::Static);

    let page = app.get("/cart").await;

    assert!(page.body.contains("data-router=\"static\""));
    assert!(!page.body.contains("/static/derived/router."));
}

#[tokio::test]
async fn test_layer_attributes() {
    let mut app = TestApp::new(RenderMode::Interactive);

    let page = app.get("/checkout/login?overlay=password").await;

    assert!(page.body.contains("data-position=\"bottom-right\""));
    assert!(page.body.contains("data-timeout=\"2500\""));
    assert!(page.body.contains("data-style-reset=\"global\""));
    assert!(page.body.contains("data-channel=\"default-channel\""));
    assert!(page.body.contains("data-query=\"overlay=password\""));
}

#[tokio::test]
async fn test_accept_language_selects_locale() {
    let mut app = TestApp::new(RenderMode::Interactive);

    let page = app
        .get_with_headers("/cart", &[("accept-language", "pl-PL,pl;q=0.9,en;q=0.5")])
        .await;

    assert!(page.body.contains("<html lang=\"pl\">"));
    assert!(page.body.contains("KONTYNUUJ ZAKUPY"));
}

#[tokio::test]
async fn test_csp_nonce_matches_scripts() {
    let mut app = TestApp::new(RenderMode::Interactive);

    let page = app.get("/cart").await;

    let policy = page
        .header("content-security-policy")
        .unwrap_or_else(|| panic!("no CSP header"));
    let nonce = policy
        .split("'nonce-")
        .nth(1)
        .and_then(|rest| rest.split('\'').next())
        .unwrap_or_else(|| panic!("no nonce in {policy}"));
    assert!(!nonce.is_empty());
    assert!(page.body.contains(&format!("nonce=\"{nonce}\"")));
}

#[tokio::test]
async fn test_security_headers_present() {
    let mut app = TestApp::new(RenderMode::Interactive);

    let page = app.get("/cart").await;

    assert_eq!(page.header("x-frame-options"), Some("DENY"));
    assert_eq!(page.header("x-content-type-options"), Some("nosniff"));
    assert_eq!(page.header("cache-control"), Some("no-store, max-age=0"));
    assert!(page.header("x-request-id").is_some());
}

#[tokio::test]
async fn test_health() {
    let mut app = TestApp::new(RenderMode::Static);

    let response = app.get("/health").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, "ok");
}
