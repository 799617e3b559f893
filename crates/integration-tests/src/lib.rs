//! Integration tests for Larkspur.
//!
//! The storefront is driven in-process: [`TestApp`] builds the full router
//! over the demo catalog and sends requests through it with `oneshot`,
//! carrying the session cookie from one request to the next the way a
//! browser would.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p larkspur-integration-tests
//! ```

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use larkspur_core::PriceDisplay;
use larkspur_storefront::commerce::MemoryCommerce;
use larkspur_storefront::config::{CommerceConfig, StorefrontConfig, TelemetryConfig};
use larkspur_storefront::middleware::session::SESSION_COOKIE_NAME;
use larkspur_storefront::shell::RenderMode;
use larkspur_storefront::state::AppState;
use tower::ServiceExt;

/// Variant in the demo catalog with 12 in stock.
pub const TEE_VARIANT: &str = "UHJvZHVjdFZhcmlhbnQ6MjAz";
/// Variant in the demo catalog with 3 in stock.
pub const TEA_VARIANT: &str = "UHJvZHVjdFZhcmlhbnQ6MzAx";
pub const DEMO_EMAIL: &str = "demo@example.com";
pub const DEMO_PASSWORD: &str = "larkspur-demo";

/// In-memory backend over the demo catalog.
///
/// # Panics
///
/// Panics if the demo catalog cannot be loaded.
#[must_use]
pub fn demo_commerce() -> MemoryCommerce {
    let catalog = Path::new(env!("CARGO_MANIFEST_DIR")).join("../storefront/demo/catalog.json");
    MemoryCommerce::load(&catalog).unwrap_or_else(|e| panic!("demo catalog: {e}"))
}

/// A response with its body read to a string.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// The `Location` header, if any.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    /// A response header as a string.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// The storefront with one browser's cookie jar.
pub struct TestApp {
    router: Router,
    cookie: Option<String>,
}

impl TestApp {
    /// Storefront over the demo catalog.
    ///
    /// # Panics
    ///
    /// Panics if the demo catalog cannot be loaded.
    #[must_use]
    pub fn new(render_mode: RenderMode) -> Self {
        Self::with_sdk(render_mode, demo_commerce())
    }

    /// Storefront over a given in-memory backend.
    #[must_use]
    pub fn with_sdk(render_mode: RenderMode, sdk: MemoryCommerce) -> Self {
        let state = AppState::new(config(render_mode), Arc::new(sdk));
        Self {
            router: larkspur_storefront::app(state),
            cookie: None,
        }
    }

    /// Send a GET request.
    pub async fn get(&mut self, path: &str) -> TestResponse {
        self.get_with_headers(path, &[]).await
    }

    /// Send a GET request with extra headers.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the router fails.
    pub async fn get_with_headers(&mut self, path: &str, headers: &[(&str, &str)]) -> TestResponse {
        let mut builder = Request::get(path);
        for &(name, value) in headers {
            builder = builder.header(name, value);
        }
        let request = self
            .with_cookie(builder)
            .body(Body::empty())
            .unwrap_or_else(|e| panic!("request: {e}"));
        self.send(request).await
    }

    /// Send a form POST.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the router fails.
    pub async fn post(&mut self, path: &str, form: &[(&str, &str)]) -> TestResponse {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(form)
            .finish();
        let builder = Request::post(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        let request = self
            .with_cookie(builder)
            .body(Body::from(body))
            .unwrap_or_else(|e| panic!("request: {e}"));
        self.send(request).await
    }

    /// Follow a `303 See Other` with a GET, as a browser does after a form
    /// post.
    ///
    /// # Panics
    ///
    /// Panics if `response` is not a redirect.
    pub async fn follow(&mut self, response: &TestResponse) -> TestResponse {
        assert_eq!(response.status, StatusCode::SEE_OTHER, "{}", response.body);
        let location = response
            .location()
            .unwrap_or_else(|| panic!("redirect without Location"))
            .to_string();
        self.get(&location).await
    }

    fn with_cookie(&self, builder: axum::http::request::Builder) -> axum::http::request::Builder {
        match &self.cookie {
            Some(cookie) => builder.header(header::COOKIE, cookie),
            None => builder,
        }
    }

    async fn send(&mut self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .unwrap_or_else(|e| match e {});

        for value in response.headers().get_all(header::SET_COOKIE) {
            if let Some(pair) = value
                .to_str()
                .ok()
                .and_then(|raw| raw.split(';').next())
                .filter(|pair| pair.starts_with(&format!("{SESSION_COOKIE_NAME}=")))
            {
                self.cookie = Some(pair.to_string());
            }
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap_or_else(|e| panic!("body: {e}"));

        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}

fn config(render_mode: RenderMode) -> StorefrontConfig {
    StorefrontConfig {
        host: std::net::IpAddr::from([127, 0, 0, 1]),
        port: 3000,
        base_url: url::Url::parse("http://shop.example.com/")
            .unwrap_or_else(|e| panic!("base url: {e}")),
        render_mode,
        price_display: PriceDisplay::Gross,
        commerce: CommerceConfig {
            api_url: None,
            channel: "default-channel".to_string(),
            demo_catalog: None,
        },
        telemetry: TelemetryConfig::default(),
    }
}
