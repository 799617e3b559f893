//! Larkspur storefront library.
//!
//! Server-rendered cart and checkout-login pages in front of a headless
//! commerce backend. The crate is a library so the whole application can be
//! driven in-process by the integration tests; the binary in `main.rs` only
//! adds telemetry, static files and the listener.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod commerce;
pub mod config;
pub mod error;
pub mod filters;
pub mod i18n;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod shell;
pub mod state;
pub mod telemetry;
pub mod views;

use axum::{Router, middleware::from_fn, routing::get};

use state::AppState;

/// Build the application router with its middleware stack.
///
/// Static files, tracing and the Sentry layers are added by the binary.
pub fn app(state: AppState) -> Router {
    let session_layer = middleware::create_session_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .merge(routes::routes())
        .layer(session_layer)
        .layer(from_fn(middleware::csp_nonce_middleware))
        .layer(from_fn(middleware::security_headers_middleware))
        .layer(from_fn(middleware::request_id_middleware))
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check the backend.
async fn health() -> &'static str {
    "ok"
}
