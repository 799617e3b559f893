//! Larkspur Storefront - cart and checkout login.
//!
//! This binary serves the storefront on port 3000.
//!
//! # Architecture
//!
//! - Axum web framework, Askama templates for server-side rendering
//! - Saleor GraphQL API for carts and customers, or an in-memory demo
//!   catalog when no API URL is configured
//! - Sessions in memory; a restart empties every cart reference

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;

use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use larkspur_storefront::config::StorefrontConfig;
use larkspur_storefront::state::AppState;
use larkspur_storefront::{app, telemetry};

#[tokio::main]
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let config = StorefrontConfig::from_env().expect("Failed to load configuration");

    // Sentry must be initialized before the tracing subscriber
    let telemetry = telemetry::init(&config.telemetry);
    telemetry::init_tracing();
    if telemetry.sentry_enabled() {
        tracing::info!("Sentry initialized");
    }
    if let Some(tag_manager) = telemetry.tag_manager() {
        tracing::info!(container = %tag_manager.container_id, "Tag manager enabled");
    }

    let state = AppState::from_config(config.clone())
        .expect("Failed to initialize application state");

    // Sentry layers outermost for full request coverage
    let app = app(state)
        .nest_service("/static", ServeDir::new("crates/storefront/static"))
        .layer(
            ServiceBuilder::new()
                .layer(sentry_tower::NewSentryLayer::new_from_top())
                .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
                .layer(TraceLayer::new_for_http()),
        );

    let addr = config.socket_addr();
    tracing::info!("storefront listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    // Connect info feeds the rate limiter's fallback client key
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Server error");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
