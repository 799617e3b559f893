//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_BASE_URL` - Public URL of the shop; "continue shopping" links here
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_SSR_MODE` - Render static, non-interactive pages (default: false)
//! - `STOREFRONT_DISPLAY_GROSS_PRICES` - Show tax-inclusive prices (default: true)
//! - `STOREFRONT_DEMO_CATALOG` - JSON catalog for the in-memory backend
//! - `SALEOR_API_URL` - Saleor GraphQL endpoint; unset runs the in-memory backend
//! - `SALEOR_CHANNEL` - Sales channel slug (default: default-channel)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_APM` - Trace sampling rate, 0.0 to 1.0 (default: 0.0)
//! - `GTM_ID` - Google Tag Manager container ID

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use larkspur_core::PriceDisplay;
use thiserror::Error;
use url::Url;

use crate::shell::RenderMode;

const DEFAULT_CHANNEL: &str = "default-channel";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of the shop
    pub base_url: Url,
    /// Static (server-only) or interactive rendering
    pub render_mode: RenderMode,
    /// Which side of taxed prices shoppers see
    pub price_display: PriceDisplay,
    /// Commerce backend configuration
    pub commerce: CommerceConfig,
    /// Error reporting and analytics
    pub telemetry: TelemetryConfig,
}

/// Commerce backend configuration.
#[derive(Debug, Clone)]
pub struct CommerceConfig {
    /// Saleor GraphQL endpoint. `None` selects the in-memory backend.
    pub api_url: Option<Url>,
    /// Sales channel slug sent with every checkout operation
    pub channel: String,
    /// Catalog file for the in-memory backend
    pub demo_catalog: Option<PathBuf>,
}

/// Error reporting and analytics configuration.
#[derive(Debug, Clone, Default)]
pub struct TelemetryConfig {
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production")
    pub sentry_environment: Option<String>,
    /// Fraction of transactions sent to Sentry for tracing
    pub traces_sample_rate: f32,
    /// Google Tag Manager container ID
    pub gtm_id: Option<String>,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;
        let base_url = parse_url("STOREFRONT_BASE_URL", &get_required_env("STOREFRONT_BASE_URL")?)?;

        let render_mode = if get_bool_env("STOREFRONT_SSR_MODE", false)? {
            RenderMode::Static
        } else {
            RenderMode::Interactive
        };
        let price_display = if get_bool_env("STOREFRONT_DISPLAY_GROSS_PRICES", true)? {
            PriceDisplay::Gross
        } else {
            PriceDisplay::Net
        };

        Ok(Self {
            host,
            port,
            base_url,
            render_mode,
            price_display,
            commerce: CommerceConfig::from_env()?,
            telemetry: TelemetryConfig::from_env()?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether session cookies should be marked `Secure`.
    #[must_use]
    pub fn is_https(&self) -> bool {
        self.base_url.scheme() == "https"
    }
}

impl CommerceConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let api_url = get_optional_env("SALEOR_API_URL")
            .map(|raw| parse_url("SALEOR_API_URL", &raw))
            .transpose()?;

        Ok(Self {
            api_url,
            channel: get_env_or_default("SALEOR_CHANNEL", DEFAULT_CHANNEL),
            demo_catalog: get_optional_env("STOREFRONT_DEMO_CATALOG").map(PathBuf::from),
        })
    }
}

impl TelemetryConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let traces_sample_rate = parse_sample_rate(&get_env_or_default("SENTRY_APM", "0"))
            .map_err(|reason| ConfigError::InvalidEnvVar("SENTRY_APM".to_string(), reason))?;

        Ok(Self {
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            traces_sample_rate,
            gtm_id: get_optional_env("GTM_ID"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable. Blank values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Get a boolean flag, accepting the usual spellings.
fn get_bool_env(key: &str, default: bool) -> Result<bool, ConfigError> {
    get_optional_env(key).map_or(Ok(default), |raw| {
        parse_bool(&raw).ok_or_else(|| {
            ConfigError::InvalidEnvVar(key.to_string(), format!("expected a boolean, got {raw:?}"))
        })
    })
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme {:?}", url.scheme()),
        ));
    }
    Ok(url)
}

fn parse_sample_rate(raw: &str) -> Result<f32, String> {
    let rate = raw
        .trim()
        .parse::<f32>()
        .map_err(|e| format!("expected a number: {e}"))?;
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(format!("must be between 0.0 and 1.0 (got {rate})"))
    }
}
