//! Process-wide telemetry: Sentry error reporting, the tag manager and the
//! tracing subscriber.
//!
//! [`init`] runs its body at most once per process. Later calls return the
//! state built by the first one, whatever configuration they pass. Nothing
//! is torn down; the Sentry guard lives until the process exits.

use std::sync::OnceLock;

use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::TelemetryConfig;

static TELEMETRY: OnceLock<Telemetry> = OnceLock::new();

/// Google Tag Manager container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagManager {
    pub container_id: String,
}

impl TagManager {
    /// URL of the container's loader script.
    #[must_use]
    pub fn script_url(&self) -> String {
        format!(
            "https://www.googletagmanager.com/gtm.js?id={}",
            self.container_id
        )
    }
}

/// What [`init`] set up.
pub struct Telemetry {
    tag_manager: Option<TagManager>,
    sentry: Option<sentry::ClientInitGuard>,
}

impl Telemetry {
    #[must_use]
    pub const fn tag_manager(&self) -> Option<&TagManager> {
        self.tag_manager.as_ref()
    }

    #[must_use]
    pub const fn sentry_enabled(&self) -> bool {
        self.sentry.is_some()
    }
}

/// Initialize the tag manager and Sentry, once.
///
/// The tag manager is only set up when a container id is configured, and
/// Sentry only when a DSN is. Must run before [`init_tracing`] so the
/// Sentry tracing layer has a client to report to.
pub fn init(config: &TelemetryConfig) -> &'static Telemetry {
    TELEMETRY.get_or_init(|| Telemetry {
        tag_manager: config.gtm_id.clone().map(|container_id| TagManager { container_id }),
        sentry: init_sentry(config),
    })
}

/// The telemetry set up by [`init`], if it has run.
#[must_use]
pub fn get() -> Option<&'static Telemetry> {
    TELEMETRY.get()
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &TelemetryConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            traces_sample_rate: config.traces_sample_rate,
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Install the global tracing subscriber.
///
/// Defaults to info level for this crate if `RUST_LOG` is not set.
pub fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "larkspur_storefront=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_runs_once() {
        let first = init(&TelemetryConfig {
            gtm_id: Some("GTM-FIRST".to_string()),
            ..TelemetryConfig::default()
        });
        let second = init(&TelemetryConfig {
            gtm_id: Some("GTM-SECOND".to_string()),
            ..TelemetryConfig::default()
        });

        assert!(std::ptr::eq(first, second));
        assert_eq!(
            second.tag_manager().map(|t| t.container_id.as_str()),
            Some("GTM-FIRST")
        );
        assert!(!second.sentry_enabled());
        assert!(get().is_some());
    }

    #[test]
    fn test_tag_manager_script_url() {
        let tag_manager = TagManager {
            container_id: "GTM-ABC123".to_string(),
        };
        assert_eq!(
            tag_manager.script_url(),
            "https://www.googletagmanager.com/gtm.js?id=GTM-ABC123"
        );
    }
}
