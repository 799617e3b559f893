//! Application shell.
//!
//! Every page is rendered inside the same stack of layers, outermost first:
//!
//! ```text
//! Theme
//! └─ Notifications (bottom-right, 2500 ms)
//!    └─ Locale + global style reset
//!       └─ Router (static or history)
//!          └─ Query params
//!             └─ Commerce SDK (API URL, channel)
//!                └─ App
//!                   └─ page
//! ```
//!
//! Each layer renders as a `<div data-layer="...">` carrying its settings as
//! data attributes. The router variant is fixed when the shell is built:
//! [`RenderMode::Static`] gives plain links and full page loads,
//! [`RenderMode::Interactive`] adds the history router script.

pub mod notifications;

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use larkspur_core::{PriceDisplay, User};
use tower_sessions::Session;

use crate::config::StorefrontConfig;
use crate::filters;
use crate::i18n::{Locale, Message};
use crate::middleware::{CspNonce, OptionalUser};
use crate::state::AppState;
use crate::telemetry::{self, TagManager};
use crate::views::{Links, ViewContext};
use notifications::{Notification, NotificationConfig};

/// How pages are delivered to the browser.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenderMode {
    /// Server-only output: no client-side navigation.
    Static,
    /// Client-side navigation with browser history.
    #[default]
    Interactive,
}

impl RenderMode {
    /// Router variant for this mode.
    #[must_use]
    pub const fn router(self) -> RouterKind {
        match self {
            Self::Static => RouterKind::Static,
            Self::Interactive => RouterKind::History,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterKind {
    Static,
    History,
}

impl RouterKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::History => "history",
        }
    }
}

/// The single storefront theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub name: &'static str,
}

impl Default for Theme {
    fn default() -> Self {
        Self { name: "default" }
    }
}

/// Commerce backend settings exposed to the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdkConfig {
    /// `None` when running on the in-memory backend.
    pub api_url: Option<String>,
    pub channel: String,
}

impl SdkConfig {
    #[must_use]
    pub fn from_config(config: &StorefrontConfig) -> Self {
        Self {
            api_url: config.commerce.api_url.as_ref().map(ToString::to_string),
            channel: config.commerce.channel.clone(),
        }
    }
}

/// One level of the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layer {
    Theme(Theme),
    Notifications(NotificationConfig),
    /// Locale provider together with the global style reset.
    Locale(Locale),
    Router(RouterKind),
    /// The raw query string of the current URL.
    QueryParams(String),
    Sdk(SdkConfig),
    App,
}

impl Layer {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Theme(_) => "theme",
            Self::Notifications(_) => "notifications",
            Self::Locale(_) => "locale",
            Self::Router(_) => "router",
            Self::QueryParams(_) => "query-params",
            Self::Sdk(_) => "sdk",
            Self::App => "app",
        }
    }

    /// Data attributes rendered on the layer element.
    #[must_use]
    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::Theme(theme) => vec![("data-theme", theme.name.to_string())],
            Self::Notifications(config) => vec![
                ("data-position", config.position.as_str().to_string()),
                ("data-timeout", config.timeout_ms().to_string()),
            ],
            Self::Locale(locale) => vec![
                ("lang", locale.tag().to_string()),
                ("data-style-reset", "global".to_string()),
            ],
            Self::Router(kind) => vec![("data-router", kind.as_str().to_string())],
            Self::QueryParams(query) => vec![("data-query", query.clone())],
            Self::Sdk(sdk) => {
                let mut attrs = vec![("data-channel", sdk.channel.clone())];
                if let Some(url) = &sdk.api_url {
                    attrs.push(("data-api-url", url.clone()));
                }
                attrs
            }
            Self::App => Vec::new(),
        }
    }

    #[must_use]
    pub const fn is_notifications(&self) -> bool {
        matches!(self, Self::Notifications(_))
    }
}

/// Per-request inputs to the shell.
///
/// Extracted once per request; handlers also read the customer and view
/// context from it.
pub struct ShellContext {
    pub locale: Locale,
    pub query: String,
    pub nonce: CspNonce,
    pub user: Option<User>,
    pub sdk: SdkConfig,
    pub tag_manager: Option<TagManager>,
    pub links: Links,
    pub price_display: PriceDisplay,
    session: Option<Session>,
}

impl ShellContext {
    /// Context for composing views.
    #[must_use]
    pub fn view(&self) -> ViewContext {
        ViewContext {
            links: self.links.clone(),
            locale: self.locale,
            price_display: self.price_display,
        }
    }

    /// Build a context by hand, without a request or session.
    #[must_use]
    pub fn detached(config: &StorefrontConfig, locale: Locale) -> Self {
        Self {
            locale,
            query: String::new(),
            nonce: CspNonce::generate(),
            user: None,
            sdk: SdkConfig::from_config(config),
            tag_manager: None,
            links: Links::new(&config.base_url),
            price_display: config.price_display,
            session: None,
        }
    }
}

impl FromRequestParts<AppState> for ShellContext {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let config = state.config();
        let Ok(locale) = Locale::from_request_parts(parts, state).await;
        let Ok(nonce) = CspNonce::from_request_parts(parts, state).await;
        let Ok(OptionalUser(user)) = OptionalUser::from_request_parts(parts, state).await;

        Ok(Self {
            locale,
            query: parts.uri.query().unwrap_or_default().to_string(),
            nonce,
            user,
            sdk: SdkConfig::from_config(config),
            tag_manager: telemetry::get().and_then(|t| t.tag_manager().cloned()),
            links: Links::new(&config.base_url),
            price_display: config.price_display,
            session: parts.extensions.get::<Session>().cloned(),
        })
    }
}

/// A page body that can be placed inside the shell.
pub trait Page: Template {
    /// Document title.
    fn title(&self) -> &str;
}

/// The layer stack around one page.
pub struct Shell {
    layers: Vec<Layer>,
    router: RouterKind,
    ctx: ShellContext,
}

impl Shell {
    /// Build the layer stack. The router variant follows `mode`.
    #[must_use]
    pub fn new(ctx: ShellContext, mode: RenderMode) -> Self {
        let router = mode.router();
        let layers = vec![
            Layer::Theme(Theme::default()),
            Layer::Notifications(NotificationConfig::default()),
            Layer::Locale(ctx.locale),
            Layer::Router(router),
            Layer::QueryParams(ctx.query.clone()),
            Layer::Sdk(ctx.sdk.clone()),
            Layer::App,
        ];
        Self {
            layers,
            router,
            ctx,
        }
    }

    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    #[must_use]
    pub const fn router(&self) -> RouterKind {
        self.router
    }

    #[must_use]
    pub fn is_interactive(&self) -> bool {
        self.router == RouterKind::History
    }

    #[must_use]
    pub const fn locale(&self) -> Locale {
        self.ctx.locale
    }

    #[must_use]
    pub fn nonce(&self) -> &str {
        self.ctx.nonce.value()
    }

    #[must_use]
    pub const fn tag_manager(&self) -> Option<&TagManager> {
        self.ctx.tag_manager.as_ref()
    }

    #[must_use]
    pub fn user_name(&self) -> Option<&str> {
        self.ctx.user.as_ref().map(User::display_name)
    }

    #[must_use]
    pub const fn links(&self) -> &Links {
        &self.ctx.links
    }

    #[must_use]
    pub const fn text(&self, message: Message) -> &'static str {
        self.ctx.locale.text(message)
    }

    /// Render `page` and place it inside the layers.
    ///
    /// Drains the session's queued notifications into this render.
    ///
    /// # Errors
    ///
    /// Returns an error if the page template fails to render.
    pub async fn wrap<P: Page + Sync>(self, page: &P) -> Result<ShellPage, askama::Error> {
        let body = page.render()?;
        let notifications = match &self.ctx.session {
            Some(session) => notifications::drain(session).await,
            None => Vec::new(),
        };

        Ok(ShellPage {
            title: page.title().to_string(),
            body,
            notifications,
            shell: self,
        })
    }
}

/// A full HTML document.
#[derive(Template, WebTemplate)]
#[template(path = "layout.html")]
pub struct ShellPage {
    pub shell: Shell,
    pub title: String,
    pub body: String,
    pub notifications: Vec<Notification>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::{CommerceConfig, TelemetryConfig};

    fn config() -> StorefrontConfig {
        StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: url::Url::parse("https://shop.example.com/").unwrap(),
            render_mode: RenderMode::Interactive,
            price_display: PriceDisplay::Gross,
            commerce: CommerceConfig {
                api_url: Some(url::Url::parse("https://api.example.com/graphql/").unwrap()),
                channel: "default-channel".to_string(),
                demo_catalog: None,
            },
            telemetry: TelemetryConfig::default(),
        }
    }

    #[derive(Template)]
    #[template(source = "<p>hello</p>", ext = "html")]
    struct Hello;

    impl Page for Hello {
        fn title(&self) -> &str {
            "Hello"
        }
    }

    #[test]
    fn test_layer_order_is_fixed() {
        for mode in [RenderMode::Static, RenderMode::Interactive] {
            let shell = Shell::new(ShellContext::detached(&config(), Locale::En), mode);
            let names: Vec<_> = shell.layers().iter().map(Layer::name).collect();
            assert_eq!(
                names,
                ["theme", "notifications", "locale", "router", "query-params", "sdk", "app"]
            );
        }
    }

    #[test]
    fn test_render_mode_selects_router() {
        let static_shell = Shell::new(ShellContext::detached(&config(), Locale::En), RenderMode::Static);
        assert_eq!(static_shell.router(), RouterKind::Static);
        assert!(static_shell.layers().contains(&Layer::Router(RouterKind::Static)));

        let interactive = Shell::new(
            ShellContext::detached(&config(), Locale::En),
            RenderMode::Interactive,
        );
        assert_eq!(interactive.router(), RouterKind::History);
        assert!(interactive.is_interactive());
    }

    #[test]
    fn test_notification_layer_attributes() {
        let layer = Layer::Notifications(NotificationConfig::default());
        assert_eq!(
            layer.attributes(),
            vec![
                ("data-position", "bottom-right".to_string()),
                ("data-timeout", "2500".to_string())
            ]
        );
    }

    #[test]
    fn test_sdk_layer_carries_api_url_and_channel() {
        let layer = Layer::Sdk(SdkConfig::from_config(&config()));
        let attrs = layer.attributes();
        assert!(attrs.contains(&("data-channel", "default-channel".to_string())));
        assert!(attrs.contains(&("data-api-url", "https://api.example.com/graphql/".to_string())));
    }

    #[tokio::test]
    async fn test_wrap_nests_page_inside_layers() {
        let shell = Shell::new(ShellContext::detached(&config(), Locale::Pl), RenderMode::Static);
        let html = shell.wrap(&Hello).await.unwrap().render().unwrap();

        assert!(html.contains("<html lang=\"pl\">"));
        assert!(html.contains("<title>Hello</title>"));
        let theme = html.find("data-layer=\"theme\"").unwrap();
        let app = html.find("data-layer=\"app\"").unwrap();
        let body = html.find("<p>hello</p>").unwrap();
        assert!(theme < app && app < body);
        assert!(!html.contains("/static/derived/router."));
    }

    #[tokio::test]
    async fn test_interactive_shell_loads_router_script() {
        let shell = Shell::new(
            ShellContext::detached(&config(), Locale::En),
            RenderMode::Interactive,
        );
        let html = shell.wrap(&Hello).await.unwrap().render().unwrap();
        assert!(html.contains("/static/derived/router."));
    }
}
