//! Content Security Policy with per-request script nonces.
//!
//! Every request gets a fresh nonce. Templates stamp it on inline scripts
//! (the tag manager bootstrap) and the policy header allows exactly that
//! nonce, so no `'unsafe-inline'` is needed.

use std::fmt;

use axum::{
    extract::{FromRequestParts, Request},
    http::{HeaderValue, header::CONTENT_SECURITY_POLICY, request::Parts},
    middleware::Next,
    response::Response,
};
use base64::{Engine, engine::general_purpose::STANDARD};
use rand::RngCore;

const TAG_MANAGER_ORIGIN: &str = "https://www.googletagmanager.com";
const ANALYTICS_ORIGINS: &str = "https://www.google-analytics.com https://*.google-analytics.com";

/// A CSP nonce value for inline scripts (128-bit, base64-encoded).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CspNonce(pub String);

impl CspNonce {
    /// Generate a new random nonce.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; 16];
        rand::rng().fill_bytes(&mut bytes);
        Self(STANDARD.encode(bytes))
    }

    /// Get the nonce value for use in templates.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CspNonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Build the policy for a response rendered with `nonce`.
///
/// Product images come from the commerce backend's media host, which is
/// not known up front, so `img-src` admits any HTTPS origin.
#[must_use]
pub fn content_security_policy(nonce: &CspNonce) -> String {
    format!(
        "default-src 'none'; \
         script-src 'self' 'nonce-{nonce}' {TAG_MANAGER_ORIGIN}; \
         style-src 'self'; \
         font-src 'self'; \
         img-src 'self' https: data:; \
         connect-src 'self' {TAG_MANAGER_ORIGIN} {ANALYTICS_ORIGINS}; \
         frame-src {TAG_MANAGER_ORIGIN}; \
         object-src 'none'; \
         base-uri 'self'; \
         form-action 'self'; \
         frame-ancestors 'none'"
    )
}

/// Generate a nonce for the request and set the matching CSP header on the
/// response.
pub async fn csp_nonce_middleware(mut request: Request, next: Next) -> Response {
    let nonce = CspNonce::generate();
    request.extensions_mut().insert(nonce.clone());

    let mut response = next.run(request).await;
    match HeaderValue::from_str(&content_security_policy(&nonce)) {
        Ok(value) => {
            response.headers_mut().insert(CONTENT_SECURITY_POLICY, value);
        }
        Err(e) => tracing::error!("Invalid CSP header value: {e}"),
    }
    response
}

/// Extractor to get the CSP nonce from request extensions.
impl<S> FromRequestParts<S> for CspNonce
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Self>().cloned().unwrap_or_else(|| {
            tracing::warn!(
                "CSP nonce not found in request extensions - middleware may be misconfigured"
            );
            Self(String::new())
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nonces_are_unique() {
        let a = CspNonce::generate();
        let b = CspNonce::generate();
        assert_ne!(a, b);
        assert_eq!(a.value().len(), 24);
    }

    #[test]
    fn test_policy_allows_only_this_nonce() {
        let nonce = CspNonce("abc123==".to_string());
        let policy = content_security_policy(&nonce);
        assert!(policy.contains("script-src 'self' 'nonce-abc123==' https://www.googletagmanager.com;"));
        assert!(!policy.contains("unsafe-inline"));
        assert!(policy.contains("frame-ancestors 'none'"));
    }
}
