//! Session middleware configuration.
//!
//! Session carts live in tower-sessions. The store is chosen by the caller:
//! `PostgresStore` in production, `MemoryStore` for the in-memory backend.

use axum::Router;
use secrecy::ExposeSecret;
use thiserror::Error;
use tower_sessions::cookie::Key;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "lm_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// The session secret could not be turned into a signing key.
#[derive(Debug, Error)]
#[error("session secret is not a usable signing key: {0}")]
pub struct SessionKeyError(String);

/// Wrap `router` in a signed-cookie session layer backed by `store`.
///
/// # Errors
///
/// Returns `SessionKeyError` if the configured secret is too short to derive
/// a cookie signing key.
pub fn with_sessions<S>(
    router: Router,
    store: S,
    config: &StorefrontConfig,
) -> Result<Router, SessionKeyError>
where
    S: SessionStore + Clone,
{
    let key = Key::try_from(config.session_secret.expose_secret().as_bytes())
        .map_err(|e| SessionKeyError(e.to_string()))?;

    let layer = SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(key);

    Ok(router.layer(layer))
}
