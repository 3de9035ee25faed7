//! Lantern Market storefront: catalog, session cart, checkout, and stock.
//!
//! This binary serves the public JSON API on port 3000.
//!
//! # Architecture
//!
//! - Axum web framework
//! - Product store chosen at startup:
//!   - `postgres`: `PostgreSQL` with atomic conditional decrements
//!   - `memory`: process-local rows behind per-product locks
//! - Session carts in tower-sessions (`PostgreSQL` or memory, matching the
//!   product store)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;
use std::time::Duration;

use lantern_storefront::config::{ConfigError, StoreBackend, StorefrontConfig};
use lantern_storefront::middleware::SessionKeyError;
use lantern_storefront::seed::{self, SeedError, SeedFile};
use lantern_storefront::state::AppState;
use lantern_storefront::store::{MemoryRowStore, PgProductStore, SerializedStore};
use lantern_storefront::{build_app, db};
use sentry::integrations::tracing as sentry_tracing;
use thiserror::Error;
use tower_sessions::{ExpiredDeletion, MemoryStore};
use tower_sessions_sqlx_store::PostgresStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How often expired `PostgreSQL` sessions are purged.
const SESSION_CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Errors that stop the server from starting.
#[derive(Debug, Error)]
enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("seed error: {0}")]
    Seed(#[from] SeedError),

    #[error("{0}")]
    SessionKey(#[from] SessionKeyError),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry.dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry
                .environment
                .clone()
                .map(std::borrow::Cow::Owned),
            sample_rate: config.sentry.sample_rate,
            traces_sample_rate: config.sentry.traces_sample_rate,
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
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

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    // Load configuration from environment (needed for Sentry init)
    let config = StorefrontConfig::from_env()?;

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "lantern_storefront=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let addr = config.socket_addr();

    // The product store is built once here and injected into the state.
    let app = match config.store.clone() {
        StoreBackend::Postgres { database_url } => {
            let pool = db::create_pool(&database_url).await?;
            tracing::info!("Database pool created");

            // NOTE: Migrations are NOT run automatically on startup.
            // Run them explicitly via: cargo run -p lantern-cli -- migrate

            let sessions = PostgresStore::new(pool.clone());
            tokio::spawn(
                sessions
                    .clone()
                    .continuously_delete_expired(SESSION_CLEANUP_INTERVAL),
            );

            let state = AppState::new(config, Arc::new(PgProductStore::new(pool)));
            build_app(state, sessions)?
        }
        StoreBackend::Memory { seed_file } => {
            tracing::warn!("Using the in-memory store; stock is lost on restart");
            let store = Arc::new(SerializedStore::new(MemoryRowStore::new()));

            if let Some(path) = seed_file {
                let seed_data = SeedFile::load(&path).await?;
                let report = seed::apply(store.as_ref(), &seed_data).await;
                if !report.errors.is_empty() {
                    tracing::warn!(
                        failed = report.errors.len(),
                        path = %path.display(),
                        "some seed products were rejected"
                    );
                }
            }

            let state = AppState::new(config, store);
            build_app(state, MemoryStore::default())?
        }
    };

    tracing::info!("storefront listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
