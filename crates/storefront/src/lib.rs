//! Lantern Market storefront library.
//!
//! This crate provides the storefront as a library so the binary, the CLI,
//! and the integration tests all build the same application.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod seed;
pub mod services;
pub mod state;
pub mod store;

use std::any::Any;

use axum::{
    Json, Router,
    extract::{Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tower_sessions::SessionStore;

use crate::error::INTERNAL_ERROR_MESSAGE;
use crate::middleware::{SessionKeyError, request_id_middleware, with_sessions};
use crate::state::AppState;

/// Build the storefront application.
///
/// `sessions` backs the session cart; the caller picks the store to match
/// the product backend.
///
/// # Errors
///
/// Returns `SessionKeyError` if the session secret cannot sign cookies.
pub fn build_app<S>(state: AppState, sessions: S) -> Result<Router, SessionKeyError>
where
    S: SessionStore + Clone,
{
    let app = Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .with_state(state.clone());

    let app = with_sessions(app, sessions, state.config())?;

    Ok(app
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .layer(CatchPanicLayer::custom(panic_response))
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction()))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the product store is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// Turn a handler panic into the generic JSON 500.
#[allow(clippy::needless_pass_by_value)]
fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    tracing::error!(panic = detail, "handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": INTERNAL_ERROR_MESSAGE })),
    )
        .into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use tower::ServiceExt;
    use tower_sessions::MemoryStore;

    use super::*;
    use crate::state::testing::state_with;

    async fn get_status(app: Router, uri: &str) -> StatusCode {
        app.oneshot(axum::http::Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_health() {
        let (state, _) = state_with(&[]).await;
        let app = build_app(state, MemoryStore::default()).unwrap();
        assert_eq!(get_status(app, "/health").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_readiness_follows_store() {
        let (state, store) = state_with(&[]).await;
        let app = build_app(state, MemoryStore::default()).unwrap();
        assert_eq!(get_status(app.clone(), "/health/ready").await, StatusCode::OK);

        store.rows().set_offline(true);
        assert_eq!(
            get_status(app, "/health/ready").await,
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[allow(clippy::unused_async)]
    async fn boom() -> &'static str {
        panic!("boom")
    }

    #[tokio::test]
    async fn test_panic_becomes_json_500() {
        let app = Router::new()
            .route("/boom", get(boom))
            .layer(CatchPanicLayer::custom(panic_response));

        let response = app
            .oneshot(axum::http::Request::get("/boom").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(bytes, r#"{"error":"Internal server error"}"#);
    }

    #[tokio::test]
    async fn test_request_id_echoed() {
        let (state, _) = state_with(&[]).await;
        let app = build_app(state, MemoryStore::default()).unwrap();
        let response = app
            .oneshot(axum::http::Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response.headers().contains_key(middleware::REQUEST_ID_HEADER));
    }
}
