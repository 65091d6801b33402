//! API Router and Application State
//!
//! Central routing configuration and shared state.

use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::platform::SessionProvider;
use crate::receiver::handlers;

/// Shared application state.
#[derive(Clone)]
pub struct AppState<P: SessionProvider> {
    /// Platform session provider
    pub provider: P,
    /// Server configuration
    pub config: Arc<Config>,
}

impl<P: SessionProvider> AppState<P> {
    /// Create new application state.
    #[must_use]
    pub fn new(provider: P, config: Config) -> Self {
        Self {
            provider,
            config: Arc::new(config),
        }
    }
}

/// Create the main application router.
pub fn create_router<P: SessionProvider>(state: AppState<P>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/events/process", post(handlers::process_event::<P>))
        .route(
            "/events/process-oneway",
            post(handlers::process_one_way_event),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// Health check endpoint.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
