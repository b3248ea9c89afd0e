// src/routes/health.rs
//! Service banner and health check endpoints for the melody proxy.
//!
//! `GET /` doubles as the connectivity probe for the monitor appliance: the
//! monitor's client performs bounded-retry GETs against it before the first
//! melody request. `GET /health` serves container orchestrators and CI.
//! Both are deliberately lightweight and never touch the upstream AI
//! backend.

use axum::{routing::get, Json, Router};
use serde::Serialize;

/// JSON response body for the `/` banner endpoint.
#[derive(Serialize)]
struct BannerResponse {
    message: &'static str,
    status: &'static str,
}

/// JSON response body for the `/health` endpoint.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// Handle `GET /`.
async fn banner() -> Json<BannerResponse> {
    // ---
    Json(BannerResponse {
        message: "Plant AI Melody Generator",
        status: "running",
    })
}

/// Handle `GET /health`.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Create a subrouter containing the banner and health routes.
///
/// Generic over the application state so it merges cleanly with the
/// gateway router regardless of the state type.
pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(banner))
        .route("/health", get(health))
}
