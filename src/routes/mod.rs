//! Route gateway for the melody proxy service (EMBP pattern).
//!
//! Each sibling module owns its endpoint handlers and exports a subrouter;
//! this gateway merges them so the proxy binary never needs to know about
//! individual endpoints.

use std::time::Duration;

use anyhow::Result;
use axum::Router;

use crate::config::ProxyConfig;

mod consulta;
mod health;

// ---

/// Shared state for all proxy routes.
#[derive(Clone)]
pub struct ProxyState {
    // ---
    pub http: reqwest::Client,
    pub config: ProxyConfig,
}

impl ProxyState {
    pub fn new(config: ProxyConfig) -> Result<Self> {
        // ---
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self { http, config })
    }
}

// ---

pub fn router(state: ProxyState) -> Router {
    // ---
    Router::new()
        .merge(consulta::router())
        .merge(health::router())
        .with_state(state)
}
