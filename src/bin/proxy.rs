//! Entry point for the `plantsong-proxy` melody service.
//!
//! A thin HTTP front for the generative-AI backend: accepts plant telemetry
//! on `POST /consulta`, forwards a rendered prompt upstream, and returns
//! the raw reply text for the appliance-side parser. The API key is read
//! from the environment; it never appears in monitor configuration.

use std::net::SocketAddr;

use anyhow::Result;
use axum::Router;
use dotenvy::dotenv;

use plantsong::config;
use plantsong::init_tracing;
use plantsong::routes::{self, ProxyState};

// ---

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    init_tracing();
    dotenv().ok();

    let cfg = config::load_proxy_from_env()?;
    cfg.log_config();

    let port = cfg.port;
    let state = ProxyState::new(cfg)?;

    // Build app from routes gateway (EMBP)
    let app: Router = routes::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
