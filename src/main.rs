//! Application entry point for the `plantsong` monitor appliance.
//!
//! This binary orchestrates the full startup sequence for the monitoring
//! loop, including:
//! - Loading configuration from environment variables or `.env`
//! - Initializing structured logging/tracing
//! - Wiring up the (simulated) sensor, display, and tone devices
//! - Building the status engine from the configured thresholds
//! - Enabling the AI melody path when `MELODY_API_URL` is set
//! - Running the monitoring loop until Ctrl-C or the error ceiling
//!
//! # Environment Variables
//! See [`plantsong::config::load_from_env`] for the full list; everything
//! has a default, so the binary runs out of the box on simulated inputs.

use std::time::Duration;

use anyhow::Result;
use dotenvy::dotenv;
use tokio::sync::watch;
use tracing::info;

use plantsong::ai::MelodyClient;
use plantsong::classify::{AmbientBounds, SoilThresholds, ThresholdClassifier};
use plantsong::config;
use plantsong::devices::{ConsoleDisplay, ConsoleTone, SimAmbientSensor, SimSoilSensor};
use plantsong::init_tracing;
use plantsong::monitor::PlantMonitor;
use plantsong::status::PlantStatusEngine;

// ---

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    init_tracing();
    dotenv().ok();

    let cfg = config::load_from_env()?;
    cfg.log_config();

    let classifier = ThresholdClassifier::new(
        SoilThresholds {
            dry: cfg.soil_dry_threshold,
            normal: cfg.soil_normal_threshold,
        },
        AmbientBounds {
            humidity_low: cfg.humidity_low,
            humidity_high: cfg.humidity_high,
            temperature_low: cfg.temperature_low,
            temperature_high: cfg.temperature_high,
        },
    );
    let engine = PlantStatusEngine::new(classifier);

    let client = match &cfg.melody_url {
        Some(url) => Some(MelodyClient::new(
            url.clone(),
            cfg.plant_type.clone(),
            cfg.plant_location.clone(),
            Duration::from_secs(cfg.request_timeout_secs),
            cfg.connect_retries,
        )?),
        None => {
            info!("MELODY_API_URL not set, running with deterministic tones only");
            None
        }
    };

    let soil = SimSoilSensor::new(cfg.sim_soil_value);
    let ambient = SimAmbientSensor::new(cfg.sim_humidity, cfg.sim_temperature);
    let mut monitor = PlantMonitor::new(
        soil,
        ambient,
        ConsoleDisplay,
        ConsoleTone::new(),
        engine,
        client,
        &cfg,
    );

    // Ctrl-C flips the stop flag; the loop finishes its current cycle and
    // shuts down.
    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received");
            let _ = stop_tx.send(true);
        }
    });

    monitor.run(stop_rx).await
}
