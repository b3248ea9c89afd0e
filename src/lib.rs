//! `plantsong`: a plant-monitoring appliance with AI-generated melody
//! alerts, plus the companion proxy that fronts the generative-AI backend.
//!
//! Pipeline: sensors -> [`classify::ThresholdClassifier`] ->
//! [`status::PlantStatusEngine`] -> either the deterministic [`mood`] path
//! or the melody service via [`ai::MelodyClient`] and [`melody::parse`] ->
//! [`dispatch::AlertDispatchPolicy`] picks what the [`monitor`] loop
//! renders to the display and tone devices.
//!
//! This crate follows the Explicit Module Boundary Pattern (EMBP): binaries
//! depend on this gateway's re-exports, and route modules only know their
//! parent gateway.

use std::env;
use std::io::IsTerminal;

use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

pub mod ai;
pub mod classify;
pub mod config;
pub mod devices;
pub mod dispatch;
pub mod melody;
pub mod models;
pub mod monitor;
pub mod mood;
pub mod routes;
pub mod status;

pub use config::{Config, ProxyConfig};
pub use models::{
    AmbientAssessment, AmbientCategory, AmbientQuality, OverallStatus, PlantStatus,
    PriorityAction, SoilMoistureCategory, ToneStep,
};

// ---

/// Initialize the global tracing subscriber for structured logging.
///
/// This function configures the [`tracing_subscriber`] with:
/// - Log target, file, and line number output enabled
/// - Color output controlled by TTY detection and `FORCE_COLOR` env var:
///   - `FORCE_COLOR=1|true|yes`: force colors on
///   - `FORCE_COLOR=0|false|no`: force colors off
///   - unset or other values: auto-detect TTY
/// - Span event emission mode controlled by the `PLANTSONG_SPAN_EVENTS` env var:
///   - `"full"`       : emit ENTER, EXIT, and CLOSE events with timing
///   - `"enter_exit"` : emit ENTER and EXIT only
///   - unset or other values: emit CLOSE events only (default)
/// - Log level controlled by the `PLANTSONG_LOG_LEVEL` env var
///
/// This should be called once at application startup before any logging
/// or tracing macros are invoked. It installs the subscriber globally
/// for the lifetime of the process.
pub fn init_tracing() {
    // ---
    let span_events = match env::var("PLANTSONG_SPAN_EVENTS").as_deref() {
        Ok("full") => FmtSpan::FULL,
        Ok("enter_exit") => FmtSpan::ENTER | FmtSpan::EXIT,
        _ => FmtSpan::CLOSE,
    };

    // Determine if we should use colors
    let use_color = match env::var("FORCE_COLOR").as_deref() {
        Ok("1") | Ok("true") | Ok("yes") => true,
        Ok("0") | Ok("false") | Ok("no") => false,
        _ => std::io::stdout().is_terminal(),
    };

    // Use RUST_LOG if available, otherwise fall back to PLANTSONG_LOG_LEVEL
    let env_filter = if env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match env::var("PLANTSONG_LOG_LEVEL").ok().as_deref() {
            Some("trace") => "trace",
            Some("debug") => "debug",
            Some("info") => "info",
            Some("warn") => "warn",
            Some("error") => "error",
            _ => "info",
        };
        EnvFilter::new(format!("{level},hyper_util=warn,reqwest=warn"))
    };

    tracing_subscriber::fmt()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(span_events)
        .with_env_filter(env_filter)
        .with_ansi(use_color)
        .compact()
        .init();
}
