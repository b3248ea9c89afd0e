//! Configuration loader for the `plantsong` appliance.
//!
//! This module centralizes all runtime configuration values and their
//! defaults, loading from environment variables (with optional `.env` file
//! support provided by the caller). By consolidating configuration logic
//! here, we avoid scattering `env::var` calls throughout the codebase.
//!
//! Defaults mirror the firmware constants: soil thresholds 26000/20000 over
//! the raw probe range, 6 s loop delay, 30 s minimum AI request interval,
//! and a ceiling of 5 consecutive cycle errors.

use std::env;

use anyhow::{anyhow, Result};

/// Parse an optional environment variable of the given type with a default.
macro_rules! parse_env {
    ($var_name:expr, $ty:ty, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<$ty>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse a required string environment variable.
macro_rules! require_env {
    ($var_name:expr) => {
        env::var($var_name)
            .map_err(|_| anyhow!("{} must be set in .env or environment", $var_name))?
    };
}

/// Strongly typed monitor configuration.
///
/// All fields are immutable after loading, ensuring a consistent
/// configuration snapshot for the lifetime of the application. Threshold
/// calibration at runtime happens on the classifier, not here.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// Raw soil readings above this are dry soil.
    pub soil_dry_threshold: u16,

    /// Raw soil readings below this are humid soil.
    pub soil_normal_threshold: u16,

    /// Ambient humidity comfort bounds (%RH).
    pub humidity_low: f32,
    pub humidity_high: f32,

    /// Ambient temperature comfort bounds (°C).
    pub temperature_low: f32,
    pub temperature_high: f32,

    /// Melody proxy base URL. Unset disables the AI path entirely; the
    /// monitor then runs on deterministic tones alone.
    pub melody_url: Option<String>,

    /// Plant identity sent with every melody request.
    pub plant_type: String,
    pub plant_location: String,

    /// Minimum seconds between outbound melody requests.
    pub ai_request_interval_secs: u64,

    /// Per-request network timeout in seconds.
    pub request_timeout_secs: u64,

    /// Bounded connection attempts before reporting a connectivity error.
    pub connect_retries: u32,

    /// Seconds between monitoring cycles.
    pub loop_delay_secs: u64,

    /// Consecutive cycle failures before the monitor halts.
    pub max_consecutive_errors: u32,

    /// Baseline raw value for the simulated soil probe.
    pub sim_soil_value: u16,

    /// Simulated room conditions for the ambient sensor.
    pub sim_humidity: f32,
    pub sim_temperature: f32,
}

/// Load monitor configuration from environment variables with defaults.
///
/// All variables are optional:
/// - `SOIL_DRY_THRESHOLD` / `SOIL_NORMAL_THRESHOLD` – raw probe thresholds
/// - `HUMIDITY_LOW` / `HUMIDITY_HIGH` – ambient humidity bounds (%RH)
/// - `TEMPERATURE_LOW` / `TEMPERATURE_HIGH` – ambient temperature bounds (°C)
/// - `MELODY_API_URL` – melody proxy base URL (unset = deterministic only)
/// - `PLANT_TYPE` / `PLANT_LOCATION` – plant identity for melody requests
/// - `AI_REQUEST_INTERVAL` – min seconds between melody requests (default: 30)
/// - `REQUEST_TIMEOUT` – network timeout seconds (default: 30)
/// - `CONNECT_RETRIES` – connection attempts (default: 3)
/// - `LOOP_DELAY` – seconds between cycles (default: 6)
/// - `MAX_CONSECUTIVE_ERRORS` – error ceiling before halting (default: 5)
/// - `SIM_SOIL_VALUE` / `SIM_HUMIDITY` / `SIM_TEMPERATURE` – simulated inputs
///
/// Returns an error if any variable is present but unparseable.
pub fn load_from_env() -> Result<Config> {
    // ---
    let soil_dry_threshold = parse_env!("SOIL_DRY_THRESHOLD", u16, 26000);
    let soil_normal_threshold = parse_env!("SOIL_NORMAL_THRESHOLD", u16, 20000);

    if soil_dry_threshold <= soil_normal_threshold {
        return Err(anyhow!(
            "SOIL_DRY_THRESHOLD ({}) must be above SOIL_NORMAL_THRESHOLD ({})",
            soil_dry_threshold,
            soil_normal_threshold
        ));
    }

    Ok(Config {
        soil_dry_threshold,
        soil_normal_threshold,
        humidity_low: parse_env!("HUMIDITY_LOW", f32, 30.0),
        humidity_high: parse_env!("HUMIDITY_HIGH", f32, 70.0),
        temperature_low: parse_env!("TEMPERATURE_LOW", f32, 15.0),
        temperature_high: parse_env!("TEMPERATURE_HIGH", f32, 30.0),
        melody_url: env::var("MELODY_API_URL").ok(),
        plant_type: env::var("PLANT_TYPE").unwrap_or_else(|_| "Pothos".to_string()),
        plant_location: env::var("PLANT_LOCATION").unwrap_or_else(|_| "Living room".to_string()),
        ai_request_interval_secs: parse_env!("AI_REQUEST_INTERVAL", u64, 30),
        request_timeout_secs: parse_env!("REQUEST_TIMEOUT", u64, 30),
        connect_retries: parse_env!("CONNECT_RETRIES", u32, 3),
        loop_delay_secs: parse_env!("LOOP_DELAY", u64, 6),
        max_consecutive_errors: parse_env!("MAX_CONSECUTIVE_ERRORS", u32, 5),
        sim_soil_value: parse_env!("SIM_SOIL_VALUE", u16, 23000),
        sim_humidity: parse_env!("SIM_HUMIDITY", f32, 50.0),
        sim_temperature: parse_env!("SIM_TEMPERATURE", f32, 22.0),
    })
}

impl Config {
    /// Log the loaded configuration for debugging purposes.
    pub fn log_config(&self) {
        // ---
        tracing::info!("Configuration loaded:");
        tracing::info!(
            "  SOIL_THRESHOLDS        : dry>{} normal>={}",
            self.soil_dry_threshold,
            self.soil_normal_threshold
        );
        tracing::info!(
            "  HUMIDITY_BOUNDS        : {:.0}-{:.0} %RH",
            self.humidity_low,
            self.humidity_high
        );
        tracing::info!(
            "  TEMPERATURE_BOUNDS     : {:.0}-{:.0} °C",
            self.temperature_low,
            self.temperature_high
        );
        tracing::info!(
            "  MELODY_API_URL         : {}",
            self.melody_url.as_deref().unwrap_or("(unset, AI path disabled)")
        );
        tracing::info!("  PLANT                  : {} @ {}", self.plant_type, self.plant_location);
        tracing::info!("  AI_REQUEST_INTERVAL    : {}s", self.ai_request_interval_secs);
        tracing::info!("  REQUEST_TIMEOUT        : {}s", self.request_timeout_secs);
        tracing::info!("  CONNECT_RETRIES        : {}", self.connect_retries);
        tracing::info!("  LOOP_DELAY             : {}s", self.loop_delay_secs);
        tracing::info!("  MAX_CONSECUTIVE_ERRORS : {}", self.max_consecutive_errors);
    }
}

// ---

/// Configuration for the companion melody proxy binary.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    // ---
    /// Generative-AI endpoint, without the key query parameter.
    pub upstream_url: String,

    /// API key, appended as the `key` query parameter. Always sourced from
    /// the environment, never hardcoded.
    pub api_key: String,

    /// Port the proxy listens on.
    pub port: u16,

    /// Timeout for upstream requests, in seconds.
    pub request_timeout_secs: u64,
}

/// Load proxy configuration from environment variables.
///
/// Required:
/// - `GEMINI_API_KEY` – upstream API key
///
/// Optional:
/// - `GEMINI_API_URL` – upstream endpoint (default: gemini-1.5-flash)
/// - `PROXY_PORT` – listen port (default: 8080)
/// - `REQUEST_TIMEOUT` – upstream timeout seconds (default: 30)
pub fn load_proxy_from_env() -> Result<ProxyConfig> {
    // ---
    let api_key = require_env!("GEMINI_API_KEY");
    let upstream_url = env::var("GEMINI_API_URL").unwrap_or_else(|_| {
        "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
            .to_string()
    });

    Ok(ProxyConfig {
        upstream_url,
        api_key,
        port: parse_env!("PROXY_PORT", u16, 8080),
        request_timeout_secs: parse_env!("REQUEST_TIMEOUT", u64, 30),
    })
}

impl ProxyConfig {
    /// Log the loaded configuration, masking the API key.
    pub fn log_config(&self) {
        // ---
        let masked_key = if self.api_key.chars().count() > 4 {
            let head: String = self.api_key.chars().take(4).collect();
            format!("{head}****")
        } else {
            "****".to_string()
        };

        tracing::info!("Proxy configuration loaded:");
        tracing::info!("  GEMINI_API_URL  : {}", self.upstream_url);
        tracing::info!("  GEMINI_API_KEY  : {}", masked_key);
        tracing::info!("  PROXY_PORT      : {}", self.port);
        tracing::info!("  REQUEST_TIMEOUT : {}s", self.request_timeout_secs);
    }
}
