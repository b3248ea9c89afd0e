//! HTTP client for the melody proxy service.
//!
//! The monitor talks to the companion proxy (see `routes/`), never to the
//! generative-AI backend directly. Connectivity establishment is modeled as
//! a bounded-retry probe of the proxy's banner route; once established the
//! session is reused. Every request is bounded by an explicit timeout.

use std::fmt;
use std::time::Duration;

use anyhow::Result;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::models::PlantStatus;

// ---

/// Pause between connection attempts.
const CONNECT_BACKOFF: Duration = Duration::from_secs(2);

/// Telemetry payload sent to `POST /consulta`.
#[derive(Debug, Clone, Serialize)]
pub struct MelodyRequest {
    // ---
    pub location: String,
    pub plant_type: String,
    pub soil_moisture: f32,
    pub temperature: f32,
    pub humidity: f32,
}

#[derive(Debug, Deserialize)]
struct MelodyReply {
    respuesta: String,
}

/// Why a melody fetch failed. Callers surface these as distinct short
/// display messages and degrade to the deterministic tone path.
#[derive(Debug)]
pub enum FetchError {
    /// No session to the melody service could be established.
    Connectivity,
    /// The service answered with a non-success status.
    Api(StatusCode),
    /// The request itself failed mid-flight (timeout, transport, bad body).
    Request(reqwest::Error),
}

impl FetchError {
    /// Short error line for the 16-column display.
    pub fn display_label(&self) -> &'static str {
        // ---
        match self {
            FetchError::Connectivity => "WiFi Error",
            FetchError::Api(_) => "AI Error",
            FetchError::Request(_) => "Request Failed",
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // ---
        match self {
            FetchError::Connectivity => write!(f, "could not reach the melody service"),
            FetchError::Api(status) => write!(f, "melody service returned {status}"),
            FetchError::Request(e) => write!(f, "melody request failed: {e}"),
        }
    }
}

impl std::error::Error for FetchError {}

// ---

/// Client for the melody proxy, carrying the plant identity sent with every
/// request.
pub struct MelodyClient {
    // ---
    http: reqwest::Client,
    base_url: String,
    plant_type: String,
    location: String,
    connect_retries: u32,
    connected: bool,
}

impl MelodyClient {
    pub fn new(
        base_url: String,
        plant_type: String,
        location: String,
        timeout: Duration,
        connect_retries: u32,
    ) -> Result<Self> {
        // ---
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url,
            plant_type,
            location,
            connect_retries,
            connected: false,
        })
    }

    /// Probe the service banner until it answers, with bounded retries.
    /// Sticky: once a session is established it is not re-probed.
    async fn ensure_connected(&mut self) -> bool {
        // ---
        if self.connected {
            return true;
        }

        info!("Connecting to melody service at {}", self.base_url);

        for attempt in 1..=self.connect_retries {
            match self.http.get(&self.base_url).send().await {
                Ok(response) if response.status().is_success() => {
                    info!("Melody service reachable");
                    self.connected = true;
                    return true;
                }
                Ok(response) => {
                    warn!(
                        "Connection attempt {} got status {}",
                        attempt,
                        response.status()
                    );
                }
                Err(e) => {
                    warn!("Connection attempt {} failed: {}", attempt, e);
                }
            }

            if attempt < self.connect_retries {
                tokio::time::sleep(CONNECT_BACKOFF).await;
            }
        }

        warn!(
            "Failed to reach melody service after {} attempts",
            self.connect_retries
        );
        false
    }

    /// Request a fresh melody reply for the given plant status. Returns the
    /// raw free text destined for [`crate::melody::parse`].
    pub async fn fetch_melody(&mut self, status: &PlantStatus) -> Result<String, FetchError> {
        // ---
        if !self.ensure_connected().await {
            return Err(FetchError::Connectivity);
        }

        let payload = MelodyRequest {
            location: self.location.clone(),
            plant_type: self.plant_type.clone(),
            soil_moisture: f32::from(status.soil_raw),
            temperature: status.temperature,
            humidity: status.humidity,
        };

        let url = format!("{}/consulta", self.base_url.trim_end_matches('/'));
        info!("Requesting AI melody from {}", url);

        let response = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(FetchError::Request)?;

        if !response.status().is_success() {
            return Err(FetchError::Api(response.status()));
        }

        let reply: MelodyReply = response.json().await.map_err(FetchError::Request)?;
        Ok(reply.respuesta)
    }

    /// Whether a session to the melody service has been established.
    pub fn is_connected(&self) -> bool {
        self.connected
    }
}
