//! `POST /consulta`: turn plant telemetry into a message/melody reply.
//!
//! The handler renders the prompt template, forwards it to the configured
//! generative-AI endpoint, and returns the raw reply text in the
//! `respuesta` field. The appliance-side parser is responsible for making
//! sense of whatever the model produced; this route stays a thin proxy.
//! Upstream failures are reported with a non-2xx status and an
//! `{"error", "details"}` body.

use axum::{
    extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use super::ProxyState;

// ---

/// Telemetry accepted from the monitor appliance.
#[derive(Debug, Deserialize)]
pub struct TelemetryPayload {
    // ---
    location: String,
    plant_type: String,
    soil_moisture: f32,
    temperature: f32,
    humidity: f32,
}

/// Prompt sent to the generative model. The exact MESSAGE:/MELODY: reply
/// format is requested here; the appliance parser tolerates deviations.
fn build_prompt(data: &TelemetryPayload) -> String {
    // ---
    format!(
        "\
You are an AI assistant helping to monitor a plant's health. Based on the \
following data, generate a unique, personalized response each time:

Plant Data:
- Location: {location}
- Plant Type: {plant_type}
- Soil Moisture: {soil_moisture}
- Temperature: {temperature}°C
- Humidity: {humidity}%

Generate your response in this exact format:
MESSAGE: [encouraging message - max 16 chars]
MELODY: [note,duration,note,duration,note,duration]

Use musical notes C3-C6 and R for rests. Make each melody unique and reflect \
the plant's mood:
- Happy/healthy: Upbeat major scales
- Thirsty: Gentle, pleading tones
- Perfect conditions: Peaceful melodies
- Issues: Attention-getting patterns

BE CREATIVE - generate a different melody each time, even for the same \
conditions!",
        location = data.location,
        plant_type = data.plant_type,
        soil_moisture = data.soil_moisture,
        temperature = data.temperature,
        humidity = data.humidity,
    )
}

// ---

pub fn router() -> Router<ProxyState> {
    // ---
    Router::new().route("/consulta", post(handler))
}

async fn handler(
    State(state): State<ProxyState>,
    Json(data): Json<TelemetryPayload>,
) -> impl IntoResponse {
    // ---
    info!(
        "POST /consulta for {} at {} (soil={}, t={}°C, h={}%)",
        data.plant_type, data.location, data.soil_moisture, data.temperature, data.humidity
    );

    let prompt = build_prompt(&data);
    let payload = json!({
        "contents": [{ "parts": [{ "text": prompt }] }],
        "generationConfig": {
            "maxOutputTokens": 150,
            // High creativity so repeated conditions still get fresh
            // melodies.
            "temperature": 0.9,
        },
    });

    let url = format!("{}?key={}", state.config.upstream_url, state.config.api_key);

    let response = match state.http.post(&url).json(&payload).send().await {
        Ok(response) => response,
        Err(e) => {
            error!("Upstream request failed: {e}");
            return (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": "Request failed", "details": e.to_string() })),
            )
                .into_response();
        }
    };

    if !response.status().is_success() {
        let status = response.status();
        error!("Upstream API error: {status}");
        return (
            StatusCode::BAD_GATEWAY,
            Json(json!({ "error": format!("API error: {}", status.as_u16()) })),
        )
            .into_response();
    }

    let body: serde_json::Value = match response.json().await {
        Ok(body) => body,
        Err(e) => {
            error!("Upstream reply was not JSON: {e}");
            return (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": "Request failed", "details": e.to_string() })),
            )
                .into_response();
        }
    };

    // Reply shape: candidates[0].content.parts[0].text
    match body
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.get(0))
        .and_then(|p| p.get("text"))
        .and_then(|t| t.as_str())
    {
        Some(text) => (StatusCode::OK, Json(json!({ "respuesta": text }))).into_response(),
        None => {
            error!("Upstream reply missing candidate text");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": "API error: malformed upstream reply" })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn prompt_carries_all_telemetry_fields() {
        // ---
        let data = TelemetryPayload {
            location: "Living room".into(),
            plant_type: "Pothos".into(),
            soil_moisture: 27000.0,
            temperature: 22.5,
            humidity: 48.0,
        };
        let prompt = build_prompt(&data);

        assert!(prompt.contains("Location: Living room"));
        assert!(prompt.contains("Plant Type: Pothos"));
        assert!(prompt.contains("Soil Moisture: 27000"));
        assert!(prompt.contains("Temperature: 22.5°C"));
        assert!(prompt.contains("Humidity: 48%"));
        assert!(prompt.contains("MESSAGE:"));
        assert!(prompt.contains("MELODY:"));
    }
}
