//! End-to-end pipeline tests: raw sensor input through classification,
//! mood/tone mapping, AI reply parsing, and dispatch throttling. These run
//! hermetically; the network fetch is a counting fake.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use plantsong::ai::FetchError;
use plantsong::classify::{AmbientBounds, SoilThresholds, ThresholdClassifier};
use plantsong::dispatch::AlertDispatchPolicy;
use plantsong::melody::{self, ParseOutcome};
use plantsong::models::{OverallStatus, PriorityAction};
use plantsong::mood;
use plantsong::status::PlantStatusEngine;

// ---

fn engine() -> PlantStatusEngine {
    // ---
    PlantStatusEngine::new(ThresholdClassifier::new(
        SoilThresholds {
            dry: 26000,
            normal: 20000,
        },
        AmbientBounds {
            humidity_low: 30.0,
            humidity_high: 70.0,
            temperature_low: 15.0,
            temperature_high: 30.0,
        },
    ))
}

#[test]
fn dry_plant_end_to_end() {
    // ---
    // Raw probe above the dry threshold with comfortable air: water stress
    // preempts everything, and the deterministic tone is the descending
    // dry pattern.
    let status = engine().evaluate(27000, 50.0, 22.0);

    assert_eq!(status.overall, OverallStatus::NeedsWater);
    assert_eq!(status.action, PriorityAction::WaterPlant);
    assert_eq!(mood::mood_for(&status), "thirsty and in need of care");

    let frequencies: Vec<u32> = mood::tone_for(&status).iter().map(|s| s.frequency).collect();
    assert_eq!(frequencies, vec![262, 220, 196]);
}

#[test]
fn ai_reply_parses_into_bounded_domain_objects() {
    // ---
    let reply = melody::parse("MESSAGE: Happy\nMELODY: C4,0.5,E4,0.5,G4,0.5");

    assert_eq!(reply.outcome, ParseOutcome::Complete);
    assert_eq!(reply.message, "Happy");
    assert_eq!(reply.melody.len(), 3);
    assert_eq!(reply.melody[0].frequency, 262);
    assert!(reply.melody.iter().all(|s| s.duration > 0.0));
}

#[tokio::test]
async fn dispatch_throttles_and_falls_back() {
    // ---
    let mut policy = AlertDispatchPolicy::new(Duration::from_secs(30));
    let calls = AtomicUsize::new(0);

    // First cycle: fetch succeeds, reply is parsed and cached.
    let advice = policy
        .decide(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok("MESSAGE: Doing great\nMELODY: C5,0.3,E5,0.3".to_string()) }
        })
        .await;
    assert_eq!(advice.message.as_deref(), Some("Doing great"));
    assert_eq!(advice.melody.as_ref().map(Vec::len), Some(2));

    // Second cycle, well inside the interval: cache served, no new call.
    let advice = policy
        .decide(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(FetchError::Connectivity) }
        })
        .await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(advice.message.as_deref(), Some("Doing great"));

    // A failing policy with an expired interval surfaces the error kind
    // but keeps the cache for future cycles.
    let mut eager = AlertDispatchPolicy::new(Duration::ZERO);
    eager
        .decide(|| async { Ok("MESSAGE: Cached\nMELODY: C4,0.5,E4,0.5".to_string()) })
        .await;
    let failed = eager.decide(|| async { Err(FetchError::Connectivity) }).await;
    assert_eq!(failed.melody, None);
    assert_eq!(failed.message.as_deref(), Some("WiFi Error"));
    assert_eq!(eager.cached().message.as_deref(), Some("Cached"));
}

#[tokio::test]
async fn failed_ai_path_never_blocks_deterministic_rendering() {
    // ---
    let status = engine().evaluate(10000, 50.0, 22.0);
    assert_eq!(status.overall, OverallStatus::TooWet);

    let mut policy = AlertDispatchPolicy::new(Duration::from_secs(30));
    let advice = policy
        .decide(|| async { Err(FetchError::Api(reqwest::StatusCode::BAD_GATEWAY)) })
        .await;

    // The advice carries no melody, so the loop falls back to the mood
    // path, which always has a pattern ready.
    assert_eq!(advice.melody, None);
    assert_eq!(advice.message.as_deref(), Some("AI Error"));
    assert_eq!(mood::tone_for(&status).len(), 3);
}
