//! The monitoring loop: read sensors, classify, decide, render, sleep.
//!
//! Single-threaded and strictly sequential per cycle; the only blocking
//! operations are tone playback (intentional) and the bounded network
//! request inside the dispatch policy. Transient errors degrade gracefully;
//! only the consecutive-failure ceiling stops monitoring.

use std::time::Duration;

use anyhow::{anyhow, Result};
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::ai::MelodyClient;
use crate::config::Config;
use crate::devices::{
    AmbientSensor, SoilSensor, StatusDisplay, ToneDevice, DEFAULT_HUMIDITY, DEFAULT_TEMPERATURE,
};
use crate::dispatch::{AlertAdvice, AlertDispatchPolicy};
use crate::models::PlantStatus;
use crate::mood;
use crate::status::PlantStatusEngine;

// ---

/// Coordinates sensors, the status engine, the alert policy, and the output
/// devices. Owns all mutable state; nothing is shared across threads.
pub struct PlantMonitor<S, A, D, T>
where
    S: SoilSensor,
    A: AmbientSensor,
    D: StatusDisplay,
    T: ToneDevice,
{
    // ---
    soil: S,
    ambient: A,
    display: D,
    tone: T,
    engine: PlantStatusEngine,
    policy: AlertDispatchPolicy,
    client: Option<MelodyClient>,
    loop_delay: Duration,
    max_consecutive_errors: u32,
    error_count: u32,
}

impl<S, A, D, T> PlantMonitor<S, A, D, T>
where
    S: SoilSensor,
    A: AmbientSensor,
    D: StatusDisplay,
    T: ToneDevice,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        soil: S,
        ambient: A,
        display: D,
        tone: T,
        engine: PlantStatusEngine,
        client: Option<MelodyClient>,
        cfg: &Config,
    ) -> Self {
        // ---
        Self {
            soil,
            ambient,
            display,
            tone,
            engine,
            policy: AlertDispatchPolicy::new(Duration::from_secs(cfg.ai_request_interval_secs)),
            client,
            loop_delay: Duration::from_secs(cfg.loop_delay_secs),
            max_consecutive_errors: cfg.max_consecutive_errors,
            error_count: 0,
        }
    }

    /// Startup sequence: banner, chime, sensor presence check.
    fn startup(&mut self) {
        // ---
        info!("Plant monitor starting");
        self.display.show_lines("Plant Monitor", "Starting...");
        self.tone.play(mood::startup_chime());

        if let Err(e) = self.soil.read_raw() {
            warn!("Soil probe may not be connected: {e:#}");
            self.display.show_lines("ERROR:", "Sensor Error");
            self.tone.play(mood::error_pattern());
        }

        info!("Startup complete");
    }

    /// Run until a stop signal or the consecutive-error ceiling. The stop
    /// signal takes effect between cycles; there is no mid-cycle
    /// cancellation.
    pub async fn run(&mut self, mut stop: watch::Receiver<bool>) -> Result<()> {
        // ---
        self.startup();
        info!("Starting monitoring loop ({}s per cycle)", self.loop_delay.as_secs());

        loop {
            match self.cycle().await {
                Ok(()) => {
                    self.error_count = 0;
                }
                Err(e) => {
                    self.error_count += 1;
                    error!(
                        "Cycle failed ({}/{}): {e:#}",
                        self.error_count, self.max_consecutive_errors
                    );
                    self.display
                        .show_lines("ERROR:", &format!("Err {}", self.error_count));
                    self.tone.play(mood::error_pattern());

                    if self.error_count >= self.max_consecutive_errors {
                        error!(
                            "Too many consecutive errors ({}), stopping monitor",
                            self.max_consecutive_errors
                        );
                        self.shutdown();
                        return Err(anyhow!(
                            "stopped after {} consecutive errors",
                            self.max_consecutive_errors
                        ));
                    }
                }
            }

            // Wake early on a stop signal instead of sleeping out the delay.
            tokio::select! {
                _ = sleep(self.loop_delay) => {}
                _ = stop.changed() => {}
            }

            if *stop.borrow() {
                info!("Stop requested, shutting down");
                break;
            }
        }

        self.shutdown();
        Ok(())
    }

    /// One monitoring cycle: sense, evaluate, advise, render, play.
    async fn cycle(&mut self) -> Result<()> {
        // ---
        let soil_raw = self.soil.read_raw()?;

        let (humidity, temperature) = match self.ambient.read() {
            Some(values) => values,
            None => {
                warn!(
                    "Ambient sensor unavailable, substituting {DEFAULT_HUMIDITY} %RH / \
                     {DEFAULT_TEMPERATURE} °C"
                );
                (DEFAULT_HUMIDITY, DEFAULT_TEMPERATURE)
            }
        };

        let status = self.engine.evaluate(soil_raw, humidity, temperature);
        info!(
            "{} ({}), {:.0} %RH, {:.1} °C -> {:?}: the plant is {}",
            status.soil.label(),
            soil_raw,
            humidity,
            temperature,
            status.overall,
            mood::mood_for(&status)
        );

        // Split borrows: the policy drives the fetch closure over the client.
        let Self { policy, client, .. } = self;
        let advice = match client.as_mut() {
            Some(client) => policy.decide(|| client.fetch_melody(&status)).await,
            // AI path disabled: any earlier cache would still be served,
            // but nothing is ever fetched.
            None => policy.cached(),
        };

        self.render(&status, &advice);
        Ok(())
    }

    /// Pick display lines and tone: AI advice when available, otherwise the
    /// deterministic mood path. AI failures never block the fallback.
    fn render(&mut self, status: &PlantStatus, advice: &AlertAdvice) {
        // ---
        let line1 = format!("{} ({})", status.soil.label(), status.soil_raw);
        let line2 = match &advice.message {
            Some(message) => message.clone(),
            None => status.action.label().to_string(),
        };
        self.display.show_lines(&line1, &line2);

        match &advice.melody {
            Some(melody) => self.tone.play(melody),
            None => self.tone.play(mood::tone_for(status)),
        }
    }

    /// Terminal state: render the stopped banner and release the tone
    /// device.
    fn shutdown(&mut self) {
        // ---
        self.display.show_lines("System", "Stopped");
        self.tone.mute();
        info!("Plant monitor stopped");
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::classify::{AmbientBounds, SoilThresholds, ThresholdClassifier};
    use crate::models::ToneStep;
    use std::sync::{Arc, Mutex};

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

    fn test_config() -> Config {
        // ---
        Config {
            soil_dry_threshold: 26000,
            soil_normal_threshold: 20000,
            humidity_low: 30.0,
            humidity_high: 70.0,
            temperature_low: 15.0,
            temperature_high: 30.0,
            melody_url: None,
            plant_type: "Pothos".into(),
            plant_location: "Living room".into(),
            ai_request_interval_secs: 30,
            request_timeout_secs: 30,
            connect_retries: 3,
            loop_delay_secs: 0,
            max_consecutive_errors: 3,
            sim_soil_value: 23000,
            sim_humidity: 50.0,
            sim_temperature: 22.0,
        }
    }

    /// Sensor that fails every read.
    struct BrokenSoil;

    impl SoilSensor for BrokenSoil {
        fn read_raw(&mut self) -> Result<u16> {
            anyhow::bail!("probe disconnected")
        }
    }

    struct FixedSoil(u16);

    impl SoilSensor for FixedSoil {
        fn read_raw(&mut self) -> Result<u16> {
            Ok(self.0)
        }
    }

    struct NoAmbient;

    impl AmbientSensor for NoAmbient {
        fn read(&mut self) -> Option<(f32, f32)> {
            None
        }
    }

    #[derive(Clone, Default)]
    struct RecordingDisplay {
        lines: Arc<Mutex<Vec<(String, String)>>>,
    }

    impl StatusDisplay for RecordingDisplay {
        fn show_lines(&mut self, line1: &str, line2: &str) {
            self.lines
                .lock()
                .unwrap()
                .push((line1.to_string(), line2.to_string()));
        }
    }

    #[derive(Clone, Default)]
    struct RecordingTone {
        played: Arc<Mutex<Vec<Vec<ToneStep>>>>,
        muted: Arc<Mutex<bool>>,
    }

    impl ToneDevice for RecordingTone {
        fn play(&mut self, steps: &[ToneStep]) {
            self.played.lock().unwrap().push(steps.to_vec());
        }

        fn mute(&mut self) {
            *self.muted.lock().unwrap() = true;
        }
    }

    #[tokio::test]
    async fn broken_sensor_halts_after_error_ceiling() {
        // ---
        let display = RecordingDisplay::default();
        let tone = RecordingTone::default();
        let (_tx, rx) = watch::channel(false);

        let mut monitor = PlantMonitor::new(
            BrokenSoil,
            NoAmbient,
            display.clone(),
            tone.clone(),
            engine(),
            None,
            &test_config(),
        );

        let result = monitor.run(rx).await;
        assert!(result.is_err());

        let lines = display.lines.lock().unwrap();
        // Startup sensor check fails, then three cycle errors, then the
        // terminal banner.
        assert_eq!(lines.last().unwrap(), &("System".to_string(), "Stopped".to_string()));
        assert!(lines
            .iter()
            .any(|(l1, l2)| l1 == "ERROR:" && l2 == "Err 3"));
        assert!(*tone.muted.lock().unwrap());
    }

    #[tokio::test]
    async fn stop_signal_ends_loop_cleanly() {
        // ---
        let display = RecordingDisplay::default();
        let tone = RecordingTone::default();
        let (tx, rx) = watch::channel(false);

        let mut monitor = PlantMonitor::new(
            FixedSoil(27000),
            NoAmbient,
            display.clone(),
            tone.clone(),
            engine(),
            None,
            &test_config(),
        );

        tx.send(true).unwrap();
        let result = monitor.run(rx).await;
        assert!(result.is_ok());

        let lines = display.lines.lock().unwrap();
        assert_eq!(lines.last().unwrap(), &("System".to_string(), "Stopped".to_string()));
    }

    #[tokio::test]
    async fn dry_plant_renders_deterministic_path() {
        // ---
        let display = RecordingDisplay::default();
        let tone = RecordingTone::default();
        let (tx, rx) = watch::channel(false);

        let mut monitor = PlantMonitor::new(
            FixedSoil(27000),
            NoAmbient,
            display.clone(),
            tone.clone(),
            engine(),
            None,
            &test_config(),
        );

        // The stop flag is already set, so exactly one cycle runs.
        tx.send(true).unwrap();
        monitor.run(rx).await.unwrap();

        let lines = display.lines.lock().unwrap();
        assert!(
            lines
                .iter()
                .any(|(l1, l2)| l1 == "Dry (27000)" && l2 == "Water now"),
            "expected dry status line, got {:?}",
            *lines
        );

        let played = tone.played.lock().unwrap();
        let dry: Vec<u32> = played
            .iter()
            .rev()
            .find(|p| p.len() == 3 && p[0].frequency == 262)
            .map(|p| p.iter().map(|s| s.frequency).collect())
            .unwrap_or_default();
        assert_eq!(dry, vec![262, 220, 196]);
    }
}
