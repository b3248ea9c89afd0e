//! Narrow interfaces over the appliance hardware, plus simulated
//! implementations for running off-hardware.
//!
//! The monitor loop only ever sees these traits. Real drivers (ADC probe,
//! DHT ambient sensor, I2C character LCD, PWM buzzer) are external
//! collaborators; the simulations reproduce their timing quirks where those
//! matter to the loop, most notably the ambient sensor's minimum inter-read
//! interval.

use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use tracing::{debug, info};

use crate::models::ToneStep;

// ---

/// Column width of the character display.
pub const DISPLAY_COLS: usize = 16;

/// Substituted when the ambient sensor has no data: 50 %RH.
pub const DEFAULT_HUMIDITY: f32 = 50.0;

/// Substituted when the ambient sensor has no data: 22 °C.
pub const DEFAULT_TEMPERATURE: f32 = 22.0;

/// Pause between notes during playback.
const NOTE_PAUSE: Duration = Duration::from_millis(50);

/// Soil moisture probe: one raw unsigned reading per poll.
pub trait SoilSensor {
    fn read_raw(&mut self) -> Result<u16>;
}

/// Ambient sensor: (humidity %RH, temperature °C), or `None` when the
/// sensor has no data yet. Callers substitute defaults on `None`.
pub trait AmbientSensor {
    fn read(&mut self) -> Option<(f32, f32)>;
}

/// Two-line character display. Lines longer than the device width are
/// truncated silently.
pub trait StatusDisplay {
    fn show_lines(&mut self, line1: &str, line2: &str);
}

/// Tone device. `play` blocks for the sum of all note durations plus
/// inter-note pauses; that busy-wait stands in for real scheduling and is
/// intentional. A muted device ignores `play`.
pub trait ToneDevice {
    fn play(&mut self, steps: &[ToneStep]);
    fn mute(&mut self);
}

// ---

/// Fixed-value soil probe for bench runs.
#[derive(Debug)]
pub struct SimSoilSensor {
    // ---
    value: u16,
}

impl SimSoilSensor {
    pub fn new(value: u16) -> Self {
        Self { value }
    }

    pub fn set_value(&mut self, value: u16) {
        self.value = value;
    }
}

impl SoilSensor for SimSoilSensor {
    fn read_raw(&mut self) -> Result<u16> {
        // ---
        // A rail reading means the probe is disconnected or shorted.
        if self.value == 0 || self.value == u16::MAX {
            bail!("soil probe reading {} is at the rail", self.value);
        }
        Ok(self.value)
    }
}

/// Ambient sensor simulation with the DHT-style minimum inter-read
/// interval: polling again too soon returns the cached values instead of
/// blocking for the sensor to become ready.
#[derive(Debug)]
pub struct SimAmbientSensor {
    // ---
    humidity: f32,
    temperature: f32,
    min_read_interval: Duration,
    last_read: Option<Instant>,
    cached: Option<(f32, f32)>,
}

impl SimAmbientSensor {
    pub fn new(humidity: f32, temperature: f32) -> Self {
        // ---
        Self::with_interval(humidity, temperature, Duration::from_secs(2))
    }

    pub fn with_interval(humidity: f32, temperature: f32, min_read_interval: Duration) -> Self {
        // ---
        Self {
            humidity,
            temperature,
            min_read_interval,
            last_read: None,
            cached: None,
        }
    }

    /// Change the simulated room conditions.
    pub fn set_conditions(&mut self, humidity: f32, temperature: f32) {
        // ---
        self.humidity = humidity;
        self.temperature = temperature;
    }
}

impl AmbientSensor for SimAmbientSensor {
    fn read(&mut self) -> Option<(f32, f32)> {
        // ---
        if let Some(at) = self.last_read {
            if at.elapsed() < self.min_read_interval {
                debug!("ambient read too soon, returning cached values");
                return self.cached;
            }
        }

        self.last_read = Some(Instant::now());
        self.cached = Some((self.humidity, self.temperature));
        self.cached
    }
}

/// Renders the 16x2 display frame into the log.
#[derive(Debug, Default)]
pub struct ConsoleDisplay;

impl StatusDisplay for ConsoleDisplay {
    fn show_lines(&mut self, line1: &str, line2: &str) {
        // ---
        let line1: String = line1.chars().take(DISPLAY_COLS).collect();
        let line2: String = line2.chars().take(DISPLAY_COLS).collect();
        info!("[LCD] |{:<cols$}|", line1, cols = DISPLAY_COLS);
        info!("[LCD] |{:<cols$}|", line2, cols = DISPLAY_COLS);
    }
}

/// Logs notes and sleeps out their durations, mirroring the blocking
/// behavior of the PWM buzzer.
#[derive(Debug)]
pub struct ConsoleTone {
    // ---
    enabled: bool,
}

impl ConsoleTone {
    pub fn new() -> Self {
        Self { enabled: true }
    }
}

impl Default for ConsoleTone {
    fn default() -> Self {
        Self::new()
    }
}

impl ToneDevice for ConsoleTone {
    fn play(&mut self, steps: &[ToneStep]) {
        // ---
        if !self.enabled {
            return;
        }

        for step in steps {
            if step.frequency == 0 {
                debug!("[TONE] rest {:.2}s", step.duration);
            } else {
                debug!("[TONE] {} Hz for {:.2}s", step.frequency, step.duration);
            }
            std::thread::sleep(Duration::from_secs_f32(step.duration));
            std::thread::sleep(NOTE_PAUSE);
        }
    }

    fn mute(&mut self) {
        // ---
        self.enabled = false;
        debug!("[TONE] muted");
    }
}
