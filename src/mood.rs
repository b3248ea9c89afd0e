//! Deterministic mood and tone mapping.
//!
//! The non-AI path: a fixed lookup from the overall status to a short mood
//! descriptor (also used as prompt context for the melody service) and to a
//! hardwired alert pattern for the tone device. Side-effect free.

use crate::models::{AmbientCategory, OverallStatus, PlantStatus, ToneStep};

// ---

/// Standard length of one alert note.
pub const NOTE_DURATION: f32 = 0.2;

/// C4, A3, G3 - descending (dry soil warning).
const DRY_PATTERN: [ToneStep; 3] = [
    ToneStep::new(262, NOTE_DURATION),
    ToneStep::new(220, NOTE_DURATION),
    ToneStep::new(196, NOTE_DURATION),
];

/// E4, G4, C5 - ascending (all good).
const GOOD_PATTERN: [ToneStep; 3] = [
    ToneStep::new(330, NOTE_DURATION),
    ToneStep::new(392, NOTE_DURATION),
    ToneStep::new(523, NOTE_DURATION),
];

/// E5, G5, A5 - high register (waterlogged alert).
const WET_PATTERN: [ToneStep; 3] = [
    ToneStep::new(659, NOTE_DURATION),
    ToneStep::new(784, NOTE_DURATION),
    ToneStep::new(880, NOTE_DURATION),
];

/// G4, E4, G4 - warning for dryness/temperature trouble in the air.
const AMBIENT_WARNING_PATTERN: [ToneStep; 3] = [
    ToneStep::new(392, NOTE_DURATION),
    ToneStep::new(330, NOTE_DURATION),
    ToneStep::new(392, NOTE_DURATION),
];

/// C5, A4, C5 - alert for the remaining ambient causes.
const AMBIENT_ALERT_PATTERN: [ToneStep; 3] = [
    ToneStep::new(523, NOTE_DURATION),
    ToneStep::new(440, NOTE_DURATION),
    ToneStep::new(523, NOTE_DURATION),
];

/// C5, E5, G5 - played once at startup.
const STARTUP_CHIME: [ToneStep; 3] = [
    ToneStep::new(523, 0.15),
    ToneStep::new(659, 0.15),
    ToneStep::new(784, 0.15),
];

/// Three low G notes - error indication.
const ERROR_PATTERN: [ToneStep; 3] = [
    ToneStep::new(196, 0.3),
    ToneStep::new(196, 0.3),
    ToneStep::new(196, 0.3),
];

// ---

/// Short natural-language mood descriptor for the given status.
pub fn mood_for(status: &PlantStatus) -> &'static str {
    // ---
    match status.overall {
        OverallStatus::Good => "content and thriving",
        OverallStatus::NeedsWater => "thirsty and in need of care",
        OverallStatus::TooWet => "overwhelmed by too much water",
        OverallStatus::DryAir => "stressed by dry air conditions",
        OverallStatus::HumidAir => "uncomfortable with high humidity",
        OverallStatus::TempStress => match status.ambient.temperature {
            AmbientCategory::Low => "cold and seeking warmth",
            AmbientCategory::High => "overheated and needing cooling",
            // TempStress with normal temperature cannot come out of the
            // status engine; this arm keeps a graceful default for any
            // future status source.
            AmbientCategory::Normal => "uncertain and needing attention",
        },
    }
}

/// Deterministic alert pattern for the given status. Used as direct input
/// to the tone device and as the fallback when the AI path yields nothing.
pub fn tone_for(status: &PlantStatus) -> &'static [ToneStep] {
    // ---
    match status.overall {
        OverallStatus::NeedsWater => &DRY_PATTERN,
        OverallStatus::TooWet => &WET_PATTERN,
        OverallStatus::Good => &GOOD_PATTERN,
        OverallStatus::DryAir | OverallStatus::TempStress => &AMBIENT_WARNING_PATTERN,
        OverallStatus::HumidAir => &AMBIENT_ALERT_PATTERN,
    }
}

pub fn startup_chime() -> &'static [ToneStep] {
    &STARTUP_CHIME
}

pub fn error_pattern() -> &'static [ToneStep] {
    &ERROR_PATTERN
}
