//! Domain types for the plant monitoring pipeline.
//!
//! Every category here is an exhaustive enum rather than a status string so
//! that the classifier, status engine, and mood mapper are checked for
//! coverage by the compiler. Wire types for the melody service live in
//! `ai.rs`; these are the in-process shapes recomputed each monitoring cycle.

use chrono::{DateTime, Utc};
use serde::Serialize;

// ---

/// Soil moisture category derived from the raw probe reading.
///
/// Higher raw readings mean drier soil on the resistive probe, so the
/// ordering is Dry above the dry threshold, Humid below the normal one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SoilMoistureCategory {
    Dry,
    Normal,
    Humid,
}

impl SoilMoistureCategory {
    /// Display-friendly label, as shown on the first LCD line.
    pub fn label(&self) -> &'static str {
        // ---
        match self {
            SoilMoistureCategory::Dry => "Dry",
            SoilMoistureCategory::Normal => "Normal",
            SoilMoistureCategory::Humid => "Humid",
        }
    }
}

/// Per-axis ambient category (humidity or temperature vs its bounds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbientCategory {
    Low,
    Normal,
    High,
}

/// Combined verdict over both ambient axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbientQuality {
    Good,
    Poor,
}

/// Humidity/temperature categorization independent of soil.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AmbientAssessment {
    // ---
    pub humidity: AmbientCategory,
    pub temperature: AmbientCategory,
    /// `Poor` iff either axis is non-Normal.
    pub overall: AmbientQuality,
}

/// Single prioritized plant-health verdict combining soil and ambient signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    Good,
    NeedsWater,
    TooWet,
    DryAir,
    HumidAir,
    TempStress,
}

/// Recommended operator action paired with the overall status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityAction {
    Monitor,
    WaterPlant,
    ReduceWatering,
    IncreaseHumidity,
    ImproveVentilation,
    AdjustTemperature,
}

impl PriorityAction {
    /// Short label that fits a 16-column display line.
    pub fn label(&self) -> &'static str {
        // ---
        match self {
            PriorityAction::Monitor => "Monitor",
            PriorityAction::WaterPlant => "Water now",
            PriorityAction::ReduceWatering => "Reduce watering",
            PriorityAction::IncreaseHumidity => "Raise humidity",
            PriorityAction::ImproveVentilation => "Ventilate",
            PriorityAction::AdjustTemperature => "Adjust temp",
        }
    }
}

// ---

/// Full analysis of one monitoring cycle.
///
/// Recomputed from fresh sensor input every cycle; nothing here carries
/// identity across cycles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlantStatus {
    // ---
    pub soil: SoilMoistureCategory,
    pub ambient: AmbientAssessment,
    pub overall: OverallStatus,
    pub action: PriorityAction,
    pub soil_raw: u16,
    pub humidity: f32,
    pub temperature: f32,
    pub observed_at: DateTime<Utc>,
}

/// One step of an audible pattern: frequency in Hz (0 = rest) and duration
/// in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ToneStep {
    // ---
    pub frequency: u32,
    pub duration: f32,
}

impl ToneStep {
    pub const fn new(frequency: u32, duration: f32) -> Self {
        Self {
            frequency,
            duration,
        }
    }

    /// A silent step of the given length.
    pub const fn rest(duration: f32) -> Self {
        Self::new(0, duration)
    }
}
