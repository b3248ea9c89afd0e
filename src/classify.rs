//! Threshold classification of raw sensor values.
//!
//! Pure and total: any numeric input is classified, including readings far
//! outside the physical range of the probes. Thresholds are owned by the
//! classifier and can be replaced at runtime (calibration); the next
//! classification uses the new bounds immediately.

use crate::models::{AmbientAssessment, AmbientCategory, AmbientQuality, SoilMoistureCategory};

// ---

/// Soil moisture thresholds over the raw probe range.
///
/// Invariant: `dry > normal`. Readings above `dry` are dry soil, readings
/// below `normal` are humid soil, anything between is normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoilThresholds {
    // ---
    pub dry: u16,
    pub normal: u16,
}

/// Per-axis ambient comfort bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientBounds {
    // ---
    pub humidity_low: f32,
    pub humidity_high: f32,
    pub temperature_low: f32,
    pub temperature_high: f32,
}

/// Maps raw sensor values onto moisture and ambient categories.
#[derive(Debug, Clone)]
pub struct ThresholdClassifier {
    // ---
    soil: SoilThresholds,
    ambient: AmbientBounds,
}

impl ThresholdClassifier {
    pub fn new(soil: SoilThresholds, ambient: AmbientBounds) -> Self {
        Self { soil, ambient }
    }

    /// Classify a raw soil probe reading into its moisture category.
    pub fn classify_soil(&self, raw: u16) -> SoilMoistureCategory {
        // ---
        if raw > self.soil.dry {
            SoilMoistureCategory::Dry
        } else if raw >= self.soil.normal {
            SoilMoistureCategory::Normal
        } else {
            SoilMoistureCategory::Humid
        }
    }

    /// Classify ambient humidity (%RH) and temperature (°C) against the
    /// configured comfort bounds.
    pub fn classify_ambient(&self, humidity: f32, temperature: f32) -> AmbientAssessment {
        // ---
        let humidity_category = classify_axis(
            humidity,
            self.ambient.humidity_low,
            self.ambient.humidity_high,
        );
        let temperature_category = classify_axis(
            temperature,
            self.ambient.temperature_low,
            self.ambient.temperature_high,
        );

        let overall = if humidity_category == AmbientCategory::Normal
            && temperature_category == AmbientCategory::Normal
        {
            AmbientQuality::Good
        } else {
            AmbientQuality::Poor
        };

        AmbientAssessment {
            humidity: humidity_category,
            temperature: temperature_category,
            overall,
        }
    }

    // ---

    /// Replace soil thresholds (calibration). Passing `None` keeps the
    /// current value for that bound.
    pub fn set_soil_thresholds(&mut self, dry: Option<u16>, normal: Option<u16>) {
        // ---
        if let Some(dry) = dry {
            self.soil.dry = dry;
        }
        if let Some(normal) = normal {
            self.soil.normal = normal;
        }
    }

    /// Replace the ambient comfort bounds (calibration).
    pub fn set_ambient_bounds(&mut self, bounds: AmbientBounds) {
        self.ambient = bounds;
    }

    pub fn soil_thresholds(&self) -> SoilThresholds {
        self.soil
    }

    pub fn ambient_bounds(&self) -> AmbientBounds {
        self.ambient
    }
}

/// Categorize a single value against its low/high bounds.
fn classify_axis(value: f32, low: f32, high: f32) -> AmbientCategory {
    // ---
    if value < low {
        AmbientCategory::Low
    } else if value > high {
        AmbientCategory::High
    } else {
        AmbientCategory::Normal
    }
}
