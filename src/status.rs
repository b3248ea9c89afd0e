//! Plant status evaluation: combines soil and ambient categories into one
//! prioritized verdict plus a recommended action.
//!
//! The priority chain is the core business rule: soil water stress threatens
//! the plant faster than ambient discomfort, so soil always preempts the
//! ambient diagnosis. Among ambient issues, humidity is checked before
//! temperature; that tie-break carries no deeper rationale and is fixed.

use chrono::Utc;
use tracing::debug;

use crate::classify::ThresholdClassifier;
use crate::models::{
    AmbientCategory, AmbientQuality, OverallStatus, PlantStatus, PriorityAction,
    SoilMoistureCategory,
};

// ---

/// Evaluates raw sensor input into a [`PlantStatus`].
#[derive(Debug, Clone)]
pub struct PlantStatusEngine {
    // ---
    classifier: ThresholdClassifier,
}

impl PlantStatusEngine {
    pub fn new(classifier: ThresholdClassifier) -> Self {
        Self { classifier }
    }

    /// Access the classifier for runtime calibration.
    pub fn classifier_mut(&mut self) -> &mut ThresholdClassifier {
        &mut self.classifier
    }

    /// Evaluate one cycle of sensor input. Total: every input combination
    /// yields a status.
    pub fn evaluate(&self, soil_raw: u16, humidity: f32, temperature: f32) -> PlantStatus {
        // ---
        let soil = self.classifier.classify_soil(soil_raw);
        let ambient = self.classifier.classify_ambient(humidity, temperature);

        let (overall, action) = match soil {
            SoilMoistureCategory::Dry => (OverallStatus::NeedsWater, PriorityAction::WaterPlant),
            SoilMoistureCategory::Humid => (OverallStatus::TooWet, PriorityAction::ReduceWatering),
            SoilMoistureCategory::Normal => match ambient.overall {
                AmbientQuality::Good => (OverallStatus::Good, PriorityAction::Monitor),
                AmbientQuality::Poor => match ambient.humidity {
                    AmbientCategory::Low => {
                        (OverallStatus::DryAir, PriorityAction::IncreaseHumidity)
                    }
                    AmbientCategory::High => {
                        (OverallStatus::HumidAir, PriorityAction::ImproveVentilation)
                    }
                    // Humidity is fine, so the poor verdict came from
                    // temperature.
                    AmbientCategory::Normal => {
                        (OverallStatus::TempStress, PriorityAction::AdjustTemperature)
                    }
                },
            },
        };

        debug!(
            soil_raw,
            humidity,
            temperature,
            ?overall,
            ?action,
            "evaluated plant status"
        );

        PlantStatus {
            soil,
            ambient,
            overall,
            action,
            soil_raw,
            humidity,
            temperature,
            observed_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::classify::{AmbientBounds, SoilThresholds};

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
    fn dry_soil_with_good_ambient_needs_water() {
        // ---
        let status = engine().evaluate(27000, 50.0, 22.0);
        assert_eq!(status.overall, OverallStatus::NeedsWater);
        assert_eq!(status.action, PriorityAction::WaterPlant);
        assert_eq!(status.soil, SoilMoistureCategory::Dry);
    }

    #[test]
    fn soil_always_preempts_ambient() {
        // ---
        // Priority law: dry soil wins no matter how bad the air is.
        let e = engine();
        for (h, t) in [(5.0, 45.0), (95.0, -10.0), (50.0, 22.0), (0.0, 0.0)] {
            let status = e.evaluate(30000, h, t);
            assert_eq!(status.overall, OverallStatus::NeedsWater);

            let status = e.evaluate(10000, h, t);
            assert_eq!(status.overall, OverallStatus::TooWet);
            assert_eq!(status.action, PriorityAction::ReduceWatering);
        }
    }

    #[test]
    fn humidity_issue_beats_temperature_issue() {
        // ---
        // Both axes poor: the humidity diagnosis wins the tie-break.
        let status = engine().evaluate(23000, 10.0, 45.0);
        assert_eq!(status.overall, OverallStatus::DryAir);
        assert_eq!(status.action, PriorityAction::IncreaseHumidity);

        let status = engine().evaluate(23000, 95.0, 45.0);
        assert_eq!(status.overall, OverallStatus::HumidAir);
        assert_eq!(status.action, PriorityAction::ImproveVentilation);
    }

    #[test]
    fn temperature_only_issue_is_temp_stress() {
        // ---
        let status = engine().evaluate(23000, 50.0, 45.0);
        assert_eq!(status.overall, OverallStatus::TempStress);
        assert_eq!(status.action, PriorityAction::AdjustTemperature);

        let status = engine().evaluate(23000, 50.0, 5.0);
        assert_eq!(status.overall, OverallStatus::TempStress);
    }

    #[test]
    fn everything_normal_is_good() {
        // ---
        let status = engine().evaluate(23000, 50.0, 22.0);
        assert_eq!(status.overall, OverallStatus::Good);
        assert_eq!(status.action, PriorityAction::Monitor);
        assert_eq!(status.ambient.overall, AmbientQuality::Good);
    }

    #[test]
    fn evaluate_is_idempotent() {
        // ---
        let e = engine();
        let first = e.evaluate(24500, 33.0, 28.0);
        let second = e.evaluate(24500, 33.0, 28.0);
        assert_eq!(first.overall, second.overall);
        assert_eq!(first.action, second.action);
        assert_eq!(first.soil, second.soil);
        assert_eq!(first.ambient, second.ambient);
    }

    #[test]
    fn runtime_calibration_changes_the_verdict() {
        // ---
        let mut e = engine();
        assert_eq!(e.evaluate(25000, 50.0, 22.0).overall, OverallStatus::Good);

        // Lowering the dry threshold reclassifies the same reading.
        e.classifier_mut().set_soil_thresholds(Some(24000), None);
        let status = e.evaluate(25000, 50.0, 22.0);
        assert_eq!(status.overall, OverallStatus::NeedsWater);
        assert_eq!(status.action, PriorityAction::WaterPlant);
    }

    #[test]
    fn raw_inputs_are_preserved() {
        // ---
        let status = engine().evaluate(21500, 42.5, 19.25);
        assert_eq!(status.soil_raw, 21500);
        assert_eq!(status.humidity, 42.5);
        assert_eq!(status.temperature, 19.25);
    }
}
