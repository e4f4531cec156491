//! Yield point estimate, fixed-width interval and improvement suggestions.

use crate::advisory::{record_outcome, round2};
use crate::error::{AppError, Result};
use crate::ml::synthetic::{reference_yield, YIELD_NOISE_STD};
use crate::ml::{Regressor, TrainedModels};
use crate::models::{ConfidenceInterval, ImprovementSuggestion, PredictionInput, YieldForecast};
use std::sync::Arc;
use tracing::{debug, error};

pub const REQUIRED_FIELDS: [&str; 5] = ["crop", "area_hectares", "temperature", "rainfall", "soil_ph"];

/// Two-sided 95% z-score
const Z_95: f64 = 1.96;

/// Reported confidence, independent of the input
pub const FORECAST_CONFIDENCE: f64 = 0.85;

/// Parsed yield inputs. Missing fertilizer means none; missing irrigation means false.
#[derive(Debug, Clone, PartialEq)]
pub struct YieldConditions {
    pub crop: String,
    pub area_hectares: f64,
    pub temperature: f64,
    pub rainfall: f64,
    pub soil_ph: f64,
    pub fertilizer_npk: f64,
    pub irrigation: bool,
}

impl YieldConditions {
    pub fn from_input(input: &PredictionInput) -> Result<Self> {
        Ok(Self {
            crop: input.text("crop")?,
            area_hectares: input.number("area_hectares")?,
            temperature: input.number("temperature")?,
            rainfall: input.number("rainfall")?,
            soil_ph: input.number("soil_ph")?,
            fertilizer_npk: input.number_or("fertilizer_npk", 0.0)?,
            irrigation: input.flag_or("irrigation", false)?,
        })
    }

    fn features(&self) -> [f64; 6] {
        [
            self.area_hectares,
            self.temperature,
            self.rainfall,
            self.soil_ph,
            self.fertilizer_npk,
            if self.irrigation { 1.0 } else { 0.0 },
        ]
    }

    /// Noise-free agronomic estimate in kg/ha
    pub fn reference_yield(&self) -> f64 {
        reference_yield(
            self.temperature,
            self.rainfall,
            self.soil_ph,
            self.fertilizer_npk,
            self.irrigation,
        )
    }
}

pub fn confidence_interval(yield_per_ha: f64) -> ConfidenceInterval {
    let half_width = Z_95 * YIELD_NOISE_STD;
    ConfidenceInterval {
        lower: (yield_per_ha - half_width).max(0.0),
        upper: yield_per_ha + half_width,
    }
}

/// Independent rule triggers; several may apply at once
pub fn improvement_suggestions(predicted_yield: f64, conditions: &YieldConditions) -> Vec<ImprovementSuggestion> {
    let mut suggestions = Vec::new();

    if conditions.fertilizer_npk < 200.0 {
        suggestions.push(ImprovementSuggestion::new(
            "Fertilisation",
            "Augmenter l'apport NPK à 200-300 kg/ha",
            "+15-20% de rendement",
        ));
    }

    if !conditions.irrigation && conditions.rainfall < 1000.0 {
        suggestions.push(ImprovementSuggestion::new(
            "Irrigation",
            "Installer système d'irrigation",
            "+25-30% de rendement",
        ));
    }

    if conditions.soil_ph < 5.5 || conditions.soil_ph > 7.5 {
        suggestions.push(ImprovementSuggestion::new(
            "pH du sol",
            "Corriger le pH avec chaulage/gypse",
            "+10-15% de rendement",
        ));
    }

    if predicted_yield < 2000.0 {
        suggestions.push(ImprovementSuggestion::new(
            "Pratiques générales",
            "Améliorer les pratiques culturales",
            "Potentiel d'amélioration significatif",
        ));
    }

    suggestions
}

pub struct YieldForecastService {
    models: Arc<TrainedModels>,
}

impl YieldForecastService {
    pub fn new(models: Arc<TrainedModels>) -> Self {
        Self { models }
    }

    /// Forecast, or a zeroed result carrying the error message
    pub fn forecast(&self, input: &PredictionInput) -> YieldForecast {
        match self.try_forecast(input) {
            Ok(forecast) => {
                record_outcome("yield", true);
                forecast
            }
            Err(e) => {
                error!(error = %e, "Yield forecast failed");
                record_outcome("yield", false);
                YieldForecast::failed(e)
            }
        }
    }

    pub fn try_forecast(&self, input: &PredictionInput) -> Result<YieldForecast> {
        let conditions = YieldConditions::from_input(input)?;
        self.forecast_conditions(&conditions)
    }

    pub fn forecast_conditions(&self, conditions: &YieldConditions) -> Result<YieldForecast> {
        let model = &self.models.yield_model;
        let features = model.scaler.transform_row(&conditions.features())?;
        let raw = model
            .regressor
            .predict(&features)?
            .first()
            .copied()
            .ok_or_else(|| AppError::Model("Regressor returned no prediction".to_string()))?;

        if !raw.is_finite() {
            return Err(AppError::Model(format!("Non-finite yield estimate: {}", raw)));
        }

        let yield_per_ha = round2(raw);
        let total_production_kg = yield_per_ha * conditions.area_hectares;

        debug!(
            crop = %conditions.crop,
            yield_per_ha,
            reference = conditions.reference_yield(),
            total_production_kg,
            "Yield forecast computed"
        );

        Ok(YieldForecast {
            yield_per_ha,
            total_production_kg,
            confidence_interval: confidence_interval(yield_per_ha),
            confidence: FORECAST_CONFIDENCE,
            recommendations: improvement_suggestions(yield_per_ha, conditions),
            error: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conditions() -> YieldConditions {
        YieldConditions {
            crop: "Maïs".to_string(),
            area_hectares: 2.5,
            temperature: 27.0,
            rainfall: 900.0,
            soil_ph: 6.2,
            fertilizer_npk: 250.0,
            irrigation: true,
        }
    }

    #[test]
    fn test_optional_fields_default() {
        let input = PredictionInput::new()
            .with("crop", "Riz")
            .with("area_hectares", 1.0)
            .with("temperature", 30.0)
            .with("rainfall", 1500.0)
            .with("soil_ph", 6.0);
        let parsed = YieldConditions::from_input(&input).unwrap();

        assert_eq!(parsed.fertilizer_npk, 0.0);
        assert!(!parsed.irrigation);
    }

    #[test]
    fn test_interval_is_clamped_at_zero() {
        let interval = confidence_interval(300.0);
        assert_eq!(interval.lower, 0.0);
        assert!((interval.upper - 692.0).abs() < 1e-9);

        let interval = confidence_interval(3000.0);
        assert!((interval.lower - 2608.0).abs() < 1e-9);
        assert!(interval.contains(3000.0));
    }

    #[test]
    fn test_no_suggestions_for_good_conditions() {
        assert!(improvement_suggestions(3500.0, &conditions()).is_empty());
    }

    #[test]
    fn test_suggestions_co_occur() {
        let poor = YieldConditions {
            fertilizer_npk: 50.0,
            irrigation: false,
            rainfall: 700.0,
            soil_ph: 8.0,
            ..conditions()
        };
        let categories: Vec<String> = improvement_suggestions(1500.0, &poor)
            .into_iter()
            .map(|s| s.category)
            .collect();

        assert_eq!(
            categories,
            vec!["Fertilisation", "Irrigation", "pH du sol", "Pratiques générales"]
        );
    }

    #[test]
    fn test_irrigation_suggestion_needs_low_rain() {
        let wet = YieldConditions {
            irrigation: false,
            rainfall: 1200.0,
            ..conditions()
        };
        assert!(improvement_suggestions(3000.0, &wet).is_empty());
    }

    #[test]
    fn test_reference_yield_matches_formula() {
        let c = conditions();
        assert_eq!(
            c.reference_yield(),
            reference_yield(27.0, 900.0, 6.2, 250.0, true)
        );
    }
}
