//! Ranked crop suggestions from the trained crop classifier.

use crate::advisory::{record_outcome, round2};
use crate::error::{AppError, Result};
use crate::ml::synthetic::crop_for_label;
use crate::ml::{Classifier, MLConfig, TrainedModels};
use crate::models::{BestPractices, PredictionInput, Recommendation};
use std::sync::Arc;
use tracing::{debug, error};

pub const REQUIRED_FIELDS: [&str; 4] = ["temperature", "humidity", "rainfall", "soil_ph"];

/// Acceptable ranges used to justify a recommendation
struct GrowingConditions {
    temperature: (f64, f64),
    rainfall_min: f64,
    soil_ph: (f64, f64),
}

fn growing_conditions(crop: &str) -> Option<GrowingConditions> {
    let conditions = match crop {
        "Maïs" => GrowingConditions {
            temperature: (20.0, 30.0),
            rainfall_min: 500.0,
            soil_ph: (5.5, 7.5),
        },
        "Riz" => GrowingConditions {
            temperature: (20.0, 35.0),
            rainfall_min: 1000.0,
            soil_ph: (5.0, 7.0),
        },
        "Tomate" => GrowingConditions {
            temperature: (18.0, 27.0),
            rainfall_min: 600.0,
            soil_ph: (6.0, 7.0),
        },
        _ => return None,
    };
    Some(conditions)
}

/// Human-readable reasons the conditions suit `crop`
pub fn reasons(crop: &str, temperature: f64, rainfall: f64, soil_ph: f64) -> Vec<String> {
    let mut reasons = Vec::new();

    if let Some(c) = growing_conditions(crop) {
        if (c.temperature.0..=c.temperature.1).contains(&temperature) {
            reasons.push(format!("Température optimale ({}°C)", temperature));
        }
        if rainfall >= c.rainfall_min {
            reasons.push(format!("Pluviométrie adéquate ({}mm)", rainfall));
        }
        if (c.soil_ph.0..=c.soil_ph.1).contains(&soil_ph) {
            reasons.push(format!("pH du sol adapté ({})", soil_ph));
        }
    }

    if reasons.is_empty() {
        reasons.push("Conditions généralement favorables".to_string());
    }

    reasons
}

pub fn best_practices(crop: &str) -> BestPractices {
    let (spacing, fertilizer, irrigation, pest_control) = match crop {
        "Maïs" => (
            "75cm entre lignes, 25cm sur ligne",
            "NPK 15-15-15 à 200-300 kg/ha",
            "Irrigation complémentaire recommandée",
            "Surveiller chenille légionnaire",
        ),
        "Riz" => (
            "20cm x 20cm en repiquage",
            "NPK 20-10-10 + Urée en couverture",
            "Maintenir 5-10cm d'eau",
            "Gestion des adventices essentielle",
        ),
        "Tomate" => (
            "60cm entre lignes, 40cm sur ligne",
            "NPK 10-20-20 + calcium",
            "Goutte-à-goutte recommandé",
            "Traitement préventif contre mildiou",
        ),
        _ => (
            "Suivre les recommandations locales",
            "Analyse du sol recommandée",
            "Selon les besoins hydriques",
            "Surveillance régulière",
        ),
    };

    BestPractices {
        spacing: spacing.to_string(),
        fertilizer: fertilizer.to_string(),
        irrigation: irrigation.to_string(),
        pest_control: pest_control.to_string(),
    }
}

pub struct RecommendationService {
    models: Arc<TrainedModels>,
    min_confidence: f64,
    max_results: usize,
}

impl RecommendationService {
    pub fn new(models: Arc<TrainedModels>, config: &MLConfig) -> Self {
        Self {
            models,
            min_confidence: config.min_confidence,
            max_results: config.max_recommendations,
        }
    }

    /// Recommendations, or an empty list if anything goes wrong
    pub fn recommend(&self, input: &PredictionInput) -> Vec<Recommendation> {
        match self.try_recommend(input) {
            Ok(recommendations) => {
                record_outcome("recommendation", true);
                recommendations
            }
            Err(e) => {
                error!(error = %e, "Crop recommendation failed");
                record_outcome("recommendation", false);
                Vec::new()
            }
        }
    }

    /// Up to `max_results` crops by descending probability, each above `min_confidence`
    pub fn try_recommend(&self, input: &PredictionInput) -> Result<Vec<Recommendation>> {
        let temperature = input.number("temperature")?;
        let humidity = input.number("humidity")?;
        let rainfall = input.number("rainfall")?;
        let soil_ph = input.number("soil_ph")?;

        let model = &self.models.crop;
        let features = model
            .scaler
            .transform_row(&[temperature, humidity, rainfall, soil_ph])?;
        let proba = model.classifier.predict_proba(&features)?;

        let mut ranked: Vec<(i32, f64)> = model
            .classifier
            .classes()
            .iter()
            .copied()
            .zip(proba.row(0).iter().copied())
            .collect();
        if ranked.iter().any(|(_, p)| !p.is_finite()) {
            return Err(AppError::Model("Classifier returned non-finite probabilities".to_string()));
        }
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        let recommendations: Vec<Recommendation> = ranked
            .into_iter()
            .take(self.max_results)
            .filter(|(_, p)| *p > self.min_confidence)
            .filter_map(|(label, p)| {
                let crop = crop_for_label(label)?;
                Some(Recommendation {
                    crop: crop.to_string(),
                    confidence: round2(p * 100.0),
                    reasons: reasons(crop, temperature, rainfall, soil_ph),
                    best_practices: best_practices(crop),
                })
            })
            .collect();

        debug!(
            temperature,
            humidity,
            rainfall,
            soil_ph,
            count = recommendations.len(),
            top = recommendations.first().map(|r| r.crop.as_str()).unwrap_or("none"),
            "Crop recommendations computed"
        );

        Ok(recommendations)
    }
}
