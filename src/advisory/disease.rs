//! Disease and pest risk from temperature and humidity thresholds.

use crate::error::Result;
use crate::models::{DiseaseRisk, PredictionInput, RiskLevel};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const REQUIRED_FIELDS: [&str; 3] = ["crop", "temperature", "humidity"];

const HIGH_RISK_SCORE: f64 = 0.8;
const MODERATE_RISK_SCORE: f64 = 0.5;
const LOW_RISK_SCORE: f64 = 0.2;

/// Threshold table. All comparisons are strict (`>`).
/// Persisted as the disease-risk artifact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskThresholds {
    pub high_temperature: f64,
    pub high_humidity: f64,
    pub moderate_temperature: f64,
    pub moderate_humidity: f64,
    pub fungal_temperature: f64,
    pub fungal_humidity: f64,
    pub pest_temperature: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            high_temperature: 25.0,
            high_humidity: 75.0,
            moderate_temperature: 23.0,
            moderate_humidity: 65.0,
            fungal_temperature: 25.0,
            fungal_humidity: 70.0,
            pest_temperature: 28.0,
        }
    }
}

impl RiskThresholds {
    pub fn level(&self, temperature: f64, humidity: f64) -> RiskLevel {
        if temperature > self.high_temperature && humidity > self.high_humidity {
            RiskLevel::High
        } else if temperature > self.moderate_temperature && humidity > self.moderate_humidity {
            RiskLevel::Moderate
        } else {
            RiskLevel::Low
        }
    }

    pub fn threats(&self, temperature: f64, humidity: f64) -> Vec<String> {
        let mut threats = Vec::new();

        if temperature > self.fungal_temperature && humidity > self.fungal_humidity {
            threats.push("Mildiou - risque élevé".to_string());
            threats.push("Pourriture fongique".to_string());
        }

        if temperature > self.pest_temperature {
            threats.push("Chenille légionnaire".to_string());
            threats.push("Pucerons".to_string());
        }

        if threats.is_empty() {
            threats.push("Conditions généralement favorables".to_string());
        }

        threats
    }
}

pub fn risk_score(level: RiskLevel) -> f64 {
    match level {
        RiskLevel::High => HIGH_RISK_SCORE,
        RiskLevel::Moderate => MODERATE_RISK_SCORE,
        RiskLevel::Low => LOW_RISK_SCORE,
    }
}

pub fn prevention_measures(level: RiskLevel) -> Vec<String> {
    let measures: &[&str] = match level {
        RiskLevel::High => &[
            "Traitement fongicide préventif",
            "Surveillance quotidienne",
            "Améliorer la circulation d'air",
            "Réduire l'irrigation si possible",
        ],
        RiskLevel::Moderate => &[
            "Surveillance régulière",
            "Traitement si symptômes",
            "Bonnes pratiques culturales",
        ],
        RiskLevel::Low => &["Surveillance normale", "Maintenir bonnes pratiques"],
    };
    measures.iter().map(|m| m.to_string()).collect()
}

/// Pure rule evaluation: same inputs, same output
#[derive(Debug, Clone, Default)]
pub struct DiseaseRiskService {
    thresholds: RiskThresholds,
}

impl DiseaseRiskService {
    pub fn new(thresholds: RiskThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &RiskThresholds {
        &self.thresholds
    }

    pub fn assess(&self, crop: &str, temperature: f64, humidity: f64) -> DiseaseRisk {
        let level = self.thresholds.level(temperature, humidity);
        debug!(crop, temperature, humidity, level = %level, "Disease risk assessed");

        DiseaseRisk {
            crop: crop.to_string(),
            risk_level: level,
            risk_score: risk_score(level),
            main_threats: self.thresholds.threats(temperature, humidity),
            prevention_measures: prevention_measures(level),
        }
    }

    /// Read crop/temperature/humidity from an input map. Rainfall is accepted but unused.
    pub fn predict(&self, input: &PredictionInput) -> Result<DiseaseRisk> {
        input.ensure_present(&REQUIRED_FIELDS)?;
        let crop = input.text("crop")?;
        let temperature = input.number("temperature")?;
        let humidity = input.number("humidity")?;
        Ok(self.assess(&crop, temperature, humidity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> DiseaseRiskService {
        DiseaseRiskService::default()
    }

    #[test]
    fn test_levels_and_scores() {
        let high = service().assess("Tomate", 26.0, 80.0);
        assert_eq!(high.risk_level, RiskLevel::High);
        assert_eq!(high.risk_score, 0.8);

        let moderate = service().assess("Tomate", 24.0, 70.0);
        assert_eq!(moderate.risk_level, RiskLevel::Moderate);
        assert_eq!(moderate.risk_score, 0.5);

        let low = service().assess("Tomate", 20.0, 50.0);
        assert_eq!(low.risk_level, RiskLevel::Low);
        assert_eq!(low.risk_score, 0.2);
    }

    #[test]
    fn test_threshold_crossing_flips_to_high() {
        assert_eq!(service().assess("Maïs", 25.0, 75.0).risk_level, RiskLevel::Moderate);
        assert_eq!(service().assess("Maïs", 25.01, 75.01).risk_level, RiskLevel::High);
        assert_eq!(service().assess("Maïs", 23.0, 80.0).risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_threats() {
        let humid = service().assess("Riz", 26.0, 72.0);
        assert_eq!(
            humid.main_threats,
            vec!["Mildiou - risque élevé", "Pourriture fongique"]
        );

        let hot_humid = service().assess("Riz", 30.0, 80.0);
        assert_eq!(hot_humid.main_threats.len(), 4);
        assert!(hot_humid.main_threats.contains(&"Pucerons".to_string()));

        let mild = service().assess("Riz", 20.0, 50.0);
        assert_eq!(mild.main_threats, vec!["Conditions généralement favorables"]);
    }

    #[test]
    fn test_prevention_by_level() {
        assert_eq!(prevention_measures(RiskLevel::High).len(), 4);
        assert_eq!(prevention_measures(RiskLevel::Moderate).len(), 3);
        assert_eq!(
            prevention_measures(RiskLevel::Low),
            vec!["Surveillance normale", "Maintenir bonnes pratiques"]
        );
    }

    #[test]
    fn test_deterministic() {
        let a = service().assess("Oignon", 27.3, 77.7);
        let b = service().assess("Oignon", 27.3, 77.7);
        assert_eq!(a, b);
        assert_eq!(a.crop, "Oignon");
    }

    #[test]
    fn test_predict_requires_fields() {
        let input = PredictionInput::new().with("crop", "Maïs").with("temperature", 30.0);
        assert!(service().predict(&input).is_err());

        let input = input.with("humidity", 80.0).with("rainfall", 1200.0);
        assert_eq!(service().predict(&input).unwrap().risk_level, RiskLevel::High);
    }
}
