use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A ranked crop suggestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub crop: String,

    /// Percentage (0-100), two decimals
    pub confidence: f64,

    pub reasons: Vec<String>,

    pub best_practices: BestPractices,
}

/// Agronomic advice by practice category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestPractices {
    pub spacing: String,
    pub fertilizer: String,
    pub irrigation: String,
    pub pest_control: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
}

impl ConfidenceInterval {
    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImprovementSuggestion {
    pub category: String,
    pub recommendation: String,
    pub impact: String,
}

impl ImprovementSuggestion {
    pub fn new(category: &str, recommendation: &str, impact: &str) -> Self {
        Self {
            category: category.to_string(),
            recommendation: recommendation.to_string(),
            impact: impact.to_string(),
        }
    }
}

/// Yield estimate for one crop on one plot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldForecast {
    /// kg/ha, two decimals
    pub yield_per_ha: f64,

    /// `yield_per_ha * area_hectares`
    pub total_production_kg: f64,

    pub confidence_interval: ConfidenceInterval,

    pub confidence: f64,

    pub recommendations: Vec<ImprovementSuggestion>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl YieldForecast {
    /// Degraded result returned when the forecast could not be computed
    pub fn failed(error: impl ToString) -> Self {
        Self {
            yield_per_ha: 0.0,
            total_production_kg: 0.0,
            confidence_interval: ConfidenceInterval {
                lower: 0.0,
                upper: 0.0,
            },
            confidence: 0.0,
            recommendations: Vec::new(),
            error: Some(error.to_string()),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    /// French label shown to farmers
    pub fn label_fr(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Faible",
            RiskLevel::Moderate => "Modéré",
            RiskLevel::High => "Élevé",
        }
    }
}

/// Disease and pest risk under given weather conditions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseRisk {
    pub crop: String,
    pub risk_level: RiskLevel,
    pub risk_score: f64,
    pub main_threats: Vec<String>,
    pub prevention_measures: Vec<String>,
}
