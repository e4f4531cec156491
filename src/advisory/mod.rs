/// Farming advisory services built on the trained models
///
/// - Crop recommendations with reasons and best practices
/// - Yield forecasts with interval and improvement suggestions
/// - Disease and pest risk from weather thresholds

pub mod disease;
pub mod recommendation;
pub mod yield_forecast;

pub use disease::{DiseaseRiskService, RiskThresholds};
pub use recommendation::RecommendationService;
pub use yield_forecast::{YieldConditions, YieldForecastService};

use crate::metrics::PREDICTIONS_TOTAL;
use crate::ml::{MLConfig, TrainedModels};
use std::sync::Arc;

/// Round to two decimals
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub(crate) fn record_outcome(service: &str, success: bool) {
    let outcome = if success { "success" } else { "degraded" };
    PREDICTIONS_TOTAL
        .with_label_values(&[service, outcome])
        .inc();
}

/// The three advisory services sharing one set of trained models
pub struct AdvisoryServices {
    pub recommendations: RecommendationService,
    pub yields: YieldForecastService,
    pub disease: DiseaseRiskService,
}

impl AdvisoryServices {
    pub fn new(models: Arc<TrainedModels>, config: &MLConfig) -> Self {
        Self {
            recommendations: RecommendationService::new(Arc::clone(&models), config),
            yields: YieldForecastService::new(Arc::clone(&models)),
            disease: DiseaseRiskService::new(models.disease),
        }
    }
}
