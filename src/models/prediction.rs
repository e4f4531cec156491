use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};
use uuid::Uuid;

/// Number of records returned by a history listing when no limit is given
pub const DEFAULT_PREDICTION_LIMIT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PredictionType {
    CropRecommendation,
    YieldForecast,
    DiseaseRisk,
}

/// One advisory answer kept in a user's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub id: Uuid,
    pub owner: String,
    pub prediction_type: PredictionType,
    pub input_data: Value,
    pub output_data: Value,
    pub confidence_score: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl PredictionRecord {
    pub fn new(
        owner: &str,
        prediction_type: PredictionType,
        input_data: Value,
        output_data: Value,
        confidence_score: Option<f64>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner: owner.to_string(),
            prediction_type,
            input_data,
            output_data,
            confidence_score,
            created_at: Utc::now(),
        }
    }
}
