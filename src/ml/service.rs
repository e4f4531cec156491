use crate::advisory::disease::RiskThresholds;
use crate::error::Result;
use crate::metrics::MODEL_TRAINING_TOTAL;
use crate::ml::forest::{ForestClassifier, ForestRegressor};
use crate::ml::models::{ArtifactKind, MLConfig, ModelMetadata};
use crate::ml::registry::{LoadOutcome, ModelRegistry};
use crate::ml::scaler::StandardScaler;
use crate::ml::training;
use serde::Serialize;
use std::time::Instant;
use tracing::info;

/// Crop classifier plus the scaler fitted on its training features
pub struct CropModel {
    pub classifier: ForestClassifier,
    pub scaler: StandardScaler,
    pub metadata: ModelMetadata,
}

/// Yield regressor plus the scaler fitted on its training features
pub struct YieldModel {
    pub regressor: ForestRegressor,
    pub scaler: StandardScaler,
    pub metadata: ModelMetadata,
}

/// What happened to each artifact during initialization
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactReport {
    pub artifact: String,
    pub outcome: &'static str,
    pub trained_at: chrono::DateTime<chrono::Utc>,
}

/// Everything the advisory services need, loaded once and shared read-only
pub struct TrainedModels {
    pub crop: CropModel,
    pub yield_model: YieldModel,
    pub disease: RiskThresholds,
    pub report: Vec<ArtifactReport>,
}

impl TrainedModels {
    /// Whether any artifact had to be (re)trained
    pub fn trained_any(&self) -> bool {
        self.report.iter().any(|r| r.outcome != LoadOutcome::Loaded.as_str())
    }
}

/// Loads model artifacts through the registry, training what is missing or stale
pub struct MLService {
    config: MLConfig,
    registry: ModelRegistry,
}

impl MLService {
    pub fn new(config: MLConfig) -> Self {
        let registry = ModelRegistry::from_config(&config);
        Self { config, registry }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn config(&self) -> &MLConfig {
        &self.config
    }

    /// Load all artifacts. With `force`, every artifact is retrained.
    pub fn initialize(&self, force: bool) -> Result<TrainedModels> {
        let started = Instant::now();
        info!(
            model_dir = %self.registry.model_dir().display(),
            force,
            "Initializing ML models"
        );

        let mut report = Vec::new();
        let config = &self.config;

        let (crop_model, crop_scaler, outcome) = if force {
            self.registry.retrain_pair(
                ArtifactKind::CropRecommender,
                ArtifactKind::CropScaler,
                || training::train_crop_recommender(config),
            )?
        } else {
            self.registry.load_or_train_pair(
                ArtifactKind::CropRecommender,
                ArtifactKind::CropScaler,
                || training::train_crop_recommender(config),
            )?
        };
        record(&mut report, ArtifactKind::CropRecommender, outcome, &crop_model.metadata);

        let (yield_model, yield_scaler, outcome) = if force {
            self.registry.retrain_pair(
                ArtifactKind::YieldPredictor,
                ArtifactKind::YieldScaler,
                || training::train_yield_predictor(config),
            )?
        } else {
            self.registry.load_or_train_pair(
                ArtifactKind::YieldPredictor,
                ArtifactKind::YieldScaler,
                || training::train_yield_predictor(config),
            )?
        };
        record(&mut report, ArtifactKind::YieldPredictor, outcome, &yield_model.metadata);

        let (disease, outcome) = if force {
            self.registry
                .retrain(ArtifactKind::DiseaseRisk, || training::disease_rules(config))?
        } else {
            self.registry
                .load_or_train(ArtifactKind::DiseaseRisk, || training::disease_rules(config))?
        };
        record(&mut report, ArtifactKind::DiseaseRisk, outcome, &disease.metadata);

        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "✅ ML models ready"
        );

        Ok(TrainedModels {
            crop: CropModel {
                classifier: crop_model.payload,
                scaler: crop_scaler.payload,
                metadata: crop_model.metadata,
            },
            yield_model: YieldModel {
                regressor: yield_model.payload,
                scaler: yield_scaler.payload,
                metadata: yield_model.metadata,
            },
            disease: disease.payload,
            report,
        })
    }
}

fn record(
    report: &mut Vec<ArtifactReport>,
    kind: ArtifactKind,
    outcome: LoadOutcome,
    metadata: &ModelMetadata,
) {
    MODEL_TRAINING_TOTAL
        .with_label_values(&[&kind.to_string(), outcome.as_str()])
        .inc();

    report.push(ArtifactReport {
        artifact: kind.to_string(),
        outcome: outcome.as_str(),
        trained_at: metadata.trained_at,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config(dir: &TempDir) -> MLConfig {
        MLConfig {
            training_samples: 500,
            recommender_trees: 4,
            yield_trees: 4,
            ..MLConfig::lightweight(dir.path().to_string_lossy())
        }
    }

    #[test]
    fn test_initialize_trains_then_loads() {
        let dir = TempDir::new().unwrap();
        let service = MLService::new(config(&dir));

        let first = service.initialize(false).unwrap();
        assert!(first.trained_any());
        assert_eq!(first.report.len(), 3);
        for kind in [
            ArtifactKind::CropRecommender,
            ArtifactKind::CropScaler,
            ArtifactKind::YieldPredictor,
            ArtifactKind::YieldScaler,
            ArtifactKind::DiseaseRisk,
        ] {
            assert!(service.registry().exists(kind), "{} missing", kind);
        }

        let second = service.initialize(false).unwrap();
        assert!(!second.trained_any());
        assert_eq!(
            second.crop.metadata.trained_at,
            first.crop.metadata.trained_at
        );
    }

    #[test]
    fn test_force_retrains_everything() {
        let dir = TempDir::new().unwrap();
        let service = MLService::new(config(&dir));
        service.initialize(false).unwrap();

        let forced = service.initialize(true).unwrap();
        assert!(forced.report.iter().all(|r| r.outcome == "forced"));
    }
}
