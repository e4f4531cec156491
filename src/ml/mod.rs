/// Machine learning for crop recommendation and yield forecasting
///
/// This module provides:
/// - Closed-form agronomic rules and synthetic training data
/// - Bagged decision-tree forests (classification and regression)
/// - Feature standardization
/// - Versioned artifact persistence with a staleness policy

pub mod forest;
pub mod models;
pub mod registry;
pub mod scaler;
pub mod service;
pub mod synthetic;
pub mod training;

pub use forest::{Classifier, ForestClassifier, ForestParams, ForestRegressor, Regressor};
pub use models::{
    Artifact, ArtifactKind, MLConfig, ModelMetadata, ModelMetrics, ModelType, TrainingDataset,
    TrainingSample, ARTIFACT_FORMAT_VERSION,
};
pub use registry::{LoadOutcome, ModelRegistry, StalenessPolicy};
pub use scaler::StandardScaler;
pub use service::{ArtifactReport, CropModel, MLService, TrainedModels, YieldModel};
