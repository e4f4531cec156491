use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum::{Display, EnumIter, EnumString};

/// Version stamped into every artifact written by this build.
/// Bump when the feature layout or payload encoding changes.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// ML model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MLConfig {
    /// Directory holding the artifact files
    pub model_dir: String,

    /// Seed for synthetic data generation and bootstrap sampling
    pub seed: u64,

    /// Synthetic samples generated per training run
    pub training_samples: usize,

    /// Trees in the crop recommender forest
    pub recommender_trees: usize,

    /// Maximum depth of each recommender tree
    pub recommender_max_depth: u16,

    /// Trees in the yield forest
    pub yield_trees: usize,

    /// Maximum depth of each yield tree
    pub yield_max_depth: u16,

    /// Artifact format version the registry accepts
    pub format_version: u32,

    /// Artifacts older than this are retrained (None disables age checks)
    pub max_age_days: Option<i64>,

    /// Probability floor for a crop to be recommended (0.0 - 1.0)
    pub min_confidence: f64,

    /// Maximum number of crops returned per recommendation
    pub max_recommendations: usize,
}

impl Default for MLConfig {
    fn default() -> Self {
        Self {
            model_dir: "./data/models".to_string(),
            seed: 42,
            training_samples: 10_000,
            recommender_trees: 100,
            recommender_max_depth: 10,
            yield_trees: 100,
            yield_max_depth: 15,
            format_version: ARTIFACT_FORMAT_VERSION,
            max_age_days: None,
            min_confidence: 0.05,
            max_recommendations: 5,
        }
    }
}

impl MLConfig {
    /// Small forests on a few thousand samples. Used by tests and quick local runs.
    pub fn lightweight(model_dir: impl Into<String>) -> Self {
        Self {
            model_dir: model_dir.into(),
            training_samples: 2_000,
            recommender_trees: 15,
            yield_trees: 15,
            ..Self::default()
        }
    }

    pub fn with_model_dir(mut self, model_dir: impl Into<String>) -> Self {
        self.model_dir = model_dir.into();
        self
    }
}

/// Training sample for ML models
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingSample {
    /// Feature vector
    pub features: Vec<f64>,

    /// Class index for classifiers, measured value for regressors
    pub target: f64,
}

impl TrainingSample {
    pub fn new(features: Vec<f64>, target: f64) -> Self {
        Self { features, target }
    }
}

/// Training dataset
#[derive(Debug, Clone)]
pub struct TrainingDataset {
    /// Feature matrix (n_samples × n_features)
    pub features: Array2<f64>,

    /// Targets, one per row
    pub targets: Array1<f64>,

    /// Number of samples
    pub n_samples: usize,

    /// Number of features
    pub n_features: usize,
}

impl TrainingDataset {
    /// Create a new training dataset from samples
    pub fn from_samples(samples: &[TrainingSample]) -> Self {
        let n_samples = samples.len();
        let n_features = samples.first().map(|s| s.features.len()).unwrap_or(0);

        let mut features = Array2::zeros((n_samples, n_features));
        let mut targets = Array1::zeros(n_samples);

        for (i, sample) in samples.iter().enumerate() {
            for (j, &val) in sample.features.iter().enumerate() {
                features[[i, j]] = val;
            }
            targets[i] = sample.target;
        }

        Self {
            features,
            targets,
            n_samples,
            n_features,
        }
    }

    /// Targets as integer class labels
    pub fn class_labels(&self) -> Vec<i32> {
        self.targets.iter().map(|&t| t as i32).collect()
    }

    /// Replace the feature matrix, keeping targets (used after scaling)
    pub fn with_features(mut self, features: Array2<f64>) -> Self {
        self.n_features = features.ncols();
        self.features = features;
        self
    }
}

/// Model evaluation metrics, computed on the training set
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ModelMetrics {
    /// Fraction of correctly labelled samples (classifiers)
    pub accuracy: Option<f64>,

    /// Root mean squared error (regressors)
    pub rmse: Option<f64>,

    /// Coefficient of determination (regressors)
    pub r_squared: Option<f64>,
}

impl ModelMetrics {
    pub fn classification(y_true: &[i32], y_pred: &[i32]) -> Self {
        if y_true.is_empty() {
            return Self::default();
        }
        let correct = y_true
            .iter()
            .zip(y_pred.iter())
            .filter(|(t, p)| t == p)
            .count();

        Self {
            accuracy: Some(correct as f64 / y_true.len() as f64),
            ..Self::default()
        }
    }

    pub fn regression(y_true: &[f64], y_pred: &[f64]) -> Self {
        let n = y_true.len();
        if n == 0 {
            return Self::default();
        }
        let mean = y_true.iter().sum::<f64>() / n as f64;
        let ss_res: f64 = y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(t, p)| (t - p).powi(2))
            .sum();
        let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();

        Self {
            accuracy: None,
            rmse: Some((ss_res / n as f64).sqrt()),
            r_squared: if ss_tot > 0.0 {
                Some(1.0 - ss_res / ss_tot)
            } else {
                None
            },
        }
    }
}

/// Model metadata, stored in every artifact envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Model name
    pub name: String,

    /// Artifact format version
    pub format_version: u32,

    /// Model type
    pub model_type: ModelType,

    /// Training timestamp
    pub trained_at: chrono::DateTime<chrono::Utc>,

    /// Number of training samples
    pub n_training_samples: usize,

    /// Number of features
    pub n_features: usize,

    /// Training metrics
    pub training_metrics: ModelMetrics,

    /// Hyperparameters
    pub hyperparameters: HashMap<String, String>,
}

impl ModelMetadata {
    pub fn new(name: impl Into<String>, model_type: ModelType) -> Self {
        Self {
            name: name.into(),
            format_version: ARTIFACT_FORMAT_VERSION,
            model_type,
            trained_at: chrono::Utc::now(),
            n_training_samples: 0,
            n_features: 0,
            training_metrics: ModelMetrics::default(),
            hyperparameters: HashMap::new(),
        }
    }

    pub fn with_format_version(mut self, version: u32) -> Self {
        self.format_version = version;
        self
    }

    pub fn with_shape(mut self, n_samples: usize, n_features: usize) -> Self {
        self.n_training_samples = n_samples;
        self.n_features = n_features;
        self
    }

    pub fn with_metrics(mut self, metrics: ModelMetrics) -> Self {
        self.training_metrics = metrics;
        self
    }

    pub fn with_hyperparameter(mut self, key: &str, value: impl ToString) -> Self {
        self.hyperparameters.insert(key.to_string(), value.to_string());
        self
    }
}

/// Model type enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    /// Bagged decision-tree classifier
    RandomForestClassifier,

    /// Bagged decision-tree regressor
    RandomForestRegressor,

    /// Per-feature standardization
    StandardScaler,

    /// Fixed threshold rules
    RuleTable,
}

impl std::fmt::Display for ModelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelType::RandomForestClassifier => write!(f, "Random Forest Classifier"),
            ModelType::RandomForestRegressor => write!(f, "Random Forest Regressor"),
            ModelType::StandardScaler => write!(f, "Standard Scaler"),
            ModelType::RuleTable => write!(f, "Rule Table"),
        }
    }
}

/// The persisted artifacts, one file each under `MLConfig::model_dir`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ArtifactKind {
    CropRecommender,
    CropScaler,
    YieldPredictor,
    YieldScaler,
    DiseaseRisk,
}

impl ArtifactKind {
    pub fn file_name(&self) -> String {
        format!("{}.bin", self)
    }
}

/// Envelope written to disk: metadata followed by the trained payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact<T> {
    pub metadata: ModelMetadata,
    pub payload: T,
}

impl<T> Artifact<T> {
    pub fn new(metadata: ModelMetadata, payload: T) -> Self {
        Self { metadata, payload }
    }
}
