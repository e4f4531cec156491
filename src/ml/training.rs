use crate::advisory::disease::RiskThresholds;
use crate::error::Result;
use crate::ml::forest::{Classifier, ForestClassifier, ForestParams, ForestRegressor, Regressor};
use crate::ml::models::{Artifact, MLConfig, ModelMetadata, ModelType};
use crate::ml::scaler::StandardScaler;
use crate::ml::synthetic;
use std::time::Instant;
use tracing::info;

fn scaler_metadata(name: &str, config: &MLConfig, n_samples: usize, n_features: usize) -> ModelMetadata {
    ModelMetadata::new(name, ModelType::StandardScaler)
        .with_format_version(config.format_version)
        .with_shape(n_samples, n_features)
}

/// Generate labelled samples, fit the scaler and train the crop forest
pub fn train_crop_recommender(
    config: &MLConfig,
) -> Result<(Artifact<ForestClassifier>, Artifact<StandardScaler>)> {
    let started = Instant::now();
    info!(
        samples = config.training_samples,
        trees = config.recommender_trees,
        max_depth = config.recommender_max_depth,
        "Training crop recommender"
    );

    let dataset = synthetic::crop_dataset(config.training_samples, config.seed);
    let (scaler, scaled) = StandardScaler::fit_transform(&dataset.features)?;
    let dataset = dataset.with_features(scaled);

    let params = ForestParams::new(
        config.recommender_trees,
        config.recommender_max_depth,
        config.seed,
    );
    let mut forest = ForestClassifier::new(params);
    let metrics = forest.train(&dataset)?;

    info!(
        accuracy = metrics.accuracy.unwrap_or_default(),
        classes = forest.classes().len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Crop recommender trained"
    );

    let metadata = ModelMetadata::new("crop_recommender", ModelType::RandomForestClassifier)
        .with_format_version(config.format_version)
        .with_shape(dataset.n_samples, dataset.n_features)
        .with_metrics(metrics)
        .with_hyperparameter("n_trees", params.n_trees)
        .with_hyperparameter("max_depth", params.max_depth)
        .with_hyperparameter("seed", params.seed)
        .with_hyperparameter("features", synthetic::CROP_FEATURES.join(","));

    let scaler_meta = scaler_metadata("crop_scaler", config, dataset.n_samples, dataset.n_features);

    Ok((
        Artifact::new(metadata, forest),
        Artifact::new(scaler_meta, scaler),
    ))
}

/// Generate yield samples, fit the scaler and train the yield forest
pub fn train_yield_predictor(
    config: &MLConfig,
) -> Result<(Artifact<ForestRegressor>, Artifact<StandardScaler>)> {
    let started = Instant::now();
    info!(
        samples = config.training_samples,
        trees = config.yield_trees,
        max_depth = config.yield_max_depth,
        "Training yield predictor"
    );

    let dataset = synthetic::yield_dataset(config.training_samples, config.seed)?;
    let (scaler, scaled) = StandardScaler::fit_transform(&dataset.features)?;
    let dataset = dataset.with_features(scaled);

    let params = ForestParams::new(config.yield_trees, config.yield_max_depth, config.seed);
    let mut forest = ForestRegressor::new(params);
    let metrics = forest.train(&dataset)?;

    info!(
        rmse = metrics.rmse.unwrap_or_default(),
        r_squared = metrics.r_squared.unwrap_or_default(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Yield predictor trained"
    );

    let metadata = ModelMetadata::new("yield_predictor", ModelType::RandomForestRegressor)
        .with_format_version(config.format_version)
        .with_shape(dataset.n_samples, dataset.n_features)
        .with_metrics(metrics)
        .with_hyperparameter("n_trees", params.n_trees)
        .with_hyperparameter("max_depth", params.max_depth)
        .with_hyperparameter("seed", params.seed)
        .with_hyperparameter("features", synthetic::YIELD_FEATURES.join(","));

    let scaler_meta = scaler_metadata("yield_scaler", config, dataset.n_samples, dataset.n_features);

    Ok((
        Artifact::new(metadata, forest),
        Artifact::new(scaler_meta, scaler),
    ))
}

/// The disease rule table has nothing to learn; the artifact records the thresholds in use
pub fn disease_rules(config: &MLConfig) -> Result<Artifact<RiskThresholds>> {
    let metadata = ModelMetadata::new("disease_risk", ModelType::RuleTable)
        .with_format_version(config.format_version);
    Ok(Artifact::new(metadata, RiskThresholds::default()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_config() -> MLConfig {
        MLConfig {
            training_samples: 600,
            recommender_trees: 5,
            yield_trees: 5,
            ..MLConfig::lightweight("unused")
        }
    }

    #[test]
    fn test_crop_recommender_artifacts() {
        let (model, scaler) = train_crop_recommender(&tiny_config()).unwrap();

        assert!(model.payload.is_trained());
        assert_eq!(model.payload.n_trees(), 5);
        assert_eq!(model.metadata.n_features, 4);
        assert_eq!(model.metadata.hyperparameters["max_depth"], "10");
        assert_eq!(scaler.payload.n_features(), 4);
        assert_eq!(scaler.metadata.model_type, ModelType::StandardScaler);
    }

    #[test]
    fn test_yield_predictor_artifacts() {
        let (model, scaler) = train_yield_predictor(&tiny_config()).unwrap();

        let row = scaler
            .payload
            .transform_row(&[2.5, 27.0, 900.0, 6.2, 250.0, 1.0])
            .unwrap();
        let prediction = model.payload.predict(&row).unwrap()[0];
        assert!(prediction >= synthetic::MIN_YIELD_KG_PER_HA);
        assert_eq!(row.dim(), (1, 6));
    }

    #[test]
    fn test_disease_rules_artifact() {
        let artifact = disease_rules(&tiny_config()).unwrap();
        assert_eq!(artifact.metadata.model_type, ModelType::RuleTable);
        assert_eq!(artifact.payload, RiskThresholds::default());
    }
}
