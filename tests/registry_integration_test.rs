/// Integration tests for model artifact persistence
///
/// - Missing, stale and corrupt artifacts are retrained
/// - Reloaded artifacts give bit-identical raw model output
/// - Forced retraining

mod common;

use agri_advisor::ml::{ArtifactKind, Classifier, MLConfig, MLService, Regressor, TrainedModels};
use common::test_ml_config;
use tempfile::TempDir;

fn small_config(dir: &TempDir) -> MLConfig {
    MLConfig {
        training_samples: 600,
        recommender_trees: 4,
        yield_trees: 4,
        ..test_ml_config(dir.path())
    }
}

fn outcomes(models: &TrainedModels) -> Vec<&'static str> {
    models.report.iter().map(|r| r.outcome).collect()
}

#[test]
fn test_missing_artifacts_are_trained() {
    let dir = TempDir::new().unwrap();
    let models = MLService::new(small_config(&dir)).initialize(false).unwrap();

    assert_eq!(outcomes(&models), vec!["missing", "missing", "missing"]);
    assert!(models.trained_any());
}

#[test]
fn test_stale_format_version_is_retrained() {
    let dir = TempDir::new().unwrap();
    MLService::new(small_config(&dir)).initialize(false).unwrap();

    let bumped = MLConfig {
        format_version: small_config(&dir).format_version + 1,
        ..small_config(&dir)
    };
    let models = MLService::new(bumped).initialize(false).unwrap();
    assert_eq!(outcomes(&models), vec!["stale", "stale", "stale"]);

    // the rewritten artifacts carry the new version
    assert_eq!(
        models.crop.metadata.format_version,
        small_config(&dir).format_version + 1
    );
}

#[test]
fn test_corrupt_artifact_is_retrained() {
    let dir = TempDir::new().unwrap();
    let service = MLService::new(small_config(&dir));
    service.initialize(false).unwrap();

    let path = service.registry().artifact_path(ArtifactKind::CropRecommender);
    std::fs::write(&path, b"not an artifact").unwrap();

    let models = service.initialize(false).unwrap();
    assert_eq!(outcomes(&models), vec!["corrupt", "loaded", "loaded"]);

    // and the file is readable again afterwards
    let again = service.initialize(false).unwrap();
    assert!(!again.trained_any());
}

#[test]
fn test_reloaded_models_predict_identically() {
    let dir = TempDir::new().unwrap();
    let trained = MLService::new(small_config(&dir)).initialize(false).unwrap();
    let loaded = MLService::new(small_config(&dir)).initialize(false).unwrap();
    assert!(!loaded.trained_any());

    let crop_row = [28.5, 75.0, 1200.0, 6.5];
    let proba = |models: &TrainedModels| {
        let features = models.crop.scaler.transform_row(&crop_row).unwrap();
        models.crop.classifier.predict_proba(&features).unwrap()
    };
    let (before, after) = (proba(&trained), proba(&loaded));
    assert_eq!(before.dim(), after.dim());
    for (a, b) in before.iter().zip(after.iter()) {
        assert_eq!(a.to_bits(), b.to_bits());
    }
    assert_eq!(trained.crop.classifier.classes(), loaded.crop.classifier.classes());

    let yield_row = [2.5, 27.0, 900.0, 6.2, 250.0, 1.0];
    let forecast = |models: &TrainedModels| {
        let features = models.yield_model.scaler.transform_row(&yield_row).unwrap();
        models.yield_model.regressor.predict(&features).unwrap()
    };
    let (before, after) = (forecast(&trained), forecast(&loaded));
    assert_eq!(before.len(), after.len());
    for (a, b) in before.iter().zip(after.iter()) {
        assert_eq!(a.to_bits(), b.to_bits());
    }
}

#[test]
fn test_force_retrains_everything() {
    let dir = TempDir::new().unwrap();
    let service = MLService::new(small_config(&dir));
    let first = service.initialize(false).unwrap();

    let forced = service.initialize(true).unwrap();
    assert_eq!(outcomes(&forced), vec!["forced", "forced", "forced"]);
    assert!(forced.crop.metadata.trained_at >= first.crop.metadata.trained_at);
}
