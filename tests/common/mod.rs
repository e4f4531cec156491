//! Shared fixtures for integration tests
//!
//! Training happens once per test binary; every test reuses the same
//! lightweight models.

#![allow(dead_code)]

use agri_advisor::{
    api::{build_router, AppState},
    config::Config,
    ml::{MLConfig, MLService, TrainedModels},
    models::PredictionInput,
};
use axum::Router;
use once_cell::sync::Lazy;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

pub struct Fixture {
    pub dir: TempDir,
    pub models: Arc<TrainedModels>,
}

static FIXTURE: Lazy<Fixture> = Lazy::new(|| {
    let dir = TempDir::new().expect("temp dir");
    let models = MLService::new(test_ml_config(dir.path()))
        .initialize(false)
        .expect("training test models");
    Fixture {
        dir,
        models: Arc::new(models),
    }
});

/// Small forests, fast enough for tests
pub fn test_ml_config(dir: &Path) -> MLConfig {
    MLConfig {
        training_samples: 1_500,
        recommender_trees: 10,
        yield_trees: 10,
        ..MLConfig::lightweight(dir.to_string_lossy())
    }
}

pub fn trained_models() -> Arc<TrainedModels> {
    Arc::clone(&FIXTURE.models)
}

pub fn test_config() -> Config {
    Config {
        ml: test_ml_config(FIXTURE.dir.path()),
        ..Config::default()
    }
}

pub fn test_state() -> AppState {
    AppState::new(test_config(), trained_models())
}

pub fn test_router() -> Router {
    build_router(test_state())
}

/// Conditions where maize grows well
pub fn recommendation_input() -> PredictionInput {
    PredictionInput::new()
        .with("temperature", 28.5)
        .with("humidity", 75.0)
        .with("rainfall", 1200.0)
        .with("soil_ph", 6.5)
}

pub fn yield_input() -> PredictionInput {
    PredictionInput::new()
        .with("crop", "Maïs")
        .with("area_hectares", 2.5)
        .with("temperature", 27.0)
        .with("rainfall", 900.0)
        .with("soil_ph", 6.2)
        .with("fertilizer_npk", 250.0)
        .with("irrigation", true)
}
