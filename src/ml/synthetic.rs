//! Closed-form agronomic rules and the synthetic datasets generated from them.
//!
//! `rule_crop` and `reference_yield` are the authoritative models. The forests
//! trained on the generated samples approximate these functions.

use crate::error::{AppError, Result};
use crate::ml::models::{TrainingDataset, TrainingSample};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

/// Crops the recommender can emit. The index is the class label used in training.
pub const CROP_LABELS: [&str; 9] = [
    "Maïs", "Riz", "Manioc", "Tomate", "Oignon", "Coton", "Arachide", "Soja", "Sorgho",
];

/// Catalogue crops drawn uniformly when no rule matches
const FALLBACK_CROPS: [&str; 8] = [
    "Maïs", "Riz", "Manioc", "Tomate", "Oignon", "Coton", "Arachide", "Soja",
];

/// Recommender feature order
pub const CROP_FEATURES: [&str; 4] = ["temperature", "humidity", "rainfall", "soil_ph"];

/// Yield regressor feature order
pub const YIELD_FEATURES: [&str; 6] = [
    "area_hectares",
    "temperature",
    "rainfall",
    "soil_ph",
    "fertilizer_npk",
    "irrigation",
];

pub const BASE_YIELD_KG_PER_HA: f64 = 2000.0;
pub const YIELD_NOISE_STD: f64 = 200.0;
pub const MIN_YIELD_KG_PER_HA: f64 = 500.0;

pub fn crop_label_index(crop: &str) -> Option<usize> {
    CROP_LABELS.iter().position(|c| *c == crop)
}

pub fn crop_for_label(label: i32) -> Option<&'static str> {
    usize::try_from(label)
        .ok()
        .and_then(|i| CROP_LABELS.get(i).copied())
}

/// Deterministic part of the crop rule cascade. `None` means no rule fires.
pub fn rule_crop(temperature: f64, humidity: f64, rainfall: f64, soil_ph: f64) -> Option<&'static str> {
    if temperature > 28.0 && rainfall > 1200.0 {
        Some(if humidity > 70.0 { "Riz" } else { "Maïs" })
    } else if temperature < 25.0 && soil_ph < 6.5 {
        Some(if rainfall < 1000.0 { "Tomate" } else { "Manioc" })
    } else if rainfall < 800.0 {
        Some(if temperature > 27.0 { "Arachide" } else { "Sorgho" })
    } else {
        None
    }
}

/// Full labelling rule: the cascade, else a uniform draw among catalogue crops
pub fn label_crop<R: Rng + ?Sized>(
    temperature: f64,
    humidity: f64,
    rainfall: f64,
    soil_ph: f64,
    rng: &mut R,
) -> &'static str {
    rule_crop(temperature, humidity, rainfall, soil_ph)
        .or_else(|| FALLBACK_CROPS.choose(rng).copied())
        .unwrap_or(FALLBACK_CROPS[0])
}

/// Noise-free yield in kg/ha
pub fn reference_yield(
    temperature: f64,
    rainfall: f64,
    soil_ph: f64,
    fertilizer_npk: f64,
    irrigation: bool,
) -> f64 {
    let temp_factor = 1.0 + 0.3 * (-(temperature - 27.0).powi(2) / 20.0).exp();
    let rain_factor = (rainfall / 1000.0).min(1.5);
    let ph_factor = 1.0 + 0.2 * (-(soil_ph - 6.5).powi(2) / 2.0).exp();
    let npk_factor = 1.0 + fertilizer_npk / 1000.0;
    let irrigation_factor = if irrigation { 1.3 } else { 1.0 };

    BASE_YIELD_KG_PER_HA * temp_factor * rain_factor * ph_factor * npk_factor * irrigation_factor
}

/// Labelled samples for the crop recommender: features follow `CROP_FEATURES`
pub fn crop_dataset(n_samples: usize, seed: u64) -> TrainingDataset {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let samples: Vec<TrainingSample> = (0..n_samples)
        .map(|_| {
            let temperature = rng.gen_range(20.0..35.0);
            let humidity = rng.gen_range(40.0..90.0);
            let rainfall = rng.gen_range(500.0..2000.0);
            let soil_ph = rng.gen_range(5.0..8.0);

            let crop = label_crop(temperature, humidity, rainfall, soil_ph, &mut rng);
            let label = crop_label_index(crop).unwrap_or(0);

            TrainingSample::new(vec![temperature, humidity, rainfall, soil_ph], label as f64)
        })
        .collect();

    TrainingDataset::from_samples(&samples)
}

/// Samples for the yield regressor: features follow `YIELD_FEATURES`
pub fn yield_dataset(n_samples: usize, seed: u64) -> Result<TrainingDataset> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let noise = Normal::new(0.0, YIELD_NOISE_STD)
        .map_err(|e| AppError::Model(format!("Invalid yield noise distribution: {}", e)))?;

    let samples: Vec<TrainingSample> = (0..n_samples)
        .map(|_| {
            let area = rng.gen_range(0.5..20.0);
            let temperature = rng.gen_range(20.0..35.0);
            let rainfall = rng.gen_range(500.0..2000.0);
            let soil_ph = rng.gen_range(5.0..8.0);
            let npk = rng.gen_range(0.0..400.0);
            let irrigation = rng.gen_bool(0.5);

            let value = reference_yield(temperature, rainfall, soil_ph, npk, irrigation)
                + noise.sample(&mut rng);

            TrainingSample::new(
                vec![
                    area,
                    temperature,
                    rainfall,
                    soil_ph,
                    npk,
                    if irrigation { 1.0 } else { 0.0 },
                ],
                value.max(MIN_YIELD_KG_PER_HA),
            )
        })
        .collect();

    Ok(TrainingDataset::from_samples(&samples))
}
