//! Seeded synthetic datasets exported as CSV for offline analysis.
//!
//! Every generator draws from its own ChaCha8 stream, so a given seed always
//! yields the same files.

use chrono::{Datelike, Duration, NaiveDate};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{AppError, Result};
use crate::state::seed_market_prices;

pub const FARM_CROPS: [&str; 8] = [
    "Maïs", "Riz", "Manioc", "Tomate", "Oignon", "Coton", "Arachide", "Soja",
];
pub const FARM_REGIONS: [&str; 10] = [
    "Nord",
    "Extrême-Nord",
    "Adamaoua",
    "Centre",
    "Sud",
    "Est",
    "Ouest",
    "Littoral",
    "Nord-Ouest",
    "Sud-Ouest",
];
const SOIL_TYPES: [&str; 4] = ["Sableux", "Argileux", "Limoneux", "Argilo-limoneux"];
const IRRIGATION_TYPES: [&str; 4] = ["Goutte-à-goutte", "Aspersion", "Gravitaire", "Aucune"];
const YIELD_QUALITIES: [&str; 4] = ["Excellente", "Bonne", "Moyenne", "Faible"];
const EDUCATION_LEVELS: [&str; 4] = ["Primaire", "Secondaire", "Supérieur", "Aucun"];

const PEST_CROPS: [&str; 5] = ["Maïs", "Tomate", "Coton", "Riz", "Cacao"];
const PESTS_AND_DISEASES: [&str; 10] = [
    "Chenille légionnaire",
    "Pucerons",
    "Mouche blanche",
    "Foreur de tige",
    "Criquet",
    "Mildiou",
    "Rouille",
    "Fusariose",
    "Anthracnose",
    "Virus mosaïque",
];
const SEVERITIES: [&str; 3] = ["Faible", "Modérée", "Sévère"];

const FERTILIZER_TYPES: [&str; 7] = [
    "NPK 15-15-15",
    "NPK 20-10-10",
    "Urée",
    "Phosphate",
    "Potasse",
    "Compost",
    "Fumier",
];
const APPLICATION_TIMINGS: [&str; 4] = ["Semis", "Croissance", "Floraison", "Maturation"];

/// Files written by [`save_datasets`], in order
pub const DATASET_FILES: [&str; 5] = [
    "farms.csv",
    "weather_stations.csv",
    "market_prices.csv",
    "pests_diseases.csv",
    "fertilizers.csv",
];

/// How much data to generate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetSizes {
    /// Rows of the farm, market, pest and fertilizer tables
    pub rows: usize,
    pub stations: usize,
    /// Daily observations per weather station
    pub days: usize,
}

impl Default for DatasetSizes {
    fn default() -> Self {
        Self {
            rows: 1_000,
            stations: 10,
            days: 365,
        }
    }
}

/// One farm season with its economics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FarmRecord {
    pub farm_id: String,
    pub region: &'static str,
    pub crop: &'static str,
    pub area_hectares: f64,
    pub soil_type: &'static str,
    pub soil_ph: f64,
    pub organic_matter: f64,
    pub temperature_avg: f64,
    pub temperature_min: f64,
    pub temperature_max: f64,
    pub rainfall_mm: i64,
    pub humidity_percent: f64,
    pub irrigation_available: bool,
    pub irrigation_type: &'static str,
    pub fertilizer_used: bool,
    pub npk_kg_ha: u32,
    pub pesticide_applications: u32,
    pub planting_date: NaiveDate,
    pub harvest_date: NaiveDate,
    pub yield_kg_ha: u32,
    pub yield_quality: &'static str,
    pub market_price_per_kg: u32,
    /// `yield_kg_ha * area_hectares * market_price_per_kg`
    pub total_revenue: f64,
    pub production_cost: u32,
    /// Percent of revenue left after costs, two decimals
    pub profit_margin: f64,
    pub farmer_experience_years: u32,
    pub education_level: &'static str,
    pub access_to_extension: bool,
    pub access_to_credit: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherStationRecord {
    pub station_id: String,
    pub date: NaiveDate,
    pub latitude: f64,
    pub longitude: f64,
    pub temperature_max: f64,
    pub temperature_min: f64,
    pub temperature_avg: f64,
    pub rainfall_mm: u32,
    pub humidity_percent: f64,
    pub wind_speed_kmh: f64,
    pub solar_radiation_wm2: f64,
    pub evapotranspiration_mm: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PestDiseaseRecord {
    pub crop: &'static str,
    pub pest_or_disease: &'static str,
    pub severity: &'static str,
    pub temperature_avg: f64,
    pub humidity_percent: f64,
    pub rainfall_mm: u32,
    pub yield_loss_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FertilizerRecord {
    pub fertilizer_type: &'static str,
    pub nitrogen_content: f64,
    pub phosphorus_content: f64,
    pub potassium_content: f64,
    pub application_rate_kg_ha: u32,
    pub application_timing: &'static str,
    pub cost_per_kg: u32,
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn pick<R: Rng>(rng: &mut R, values: &[&'static str]) -> &'static str {
    values.choose(rng).copied().unwrap_or_default()
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

/// Revenue and margin of one season. A season without revenue has no margin.
pub fn farm_economics(yield_kg_ha: f64, area_hectares: f64, price_per_kg: f64, cost: f64) -> (f64, f64) {
    let revenue = round_to(yield_kg_ha * area_hectares * price_per_kg, 2);
    let margin = if revenue > 0.0 {
        round_to((revenue - cost) / revenue * 100.0, 2)
    } else {
        0.0
    };
    (revenue, margin)
}

/// `n` farm seasons planted during 2024. Harvest follows planting by 60-180 days.
pub fn generate_farm_records(n: usize, seed: u64) -> Vec<FarmRecord> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let year_start = date(2024, 1, 1);

    (0..n)
        .map(|index| {
            let base_temp: f64 = rng.gen_range(22.0..32.0);
            let base_rainfall: i64 = rng.gen_range(600..=2000);
            let area_hectares = round_to(rng.gen_range(0.5..50.0), 2);
            let planting_date = year_start + Duration::days(rng.gen_range(0..366));
            let yield_kg_ha: u32 = rng.gen_range(500..=8000);
            let market_price_per_kg: u32 = rng.gen_range(100..=2000);
            let production_cost: u32 = rng.gen_range(100_000..=2_000_000);
            let (total_revenue, profit_margin) = farm_economics(
                yield_kg_ha as f64,
                area_hectares,
                market_price_per_kg as f64,
                production_cost as f64,
            );

            FarmRecord {
                farm_id: format!("FARM_{:06}", index),
                region: pick(&mut rng, &FARM_REGIONS),
                crop: pick(&mut rng, &FARM_CROPS),
                area_hectares,
                soil_type: pick(&mut rng, &SOIL_TYPES),
                soil_ph: round_to(rng.gen_range(5.0..7.5), 2),
                organic_matter: round_to(rng.gen_range(1.0..5.0), 2),
                temperature_avg: round_to(base_temp + rng.gen_range(-2.0..2.0), 1),
                temperature_min: round_to(base_temp - rng.gen_range(5.0..10.0), 1),
                temperature_max: round_to(base_temp + rng.gen_range(5.0..12.0), 1),
                rainfall_mm: base_rainfall + rng.gen_range(-200..=200),
                humidity_percent: round_to(rng.gen_range(50.0..90.0), 1),
                irrigation_available: rng.gen_bool(0.5),
                irrigation_type: pick(&mut rng, &IRRIGATION_TYPES),
                fertilizer_used: rng.gen_bool(0.5),
                npk_kg_ha: rng.gen_range(0..=400),
                pesticide_applications: rng.gen_range(0..=8),
                planting_date,
                harvest_date: planting_date + Duration::days(rng.gen_range(60..=180)),
                yield_kg_ha,
                yield_quality: pick(&mut rng, &YIELD_QUALITIES),
                market_price_per_kg,
                total_revenue,
                production_cost,
                profit_margin,
                farmer_experience_years: rng.gen_range(1..=40),
                education_level: pick(&mut rng, &EDUCATION_LEVELS),
                access_to_extension: rng.gen_bool(0.5),
                access_to_credit: rng.gen_bool(0.5),
            }
        })
        .collect()
}

/// Rainfall (mm) and humidity (%) ranges for a calendar month
fn monthly_climate(month: u32) -> ((u32, u32), (f64, f64)) {
    match month {
        6..=9 => ((0, 80), (70.0, 95.0)),
        12 | 1 | 2 => ((0, 10), (40.0, 65.0)),
        _ => ((0, 40), (55.0, 80.0)),
    }
}

/// Daily readings from 2021-01-01 for `stations` fixed stations spread over Cameroon
pub fn generate_weather_stations(stations: usize, days: usize, seed: u64) -> Vec<WeatherStationRecord> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let origin = date(2021, 1, 1);
    let mut records = Vec::with_capacity(stations * days);

    for station in 0..stations {
        let station_id = format!("STN_{:03}", station);
        let latitude = round_to(rng.gen_range(2.0..13.0), 4);
        let longitude = round_to(rng.gen_range(8.0..16.0), 4);

        for day in 0..days {
            let date = origin + Duration::days(day as i64);
            let ((rain_lo, rain_hi), (hum_lo, hum_hi)) = monthly_climate(date.month());

            records.push(WeatherStationRecord {
                station_id: station_id.clone(),
                date,
                latitude,
                longitude,
                temperature_max: round_to(rng.gen_range(28.0..38.0), 1),
                temperature_min: round_to(rng.gen_range(18.0..25.0), 1),
                temperature_avg: round_to(rng.gen_range(23.0..32.0), 1),
                rainfall_mm: rng.gen_range(rain_lo..=rain_hi),
                humidity_percent: round_to(rng.gen_range(hum_lo..hum_hi), 1),
                wind_speed_kmh: round_to(rng.gen_range(0.0..25.0), 1),
                solar_radiation_wm2: round_to(rng.gen_range(150.0..300.0), 1),
                evapotranspiration_mm: round_to(rng.gen_range(2.0..8.0), 2),
            });
        }
    }
    records
}

pub fn generate_pest_disease_records(n: usize, seed: u64) -> Vec<PestDiseaseRecord> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|_| PestDiseaseRecord {
            crop: pick(&mut rng, &PEST_CROPS),
            pest_or_disease: pick(&mut rng, &PESTS_AND_DISEASES),
            severity: pick(&mut rng, &SEVERITIES),
            temperature_avg: round_to(rng.gen_range(20.0..35.0), 1),
            humidity_percent: round_to(rng.gen_range(40.0..95.0), 1),
            rainfall_mm: rng.gen_range(0..=300),
            yield_loss_percent: round_to(rng.gen_range(0.0..80.0), 1),
        })
        .collect()
}

pub fn generate_fertilizer_records(n: usize, seed: u64) -> Vec<FertilizerRecord> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|_| FertilizerRecord {
            fertilizer_type: pick(&mut rng, &FERTILIZER_TYPES),
            nitrogen_content: round_to(rng.gen_range(0.0..46.0), 1),
            phosphorus_content: round_to(rng.gen_range(0.0..23.0), 1),
            potassium_content: round_to(rng.gen_range(0.0..60.0), 1),
            application_rate_kg_ha: rng.gen_range(50..=500),
            application_timing: pick(&mut rng, &APPLICATION_TIMINGS),
            cost_per_kg: rng.gen_range(200..=2000),
        })
        .collect()
}

fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    info!(path = %path.display(), rows = rows.len(), "Dataset written");
    Ok(())
}

/// Generate every dataset into `dir` (created if missing). Each table gets
/// its own seed derived from `seed`. Returns the written paths in
/// [`DATASET_FILES`] order.
pub fn save_datasets(dir: &Path, sizes: DatasetSizes, seed: u64) -> Result<Vec<PathBuf>> {
    if sizes.rows == 0 || sizes.stations == 0 || sizes.days == 0 {
        return Err(AppError::Validation(
            "Dataset sizes must be at least 1".to_string(),
        ));
    }
    std::fs::create_dir_all(dir)?;

    let paths: Vec<PathBuf> = DATASET_FILES.iter().map(|name| dir.join(name)).collect();
    write_csv(&paths[0], &generate_farm_records(sizes.rows, seed))?;
    write_csv(
        &paths[1],
        &generate_weather_stations(sizes.stations, sizes.days, seed.wrapping_add(1)),
    )?;
    write_csv(&paths[2], &seed_market_prices(sizes.rows, seed.wrapping_add(2)))?;
    write_csv(&paths[3], &generate_pest_disease_records(sizes.rows, seed.wrapping_add(3)))?;
    write_csv(&paths[4], &generate_fertilizer_records(sizes.rows, seed.wrapping_add(4)))?;
    Ok(paths)
}
