//! Synthetic market price observations loaded at startup.

use chrono::{Datelike, Duration, NaiveDate};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::f64::consts::PI;

use crate::models::MarketPrice;

pub const SEED_CROPS: [&str; 7] = ["Maïs", "Riz", "Tomate", "Oignon", "Arachide", "Haricot", "Manioc"];
pub const SEED_REGIONS: [&str; 5] = ["Centre", "Littoral", "Nord", "Ouest", "Sud"];

/// Observations span this many days from 2020-01-01
const SPAN_DAYS: i64 = 1500;

/// Amplitude of the yearly price cycle
const SEASONAL_AMPLITUDE: f64 = 0.3;

fn origin() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Seasonal multiplier for a calendar month (1-12)
pub fn seasonal_factor(month: u32) -> f64 {
    1.0 + SEASONAL_AMPLITUDE * (2.0 * PI * month as f64 / 12.0).sin()
}

/// `n` prices: uniform crop, region and date; base price U(200, 1500) FCFA/kg
/// scaled by the seasonal factor of the observation month.
pub fn seed_market_prices(n: usize, seed: u64) -> Vec<MarketPrice> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let origin = origin();

    (0..n)
        .map(|_| {
            let crop = SEED_CROPS[rng.gen_range(0..SEED_CROPS.len())];
            let region = SEED_REGIONS[rng.gen_range(0..SEED_REGIONS.len())];
            let date = origin + Duration::days(rng.gen_range(0..SPAN_DAYS));
            let base: f64 = rng.gen_range(200.0..1500.0);
            let price = (base * seasonal_factor(date.month()) * 100.0).round() / 100.0;
            MarketPrice::new(date, crop, region, price)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_is_deterministic() {
        let a = seed_market_prices(50, 7);
        let b = seed_market_prices(50, 7);
        let key = |p: &MarketPrice| (p.date, p.crop.clone(), p.region.clone(), p.price_per_kg.to_bits());

        assert_eq!(
            a.iter().map(key).collect::<Vec<_>>(),
            b.iter().map(key).collect::<Vec<_>>()
        );
        assert_ne!(
            a.iter().map(key).collect::<Vec<_>>(),
            seed_market_prices(50, 8).iter().map(key).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_values_in_range() {
        let end = origin() + Duration::days(SPAN_DAYS);
        for price in seed_market_prices(500, 42) {
            assert!(SEED_CROPS.contains(&price.crop.as_str()));
            assert!(SEED_REGIONS.contains(&price.region.as_str()));
            assert!(price.date >= origin() && price.date < end);
            // 200 * 0.7 .. 1500 * 1.3
            assert!(price.price_per_kg >= 140.0 && price.price_per_kg <= 1950.0);
            assert_eq!(price.supply_level, "Normal");
        }
    }

    #[test]
    fn test_seasonal_factor() {
        assert!((seasonal_factor(3) - 1.3).abs() < 1e-12);
        assert!((seasonal_factor(9) - 0.7).abs() < 1e-12);
        assert!((seasonal_factor(12) - 1.0).abs() < 1e-12);
    }
}
