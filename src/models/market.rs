use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default number of prices returned by a query
pub const DEFAULT_PRICE_LIMIT: usize = 30;

/// Observed price of a crop on a regional market (FCFA/kg)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketPrice {
    pub id: Uuid,
    pub date: NaiveDate,
    pub crop: String,
    pub region: String,
    pub price_per_kg: f64,
    pub supply_level: String,
    pub demand_level: String,
}

impl MarketPrice {
    pub fn new(date: NaiveDate, crop: &str, region: &str, price_per_kg: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            crop: crop.to_string(),
            region: region.to_string(),
            price_per_kg,
            supply_level: "Normal".to_string(),
            demand_level: "Normal".to_string(),
        }
    }

    pub fn with_levels(mut self, supply: &str, demand: &str) -> Self {
        self.supply_level = supply.to_string();
        self.demand_level = demand.to_string();
        self
    }
}

/// Query parameters for market prices
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MarketFilter {
    pub crop: Option<String>,
    pub region: Option<String>,
    pub limit: Option<usize>,
}

impl MarketFilter {
    pub fn crop(mut self, crop: &str) -> Self {
        self.crop = Some(crop.to_string());
        self
    }

    pub fn region(mut self, region: &str) -> Self {
        self.region = Some(region.to_string());
        self
    }

    pub fn matches(&self, price: &MarketPrice) -> bool {
        let crop_ok = self
            .crop
            .as_deref()
            .map_or(true, |c| price.crop.to_lowercase() == c.to_lowercase());
        let region_ok = self
            .region
            .as_deref()
            .map_or(true, |r| price.region.to_lowercase() == r.to_lowercase());
        crop_ok && region_ok
    }

    pub fn effective_limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_PRICE_LIMIT)
    }
}
