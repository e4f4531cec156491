use crate::error::{AppError, Result};
use crate::models::{CropSeason, Farm, MarketFilter, MarketPrice, PredictionRecord, UserStats};
use crate::state::{FarmStore, MarketStore, PredictionStore};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

/// In-memory farm store
#[derive(Clone)]
pub struct InMemoryFarmStore {
    farms: Arc<DashMap<Uuid, Farm>>,
    seasons: Arc<DashMap<Uuid, CropSeason>>,
}

impl InMemoryFarmStore {
    pub fn new() -> Self {
        Self {
            farms: Arc::new(DashMap::new()),
            seasons: Arc::new(DashMap::new()),
        }
    }

    fn seasons_where(&self, keep: impl Fn(&CropSeason) -> bool) -> Vec<CropSeason> {
        self.seasons
            .iter()
            .filter(|entry| keep(entry.value()))
            .map(|entry| entry.value().clone())
            .collect()
    }
}

impl Default for InMemoryFarmStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FarmStore for InMemoryFarmStore {
    async fn save_farm(&self, farm: &Farm) -> Result<()> {
        self.farms.insert(farm.id, farm.clone());
        tracing::debug!(farm_id = %farm.id, owner = %farm.owner, "Farm saved");
        Ok(())
    }

    async fn get_farm(&self, id: &Uuid) -> Result<Option<Farm>> {
        Ok(self.farms.get(id).map(|entry| entry.clone()))
    }

    async fn list_farms(&self, owner: &str) -> Result<Vec<Farm>> {
        let mut farms: Vec<Farm> = self
            .farms
            .iter()
            .filter(|entry| entry.owner == owner)
            .map(|entry| entry.value().clone())
            .collect();
        farms.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(farms)
    }

    async fn delete_farm(&self, id: &Uuid) -> Result<()> {
        if self.farms.remove(id).is_none() {
            return Err(AppError::NotFound(format!("Farm {} not found", id)));
        }

        let before = self.seasons.len();
        self.seasons.retain(|_, season| season.farm_id != *id);
        tracing::debug!(
            farm_id = %id,
            seasons_removed = before - self.seasons.len(),
            "Farm deleted"
        );
        Ok(())
    }

    async fn save_season(&self, mut season: CropSeason) -> Result<CropSeason> {
        if !self.farms.contains_key(&season.farm_id) {
            return Err(AppError::NotFound(format!(
                "Farm {} not found",
                season.farm_id
            )));
        }

        season.recompute_derived();
        self.seasons.insert(season.id, season.clone());
        tracing::debug!(season_id = %season.id, farm_id = %season.farm_id, "Season saved");
        Ok(season)
    }

    async fn list_seasons(&self, farm_id: &Uuid) -> Result<Vec<CropSeason>> {
        let mut seasons = self.seasons_where(|s| s.farm_id == *farm_id);
        seasons.sort_by(|a, b| b.planting_date.cmp(&a.planting_date));
        Ok(seasons)
    }

    async fn user_stats(&self, owner: &str) -> Result<UserStats> {
        let farms = self.list_farms(owner).await?;
        let farm_ids: Vec<Uuid> = farms.iter().map(|f| f.id).collect();
        let seasons = self.seasons_where(|s| farm_ids.contains(&s.farm_id));
        Ok(UserStats::compute(&farms, &seasons))
    }
}

/// In-memory market price store
#[derive(Clone)]
pub struct InMemoryMarketStore {
    prices: Arc<DashMap<Uuid, MarketPrice>>,
}

impl InMemoryMarketStore {
    pub fn new() -> Self {
        Self {
            prices: Arc::new(DashMap::new()),
        }
    }
}

impl Default for InMemoryMarketStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketStore for InMemoryMarketStore {
    async fn record(&self, price: MarketPrice) -> Result<()> {
        if !price.price_per_kg.is_finite() || price.price_per_kg < 0.0 {
            return Err(AppError::Validation(format!(
                "Invalid price {} for {}",
                price.price_per_kg, price.crop
            )));
        }
        self.prices.insert(price.id, price);
        Ok(())
    }

    async fn query(&self, filter: &MarketFilter) -> Result<Vec<MarketPrice>> {
        let mut prices: Vec<MarketPrice> = self
            .prices
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();

        // Newest first; ties broken by crop then region for a stable order
        prices.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then_with(|| a.crop.cmp(&b.crop))
                .then_with(|| a.region.cmp(&b.region))
        });
        prices.truncate(filter.effective_limit());
        Ok(prices)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.prices.len())
    }
}

/// In-memory prediction history
#[derive(Clone)]
pub struct InMemoryPredictionStore {
    predictions: Arc<DashMap<Uuid, PredictionRecord>>,
}

impl InMemoryPredictionStore {
    pub fn new() -> Self {
        Self {
            predictions: Arc::new(DashMap::new()),
        }
    }
}

impl Default for InMemoryPredictionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PredictionStore for InMemoryPredictionStore {
    async fn record(&self, prediction: PredictionRecord) -> Result<()> {
        if prediction.owner.trim().is_empty() {
            return Err(AppError::Validation(
                "Prediction owner must not be empty".to_string(),
            ));
        }
        tracing::debug!(
            prediction_id = %prediction.id,
            owner = %prediction.owner,
            kind = %prediction.prediction_type,
            "Prediction recorded"
        );
        self.predictions.insert(prediction.id, prediction);
        Ok(())
    }

    async fn list(&self, owner: &str, limit: usize) -> Result<Vec<PredictionRecord>> {
        let mut predictions: Vec<PredictionRecord> = self
            .predictions
            .iter()
            .filter(|entry| entry.owner == owner)
            .map(|entry| entry.value().clone())
            .collect();
        predictions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        predictions.truncate(limit);
        Ok(predictions)
    }

    async fn count(&self, owner: &str) -> Result<usize> {
        Ok(self
            .predictions
            .iter()
            .filter(|entry| entry.owner == owner)
            .count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewCropSeason, NewFarm, PredictionType, Region, SeasonType, SoilType};
    use chrono::NaiveDate;
    use serde_json::json;

    fn new_farm(owner: &str) -> Farm {
        NewFarm {
            owner: owner.to_string(),
            name: "Parcelle Nord".to_string(),
            region: Region::Center,
            latitude: 3.87,
            longitude: 11.52,
            area_hectares: 4.0,
            soil_type: SoilType::Loam,
            soil_ph: Some(6.2),
            organic_matter: None,
            irrigation_available: false,
        }
        .into_farm()
    }

    fn new_season(farm_id: Uuid, planted: (i32, u32, u32), harvested: bool) -> CropSeason {
        let planting_date = NaiveDate::from_ymd_opt(planted.0, planted.1, planted.2).unwrap();
        NewCropSeason {
            crop: "Maïs".to_string(),
            season_type: SeasonType::Rainy,
            planting_date,
            expected_harvest_date: planting_date + chrono::Duration::days(110),
            actual_harvest_date: harvested.then(|| planting_date + chrono::Duration::days(115)),
            area_planted: 2.0,
            npk_amount: Some(250.0),
            yield_kg_per_ha: Some(3000.0),
            production_cost: Some(600_000.0),
            market_price_per_kg: Some(200.0),
        }
        .into_season(farm_id)
    }

    #[tokio::test]
    async fn test_farm_crud() {
        let store = InMemoryFarmStore::new();
        let farm = new_farm("amina");
        store.save_farm(&farm).await.unwrap();

        assert_eq!(store.get_farm(&farm.id).await.unwrap(), Some(farm.clone()));
        assert_eq!(store.list_farms("amina").await.unwrap().len(), 1);
        assert!(store.list_farms("someone-else").await.unwrap().is_empty());

        store.delete_farm(&farm.id).await.unwrap();
        assert!(store.get_farm(&farm.id).await.unwrap().is_none());
        assert!(matches!(
            store.delete_farm(&farm.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_cascades_seasons() {
        let store = InMemoryFarmStore::new();
        let farm = new_farm("amina");
        let other = new_farm("amina");
        store.save_farm(&farm).await.unwrap();
        store.save_farm(&other).await.unwrap();

        store.save_season(new_season(farm.id, (2024, 3, 1), true)).await.unwrap();
        store.save_season(new_season(other.id, (2024, 3, 1), false)).await.unwrap();

        store.delete_farm(&farm.id).await.unwrap();
        assert!(store.list_seasons(&farm.id).await.unwrap().is_empty());
        assert_eq!(store.list_seasons(&other.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_season_requires_farm() {
        let store = InMemoryFarmStore::new();
        let result = store.save_season(new_season(Uuid::new_v4(), (2024, 3, 1), false)).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_saved_season_has_derived_fields() {
        let store = InMemoryFarmStore::new();
        let farm = new_farm("amina");
        store.save_farm(&farm).await.unwrap();

        let mut season = new_season(farm.id, (2024, 3, 1), true);
        season.market_price_per_kg = Some(250.0);
        let saved = store.save_season(season).await.unwrap();

        assert_eq!(saved.total_production_kg, Some(6000.0));
        assert_eq!(saved.total_revenue, Some(1_500_000.0));
        assert_eq!(saved.profit_margin, Some(60.0));
    }

    #[tokio::test]
    async fn test_seasons_newest_planting_first() {
        let store = InMemoryFarmStore::new();
        let farm = new_farm("amina");
        store.save_farm(&farm).await.unwrap();
        store.save_season(new_season(farm.id, (2023, 3, 1), true)).await.unwrap();
        store.save_season(new_season(farm.id, (2024, 9, 1), false)).await.unwrap();

        let seasons = store.list_seasons(&farm.id).await.unwrap();
        assert_eq!(seasons[0].planting_date, NaiveDate::from_ymd_opt(2024, 9, 1).unwrap());
    }

    #[tokio::test]
    async fn test_user_stats() {
        let store = InMemoryFarmStore::new();
        let farm = new_farm("amina");
        store.save_farm(&farm).await.unwrap();
        store.save_farm(&new_farm("amina")).await.unwrap();
        store.save_season(new_season(farm.id, (2023, 3, 1), true)).await.unwrap();
        store.save_season(new_season(farm.id, (2024, 3, 1), false)).await.unwrap();

        let stats = store.user_stats("amina").await.unwrap();
        assert_eq!(stats.total_farms, 2);
        assert_eq!(stats.total_area, 8.0);
        assert_eq!(stats.active_seasons, 1);
        assert_eq!(stats.completed_seasons, 1);
        assert_eq!(stats.total_production, 12_000.0);
        assert_eq!(stats.average_yield, 3000.0);

        assert_eq!(store.user_stats("nobody").await.unwrap(), UserStats::default());
    }

    #[tokio::test]
    async fn test_market_query_newest_first_filtered_limited() {
        let store = InMemoryMarketStore::new();
        for day in 1..=40 {
            let date = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap() + chrono::Duration::days(day);
            store.record(MarketPrice::new(date, "Maïs", "Centre", 300.0)).await.unwrap();
            store.record(MarketPrice::new(date, "Riz", "Nord", 500.0)).await.unwrap();
        }

        let all = store.query(&MarketFilter::default()).await.unwrap();
        assert_eq!(all.len(), 30);
        assert!(all.windows(2).all(|w| w[0].date >= w[1].date));

        let maize = store.query(&MarketFilter::default().crop("maïs")).await.unwrap();
        assert_eq!(maize.len(), 30);
        assert!(maize.iter().all(|p| p.crop == "Maïs"));
        assert_eq!(
            maize[0].date,
            NaiveDate::from_ymd_opt(2023, 2, 10).unwrap()
        );

        let none = store
            .query(&MarketFilter::default().crop("Riz").region("Centre"))
            .await
            .unwrap();
        assert!(none.is_empty());

        let few = MarketFilter {
            limit: Some(5),
            ..Default::default()
        };
        assert_eq!(store.query(&few).await.unwrap().len(), 5);
        assert_eq!(store.count().await.unwrap(), 80);
    }

    #[tokio::test]
    async fn test_market_rejects_negative_price() {
        let store = InMemoryMarketStore::new();
        let date = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let result = store.record(MarketPrice::new(date, "Riz", "Sud", -1.0)).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    fn prediction(owner: &str, minutes_ago: i64) -> PredictionRecord {
        let mut record = PredictionRecord::new(
            owner,
            PredictionType::YieldForecast,
            json!({"crop": "Maïs"}),
            json!({"yield_per_ha": 3100.0}),
            Some(0.85),
        );
        record.created_at = record.created_at - chrono::Duration::minutes(minutes_ago);
        record
    }

    #[tokio::test]
    async fn test_predictions_listed_newest_first_per_owner() {
        let store = InMemoryPredictionStore::new();
        for minutes_ago in [30, 5, 60] {
            store.record(prediction("amina", minutes_ago)).await.unwrap();
        }
        store.record(prediction("paul", 1)).await.unwrap();

        let history = store.list("amina", 10).await.unwrap();
        assert_eq!(history.len(), 3);
        assert!(history.iter().all(|p| p.owner == "amina"));
        assert!(history.windows(2).all(|w| w[0].created_at >= w[1].created_at));

        assert_eq!(store.list("amina", 2).await.unwrap().len(), 2);
        assert_eq!(store.count("amina").await.unwrap(), 3);
        assert_eq!(store.count("nobody").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_prediction_needs_owner() {
        let store = InMemoryPredictionStore::new();
        let result = store.record(prediction(" ", 0)).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
