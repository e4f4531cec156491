pub mod datasets;
pub mod seed;
pub mod store;

pub use datasets::{save_datasets, DatasetSizes, DATASET_FILES};
pub use seed::{seed_market_prices, SEED_CROPS, SEED_REGIONS};
pub use store::{InMemoryFarmStore, InMemoryMarketStore, InMemoryPredictionStore};

use crate::error::Result;
use crate::models::{CropSeason, Farm, MarketFilter, MarketPrice, PredictionRecord, UserStats};
use async_trait::async_trait;
use uuid::Uuid;

/// Storage for farms and their crop seasons
#[async_trait]
pub trait FarmStore: Send + Sync {
    /// Insert or replace a farm
    async fn save_farm(&self, farm: &Farm) -> Result<()>;

    async fn get_farm(&self, id: &Uuid) -> Result<Option<Farm>>;

    /// Farms of one owner, oldest first
    async fn list_farms(&self, owner: &str) -> Result<Vec<Farm>>;

    /// Delete a farm and every season recorded on it
    async fn delete_farm(&self, id: &Uuid) -> Result<()>;

    /// Insert or replace a season. Derived fields are recomputed first;
    /// the stored copy is returned.
    async fn save_season(&self, season: CropSeason) -> Result<CropSeason>;

    /// Seasons of one farm, most recent planting first
    async fn list_seasons(&self, farm_id: &Uuid) -> Result<Vec<CropSeason>>;

    async fn user_stats(&self, owner: &str) -> Result<UserStats>;
}

/// Storage for observed market prices
#[async_trait]
pub trait MarketStore: Send + Sync {
    async fn record(&self, price: MarketPrice) -> Result<()>;

    async fn record_all(&self, prices: Vec<MarketPrice>) -> Result<usize> {
        let count = prices.len();
        for price in prices {
            self.record(price).await?;
        }
        Ok(count)
    }

    /// Matching prices, newest first, at most `filter.effective_limit()`
    async fn query(&self, filter: &MarketFilter) -> Result<Vec<MarketPrice>>;

    async fn count(&self) -> Result<usize>;
}

/// History of advisory answers given to identified users
#[async_trait]
pub trait PredictionStore: Send + Sync {
    async fn record(&self, prediction: PredictionRecord) -> Result<()>;

    /// Records of one owner, newest first, at most `limit`
    async fn list(&self, owner: &str, limit: usize) -> Result<Vec<PredictionRecord>>;

    async fn count(&self, owner: &str) -> Result<usize>;
}
