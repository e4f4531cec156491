pub mod handlers;
pub mod routes;

pub use routes::*;

use crate::advisory::AdvisoryServices;
use crate::chatbot::{ConversationEngine, InMemorySessionStore, SessionStore};
use crate::config::Config;
use crate::ml::TrainedModels;
use crate::state::{
    FarmStore, InMemoryFarmStore, InMemoryMarketStore, InMemoryPredictionStore, MarketStore,
    PredictionStore,
};
use std::sync::Arc;
use std::time::Instant;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub models: Arc<TrainedModels>,
    pub advisory: Arc<AdvisoryServices>,
    pub chatbot: Arc<ConversationEngine>,
    pub farms: Arc<dyn FarmStore>,
    pub market: Arc<dyn MarketStore>,
    pub predictions: Arc<dyn PredictionStore>,
    pub started_at: Instant,
}

impl AppState {
    /// State backed by in-memory stores
    pub fn new(config: Config, models: Arc<TrainedModels>) -> Self {
        let sessions: Arc<dyn SessionStore> =
            Arc::new(InMemorySessionStore::new(config.chatbot.history_limit));
        let chatbot = ConversationEngine::new(sessions, &config.chatbot.default_language);
        let advisory = AdvisoryServices::new(Arc::clone(&models), &config.ml);

        Self {
            config: Arc::new(config),
            models,
            advisory: Arc::new(advisory),
            chatbot: Arc::new(chatbot),
            farms: Arc::new(InMemoryFarmStore::new()),
            market: Arc::new(InMemoryMarketStore::new()),
            predictions: Arc::new(InMemoryPredictionStore::new()),
            started_at: Instant::now(),
        }
    }

    pub fn with_farm_store(mut self, farms: Arc<dyn FarmStore>) -> Self {
        self.farms = farms;
        self
    }

    pub fn with_market_store(mut self, market: Arc<dyn MarketStore>) -> Self {
        self.market = market;
        self
    }

    pub fn with_prediction_store(mut self, predictions: Arc<dyn PredictionStore>) -> Self {
        self.predictions = predictions;
        self
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
