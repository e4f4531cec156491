//! Per-user conversation history

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::error::Result;

/// Exchanges kept per user unless configured otherwise
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// One question and the answer it got
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exchange {
    pub timestamp: DateTime<Utc>,
    pub user_message: String,
    pub bot_response: String,
}

impl Exchange {
    pub fn new(user_message: impl Into<String>, bot_response: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            user_message: user_message.into(),
            bot_response: bot_response.into(),
        }
    }
}

/// Storage for conversation history, injected into the engine
pub trait SessionStore: Send + Sync {
    /// Append an exchange, evicting the oldest beyond the store's limit
    fn append(&self, user_id: &str, exchange: Exchange) -> Result<()>;

    /// Oldest first
    fn history(&self, user_id: &str) -> Result<Vec<Exchange>>;

    /// Returns whether the user had any history
    fn clear(&self, user_id: &str) -> Result<bool>;
}

/// In-memory store; entries for one user are serialized by the map's shard lock
pub struct InMemorySessionStore {
    sessions: DashMap<String, VecDeque<Exchange>>,
    limit: usize,
}

impl InMemorySessionStore {
    pub fn new(limit: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            limit: limit.max(1),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Number of users with history
    pub fn user_count(&self) -> usize {
        self.sessions.len()
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl SessionStore for InMemorySessionStore {
    fn append(&self, user_id: &str, exchange: Exchange) -> Result<()> {
        let mut history = self.sessions.entry(user_id.to_string()).or_default();
        history.push_back(exchange);
        while history.len() > self.limit {
            history.pop_front();
        }
        Ok(())
    }

    fn history(&self, user_id: &str) -> Result<Vec<Exchange>> {
        Ok(self
            .sessions
            .get(user_id)
            .map(|h| h.iter().cloned().collect())
            .unwrap_or_default())
    }

    fn clear(&self, user_id: &str) -> Result<bool> {
        Ok(self.sessions.remove(user_id).is_some())
    }
}
