//! Farming advisory service.
//!
//! Crop recommendations and yield forecasts from bagged decision-tree models
//! trained on synthetic agronomic data, rule-based disease risk, a keyword
//! driven agricultural assistant, and the farm/market records around them.

pub mod advisory;
pub mod api;
pub mod chatbot;
pub mod config;
pub mod error;
pub mod metrics;
pub mod ml;
pub mod models;
pub mod state;

pub use error::{AppError, Result};
