use crate::ml::MLConfig;
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// Model training and artifact configuration
    #[serde(default)]
    pub ml: MLConfig,

    /// Conversation engine configuration
    #[serde(default)]
    pub chatbot: ChatbotConfig,

    /// Market price seeding
    #[serde(default)]
    pub market: MarketConfig,

    /// Observability configuration
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/local.toml".to_string());

        config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            // Override with config file if it exists
            .add_source(config::File::with_name(&config_path).required(false))
            // Override with environment variables (prefix: AGRI_)
            .add_source(
                config::Environment::with_prefix("AGRI")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Address the HTTP listener binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.http_port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: default_host(),
                http_port: default_http_port(),
                request_timeout_secs: default_request_timeout(),
            },
            ml: MLConfig::default(),
            chatbot: ChatbotConfig::default(),
            market: MarketConfig::default(),
            observability: ObservabilityConfig {
                log_level: default_log_level(),
                json_logs: false,
                service_name: default_service_name(),
                prometheus_enabled: true,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatbotConfig {
    /// Exchanges retained per user
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Language used when a request carries none
    #[serde(default = "default_language")]
    pub default_language: String,
}

impl Default for ChatbotConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            default_language: default_language(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Number of synthetic price observations loaded at startup
    #[serde(default = "default_market_samples")]
    pub seed_samples: usize,

    /// RNG seed for the synthetic observations
    #[serde(default = "default_market_seed")]
    pub seed: u64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            seed_samples: default_market_samples(),
            seed: default_market_seed(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logs: bool,

    /// Service name
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Enable Prometheus metrics
    #[serde(default = "default_true")]
    pub prometheus_enabled: bool,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

fn default_history_limit() -> usize {
    20
}

fn default_language() -> String {
    "fr".to_string()
}

fn default_market_samples() -> usize {
    2000
}

fn default_market_seed() -> u64 {
    42
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_service_name() -> String {
    "agri-advisor".to_string()
}

fn default_true() -> bool {
    true
}
