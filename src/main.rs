use agri_advisor::{
    api::{build_router, AppState},
    config::Config,
    ml::MLService,
    state::seed_market_prices,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        eprintln!("Using default configuration");
        Config::default()
    });

    // Initialize tracing
    let level = &config.observability.log_level;
    let json = config.observability.json_logs;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("agri_advisor={},tower_http={}", level, level).into()
            }),
        )
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .init();

    tracing::info!("Starting {} v{}", config.observability.service_name, env!("CARGO_PKG_VERSION"));

    // Initialize Prometheus metrics
    if config.observability.prometheus_enabled {
        if let Err(e) = agri_advisor::metrics::init_metrics() {
            tracing::warn!("Failed to initialize metrics: {}", e);
            tracing::warn!("Continuing without metrics");
        } else {
            tracing::info!("✅ Prometheus metrics initialized");
        }
    } else {
        tracing::info!("⚠️  Prometheus metrics disabled in configuration");
    }

    // Load or train model artifacts before accepting requests
    let ml_service = MLService::new(config.ml.clone());
    let models = tokio::task::spawn_blocking(move || ml_service.initialize(false)).await??;
    for artifact in &models.report {
        tracing::info!(artifact = %artifact.artifact, outcome = artifact.outcome, "Model artifact ready");
    }
    let models = Arc::new(models);

    let app_state = AppState::new(config.clone(), models);

    // Seed market prices
    let seeded = app_state
        .market
        .record_all(seed_market_prices(config.market.seed_samples, config.market.seed))
        .await?;
    tracing::info!(count = seeded, "✅ Market prices seeded");

    let app = build_router(app_state);

    // Start HTTP server
    let http_addr = config.bind_addr();
    let http_listener = tokio::net::TcpListener::bind(&http_addr).await?;

    tracing::info!("🚀 HTTP API server listening on http://{}", http_addr);
    tracing::info!("   Health check: http://{}/health", http_addr);
    tracing::info!("   Metrics: http://{}/metrics", http_addr);
    tracing::info!("Press Ctrl+C to shutdown");

    axum::serve(http_listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("Shutdown signal received");
        })
        .await?;

    tracing::info!("Shut down gracefully");
    Ok(())
}
