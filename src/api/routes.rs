use crate::api::{handlers, AppState};
use crate::metrics::track_http_metrics;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower_http::{
    cors::CorsLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

/// Build the main API router
pub fn build_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.server.request_timeout_secs.max(1));

    Router::new()
        // Health endpoints
        .route("/health", get(handlers::health_check))
        .route("/health/live", get(handlers::health_check))
        .route("/health/ready", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics))
        // Advisory
        .route("/v1/recommendations", post(handlers::recommend_crops))
        .route("/v1/yield-prediction", post(handlers::predict_yield))
        .route("/v1/disease-risk", post(handlers::disease_risk))
        // Assistant
        .route("/v1/chatbot", post(handlers::chat))
        .route("/v1/chatbot/history/:user_id", get(handlers::chat_history))
        // Reference data
        .route("/v1/crops", get(handlers::list_crops))
        .route("/v1/market-prices", get(handlers::market_prices))
        // Farm records
        .route("/v1/farms", post(handlers::create_farm).get(handlers::list_farms))
        .route(
            "/v1/farms/:id",
            get(handlers::get_farm)
                .put(handlers::replace_farm)
                .delete(handlers::delete_farm),
        )
        .route(
            "/v1/farms/:id/seasons",
            post(handlers::create_season).get(handlers::list_seasons),
        )
        .route("/v1/users/:owner/stats", get(handlers::user_stats))
        .route("/v1/users/:owner/predictions", get(handlers::user_predictions))
        // Add state
        .with_state(state)
        // Add middleware
        .layer(middleware::from_fn(track_http_metrics))
        .layer(TimeoutLayer::new(timeout))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
}
