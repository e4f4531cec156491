/// Prometheus metrics for the advisory service
///
/// - HTTP request counts and latencies (via `track_http_metrics`)
/// - Advisory predictions by service and outcome
/// - Chat messages by intent
/// - Model artifact loads and trainings
///
/// # Example
/// ```no_run
/// use agri_advisor::metrics::PREDICTIONS_TOTAL;
///
/// PREDICTIONS_TOTAL
///     .with_label_values(&["recommendation", "success"])
///     .inc();
/// ```

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use lazy_static::lazy_static;
use prometheus::{CounterVec, Gauge, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry};
use std::time::Instant;

const NAMESPACE: &str = "agri_advisor";

lazy_static! {
    /// Global Prometheus registry for all metrics
    pub static ref PROMETHEUS_REGISTRY: Registry = Registry::new();

    /// Labels: method, path, status_code
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests")
            .namespace(NAMESPACE),
        &["method", "path", "status_code"]
    ).expect("Failed to create HTTP_REQUESTS_TOTAL metric");

    /// Labels: method, path
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request duration in seconds"
        )
        .namespace(NAMESPACE)
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["method", "path"]
    ).expect("Failed to create HTTP_REQUEST_DURATION_SECONDS metric");

    /// Advisory computations
    ///
    /// Labels: service (recommendation, yield, disease), outcome (success, degraded)
    pub static ref PREDICTIONS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("predictions_total", "Total number of advisory predictions")
            .namespace(NAMESPACE),
        &["service", "outcome"]
    ).expect("Failed to create PREDICTIONS_TOTAL metric");

    /// Labels: intent
    pub static ref CHAT_MESSAGES_TOTAL: CounterVec = CounterVec::new(
        Opts::new("chat_messages_total", "Total number of chat messages answered")
            .namespace(NAMESPACE),
        &["intent"]
    ).expect("Failed to create CHAT_MESSAGES_TOTAL metric");

    /// Artifact initialization results
    ///
    /// Labels: model, trigger (loaded, missing, stale, corrupt, forced)
    pub static ref MODEL_TRAINING_TOTAL: CounterVec = CounterVec::new(
        Opts::new("model_training_total", "Model artifact loads and trainings")
            .namespace(NAMESPACE),
        &["model", "trigger"]
    ).expect("Failed to create MODEL_TRAINING_TOTAL metric");

    /// Labels: version
    pub static ref BUILD_INFO: GaugeVec = GaugeVec::new(
        Opts::new("build_info", "Application build information")
            .namespace(NAMESPACE),
        &["version"]
    ).expect("Failed to create BUILD_INFO metric");

    pub static ref UPTIME_SECONDS: Gauge = Gauge::with_opts(
        Opts::new("uptime_seconds", "Application uptime in seconds")
            .namespace(NAMESPACE)
    ).expect("Failed to create UPTIME_SECONDS metric");
}

/// Register all metrics with the global registry.
///
/// Call once at startup; a second call fails with `AlreadyReg`.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    PROMETHEUS_REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(PREDICTIONS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(CHAT_MESSAGES_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(MODEL_TRAINING_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(BUILD_INFO.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(UPTIME_SECONDS.clone()))?;

    BUILD_INFO
        .with_label_values(&[env!("CARGO_PKG_VERSION")])
        .set(1.0);

    tracing::info!("Prometheus metrics initialized successfully");
    Ok(())
}

/// Prometheus text exposition of the global registry
pub fn gather_metrics() -> String {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();
    let metric_families = PROMETHEUS_REGISTRY.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::from("# Error encoding metrics\n");
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!("Failed to convert metrics to string: {}", e);
        String::from("# Error converting metrics\n")
    })
}

/// axum middleware recording request count and duration per matched route
pub async fn track_http_metrics(req: Request, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let start = Instant::now();
    let response = next.run(req).await;

    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &path, response.status().as_str()])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[&method, &path])
        .observe(start.elapsed().as_secs_f64());

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_initialization() {
        // Global registry: only the first call in the process succeeds
        let _ = init_metrics();
        let second = init_metrics();
        assert!(second.is_err());
    }

    #[test]
    fn test_prediction_counter() {
        PREDICTIONS_TOTAL
            .with_label_values(&["disease", "success"])
            .inc();

        let value = PREDICTIONS_TOTAL
            .with_label_values(&["disease", "success"])
            .get();
        assert!(value >= 1.0);
    }

    #[test]
    fn test_gather_metrics() {
        let _ = init_metrics();
        CHAT_MESSAGES_TOTAL.with_label_values(&["general"]).inc();
        let metrics = gather_metrics();
        assert!(metrics.contains("agri_advisor_chat_messages_total"));
    }
}
