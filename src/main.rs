mod app_state;
mod config;
mod models;
mod routes;
mod services;

use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use metrics_exporter_prometheus::PrometheusBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use app_state::AppState;
use config::AppConfig;
use services::{ai::GeminiClient, delivery::WebhookDelivery};

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    // Load configuration from environment
    let config = AppConfig::from_env().expect("Failed to load configuration from environment");

    tracing::info!("Initializing maintenance-intake server");

    // Initialize Prometheus metrics recorder
    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    let prometheus_handle = Arc::new(prometheus_handle);

    // Register application metrics
    metrics::describe_counter!("submissions_total", "Total submissions received, by kind");
    metrics::describe_counter!(
        "submissions_failed_total",
        "Submissions that failed, by kind and stage"
    );
    metrics::describe_counter!("image_analysis_total", "Total image analysis requests");
    metrics::describe_histogram!(
        "submission_processing_seconds",
        "Time to validate, summarize and deliver a submission"
    );

    let outbound_timeout = Duration::from_secs(config.ai_timeout_seconds);

    // Initialize generative AI client (classifier + summarizer)
    tracing::info!("Initializing generative AI client");
    let ai_client = Arc::new(
        GeminiClient::new(
            &config.ai_base_url,
            &config.ai_api_key,
            &config.ai_model,
            outbound_timeout,
        )
        .expect("Failed to initialize AI client"),
    );

    // Initialize webhook delivery channel
    tracing::info!("Initializing webhook delivery channel");
    let delivery = Arc::new(
        WebhookDelivery::new(&config.webhook_url, outbound_timeout)
            .expect("Failed to initialize webhook delivery channel"),
    );

    // Create shared application state
    let state = AppState::new(ai_client.clone(), ai_client, delivery);

    // Build API routes
    let app = routes::router(state)
        // Prometheus metrics endpoint (separate state)
        .route(
            "/metrics",
            get(routes::metrics::prometheus_metrics).with_state(prometheus_handle),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(10 * 1024 * 1024)); // photos arrive as data URIs

    tracing::info!("Starting maintenance-intake on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await.expect("Server error");
}
