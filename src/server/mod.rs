//! HTTP surface of the detection service.
//!
//! A thin axum layer over the pipeline: one multipart prediction route, a
//! liveness probe, permissive CORS for the browser frontends, and a body
//! limit sized for photographic uploads. The pipeline is finished loading
//! before the listener binds, so the service is never reachable while only
//! partially ready.

pub mod error;
pub mod handlers;
pub mod response;

pub use error::ApiError;
pub use response::{ClassificationBody, MaskBody, PredictResponse, round4};

use crate::core::config::ServerConfig;
use crate::pipeline::ImageAnalyzer;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// The analyzer backing /predict.
    pub analyzer: Arc<dyn ImageAnalyzer>,
}

impl AppState {
    /// Wraps an analyzer for sharing across handlers.
    pub fn new(analyzer: Arc<dyn ImageAnalyzer>) -> Self {
        Self { analyzer }
    }
}

/// Builds the service router with all routes and middleware attached.
pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/predict", post(handlers::predict))
        .route("/health", get(handlers::health))
        .route("/favicon.ico", get(handlers::favicon))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds the listener and serves until ctrl-c.
pub async fn serve(config: &ServerConfig, state: AppState) -> std::io::Result<()> {
    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    info!(
        host = config.host,
        port = config.port,
        "detection service listening"
    );
    axum::serve(listener, router(state, config.max_upload_bytes))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}
