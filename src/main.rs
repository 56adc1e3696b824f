//! Brain MRI Classification Service
//!
//! Classifies brain MRI scans into glioma, meningioma, no-tumor and
//! pituitary adenoma categories with OpenVINO acceleration, served over a
//! REST (Axum) API.

use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use tokio::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use neuroscan::api::rest::{create_rest_router, AppState};
use neuroscan::config::Config;
use neuroscan::engine::{ensure_model_present, ModelLoader};
use neuroscan::service::ScanService;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    info!("Starting MRI Classification Service v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = Config::load(Config::default_path()).unwrap_or_else(|e| {
        info!("Using default config ({})", e);
        Config::default()
    });

    info!("Configuration loaded:");
    info!("  Port: {}", config.server.port);
    info!("  Device: {}", config.inference.device);
    info!("  Model path: {}", config.model.path.display());

    // Fetch the model artifact if it is absent and a remote URL is configured
    if config.model.url.is_some() {
        ensure_model_present(&config.model.path, config.model.url.as_deref()).await?;
    }

    let loader = Arc::new(ModelLoader::new(
        config.model.path.clone(),
        config.inference.device.clone(),
    ));
    let service = Arc::new(ScanService::new(loader));

    // A missing or corrupt artifact is fatal at startup
    service.warm_up().await?;
    info!("Model ready");

    let app_state = Arc::new(AppState {
        service: service.clone(),
        start_time: Instant::now(),
        total_classifications: AtomicU64::new(0),
    });

    let router = create_rest_router(app_state);

    let addr = format!("0.0.0.0:{}", config.server.port);
    info!("REST API listening on http://{}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received, cleaning up...");
        })
        .await?;

    info!("Goodbye!");
    Ok(())
}
