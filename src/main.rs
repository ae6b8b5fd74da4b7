//! OCR Service
//!
//! A small HTTP service that extracts text from uploaded images using a
//! fixed pool of Tesseract engines.

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ocr_service::config::Config;
use ocr_service::ocr::TesseractEngine;
use ocr_service::pool::EnginePool;
use ocr_service::routes;
use ocr_service::state::AppState;

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "ocr_service=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();

    let config = Config::from_env().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config from env: {}, using defaults", e);
        Config::default()
    });

    tracing::info!("Starting OCR Service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Tessdata path: {}", config.engine.data_path.display());
    tracing::info!("Language: {}, pool size: {}", config.engine.language, config.pool.size);

    // Build every engine before accepting requests
    let pool = EnginePool::new(config.pool.size, |_| TesseractEngine::new(&config.engine))
        .context("Failed to initialize OCR engine pool")?;

    // One blocking thread per engine; the pool never runs more recognitions than that
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .max_blocking_threads(config.pool.size)
        .build()
        .context("Failed to build Tokio runtime")?;

    runtime.block_on(serve(config, pool))
}

async fn serve(config: Config, pool: EnginePool<TesseractEngine>) -> anyhow::Result<()> {
    let app_state = AppState::new(config.clone(), pool);
    let app = routes::app(app_state.clone());

    let listener = TcpListener::bind((config.server.host.as_str(), config.server.port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", config.server.host, config.server.port))?;
    tracing::info!("OCR Service listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    app_state.shutdown().await;
    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}
