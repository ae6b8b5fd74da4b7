//! Application state management

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::ocr::OcrEngine;
use crate::pool::EnginePool;

/// Shared application state
pub struct AppState<E: OcrEngine> {
    inner: Arc<AppStateInner<E>>,
}

struct AppStateInner<E: OcrEngine> {
    config: Config,
    pool: EnginePool<E>,
}

impl<E: OcrEngine> Clone for AppState<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E: OcrEngine> AppState<E> {
    /// Create a new application state around an already built engine pool
    pub fn new(config: Config, pool: EnginePool<E>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, pool }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the engine pool
    pub fn pool(&self) -> &EnginePool<E> {
        &self.inner.pool
    }

    /// Shut the engine pool down, waiting at most the configured timeout
    ///
    /// Returns false if recognitions were still running when the timeout hit;
    /// those engines are disposed as soon as they finish.
    pub async fn shutdown(&self) -> bool {
        tracing::info!("Shutting down application state...");
        let limit = Duration::from_secs(self.inner.config.pool.shutdown_timeout_secs);

        match tokio::time::timeout(limit, self.inner.pool.shutdown()).await {
            Ok(()) => true,
            Err(_) => {
                tracing::warn!(
                    "{} recognitions still running after {:?}; leaving them to finish",
                    self.inner.pool.stats().in_use,
                    limit
                );
                false
            }
        }
    }
}
