//! Engine Pool
//!
//! Shares a small, fixed set of OCR engines between any number of concurrent
//! requests.
//!
//! # Guarantees
//!
//! 1. **Bounded**: at most `size` recognitions run at once
//! 2. **Exclusive**: an engine is held by one request at a time
//! 3. **Leak-free**: the engine goes back on success, failure, panic and
//!    cancellation
//! 4. **FIFO admission**: waiters are admitted in arrival order
//!
//! Recognition runs on tokio's blocking thread pool, so a slow image never
//! stalls the async workers serving other requests.
//!
//! # Usage
//!
//! ```rust,ignore
//! use ocr_service::ocr::{EngineConfig, TesseractEngine};
//! use ocr_service::pool::EnginePool;
//!
//! let config = EngineConfig::default();
//! let pool = EnginePool::new(4, |_| TesseractEngine::new(&config))?;
//!
//! let result = pool.process(image_bytes).await?;
//!
//! pool.shutdown().await;
//! ```

mod engine_pool;
mod error;
mod stats;

pub use engine_pool::EnginePool;
pub use error::PoolError;
pub use stats::PoolStats;
