//! Engine pool error types

use thiserror::Error;

use crate::ocr::OcrError;

/// Errors surfaced by [`super::EnginePool`]
#[derive(Debug, Error)]
pub enum PoolError {
    /// Pool configuration rejected before any engine was built
    #[error("Invalid pool configuration: {0}")]
    InvalidConfig(String),

    /// An engine failed to initialize; no pool was created
    #[error("Failed to initialize engine {index}: {source}")]
    Construction {
        index: usize,
        #[source]
        source: OcrError,
    },

    /// The engine rejected the image or failed while recognizing it
    #[error(transparent)]
    Ocr(#[from] OcrError),

    /// The pool no longer admits work
    #[error("Engine pool is shut down")]
    ShutDown,

    /// The recognition task panicked or was aborted
    #[error("Recognition task failed: {0}")]
    TaskFailed(String),

    /// A pool invariant was violated
    #[error("Engine pool internal error: {0}")]
    Internal(String),
}

impl PoolError {
    /// Whether the failure belongs to the pool itself rather than the engine or the input
    pub fn is_pool_failure(&self) -> bool {
        matches!(self, Self::ShutDown | Self::TaskFailed(_) | Self::Internal(_))
    }
}
