//! Bounded pool of OCR engines
//!
//! # Design
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                         EnginePool                             │
//! │                                                                │
//! │  process() → acquire permit → checkout() → spawn_blocking      │
//! │                    ↑               ↓              ↓            │
//! │           [Semaphore: N]   [idle.pop_front]  [recognize]       │
//! │                    ↑                              ↓            │
//! │             [permit drop] ← [idle.push_back] ← Checkout::drop  │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The idle queue mutex is held only for push/pop. The checkout guard travels
//! into the blocking task, so the engine goes back to the queue when the
//! engine is actually done, even if the awaiting caller was cancelled.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{Notify, OwnedSemaphorePermit, Semaphore};

use super::error::PoolError;
use super::stats::PoolStats;
use crate::ocr::{OcrEngine, OcrError, OcrResult};

/// Fixed-size pool of non-reentrant OCR engines
///
/// Cloning is cheap and every clone refers to the same engines.
pub struct EnginePool<E: OcrEngine> {
    inner: Arc<PoolInner<E>>,
}

impl<E: OcrEngine> Clone for EnginePool<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct PoolInner<E> {
    size: usize,
    engine_name: &'static str,
    /// One permit per engine not currently checked out
    admission: Arc<Semaphore>,
    slots: Mutex<Slots<E>>,
    /// Signalled whenever an engine comes back after shutdown started
    returned: Notify,
    processed: AtomicU64,
    failed: AtomicU64,
}

struct Slots<E> {
    idle: VecDeque<Worker<E>>,
    in_use: usize,
    closed: bool,
}

struct Worker<E> {
    id: usize,
    engine: E,
}

impl<E: OcrEngine> EnginePool<E> {
    /// Build `size` engines up front
    ///
    /// `factory` receives the index of the engine being built. If any call
    /// fails, the engines built so far are dropped before the error is
    /// returned.
    pub fn new<F>(size: usize, mut factory: F) -> Result<Self, PoolError>
    where
        F: FnMut(usize) -> Result<E, OcrError>,
    {
        if size == 0 {
            return Err(PoolError::InvalidConfig(
                "pool size must be at least 1".to_string(),
            ));
        }

        let mut idle = VecDeque::with_capacity(size);
        for id in 0..size {
            match factory(id) {
                Ok(engine) => {
                    tracing::debug!("Engine {} ({}) initialized", id, engine.name());
                    idle.push_back(Worker { id, engine });
                }
                Err(source) => {
                    tracing::error!("Engine {} of {} failed to initialize: {}", id, size, source);
                    let built = idle.len();
                    drop(idle);
                    tracing::debug!("Disposed {} engines built before the failure", built);
                    return Err(PoolError::Construction { index: id, source });
                }
            }
        }

        let engine_name = idle.front().map(|w: &Worker<E>| w.engine.name()).unwrap_or("none");
        tracing::info!("Engine pool ready: {} x {}", size, engine_name);

        Ok(Self {
            inner: Arc::new(PoolInner {
                size,
                engine_name,
                admission: Arc::new(Semaphore::new(size)),
                slots: Mutex::new(Slots {
                    idle,
                    in_use: 0,
                    closed: false,
                }),
                returned: Notify::new(),
                processed: AtomicU64::new(0),
                failed: AtomicU64::new(0),
            }),
        })
    }

    /// Run one recognition on a pooled engine
    ///
    /// Waits without a timeout while all engines are busy. Dropping the
    /// returned future while it waits gives up nothing; dropping it during
    /// recognition returns the engine once recognition finishes.
    pub async fn process(&self, image: Vec<u8>) -> Result<OcrResult, PoolError> {
        let permit = Arc::clone(&self.inner.admission)
            .acquire_owned()
            .await
            .map_err(|_| PoolError::ShutDown)?;

        let worker = self.inner.checkout()?;
        let worker_id = worker.id;
        tracing::debug!("Engine {} checked out for {} bytes", worker_id, image.len());

        let mut checkout = Checkout {
            pool: Arc::clone(&self.inner),
            worker: Some(worker),
            permit: Some(permit),
        };

        let outcome = tokio::task::spawn_blocking(move || {
            let result = checkout.recognize(&image);
            drop(checkout);
            result
        })
        .await;

        match outcome {
            Ok(result) => {
                if let Err(e) = &result {
                    tracing::warn!("Engine {} failed: {}", worker_id, e);
                }
                result
            }
            Err(e) => {
                tracing::error!("Recognition task on engine {} failed: {}", worker_id, e);
                Err(PoolError::TaskFailed(e.to_string()))
            }
        }
    }

    /// Stop admitting work and dispose every engine exactly once
    ///
    /// Idle engines are dropped immediately. Engines still recognizing are
    /// dropped by their checkout guard when they finish; this call waits for
    /// them. Callers that cannot wait should wrap it in a timeout.
    pub async fn shutdown(&self) {
        let (idle, in_flight) = {
            let mut slots = self.inner.slots.lock();
            let idle = if slots.closed {
                VecDeque::new()
            } else {
                slots.closed = true;
                self.inner.admission.close();
                std::mem::take(&mut slots.idle)
            };
            (idle, slots.in_use)
        };

        if !idle.is_empty() {
            let disposed = idle.len();
            drop(idle);
            tracing::info!(
                "Engine pool closing: disposed {} idle engines, {} in flight",
                disposed,
                in_flight
            );
        }

        if in_flight > 0 {
            loop {
                let returned = self.inner.returned.notified();
                if self.inner.slots.lock().in_use == 0 {
                    break;
                }
                returned.await;
            }
        }

        tracing::info!("Engine pool shut down");
    }

    /// Get pool statistics
    pub fn stats(&self) -> PoolStats {
        let slots = self.inner.slots.lock();
        PoolStats {
            size: self.inner.size,
            available: slots.idle.len(),
            in_use: slots.in_use,
            processed: self.inner.processed.load(Ordering::Relaxed),
            failed: self.inner.failed.load(Ordering::Relaxed),
            shut_down: slots.closed,
        }
    }

    /// Number of engines
    pub fn size(&self) -> usize {
        self.inner.size
    }

    /// Name reported by the pooled engines
    pub fn engine_name(&self) -> &'static str {
        self.inner.engine_name
    }

    #[cfg(test)]
    fn free_permits(&self) -> usize {
        self.inner.admission.available_permits()
    }
}

impl<E> PoolInner<E> {
    /// Take the engine at the front of the idle queue
    fn checkout(&self) -> Result<Worker<E>, PoolError> {
        let mut slots = self.slots.lock();
        if slots.closed {
            return Err(PoolError::ShutDown);
        }

        match slots.idle.pop_front() {
            Some(worker) => {
                slots.in_use += 1;
                Ok(worker)
            }
            None => {
                tracing::error!(
                    "Admission granted but no idle engine (size {}, in use {})",
                    self.size,
                    slots.in_use
                );
                Err(PoolError::Internal(format!(
                    "no idle engine despite admission (size {}, in use {})",
                    self.size, slots.in_use
                )))
            }
        }
    }

    /// Put an engine back, or dispose it if the pool has been shut down
    fn checkin(&self, worker: Worker<E>) {
        if std::thread::panicking() {
            self.failed.fetch_add(1, Ordering::Relaxed);
            tracing::warn!("Engine {} returned after a panic", worker.id);
        }

        let mut slots = self.slots.lock();
        slots.in_use -= 1;
        if slots.closed {
            tracing::debug!("Disposing engine {} returned after shutdown", worker.id);
            drop(slots);
            drop(worker);
            self.returned.notify_waiters();
        } else {
            slots.idle.push_back(worker);
        }
    }
}

/// Exclusive hold on one engine and one admission permit
///
/// Dropping it returns the engine first and releases the permit second, so a
/// newly admitted caller always finds an idle engine.
struct Checkout<E> {
    pool: Arc<PoolInner<E>>,
    worker: Option<Worker<E>>,
    permit: Option<OwnedSemaphorePermit>,
}

impl<E: OcrEngine> Checkout<E> {
    fn recognize(&mut self, image: &[u8]) -> Result<OcrResult, PoolError> {
        let worker = self
            .worker
            .as_mut()
            .ok_or_else(|| PoolError::Internal("checkout holds no engine".to_string()))?;

        let result = worker.engine.recognize(image);
        let counter = if result.is_ok() {
            &self.pool.processed
        } else {
            &self.pool.failed
        };
        counter.fetch_add(1, Ordering::Relaxed);

        result.map_err(PoolError::from)
    }
}

impl<E> Drop for Checkout<E> {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            self.pool.checkin(worker);
        }
        drop(self.permit.take());
    }
}
