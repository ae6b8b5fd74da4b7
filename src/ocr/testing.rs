//! Deterministic engine for tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::{OcrEngine, OcrError, OcrResult};

/// Input that makes [`StubEngine`] report an undecodable image
pub const UNDECODABLE: &[u8] = b"not-an-image";
/// Input that makes [`StubEngine`] report an engine failure
pub const ENGINE_FAILURE: &[u8] = b"engine-failure";
/// Input that makes [`StubEngine`] panic mid-recognition
pub const PANIC: &[u8] = b"panic";

/// Shared counters observed by tests
#[derive(Debug, Default)]
pub struct Probe {
    pub active: AtomicUsize,
    pub max_active: AtomicUsize,
    pub calls: AtomicUsize,
    pub disposed: AtomicUsize,
}

impl Probe {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    pub fn disposed(&self) -> usize {
        self.disposed.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Engine that echoes its input length and sleeps to simulate work
pub struct StubEngine {
    pub(crate) id: usize,
    delay: Duration,
    probe: Arc<Probe>,
}

impl StubEngine {
    pub fn new(id: usize, delay: Duration, probe: Arc<Probe>) -> Self {
        Self { id, delay, probe }
    }
}

impl OcrEngine for StubEngine {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn recognize(&mut self, image: &[u8]) -> Result<OcrResult, OcrError> {
        let now = self.probe.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.probe.max_active.fetch_max(now, Ordering::SeqCst);
        self.probe.calls.fetch_add(1, Ordering::SeqCst);

        std::thread::sleep(self.delay);
        self.probe.active.fetch_sub(1, Ordering::SeqCst);

        match image {
            UNDECODABLE => Err(OcrError::ImageDecode("unsupported image format".to_string())),
            ENGINE_FAILURE => Err(OcrError::Recognition("engine crashed".to_string())),
            PANIC => panic!("stub engine panicked"),
            bytes => Ok(OcrResult::new(
                format!("{} bytes", bytes.len()),
                (bytes.len() % 101) as f32,
            )),
        }
    }
}

impl Drop for StubEngine {
    fn drop(&mut self) {
        self.probe.disposed.fetch_add(1, Ordering::SeqCst);
    }
}
