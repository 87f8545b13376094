use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::{OcrError, Result};

use super::{RecognitionEngine, TextSegment};

/// Shared handle to the single recognition engine of the process.
///
/// Cloning is cheap and every clone talks to the same engine. Calls are
/// serialized by the inner mutex, so throughput is one recognition at a time
/// regardless of how many requests are in flight.
#[derive(Clone)]
pub struct EngineHandle {
    engine: Arc<Mutex<Box<dyn RecognitionEngine>>>,
    name: &'static str,
    paragraph: bool,
    timeout: Option<Duration>,
}

impl EngineHandle {
    /// Load the configured backend. Fails if the model cannot be loaded;
    /// there is no degraded mode.
    pub fn initialize(config: &EngineConfig) -> Result<Self> {
        info!(
            languages = ?config.languages,
            use_gpu = config.use_gpu,
            paragraph = config.paragraph,
            "Initializing OCR engine"
        );

        let engine = load_backend(config)?;
        Ok(Self::from_boxed(engine, config))
    }

    /// Wrap an already constructed engine.
    pub fn from_engine<E: RecognitionEngine>(engine: E, config: &EngineConfig) -> Self {
        Self::from_boxed(Box::new(engine), config)
    }

    fn from_boxed(engine: Box<dyn RecognitionEngine>, config: &EngineConfig) -> Self {
        let timeout = (config.timeout_secs > 0).then(|| Duration::from_secs(config.timeout_secs));
        Self {
            name: engine.name(),
            engine: Arc::new(Mutex::new(engine)),
            paragraph: config.paragraph,
            timeout,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Run recognition on the blocking pool while holding the engine lock.
    pub async fn recognize(&self, image: Vec<u8>) -> Result<Vec<TextSegment>> {
        self.recognize_holding(image, ()).await
    }

    /// Like [`recognize`](Self::recognize), but `slot` is dropped only once
    /// the blocking job is over, even if the caller stopped waiting.
    ///
    /// When a deadline is set and expires, the caller gets
    /// [`OcrError::Timeout`]. A job still waiting for the engine lock at that
    /// point, or when this future is dropped, is skipped; one already inside
    /// the engine runs to completion.
    pub async fn recognize_holding<S>(&self, image: Vec<u8>, slot: S) -> Result<Vec<TextSegment>>
    where
        S: Send + 'static,
    {
        let engine = Arc::clone(&self.engine);
        let paragraph = self.paragraph;
        let abandoned = CancellationToken::new();
        let job_abandoned = abandoned.clone();
        // Fires on timeout and also when the caller's future is dropped.
        let _abandon_on_exit = abandoned.drop_guard();

        let task = tokio::task::spawn_blocking(move || {
            let _slot = slot;
            let mut engine = engine.blocking_lock();
            if job_abandoned.is_cancelled() {
                debug!("Skipping recognition for a caller that timed out");
                return Ok(Vec::new());
            }
            engine.recognize(&image, paragraph)
        });

        let joined = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, task).await {
                Ok(joined) => joined,
                Err(_) => return Err(OcrError::Timeout(limit)),
            },
            None => task.await,
        };

        joined.map_err(|e| OcrError::Recognition(format!("OCR task panicked: {e}")))?
    }
}

#[cfg(feature = "tesseract")]
fn load_backend(config: &EngineConfig) -> Result<Box<dyn RecognitionEngine>> {
    Ok(Box::new(super::TesseractEngine::new(config)?))
}

#[cfg(not(feature = "tesseract"))]
fn load_backend(_config: &EngineConfig) -> Result<Box<dyn RecognitionEngine>> {
    Err(OcrError::Initialization(
        "no recognition backend compiled in, enable the `tesseract` feature".to_string(),
    ))
}

impl std::fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineHandle")
            .field("name", &self.name)
            .field("paragraph", &self.paragraph)
            .field("timeout", &self.timeout)
            .finish()
    }
}
