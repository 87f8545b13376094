//! One-shot recognition of a local file.
//!
//! Results are plain strings for the terminal: the recognized text, a
//! not-found message naming the path, or a generic error naming the cause.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, error};

use crate::config::EngineConfig;
use crate::engine::EngineHandle;
use crate::error::{OcrError, Result};
use crate::handler::join_segments;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Text(String),
    NotFound(PathBuf),
    Failure(String),
}

impl LookupOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, LookupOutcome::Text(_))
    }

    fn from_result(path: &Path, result: Result<String>) -> Self {
        match result {
            Ok(text) => LookupOutcome::Text(text),
            Err(OcrError::NotFound(_)) => LookupOutcome::NotFound(path.to_path_buf()),
            Err(err) => {
                error!(path = %path.display(), error = %err, "Local lookup failed");
                LookupOutcome::Failure(err.to_string())
            }
        }
    }
}

impl fmt::Display for LookupOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupOutcome::Text(text) => f.write_str(text),
            LookupOutcome::NotFound(path) => write!(
                f,
                "Error: File not found at the specified path: {}",
                path.display()
            ),
            LookupOutcome::Failure(cause) => write!(f, "An unexpected error occurred: {cause}"),
        }
    }
}

async fn ensure_exists(path: &Path) -> Result<()> {
    if tokio::fs::try_exists(path).await? {
        Ok(())
    } else {
        Err(OcrError::NotFound(path.to_path_buf()))
    }
}

async fn recognize_file(engine: &EngineHandle, path: &Path) -> Result<String> {
    ensure_exists(path).await?;
    let image = tokio::fs::read(path).await?;
    debug!(path = %path.display(), bytes = image.len(), "Loaded image");
    if image.is_empty() {
        return Err(OcrError::EmptyImage);
    }
    let segments = engine.recognize(image).await?;
    Ok(join_segments(&segments))
}

/// Recognize `path` with an engine that is already loaded.
pub async fn lookup_with_engine(engine: &EngineHandle, path: &Path) -> LookupOutcome {
    LookupOutcome::from_result(path, recognize_file(engine, path).await)
}

/// Check the path, load the engine with `init` and recognize the file.
///
/// The existence check runs first so a typo does not pay for model loading.
/// A failing `init` is reported as a [`LookupOutcome::Failure`].
pub async fn lookup<I>(path: &Path, config: &EngineConfig, init: I) -> LookupOutcome
where
    I: FnOnce(&EngineConfig) -> Result<EngineHandle> + Send + 'static,
{
    if let Err(err) = ensure_exists(path).await {
        return LookupOutcome::from_result(path, Err(err));
    }

    let engine_config = config.clone();
    let engine = tokio::task::spawn_blocking(move || init(&engine_config))
        .await
        .unwrap_or_else(|e| {
            Err(OcrError::Initialization(format!(
                "engine initialization panicked: {e}"
            )))
        });

    match engine {
        Ok(engine) => lookup_with_engine(&engine, path).await,
        Err(err) => LookupOutcome::from_result(path, Err(err)),
    }
}
