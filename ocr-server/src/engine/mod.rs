//! Recognition engine adapter
//!
//! The engine itself is an external capability: given image bytes it returns
//! ordered text segments. This module wraps it behind a narrow interface:
//! - `RecognitionEngine` trait is what a backend implements
//! - `TesseractEngine` is the local backend via leptess (`tesseract` feature)
//! - `EngineHandle` is the process-wide, shareable handle the server hands
//!   to every request
//!
//! Backends are not assumed to be thread-safe. The handle serializes every
//! call behind a mutex and runs it on the blocking thread pool.
//!
//! # Usage
//!
//! ```rust,ignore
//! let engine = EngineHandle::initialize(&config.engine)?;
//! let segments = engine.recognize(image_bytes).await?;
//! ```

mod handle;
mod language;
mod segment;
#[cfg(feature = "tesseract")]
mod tesseract;
mod tsv;

pub use handle::EngineHandle;
pub use language::LanguageCode;
pub use segment::{BoundingBox, TextSegment};
#[cfg(feature = "tesseract")]
pub use tesseract::TesseractEngine;
pub use tsv::{parse_tsv, Grouping};

use crate::error::Result;

/// A loaded recognition model.
///
/// Implementations may keep mutable internal state, hence `&mut self`;
/// callers never touch an engine directly, only through [`EngineHandle`].
pub trait RecognitionEngine: Send + 'static {
    /// Short identifier used in logs, e.g. `"tesseract"`.
    fn name(&self) -> &'static str;

    /// Recognize text in an encoded image.
    ///
    /// Segments come back in reading order. An image without text is
    /// `Ok(vec![])`, not an error.
    fn recognize(&mut self, image: &[u8], paragraph: bool) -> Result<Vec<TextSegment>>;
}
