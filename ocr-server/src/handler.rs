//! Request handling between the RPC boundary and the engine.
//!
//! The handler is the single place where engine failures become service
//! errors. It never panics on bad input and never retries.

use tracing::{error, info};

use crate::engine::{EngineHandle, TextSegment};
use crate::error::{OcrError, Result};

/// Separator placed between segment texts in the response.
pub const SEGMENT_SEPARATOR: &str = "\n";

/// An encoded image to recognize. The format is left to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionRequest {
    pub image: Vec<u8>,
}

impl RecognitionRequest {
    pub fn new(image: impl Into<Vec<u8>>) -> Self {
        Self {
            image: image.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecognitionResponse {
    pub text: String,
}

/// Join segment texts in engine order.
///
/// Text is copied verbatim: no trimming, no deduplication, no reordering.
pub fn join_segments(segments: &[TextSegment]) -> String {
    segments
        .iter()
        .map(|segment| segment.text.as_str())
        .collect::<Vec<_>>()
        .join(SEGMENT_SEPARATOR)
}

#[derive(Clone, Debug)]
pub struct RecognitionHandler {
    engine: EngineHandle,
}

impl RecognitionHandler {
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }

    /// Validate, recognize and assemble the response for one request.
    pub async fn handle(&self, request: RecognitionRequest) -> Result<RecognitionResponse> {
        self.handle_holding(request, ()).await
    }

    /// Same as [`handle`](Self::handle), with `slot` kept alive for as long
    /// as the engine works on this request.
    pub async fn handle_holding<S>(
        &self,
        request: RecognitionRequest,
        slot: S,
    ) -> Result<RecognitionResponse>
    where
        S: Send + 'static,
    {
        info!(bytes = request.image.len(), "Received new OCR request");

        if request.image.is_empty() {
            let err = OcrError::EmptyImage;
            error!(error = %err, "Rejected OCR request");
            return Err(err);
        }

        match self.engine.recognize_holding(request.image, slot).await {
            Ok(segments) => {
                let text = join_segments(&segments);
                info!(
                    segments = segments.len(),
                    text_length = text.chars().count(),
                    "OCR operation completed successfully"
                );
                Ok(RecognitionResponse { text })
            }
            Err(err) => {
                let err = classify(err);
                error!(error = %err, "OCR operation failed");
                Err(err)
            }
        }
    }
}

/// Anything the engine reports that is not already a recognition or
/// deadline error is treated as an internal failure.
fn classify(err: OcrError) -> OcrError {
    match err {
        OcrError::Recognition(_) | OcrError::Timeout(_) => err,
        other => OcrError::Recognition(other.to_string()),
    }
}
