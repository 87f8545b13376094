use leptess::LepTess;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::{OcrError, Result};

use super::language::LanguageCode;
use super::segment::TextSegment;
use super::tsv::{parse_tsv, Grouping};

/// Local OCR backed by Tesseract through leptess.
///
/// `LepTess` keeps the current image and recognition results inside the
/// Tesseract API object, so one instance must never be used from two threads
/// at once. [`super::EngineHandle`] guarantees that.
pub struct TesseractEngine {
    tess: LepTess,
    languages: String,
}

impl TesseractEngine {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        let languages = LanguageCode::tesseract_list(&config.languages);
        if languages.is_empty() {
            return Err(OcrError::Initialization(
                "no recognition languages configured".to_string(),
            ));
        }

        if config.use_gpu {
            warn!("Tesseract has no accelerator support, running on CPU");
        }

        let tess = LepTess::new(config.data_path.as_deref(), &languages).map_err(|e| {
            OcrError::Initialization(format!(
                "Tesseract could not load languages '{languages}': {e}"
            ))
        })?;

        info!(languages = %languages, "Tesseract OCR initialized");

        Ok(Self { tess, languages })
    }
}

impl super::RecognitionEngine for TesseractEngine {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn recognize(&mut self, image: &[u8], paragraph: bool) -> Result<Vec<TextSegment>> {
        self.tess
            .set_image_from_mem(image)
            .map_err(|e| OcrError::Recognition(format!("Failed to set image: {e}")))?;

        let tsv = self
            .tess
            .get_tsv_text(0)
            .map_err(|e| OcrError::Recognition(format!("Failed to extract text: {e}")))?;

        let segments = parse_tsv(&tsv, Grouping::from_paragraph_flag(paragraph));
        debug!(
            languages = %self.languages,
            segments = segments.len(),
            "Tesseract recognition finished"
        );

        Ok(segments)
    }
}
