use std::fmt;

/// Two-letter (ISO 639-1) codes and the Tesseract traineddata names they map to.
const TESSERACT_CODES: &[(&str, &str)] = &[
    ("en", "eng"),
    ("pl", "pol"),
    ("de", "deu"),
    ("fr", "fra"),
    ("es", "spa"),
    ("it", "ita"),
    ("pt", "por"),
    ("nl", "nld"),
    ("cs", "ces"),
    ("uk", "ukr"),
    ("ru", "rus"),
];

/// A language the engine should recognize, as configured by the operator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LanguageCode(String);

impl LanguageCode {
    pub fn new(code: &str) -> Self {
        Self(code.trim().to_lowercase())
    }

    /// Name of the Tesseract traineddata for this language.
    ///
    /// Unknown codes are passed through untouched so that any installed
    /// traineddata (e.g. `chi_sim`) can still be requested.
    pub fn tesseract_code(&self) -> &str {
        TESSERACT_CODES
            .iter()
            .find(|(short, _)| *short == self.0)
            .map(|(_, long)| *long)
            .unwrap_or(self.0.as_str())
    }

    /// Join languages into the `eng+pol` form Tesseract expects.
    pub fn tesseract_list(languages: &[LanguageCode]) -> String {
        let mut codes: Vec<&str> = Vec::with_capacity(languages.len());
        for code in languages.iter().map(LanguageCode::tesseract_code) {
            if !codes.contains(&code) {
                codes.push(code);
            }
        }
        codes.join("+")
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
