use std::env;

use crate::engine::LanguageCode;
use crate::error::{OcrError, Result};

pub const DEFAULT_PORT: u16 = 50051;
pub const DEFAULT_MAX_WORKERS: usize = 10;
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 16 * 1024 * 1024;
pub const DEFAULT_LANGUAGES: &str = "pl,en";

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

/// Parse a comma-separated language list, e.g. `pl,en` or `pol+eng`.
///
/// Blank entries are dropped and duplicates keep their first position, since
/// the engine treats the order as priority.
pub fn parse_languages(raw: &str) -> Vec<LanguageCode> {
    let mut languages: Vec<LanguageCode> = Vec::new();
    for code in raw.split([',', '+']) {
        let code = code.trim();
        if code.is_empty() {
            continue;
        }
        let code = LanguageCode::new(code);
        if !languages.contains(&code) {
            languages.push(code);
        }
    }
    languages
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub engine: EngineConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on requests executing at the same time.
    pub max_workers: usize,
    pub max_message_bytes: usize,
    /// Include the underlying cause in `INTERNAL` status messages.
    pub expose_error_details: bool,
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub languages: Vec<LanguageCode>,
    pub use_gpu: bool,
    /// Group detected text into paragraphs instead of single lines.
    pub paragraph: bool,
    pub data_path: Option<String>,
    /// Recognition deadline in seconds. Zero disables it.
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            max_workers: DEFAULT_MAX_WORKERS,
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
            expose_error_details: true,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            languages: parse_languages(DEFAULT_LANGUAGES),
            use_gpu: false,
            paragraph: true,
            data_path: None,
            timeout_secs: 0,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let server_defaults = ServerConfig::default();
        let engine_defaults = EngineConfig::default();

        Self {
            server: ServerConfig {
                host: env::var("OCR_HOST").unwrap_or(server_defaults.host),
                port: parse_env_or("OCR_PORT", server_defaults.port),
                max_workers: parse_env_or("OCR_MAX_WORKERS", server_defaults.max_workers),
                max_message_bytes: parse_env_or(
                    "OCR_MAX_MESSAGE_BYTES",
                    server_defaults.max_message_bytes,
                ),
                expose_error_details: parse_env_or(
                    "OCR_EXPOSE_ERROR_DETAILS",
                    server_defaults.expose_error_details,
                ),
            },
            engine: EngineConfig {
                languages: env::var("OCR_LANGUAGES")
                    .map(|raw| parse_languages(&raw))
                    .unwrap_or(engine_defaults.languages),
                use_gpu: parse_env_or("OCR_USE_GPU", engine_defaults.use_gpu),
                paragraph: parse_env_or("OCR_PARAGRAPH", engine_defaults.paragraph),
                data_path: env::var("OCR_TESSDATA_PATH")
                    .ok()
                    .filter(|path| !path.trim().is_empty()),
                timeout_secs: parse_env_or("OCR_TIMEOUT", engine_defaults.timeout_secs),
            },
        }
    }

    /// Reject settings the server cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.server.max_workers == 0 {
            return Err(OcrError::Config(
                "OCR_MAX_WORKERS must be at least 1".to_string(),
            ));
        }
        if self.server.max_message_bytes == 0 {
            return Err(OcrError::Config(
                "OCR_MAX_MESSAGE_BYTES must be greater than 0".to_string(),
            ));
        }
        if self.engine.languages.is_empty() {
            return Err(OcrError::Config(
                "OCR_LANGUAGES must name at least one language".to_string(),
            ));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
