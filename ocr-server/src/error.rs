use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tonic::{Code, Status};

/// Message returned for internal failures when error details are hidden.
pub const GENERIC_INTERNAL_MESSAGE: &str = "An unexpected error occurred during OCR processing";

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("Failed to initialize OCR engine: {0}")]
    Initialization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Image payload is empty")]
    EmptyImage,

    #[error("File not found at the specified path: {}", .0.display())]
    NotFound(PathBuf),

    #[error("An unexpected error occurred during OCR processing: {0}")]
    Recognition(String),

    #[error("OCR operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    #[error("RPC failed with {}: {}", .0.code(), .0.message())]
    Rpc(#[from] Status),
}

impl OcrError {
    pub fn code(&self) -> Code {
        match self {
            OcrError::EmptyImage => Code::InvalidArgument,
            OcrError::NotFound(_) => Code::NotFound,
            OcrError::Timeout(_) => Code::DeadlineExceeded,
            OcrError::Rpc(status) => status.code(),
            _ => Code::Internal,
        }
    }

    /// Collapse the error into a wire status.
    ///
    /// Client-caused errors always carry their message. For internal errors
    /// the cause is only included when `expose_details` is set.
    pub fn to_status(&self, expose_details: bool) -> Status {
        let code = self.code();
        let message = match code {
            Code::Internal if !expose_details => GENERIC_INTERNAL_MESSAGE.to_string(),
            _ => self.to_string(),
        };
        Status::new(code, message)
    }
}

impl From<OcrError> for Status {
    fn from(err: OcrError) -> Self {
        err.to_status(true)
    }
}

pub type Result<T> = std::result::Result<T, OcrError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognition_error_maps_to_internal_with_cause() {
        let status = Status::from(OcrError::Recognition("decoder exploded".to_string()));
        assert_eq!(status.code(), Code::Internal);
        assert!(status.message().contains("decoder exploded"));
    }

    #[test]
    fn test_hidden_details_use_generic_message() {
        let status = OcrError::Recognition("secret path /srv/models".to_string()).to_status(false);
        assert_eq!(status.code(), Code::Internal);
        assert_eq!(status.message(), GENERIC_INTERNAL_MESSAGE);
    }

    #[test]
    fn test_client_errors_keep_message_when_details_hidden() {
        let status = OcrError::EmptyImage.to_status(false);
        assert_eq!(status.code(), Code::InvalidArgument);
        assert_eq!(status.message(), "Image payload is empty");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(OcrError::Timeout(Duration::from_secs(5)).code(), Code::DeadlineExceeded);
        assert_eq!(
            OcrError::NotFound(PathBuf::from("missing.png")).code(),
            Code::NotFound
        );
        assert_eq!(
            OcrError::Initialization("no model".to_string()).code(),
            Code::Internal
        );
        assert_eq!(
            OcrError::Rpc(Status::unavailable("down")).code(),
            Code::Unavailable
        );
    }

    #[test]
    fn test_not_found_message_contains_path() {
        let err = OcrError::NotFound(PathBuf::from("/tmp/nope.png"));
        assert_eq!(
            err.to_string(),
            "File not found at the specified path: /tmp/nope.png"
        );
    }
}
