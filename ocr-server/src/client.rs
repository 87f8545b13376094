use std::path::Path;
use std::time::Duration;

use tonic::transport::{Channel, Endpoint};
use tracing::error;

use crate::api::{OcrRequest, OcrServiceClient};
use crate::config::DEFAULT_MAX_MESSAGE_BYTES;
use crate::error::{OcrError, Result};

/// Per-call deadline used unless overridden.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Thin client for a running OCR server.
#[derive(Clone, Debug)]
pub struct OcrClient {
    inner: OcrServiceClient<Channel>,
    timeout: Duration,
}

impl OcrClient {
    /// Connect to `addr`, e.g. `http://127.0.0.1:50051`.
    pub async fn connect(addr: impl Into<String>) -> Result<Self> {
        let endpoint = Endpoint::from_shared(addr.into())?;
        let channel = endpoint.connect().await?;
        let inner = OcrServiceClient::new(channel)
            .max_decoding_message_size(DEFAULT_MAX_MESSAGE_BYTES)
            .max_encoding_message_size(DEFAULT_MAX_MESSAGE_BYTES);

        Ok(Self {
            inner,
            timeout: DEFAULT_CALL_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn perform_ocr(&self, image: Vec<u8>) -> Result<String> {
        let mut request = tonic::Request::new(OcrRequest { image_data: image });
        request.set_timeout(self.timeout);

        // Clients are cheap to clone and share the channel.
        let mut client = self.inner.clone();
        match client.perform_ocr(request).await {
            Ok(response) => Ok(response.into_inner().extracted_text),
            Err(status) => {
                error!(code = ?status.code(), message = status.message(), "Error during OCR operation");
                Err(OcrError::Rpc(status))
            }
        }
    }

    /// Read an image from disk and send it.
    pub async fn perform_ocr_file(&self, path: &Path) -> Result<String> {
        if !tokio::fs::try_exists(path).await? {
            return Err(OcrError::NotFound(path.to_path_buf()));
        }
        let image = tokio::fs::read(path).await?;
        self.perform_ocr(image).await
    }
}
