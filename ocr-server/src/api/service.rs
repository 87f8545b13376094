use tonic::{Request, Response, Status};
use tracing::{info_span, Instrument};
use uuid::Uuid;

use crate::handler::{RecognitionHandler, RecognitionRequest};
use crate::server::WorkerPool;

use super::proto::ocr_service_server::OcrService;
use super::proto::{OcrRequest, OcrResponse};

/// `ocr.OcrService` implementation.
///
/// Every call first takes a slot from the worker pool and hands it to the
/// engine job, so the slot stays taken until the engine is done with the
/// image. Errors leave here as `Status` and nowhere else.
#[derive(Clone, Debug)]
pub struct OcrGrpcService {
    handler: RecognitionHandler,
    pool: WorkerPool,
    expose_error_details: bool,
}

impl OcrGrpcService {
    pub fn new(handler: RecognitionHandler, pool: WorkerPool, expose_error_details: bool) -> Self {
        Self {
            handler,
            pool,
            expose_error_details,
        }
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }
}

#[tonic::async_trait]
impl OcrService for OcrGrpcService {
    async fn perform_ocr(
        &self,
        request: Request<OcrRequest>,
    ) -> Result<Response<OcrResponse>, Status> {
        let request_id = Uuid::new_v4();
        let span = info_span!("perform_ocr", %request_id, remote = ?request.remote_addr());

        async move {
            let permit = self
                .pool
                .acquire()
                .await
                .map_err(|e| e.to_status(self.expose_error_details))?;

            let OcrRequest { image_data } = request.into_inner();

            match self
                .handler
                .handle_holding(RecognitionRequest::new(image_data), permit)
                .await
            {
                Ok(response) => Ok(Response::new(OcrResponse {
                    extracted_text: response.text,
                })),
                Err(err) => Err(err.to_status(self.expose_error_details)),
            }
        }
        .instrument(span)
        .await
    }
}
