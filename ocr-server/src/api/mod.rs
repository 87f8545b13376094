//! gRPC surface of the server.
//!
//! `proto` holds the generated `ocr.OcrService` bindings; `OcrGrpcService`
//! is the only place where [`crate::error::OcrError`] is collapsed into a
//! wire [`tonic::Status`].

pub mod proto {
    //! Generated protobuf types and service definitions
    #![allow(clippy::derive_partial_eq_without_eq)]
    tonic::include_proto!("ocr");
}

mod service;

pub use proto::ocr_service_client::OcrServiceClient;
pub use proto::ocr_service_server::{OcrService, OcrServiceServer};
pub use proto::{OcrRequest, OcrResponse};
pub use service::OcrGrpcService;
