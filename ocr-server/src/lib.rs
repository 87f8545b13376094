//! gRPC text recognition server.
//!
//! One recognition engine is loaded at startup and shared by every request.
//! Requests run on a bounded worker pool; engine access is serialized.
//!
//! ```rust,ignore
//! let runtime = ServerRuntime::new(Config::from_env());
//! runtime.run(EngineHandle::initialize, CancellationToken::new()).await?;
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod handler;
pub mod lookup;
pub mod server;

pub use client::OcrClient;
pub use config::Config;
pub use engine::{EngineHandle, RecognitionEngine, TextSegment};
pub use error::{OcrError, Result};
pub use handler::{RecognitionHandler, RecognitionRequest, RecognitionResponse};
pub use lookup::LookupOutcome;
pub use server::{ServerPhase, ServerRuntime, WorkerPool};
