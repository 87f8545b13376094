//! Server runtime: engine initialization, port binding, serving and drain.
//!
//! Lifecycle:
//!
//! ```text
//! Uninitialized -> Initializing -> Ready -> Draining -> Stopped
//!                       |                                  ^
//!                       +---------- init failure ----------+
//! ```
//!
//! The port is only bound after the engine has loaded, so a broken engine
//! never accepts a connection. The current phase is published on a `watch`
//! channel.

mod pool;
mod shutdown;

pub use pool::WorkerPool;
pub use shutdown::shutdown_signal;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio_stream::wrappers::TcpListenerStream;
use tokio_util::sync::CancellationToken;
use tonic::transport::Server;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::api::{OcrGrpcService, OcrServiceServer};
use crate::config::{Config, EngineConfig};
use crate::engine::EngineHandle;
use crate::error::{OcrError, Result};
use crate::handler::RecognitionHandler;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerPhase {
    Uninitialized,
    Initializing,
    Ready { addr: SocketAddr },
    Draining,
    Stopped,
}

fn transition(phase: &watch::Sender<ServerPhase>, next: ServerPhase) {
    let previous = phase.send_replace(next);
    info!(from = ?previous, to = ?next, "Server phase changed");
}

pub struct ServerRuntime {
    config: Arc<Config>,
    phase: Arc<watch::Sender<ServerPhase>>,
    pool: WorkerPool,
}

impl ServerRuntime {
    pub fn new(config: Config) -> Self {
        let (phase, _) = watch::channel(ServerPhase::Uninitialized);
        let pool = WorkerPool::new(config.server.max_workers);
        Self {
            config: Arc::new(config),
            phase: Arc::new(phase),
            pool,
        }
    }

    /// The pool every call draws its execution slot from.
    pub fn pool(&self) -> WorkerPool {
        self.pool.clone()
    }

    pub fn phase(&self) -> ServerPhase {
        *self.phase.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ServerPhase> {
        self.phase.subscribe()
    }

    /// Initialize the engine with `init`, then serve until `shutdown` is
    /// cancelled and all in-flight requests have finished.
    ///
    /// Any failure before `Ready` ends in `Stopped` and is returned to the
    /// caller, which is expected to exit non-zero.
    pub async fn run<I>(self, init: I, shutdown: CancellationToken) -> Result<()>
    where
        I: FnOnce(&EngineConfig) -> Result<EngineHandle> + Send + 'static,
    {
        if let Err(err) = self.config.validate() {
            error!(error = %err, "Refusing to start with invalid configuration");
            transition(&self.phase, ServerPhase::Stopped);
            return Err(err);
        }

        transition(&self.phase, ServerPhase::Initializing);

        let engine_config = self.config.engine.clone();
        let initialized = tokio::task::spawn_blocking(move || init(&engine_config))
            .await
            .unwrap_or_else(|e| {
                Err(OcrError::Initialization(format!(
                    "engine initialization panicked: {e}"
                )))
            });

        let engine = match initialized {
            Ok(engine) => engine,
            Err(err) => {
                error!(error = %err, "Failed to initialize OCR engine");
                transition(&self.phase, ServerPhase::Stopped);
                return Err(err);
            }
        };
        info!(engine = engine.name(), "OCR engine ready");

        let addr = self.config.bind_address();
        let listener = match TcpListener::bind(&addr).await {
            Ok(listener) => listener,
            Err(err) => {
                error!(%addr, error = %err, "Failed to bind");
                transition(&self.phase, ServerPhase::Stopped);
                return Err(err.into());
            }
        };

        let result = self.serve(engine, listener, shutdown).await;
        transition(&self.phase, ServerPhase::Stopped);
        result
    }

    async fn serve(
        &self,
        engine: EngineHandle,
        listener: TcpListener,
        shutdown: CancellationToken,
    ) -> Result<()> {
        let addr = listener.local_addr()?;
        let server_config = &self.config.server;

        let service = OcrGrpcService::new(
            RecognitionHandler::new(engine),
            self.pool.clone(),
            server_config.expose_error_details,
        );
        let ocr_service =
            OcrServiceServer::new(service).max_decoding_message_size(server_config.max_message_bytes);

        let (mut health, health_service) = tonic_health::server::health_reporter();
        health
            .set_serving::<OcrServiceServer<OcrGrpcService>>()
            .await;

        let phase = Arc::clone(&self.phase);
        let drain = async move {
            shutdown.cancelled().await;
            transition(&phase, ServerPhase::Draining);
            health
                .set_not_serving::<OcrServiceServer<OcrGrpcService>>()
                .await;
        };

        if !addr.ip().is_loopback() {
            warn!("Serving plaintext gRPC on {} without TLS", addr);
        }

        transition(&self.phase, ServerPhase::Ready { addr });
        info!(
            workers = self.pool.size(),
            "OCR server listening on {}, waiting for connections", addr
        );

        Server::builder()
            .layer(TraceLayer::new_for_grpc())
            .add_service(health_service)
            .add_service(ocr_service)
            .serve_with_incoming_shutdown(TcpListenerStream::new(listener), drain)
            .await?;

        info!("OCR server stopped");
        Ok(())
    }
}
