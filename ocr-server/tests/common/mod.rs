#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tonic::transport::Channel;

use ocr_server::config::{Config, EngineConfig};
use ocr_server::engine::{EngineHandle, RecognitionEngine, TextSegment};
use ocr_server::error::{OcrError, Result};
use ocr_server::server::{ServerPhase, ServerRuntime, WorkerPool};

/// Returns the same segments for every image.
pub struct ScriptedEngine {
    pub segments: Vec<TextSegment>,
}

impl ScriptedEngine {
    pub fn new(texts: &[&str]) -> Self {
        Self {
            segments: texts.iter().map(|t| TextSegment::text_only(*t)).collect(),
        }
    }
}

impl RecognitionEngine for ScriptedEngine {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn recognize(&mut self, _image: &[u8], _paragraph: bool) -> Result<Vec<TextSegment>> {
        Ok(self.segments.clone())
    }
}

/// Treats the image bytes as UTF-8 and returns one segment per line.
///
/// Lets tests check that every caller gets its own answer back.
pub struct EchoEngine {
    pub delay: Duration,
}

impl RecognitionEngine for EchoEngine {
    fn name(&self) -> &'static str {
        "echo"
    }

    fn recognize(&mut self, image: &[u8], _paragraph: bool) -> Result<Vec<TextSegment>> {
        std::thread::sleep(self.delay);
        let text = std::str::from_utf8(image)
            .map_err(|e| OcrError::Recognition(format!("not an image: {e}")))?;
        Ok(text.split('\n').map(TextSegment::text_only).collect())
    }
}

/// Fails the first `failures` calls with `cause`, then returns `text`.
pub struct FlakyEngine {
    pub failures: usize,
    pub cause: &'static str,
    pub text: &'static str,
    pub calls: Arc<AtomicUsize>,
}

impl RecognitionEngine for FlakyEngine {
    fn name(&self) -> &'static str {
        "flaky"
    }

    fn recognize(&mut self, _image: &[u8], _paragraph: bool) -> Result<Vec<TextSegment>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            Err(OcrError::Recognition(self.cause.to_string()))
        } else {
            Ok(vec![TextSegment::text_only(self.text)])
        }
    }
}

pub fn test_config(max_workers: usize) -> Config {
    let mut config = Config::default();
    config.server.host = "127.0.0.1".to_string();
    config.server.port = 0;
    config.server.max_workers = max_workers;
    config
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: CancellationToken,
    pub phase: watch::Receiver<ServerPhase>,
    pub pool: WorkerPool,
    pub task: JoinHandle<Result<()>>,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn channel(&self) -> Channel {
        Channel::from_shared(self.url())
            .expect("valid url")
            .connect()
            .await
            .expect("connect")
    }

    /// Cancel and wait for the runtime to finish draining.
    pub async fn stop(self) -> Result<()> {
        self.shutdown.cancel();
        self.task.await.expect("server task panicked")
    }
}

/// Start a runtime on an ephemeral loopback port and wait until it is ready.
pub async fn spawn_server<E: RecognitionEngine>(engine: E, config: Config) -> TestServer {
    let runtime = ServerRuntime::new(config);
    let mut phase = runtime.subscribe();
    let pool = runtime.pool();
    let shutdown = CancellationToken::new();

    let task = tokio::spawn(runtime.run(
        move |engine_config: &EngineConfig| Ok(EngineHandle::from_engine(engine, engine_config)),
        shutdown.clone(),
    ));

    let addr = tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            if let ServerPhase::Ready { addr } = *phase.borrow_and_update() {
                return addr;
            }
            phase.changed().await.expect("runtime dropped before ready");
        }
    })
    .await
    .expect("server did not become ready");

    TestServer {
        addr,
        shutdown,
        phase,
        pool,
        task,
    }
}
