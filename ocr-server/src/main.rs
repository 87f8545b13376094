use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ocr_server::config::Config;
use ocr_server::engine::EngineHandle;
use ocr_server::lookup;
use ocr_server::server::{shutdown_signal, ServerRuntime};
use ocr_server::OcrClient;

#[derive(Parser)]
#[command(name = "ocr-server")]
#[command(about = "gRPC text recognition server")]
struct Args {
    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Load the engine and serve `ocr.OcrService` (default)
    Serve(ServeArgs),
    /// Recognize a local image file and print the text
    Recognize {
        /// Image file to read
        path: PathBuf,
    },
    /// Send an image to a running server and print the text
    Call {
        /// Server address
        #[arg(long, default_value = "http://127.0.0.1:50051")]
        addr: String,
        /// Per-call deadline in seconds
        #[arg(long, default_value_t = 30)]
        timeout_secs: u64,
        /// Image file to send
        path: PathBuf,
    },
}

#[derive(clap::Args, Default)]
struct ServeArgs {
    /// Bind host, overrides OCR_HOST
    #[arg(long)]
    host: Option<String>,
    /// Bind port, overrides OCR_PORT
    #[arg(long)]
    port: Option<u16>,
    /// Worker pool size, overrides OCR_MAX_WORKERS
    #[arg(long)]
    workers: Option<usize>,
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "ocr_server=info,tower_http=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    dotenvy::dotenv().ok();
    init_tracing(args.log_format);

    let mut config = Config::from_env();

    match args.command.unwrap_or(Command::Serve(ServeArgs::default())) {
        Command::Serve(serve) => {
            if let Some(host) = serve.host {
                config.server.host = host;
            }
            if let Some(port) = serve.port {
                config.server.port = port;
            }
            if let Some(workers) = serve.workers {
                config.server.max_workers = workers;
            }

            tracing::info!(
                "Starting OCR server on {} (languages: {:?})",
                config.bind_address(),
                config.engine.languages
            );

            let cancel_token = CancellationToken::new();
            tokio::spawn(shutdown_signal(cancel_token.clone()));

            let runtime = ServerRuntime::new(config);
            runtime
                .run(EngineHandle::initialize, cancel_token)
                .await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Recognize { path } => {
            let outcome = lookup::lookup(&path, &config.engine, EngineHandle::initialize).await;
            println!("Recognized text: {outcome}");
            Ok(if outcome.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Call {
            addr,
            timeout_secs,
            path,
        } => {
            let client = OcrClient::connect(addr)
                .await?
                .with_timeout(Duration::from_secs(timeout_secs));
            let text = client.perform_ocr_file(&path).await?;
            println!("{text}");
            Ok(ExitCode::SUCCESS)
        }
    }
}
