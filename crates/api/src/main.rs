//! ShopScout API server binary.
//!
//! Usage:
//!   shopscout-api --config config.toml
//!   shopscout-api --port 8080
//!   shopscout-api --port 8080 --bind 0.0.0.0 --voice
//!
//! # Environment Variables
//!
//! - `GOOGLE_API_KEY` - Gemini API key (required)
//! - `SERPER_API_KEY` - Serper web search key (required)
//! - `OPENAI_API_KEY` - Transcription key (required with --voice)
//! - `SHOPSCOUT_BIND_ADDR` - Server bind address (default: 127.0.0.1)

use std::net::SocketAddr;
use std::sync::Arc;

use shopscout_api::{AppState, TranscriptionConfig, WhisperTranscriber, serve};
use shopscout_pipeline::{ShopScoutConfig, build_pipeline, require_env};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Pick up a local .env before reading any keys
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,shopscout_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().collect();
    let mut port: u16 = 8080;
    let mut config_path: Option<String> = None;
    let mut bind_addr: Option<String> = None;
    let mut voice = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--port" | "-p" => {
                if i + 1 < args.len() {
                    port = args[i + 1]
                        .parse()
                        .map_err(|_| anyhow::anyhow!("Invalid port: {}", args[i + 1]))?;
                    i += 1;
                }
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--bind" | "-b" => {
                if i + 1 < args.len() {
                    bind_addr = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--voice" | "-v" => {
                voice = true;
            }
            "--help" | "-h" => {
                println!("ShopScout API Server");
                println!();
                println!("Usage: shopscout-api [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -p, --port <PORT>      Port to listen on (default: 8080)");
                println!(
                    "  -b, --bind <ADDR>      Bind address (default: 127.0.0.1, env: SHOPSCOUT_BIND_ADDR)"
                );
                println!("  -c, --config <FILE>    Path to config.toml file");
                println!("  -v, --voice            Enable the voice transcription endpoint");
                println!("  -h, --help             Show this help message");
                println!();
                println!("Environment variables:");
                println!("  GOOGLE_API_KEY         Gemini API key (required)");
                println!("  SERPER_API_KEY         Serper web search key (required)");
                println!("  OPENAI_API_KEY         Transcription key (required with --voice)");
                println!("  SHOPSCOUT_BIND_ADDR    Server bind address (overridden by --bind)");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let host = bind_addr
        .or_else(|| std::env::var("SHOPSCOUT_BIND_ADDR").ok())
        .unwrap_or_else(|| "127.0.0.1".to_string());

    let config = if let Some(path) = config_path {
        tracing::info!(path = %path, "Loading configuration");
        ShopScoutConfig::from_file(&path)?
    } else {
        tracing::info!("Using default configuration");
        ShopScoutConfig::default()
    };

    // Fail fast on missing credentials, before anything can run
    let pipeline = Arc::new(build_pipeline(&config)?);

    let mut state = AppState::new(pipeline);
    if voice {
        require_env(&["OPENAI_API_KEY"])?;
        let transcriber = WhisperTranscriber::new(TranscriptionConfig::default())?;
        state = state.with_transcriber(Arc::new(transcriber));
        tracing::info!("Voice transcription enabled");
    }

    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    serve(Arc::new(state), addr).await?;

    Ok(())
}
