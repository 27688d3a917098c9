//! `inference-gateway` binary.
//!
//! Reads the gateway configuration from the environment and serves the HTTP
//! surface until Ctrl-C.

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};

use inference_gateway::observability::{LogFormat, LogLevel, LoggingConfig};
use inference_gateway::server::{build_app, parse_origins, serve};
use inference_gateway::{Gateway, GatewayConfig};

/// OpenAI-compatible inference gateway with audio normalization.
#[derive(Debug, Parser)]
#[command(name = "inference-gateway", version, about)]
struct Args {
    /// Address to bind.
    #[arg(long, env = "GATEWAY_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to bind.
    #[arg(long, env = "GATEWAY_PORT", default_value_t = 8090)]
    port: u16,

    /// Comma-separated CORS origins; empty disables CORS.
    #[arg(long, env = "ALLOW_ORIGINS", default_value = "")]
    allow_origins: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: LogLevel,

    /// Log format (pretty, json, compact).
    #[arg(long, env = "LOG_FORMAT", default_value = "pretty")]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    LoggingConfig::new()
        .with_level(args.log_level)
        .with_format(args.log_format)
        .init()?;

    let config = match GatewayConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid gateway configuration");
            return Err(e.into());
        }
    };
    info!(
        routing_mode = config.routing_mode().as_str(),
        text = ?config.text_base_url(),
        audio = ?config.audio_base_url(),
        default = ?config.default_base_url(),
        preprocess = config.audio_preprocess_enabled(),
        "Gateway configured"
    );

    let gateway = Gateway::new(config)?;
    let app = build_app(gateway, &parse_origins(&args.allow_origins));

    let listener = TcpListener::bind((args.host.as_str(), args.port)).await?;
    serve(listener, app, shutdown_signal()).await?;

    info!("Inference gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
