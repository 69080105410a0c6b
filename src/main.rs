//! Service entrypoint: load configuration, load models, serve.

use anyhow::Context;
use clap::Parser;
use pixelproof::core::config::AppConfig;
use pixelproof::core::init_tracing;
use pixelproof::pipeline::DetectionPipeline;
use pixelproof::server::{self, AppState};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "pixelproof", about = "Image forgery and deepfake detection service")]
struct Cli {
    /// Path to a JSON configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address, overriding the configuration file.
    #[arg(long)]
    host: Option<String>,

    /// Bind port, overriding the configuration file.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => AppConfig::default(),
    };
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    config.validate().context("validating configuration")?;

    info!("loading models");
    let pipeline = DetectionPipeline::from_config(&config).context("loading models")?;
    info!("all models loaded");

    let state = AppState::new(Arc::new(pipeline));
    server::serve(&config.server, state)
        .await
        .context("serving")?;
    Ok(())
}
