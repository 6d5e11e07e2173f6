//! Data Visualizer - web front-end

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use data_visualizer::config::VisualizerConfig;
use data_visualizer::telemetry;
use data_visualizer::web::{self, AppState};

#[derive(Parser, Debug)]
#[command(name = "data-visualizer-web", about = "Serve the CSV chart page over HTTP")]
struct Args {
    /// JSON settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to listen on, overriding the config file
    #[arg(long)]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    telemetry::init_tracing("data_visualizer=info");

    let mut config = VisualizerConfig::load_or_default(args.config.as_deref())
        .context("loading configuration")?;
    if let Some(listen) = args.listen {
        config.web.listen = listen;
    }

    let addr: SocketAddr = config
        .web
        .listen
        .parse()
        .with_context(|| format!("invalid listen address '{}'", config.web.listen))?;

    let app = web::router(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "listening");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
