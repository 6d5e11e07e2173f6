//! Data Visualizer - desktop front-end
//!
//! Load a CSV file, pick columns and a chart type, and view or export the chart.

use anyhow::Context;
use clap::Parser;
use data_visualizer::config::VisualizerConfig;
use data_visualizer::gui::VisualizerApp;
use data_visualizer::telemetry;
use eframe::egui;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "data-visualizer", about = "Chart columns of a CSV file")]
struct Args {
    /// JSON settings file
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    telemetry::init_tracing("data_visualizer=info");

    let config = VisualizerConfig::load_or_default(args.config.as_deref())
        .context("loading configuration")?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 760.0])
            .with_min_inner_size([900.0, 600.0])
            .with_title("Data Visualizer"),
        ..Default::default()
    };

    eframe::run_native(
        "Data Visualizer",
        options,
        Box::new(move |cc| Ok(Box::new(VisualizerApp::new(cc, config)))),
    )
    .map_err(|e| anyhow::anyhow!("eframe failed: {e}"))
}
