//! Data Visualizer - upload a CSV file and chart it.
//!
//! Both front-ends (the egui desktop app and the axum web app) drive the same
//! pipeline: load a [`data::Table`], validate a [`charts::ChartRequest`],
//! build a [`charts::Figure`] and draw it.

pub mod charts;
pub mod config;
pub mod data;
pub mod error;
pub mod gui;
pub mod session;
pub mod telemetry;
pub mod web;

pub use error::VisualizerError;
pub use session::Session;
