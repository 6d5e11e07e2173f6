//! Data Visualizer Main Application
//! Main window with control panel, data preview and chart window.

use crate::charts::StaticChartRenderer;
use crate::config::VisualizerConfig;
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction, StatusLevel};
use crate::session::Session;
use crate::VisualizerError;
use egui::{RichText, ScrollArea, SidePanel};
use tracing::{error, info};

/// Main application window.
pub struct VisualizerApp {
    session: Session,
    config: VisualizerConfig,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,
}

impl VisualizerApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: VisualizerConfig) -> Self {
        Self {
            session: Session::new(),
            config,
            control_panel: ControlPanel::new(),
            chart_viewer: ChartViewer::new(),
        }
    }

    /// Handle CSV file selection
    fn handle_browse_csv(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        else {
            return;
        };

        match self.session.load_path(&path) {
            Ok(table) => {
                self.chart_viewer.clear();
                self.control_panel.settings.csv_path = Some(path);
                self.control_panel
                    .update_columns(table.column_names(), table.numeric_columns());
                self.control_panel
                    .set_status(StatusLevel::Success, "File uploaded successfully!");
            }
            Err(e) => self.report(&e),
        }
    }

    /// Validate the selections and open the chart window.
    fn handle_generate(&mut self) {
        let request = self.control_panel.chart_request();
        match self.session.generate(&request) {
            Ok(figure) => {
                self.control_panel.set_status(
                    StatusLevel::Success,
                    &format!("{} generated", figure.title()),
                );
                self.chart_viewer.set_figure(figure);
                self.control_panel.export_enabled = true;
            }
            Err(e) => self.report(&e),
        }
    }

    /// Render the current figure to a PNG chosen by the user and open it.
    fn handle_export_png(&mut self) {
        let Some(figure) = self.chart_viewer.figure() else {
            self.control_panel
                .set_status(StatusLevel::Warning, "Generate a chart first.");
            return;
        };

        let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG Image", &["png"])
            .set_file_name(format!("{}.png", figure.kind().code()))
            .save_file()
        else {
            return;
        };

        let size = self.config.figure;
        match StaticChartRenderer::save_png(figure, &path, size.width, size.height) {
            Ok(()) => {
                info!(path = %path.display(), "chart exported");
                self.control_panel.set_status(
                    StatusLevel::Success,
                    &format!("Saved {}", path.display()),
                );
                if let Err(e) = open::that(&path) {
                    error!(error = %e, "could not open exported image");
                }
            }
            Err(e) => self.report(&VisualizerError::from(e)),
        }
    }

    fn report(&mut self, err: &VisualizerError) {
        let level = if err.is_warning() {
            StatusLevel::Warning
        } else {
            StatusLevel::Error
        };
        self.control_panel.set_status(level, &err.to_string());
    }

    /// File summary and the first rows of the loaded table.
    fn show_preview(&self, ui: &mut egui::Ui) {
        let Some(table) = self.session.table() else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("Please upload a CSV file to begin.").size(20.0));
            });
            return;
        };

        ui.heading(table.source());
        ui.label(format!(
            "{} rows, {} columns",
            table.row_count(),
            table.column_count()
        ));
        ui.add_space(10.0);
        ui.label(RichText::new("Data Preview").size(16.0).strong());
        ui.add_space(5.0);

        let preview = table.preview(self.config.preview_rows);
        ScrollArea::horizontal().show(ui, |ui| {
            egui::Grid::new("preview_grid")
                .striped(true)
                .spacing([16.0, 4.0])
                .show(ui, |ui| {
                    for name in &preview.columns {
                        ui.label(RichText::new(name).strong());
                    }
                    ui.end_row();
                    for row in &preview.rows {
                        for cell in row {
                            ui.label(cell);
                        }
                        ui.end_row();
                    }
                });
        });
    }
}

impl eframe::App for VisualizerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                ScrollArea::vertical().show(ui, |ui| {
                    match self.control_panel.show(ui) {
                        ControlPanelAction::BrowseCsv => self.handle_browse_csv(),
                        ControlPanelAction::Generate => self.handle_generate(),
                        ControlPanelAction::ExportPng => self.handle_export_png(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Data Preview
        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_preview(ui);
        });

        self.chart_viewer.show(ctx);
    }
}
