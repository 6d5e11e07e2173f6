//! Chart Viewer Widget
//! Pop-up window showing the last generated chart using egui_plot.

use crate::charts::{ChartPlotter, Figure};
use egui::RichText;

const WINDOW_WIDTH: f32 = 820.0;
const PLOT_HEIGHT: f32 = 420.0;

/// Holds the last generated figure and shows it in its own window.
#[derive(Default)]
pub struct ChartViewer {
    figure: Option<Figure>,
    open: bool,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the displayed figure and open the window.
    pub fn set_figure(&mut self, figure: Figure) {
        self.figure = Some(figure);
        self.open = true;
    }

    pub fn figure(&self) -> Option<&Figure> {
        self.figure.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn clear(&mut self) {
        self.figure = None;
        self.open = false;
    }

    /// Draw the chart window, if one is open.
    pub fn show(&mut self, ctx: &egui::Context) {
        let Some(figure) = &self.figure else {
            return;
        };

        egui::Window::new(RichText::new(figure.kind().label()).strong())
            .id(egui::Id::new("chart_window"))
            .open(&mut self.open)
            .default_width(WINDOW_WIDTH)
            .resizable(true)
            .collapsible(false)
            .show(ctx, |ui| {
                ChartPlotter::draw_figure(ui, figure, PLOT_HEIGHT);
            });
    }
}
