//! Control Panel Widget
//! Left side panel with all input controls and settings.

use crate::charts::{ChartKind, ChartRequest, MarkerColor, MarkerStyle};
use egui::{Color32, ComboBox, RichText, ScrollArea};
use std::path::PathBuf;

/// User selections for the next chart
#[derive(Default, Clone)]
pub struct UserSettings {
    pub csv_path: Option<PathBuf>,
    pub chart_kind: ChartKind,
    pub marker_style: MarkerStyle,
    pub marker_color: MarkerColor,
    /// Selected columns in the order they were picked.
    pub selected_columns: Vec<String>,
}

/// How the status line should be colored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Left side control panel with file selection and chart controls.
pub struct ControlPanel {
    pub settings: UserSettings,
    pub columns: Vec<String>,
    pub numeric_columns: Vec<String>,
    pub status: String,
    pub status_level: StatusLevel,
    pub generate_enabled: bool,
    pub export_enabled: bool,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            settings: UserSettings::default(),
            columns: Vec::new(),
            numeric_columns: Vec::new(),
            status: "Please upload a CSV file to begin.".to_string(),
            status_level: StatusLevel::Info,
            generate_enabled: false,
            export_enabled: false,
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update available columns after CSV load; the previous selection is dropped.
    pub fn update_columns(&mut self, columns: Vec<String>, numeric_columns: Vec<String>) {
        self.generate_enabled = !columns.is_empty();
        self.columns = columns;
        self.numeric_columns = numeric_columns;
        self.settings.selected_columns.clear();
        self.export_enabled = false;
    }

    /// Add or remove a column, keeping pick order.
    pub fn toggle_column(&mut self, column: &str, selected: bool) {
        let selection = &mut self.settings.selected_columns;
        let position = selection.iter().position(|c| c == column);
        match (selected, position) {
            (true, None) => selection.push(column.to_string()),
            (false, Some(i)) => {
                selection.remove(i);
            }
            _ => {}
        }
    }

    /// Checkbox text; text columns are marked since only pie charts take them.
    pub fn column_label(&self, column: &str) -> String {
        if self.numeric_columns.iter().any(|c| c == column) {
            column.to_string()
        } else {
            format!("{column} (text)")
        }
    }

    /// Chart request built from the current selections.
    pub fn chart_request(&self) -> ChartRequest {
        ChartRequest::new(
            self.settings.chart_kind,
            self.settings.selected_columns.clone(),
        )
        .with_marker(self.settings.marker_style, self.settings.marker_color)
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("📊 Data Visualizer")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("Upload a CSV and chart it")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== CSV File Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let path_text = self
                        .settings
                        .csv_path
                        .as_ref()
                        .and_then(|p| p.file_name())
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "No file selected".to_string());

                    ui.label(RichText::new(&path_text).size(12.0).color(
                        if self.settings.csv_path.is_some() {
                            ui.visuals().text_color()
                        } else {
                            Color32::GRAY
                        },
                    ));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("📂 Browse").clicked() {
                            action = ControlPanelAction::BrowseCsv;
                        }
                    });
                });
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Chart Options Section =====
        ui.label(RichText::new("⚙️ Chart Options").size(14.0).strong());
        ui.add_space(8.0);

        let label_width = 110.0;
        let combo_width = 150.0;

        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("Chart Type:"));
            ComboBox::from_id_salt("chart_kind")
                .width(combo_width)
                .selected_text(self.settings.chart_kind.label())
                .show_ui(ui, |ui| {
                    for kind in ChartKind::ALL {
                        ui.selectable_value(&mut self.settings.chart_kind, kind, kind.label());
                    }
                });
        });

        ui.add_space(5.0);

        let markers_used = self.settings.chart_kind.uses_markers();
        ui.add_enabled_ui(markers_used, |ui| {
            ui.horizontal(|ui| {
                ui.add_sized([label_width, 20.0], egui::Label::new("Marker Style:"));
                ComboBox::from_id_salt("marker_style")
                    .width(combo_width)
                    .selected_text(self.settings.marker_style.to_string())
                    .show_ui(ui, |ui| {
                        for style in MarkerStyle::ALL {
                            ui.selectable_value(
                                &mut self.settings.marker_style,
                                style,
                                style.to_string(),
                            );
                        }
                    });
            });

            ui.add_space(5.0);

            ui.horizontal(|ui| {
                ui.add_sized([label_width, 20.0], egui::Label::new("Marker Color:"));
                ComboBox::from_id_salt("marker_color")
                    .width(combo_width)
                    .selected_text(self.settings.marker_color.name())
                    .show_ui(ui, |ui| {
                        for color in MarkerColor::ALL {
                            ui.selectable_value(
                                &mut self.settings.marker_color,
                                color,
                                color.name(),
                            );
                        }
                    });
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Column Selection Section =====
        ui.label(RichText::new("🔧 Columns").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(5.0)
            .show(ui, |ui| {
                ScrollArea::vertical().max_height(180.0).show(ui, |ui| {
                    let mut toggled: Vec<(String, bool)> = Vec::new();
                    for col in &self.columns {
                        let mut checked = self.settings.selected_columns.contains(col);
                        if ui.checkbox(&mut checked, self.column_label(col)).changed() {
                            toggled.push((col.clone(), checked));
                        }
                    }
                    for (col, checked) in toggled {
                        self.toggle_column(&col, checked);
                    }
                });
            });

        ui.add_space(5.0);
        ui.horizontal(|ui| {
            if ui.small_button("Clear All").clicked() {
                self.settings.selected_columns.clear();
            }
            if !self.settings.selected_columns.is_empty() {
                ui.label(
                    RichText::new(self.settings.selected_columns.join(", "))
                        .size(11.0)
                        .color(Color32::GRAY),
                );
            }
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Action Buttons =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.generate_enabled, |ui| {
                let button = egui::Button::new(RichText::new("▶ Generate Chart").size(16.0))
                    .min_size(egui::vec2(200.0, 35.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::Generate;
                }
            });

            ui.add_space(8.0);

            ui.add_enabled_ui(self.export_enabled, |ui| {
                let export_button = egui::Button::new(RichText::new("🖼 Export PNG").size(14.0))
                    .min_size(egui::vec2(150.0, 30.0));
                if ui.add(export_button).clicked() {
                    action = ControlPanelAction::ExportPng;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status Section =====
        let status_color = match self.status_level {
            StatusLevel::Info => Color32::GRAY,
            StatusLevel::Success => Color32::from_rgb(40, 167, 69),
            StatusLevel::Warning => Color32::from_rgb(255, 193, 7),
            StatusLevel::Error => Color32::from_rgb(220, 53, 69),
        };
        ui.label(RichText::new(&self.status).size(12.0).color(status_color));

        action
    }

    /// Set status message and its severity
    pub fn set_status(&mut self, level: StatusLevel, status: &str) {
        self.status_level = level;
        self.status = status.to_string();
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseCsv,
    Generate,
    ExportPng,
}
