//! Chart Plotter Module
//! Creates interactive visualizations using egui_plot.

use crate::charts::figure::{
    BarFigure, Figure, HistogramFigure, LineFigure, PieFigure, ScatterFigure, BAR_COLOR,
    GRID_ALPHA, GRID_COLOR, HISTOGRAM_ALPHA,
};
use crate::charts::renderer::{axis_ranges, ticks, GRID_X_STEPS, GRID_Y_STEPS};
use crate::charts::request::MarkerStyle;
use egui::{Align2, Color32, RichText, Stroke};
use egui_plot::{
    Bar, BarChart, HLine, Legend, Line, LineStyle, MarkerShape, Plot, PlotPoint, PlotPoints,
    PlotUi, Points, Polygon, Text, VLine,
};
use plotters::style::RGBColor;

const MARKER_RADIUS: f32 = 4.0;

type Grid = (Vec<f64>, Vec<f64>);

pub fn to_color32(color: RGBColor) -> Color32 {
    Color32::from_rgb(color.0, color.1, color.2)
}

fn with_alpha(color: RGBColor, alpha: f64) -> Color32 {
    Color32::from_rgba_unmultiplied(color.0, color.1, color.2, (alpha * 255.0).round() as u8)
}

/// Gridline positions for a figure: vertical lines at `.0`, horizontal at `.1`.
///
/// Ticks come from the figure's data ranges, not the live plot bounds, so the
/// lines never widen the auto-fitted view.
fn grid_lines(figure: &Figure) -> Grid {
    let (x_range, y_range) = axis_ranges(figure);
    (ticks(&x_range, GRID_X_STEPS), ticks(&y_range, GRID_Y_STEPS))
}

fn draw_dashed_grid(plot_ui: &mut PlotUi, grid: &Grid) {
    let color = with_alpha(GRID_COLOR, GRID_ALPHA);
    for &x in &grid.0 {
        plot_ui.vline(
            VLine::new(x)
                .color(color)
                .width(1.0)
                .style(LineStyle::dashed_loose()),
        );
    }
    for &y in &grid.1 {
        plot_ui.hline(
            HLine::new(y)
                .color(color)
                .width(1.0)
                .style(LineStyle::dashed_loose()),
        );
    }
}

pub fn marker_shape(style: MarkerStyle) -> MarkerShape {
    match style {
        MarkerStyle::Circle => MarkerShape::Circle,
        MarkerStyle::Square => MarkerShape::Square,
        MarkerStyle::Triangle => MarkerShape::Up,
        MarkerStyle::Star => MarkerShape::Asterisk,
        MarkerStyle::Cross => MarkerShape::Cross,
        MarkerStyle::Diamond => MarkerShape::Diamond,
    }
}

/// Draws figures as interactive egui plots.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Draw the figure with its title above the plot.
    pub fn draw_figure(ui: &mut egui::Ui, figure: &Figure, height: f32) {
        ui.vertical_centered(|ui| {
            ui.label(RichText::new(figure.title()).size(18.0).strong());
        });
        ui.add_space(6.0);

        let mut plot = Plot::new(format!("figure_{}", figure.kind().code()))
            .height(height)
            .legend(Legend::default())
            .show_grid(false);
        if let Some(label) = figure.x_label() {
            plot = plot.x_axis_label(label.to_string());
        }
        if let Some(label) = figure.y_label() {
            plot = plot.y_axis_label(label.to_string());
        }

        let grid = grid_lines(figure);
        match figure {
            Figure::Bar(bar) => Self::draw_bar_chart(ui, plot, &grid, bar),
            Figure::Line(line) => Self::draw_line_chart(ui, plot, &grid, line),
            Figure::Pie(pie) => Self::draw_pie_chart(ui, plot, &grid, pie),
            Figure::Scatter(scatter) => Self::draw_scatter_chart(ui, plot, &grid, scatter),
            Figure::Histogram(hist) => Self::draw_histogram_chart(ui, plot, &grid, hist),
        }
    }

    fn draw_bar_chart(ui: &mut egui::Ui, plot: Plot, grid: &Grid, bar: &BarFigure) {
        let x_labels: Vec<String> = bar.bars.iter().map(|b| b.column.clone()).collect();

        plot.x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() < 1e-6 && idx >= 0.0 {
                x_labels.get(idx as usize).cloned().unwrap_or_default()
            } else {
                String::new()
            }
        })
        .show(ui, |plot_ui| {
            draw_dashed_grid(plot_ui, grid);
            let bars: Vec<Bar> = bar
                .bars
                .iter()
                .enumerate()
                .map(|(i, b)| {
                    Bar::new(i as f64, b.sum)
                        .width(0.8)
                        .name(&b.column)
                        .fill(to_color32(BAR_COLOR))
                        .stroke(Stroke::new(1.0, Color32::BLACK))
                })
                .collect();
            plot_ui.bar_chart(BarChart::new(bars).name("Sum"));

            for (i, b) in bar.bars.iter().enumerate() {
                plot_ui.text(
                    Text::new(PlotPoint::new(i as f64, b.sum), b.annotation())
                        .anchor(Align2::CENTER_BOTTOM)
                        .color(Color32::BLACK),
                );
            }
        });
    }

    fn draw_line_chart(ui: &mut egui::Ui, plot: Plot, grid: &Grid, line: &LineFigure) {
        plot.show(ui, |plot_ui| {
            draw_dashed_grid(plot_ui, grid);
            for series in &line.series {
                let color = to_color32(series.color);
                // Items sharing a name share one legend entry.
                for segment in series.segments() {
                    plot_ui.line(
                        Line::new(PlotPoints::from_iter(segment.iter().map(|&(x, y)| [x, y])))
                            .color(color)
                            .width(1.5)
                            .name(&series.name),
                    );
                }
                plot_ui.points(
                    Points::new(PlotPoints::from_iter(
                        series.points.iter().map(|&(x, y)| [x, y]),
                    ))
                        .shape(marker_shape(line.marker))
                        .radius(MARKER_RADIUS)
                        .filled(true)
                        .color(color)
                        .name(&series.name),
                );
            }
        });
    }

    fn draw_pie_chart(ui: &mut egui::Ui, plot: Plot, grid: &Grid, pie: &PieFigure) {
        let angles = pie.wedge_angles();
        let percents = pie.percent_labels();

        plot.data_aspect(1.0)
            .show_axes(false)
            .allow_drag(false)
            .allow_zoom(false)
            .allow_scroll(false)
            .include_x(-1.4)
            .include_x(1.4)
            .include_y(-1.3)
            .include_y(1.3)
            .show(ui, |plot_ui| {
                draw_dashed_grid(plot_ui, grid);
                for ((slice, &(start, end)), percent) in
                    pie.slices.iter().zip(&angles).zip(&percents)
                {
                    let wedge: Vec<[f64; 2]> = PieFigure::wedge_polygon(start, end, 1.0)
                        .into_iter()
                        .map(|(x, y)| [x, y])
                        .collect();
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::from(wedge))
                            .fill_color(to_color32(slice.color))
                            .stroke(Stroke::new(1.0, Color32::WHITE))
                            .name(&slice.label),
                    );

                    let mid = (start + end) / 2.0;
                    plot_ui.text(
                        Text::new(
                            PlotPoint::new(0.6 * mid.cos(), 0.6 * mid.sin()),
                            percent.as_str(),
                        )
                        .color(Color32::BLACK),
                    );
                    plot_ui.text(
                        Text::new(
                            PlotPoint::new(1.15 * mid.cos(), 1.15 * mid.sin()),
                            slice.label.as_str(),
                        )
                        .color(Color32::BLACK),
                    );
                }
            });
    }

    fn draw_scatter_chart(
        ui: &mut egui::Ui,
        plot: Plot,
        grid: &Grid,
        scatter: &ScatterFigure,
    ) {
        plot.show(ui, |plot_ui| {
            draw_dashed_grid(plot_ui, grid);
            let points: PlotPoints = scatter.points.iter().map(|&(x, y)| [x, y]).collect();
            plot_ui.points(
                Points::new(points)
                    .shape(marker_shape(scatter.marker))
                    .radius(MARKER_RADIUS + 1.0)
                    .filled(true)
                    .color(to_color32(scatter.color.rgb()))
                    .name(format!("{} vs {}", scatter.y_column, scatter.x_column)),
            );
        });
    }

    fn draw_histogram_chart(
        ui: &mut egui::Ui,
        plot: Plot,
        grid: &Grid,
        hist: &HistogramFigure,
    ) {
        let edge = Stroke::new(1.0, Color32::BLACK);

        plot.y_axis_label("Frequency")
            .legend(Legend::default().text_style(egui::TextStyle::Small))
            .show(ui, |plot_ui| {
                draw_dashed_grid(plot_ui, grid);
                for series in &hist.series {
                    let fill = with_alpha(series.color, HISTOGRAM_ALPHA);
                    let bars: Vec<Bar> = hist
                        .edges
                        .windows(2)
                        .zip(&series.counts)
                        .map(|(e, &count)| {
                            Bar::new((e[0] + e[1]) / 2.0, count as f64)
                                .width(e[1] - e[0])
                                .fill(fill)
                                .stroke(edge)
                        })
                        .collect();
                    plot_ui.bar_chart(BarChart::new(bars).color(fill).name(&series.name));
                }
            });
    }
}
