//! Static Chart Renderer
//! Draws a [`Figure`] into PNG bytes or an SVG document with plotters.
//!
//! Layout follows the classic single-axes figure:
//! 1. Title centered above the plot
//! 2. Plot area with dashed, semi-transparent gridlines
//! 3. Legend in the upper right for multi-series kinds (line, histogram)

use crate::charts::figure::{
    BarFigure, Figure, HistogramFigure, LineFigure, PieFigure, RenderError, ScatterFigure,
    BAR_COLOR, GRID_ALPHA, GRID_COLOR, HISTOGRAM_ALPHA,
};
use crate::charts::request::MarkerStyle;
use image::{ImageFormat, RgbImage};
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::element::DashedPathElement;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::io::Cursor;
use std::ops::Range;
use std::path::Path;
use tracing::{debug, info};

const FONT: &str = "sans-serif";
const TITLE_SIZE: u32 = 22;
const LABEL_SIZE: u32 = 14;
const MARKER_SIZE: i32 = 4;
const PIE_RANGE: Range<f64> = -1.35..1.35;
pub(crate) const GRID_X_STEPS: usize = 10;
pub(crate) const GRID_Y_STEPS: usize = 8;

type Chart<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render the figure as PNG bytes.
    pub fn render_png(figure: &Figure, width: u32, height: u32) -> Result<Vec<u8>, RenderError> {
        let mut buffer = vec![0u8; width as usize * height as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            Self::draw(&root, figure)?;
            root.present().map_err(backend_err)?;
        }

        let img = RgbImage::from_raw(width, height, buffer)
            .ok_or_else(|| RenderError::Backend("pixel buffer size mismatch".to_string()))?;
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;

        debug!(width, height, bytes = bytes.len(), "rendered PNG");
        Ok(bytes)
    }

    /// Render the figure as a standalone SVG document.
    pub fn render_svg(figure: &Figure, width: u32, height: u32) -> Result<String, RenderError> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
            Self::draw(&root, figure)?;
            root.present().map_err(backend_err)?;
        }

        debug!(width, height, bytes = svg.len(), "rendered SVG");
        Ok(svg)
    }

    /// Render the figure and write it to `path` as PNG.
    pub fn save_png(
        figure: &Figure,
        path: &Path,
        width: u32,
        height: u32,
    ) -> Result<(), RenderError> {
        let bytes = Self::render_png(figure, width, height)?;
        std::fs::write(path, bytes)?;
        info!(path = %path.display(), "exported chart");
        Ok(())
    }

    fn draw<DB: DrawingBackend>(
        root: &DrawingArea<DB, Shift>,
        figure: &Figure,
    ) -> Result<(), RenderError> {
        root.fill(&WHITE).map_err(backend_err)?;
        let title = figure.title();

        match figure {
            Figure::Bar(bar) => Self::draw_bar(root, &title, bar),
            Figure::Line(line) => Self::draw_line(root, &title, line),
            Figure::Pie(pie) => Self::draw_pie(root, &title, pie),
            Figure::Scatter(scatter) => Self::draw_scatter(root, &title, scatter),
            Figure::Histogram(hist) => Self::draw_histogram(root, &title, hist),
        }
    }

    fn draw_bar<DB: DrawingBackend>(
        root: &DrawingArea<DB, Shift>,
        title: &str,
        bar: &BarFigure,
    ) -> Result<(), RenderError> {
        let n = bar.bars.len();
        let (x_range, y_range) = bar_ranges(bar);

        let mut chart = Self::cartesian(root, title, x_range.clone(), y_range.clone())?;

        let names: Vec<String> = bar.bars.iter().map(|b| b.column.clone()).collect();
        let x_formatter = move |x: &f64| category_label(&names, *x);
        chart
            .configure_mesh()
            .disable_mesh()
            .x_labels(n.max(1))
            .x_label_formatter(&x_formatter)
            .y_desc("Sum")
            .draw()
            .map_err(backend_err)?;

        Self::draw_grid(&mut chart, &x_range, &y_range)?;

        let edge = BLACK.stroke_width(1);
        chart
            .draw_series(bar.bars.iter().enumerate().map(|(i, b)| {
                let x = i as f64;
                Rectangle::new([(x - 0.4, 0.0), (x + 0.4, b.sum)], BAR_COLOR.filled())
            }))
            .map_err(backend_err)?;
        chart
            .draw_series(bar.bars.iter().enumerate().map(|(i, b)| {
                let x = i as f64;
                Rectangle::new([(x - 0.4, 0.0), (x + 0.4, b.sum)], edge)
            }))
            .map_err(backend_err)?;

        let style = (FONT, LABEL_SIZE)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Bottom));
        chart
            .draw_series(bar.bars.iter().enumerate().map(|(i, b)| {
                EmptyElement::at((i as f64, b.sum)) + Text::new(b.annotation(), (0, -3), style.clone())
            }))
            .map_err(backend_err)?;

        Ok(())
    }

    fn draw_line<DB: DrawingBackend>(
        root: &DrawingArea<DB, Shift>,
        title: &str,
        line: &LineFigure,
    ) -> Result<(), RenderError> {
        let (x_range, y_range) = line_ranges(line);

        let mut chart = Self::cartesian(root, title, x_range.clone(), y_range.clone())?;
        chart
            .configure_mesh()
            .disable_mesh()
            .draw()
            .map_err(backend_err)?;
        Self::draw_grid(&mut chart, &x_range, &y_range)?;

        for series in &line.series {
            let color = series.color;
            let segments = series
                .segments()
                .into_iter()
                .map(|segment| PathElement::new(segment.to_vec(), color.stroke_width(2)));
            chart
                .draw_series(segments)
                .map_err(backend_err)?
                .label(series.name.clone())
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                });
            draw_markers(&mut chart, &series.points, line.marker, color, color)?;
        }

        Self::draw_legend(&mut chart)
    }

    fn draw_pie<DB: DrawingBackend>(
        root: &DrawingArea<DB, Shift>,
        title: &str,
        pie: &PieFigure,
    ) -> Result<(), RenderError> {
        // Square plot area keeps wedges circular.
        let (w, h) = root.dim_in_pixel();
        let side = w.min(h);
        let area = root.clone().shrink(((w - side) / 2, 0), (side, side));

        let range = PIE_RANGE;
        let mut chart = ChartBuilder::on(&area)
            .caption(title, (FONT, TITLE_SIZE))
            .margin(10)
            .build_cartesian_2d(range.clone(), range.clone())
            .map_err(backend_err)?;
        Self::draw_grid(&mut chart, &range, &range)?;

        let angles = pie.wedge_angles();
        let percents = pie.percent_labels();
        let label_style = (FONT, LABEL_SIZE)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Center));

        for ((slice, &(start, end)), percent) in pie.slices.iter().zip(&angles).zip(&percents) {
            let wedge = PieFigure::wedge_polygon(start, end, 1.0);
            chart
                .draw_series(std::iter::once(Polygon::new(
                    wedge.clone(),
                    slice.color.filled(),
                )))
                .map_err(backend_err)?;

            let mut outline = wedge;
            outline.push((0.0, 0.0));
            chart
                .draw_series(std::iter::once(PathElement::new(
                    outline,
                    WHITE.stroke_width(1),
                )))
                .map_err(backend_err)?;

            let mid = (start + end) / 2.0;
            chart
                .draw_series([
                    Text::new(
                        percent.clone(),
                        (0.6 * mid.cos(), 0.6 * mid.sin()),
                        label_style.clone(),
                    ),
                    Text::new(
                        slice.label.clone(),
                        (1.15 * mid.cos(), 1.15 * mid.sin()),
                        label_style.clone(),
                    ),
                ])
                .map_err(backend_err)?;
        }

        Ok(())
    }

    fn draw_scatter<DB: DrawingBackend>(
        root: &DrawingArea<DB, Shift>,
        title: &str,
        scatter: &ScatterFigure,
    ) -> Result<(), RenderError> {
        let (x_range, y_range) = scatter_ranges(scatter);

        let mut chart = Self::cartesian(root, title, x_range.clone(), y_range.clone())?;
        chart
            .configure_mesh()
            .disable_mesh()
            .x_desc(scatter.x_column.as_str())
            .y_desc(scatter.y_column.as_str())
            .draw()
            .map_err(backend_err)?;
        Self::draw_grid(&mut chart, &x_range, &y_range)?;

        draw_markers(
            &mut chart,
            &scatter.points,
            scatter.marker,
            scatter.color.rgb(),
            BLACK,
        )
    }

    fn draw_histogram<DB: DrawingBackend>(
        root: &DrawingArea<DB, Shift>,
        title: &str,
        hist: &HistogramFigure,
    ) -> Result<(), RenderError> {
        let Some((x_range, y_range)) = histogram_ranges(hist) else {
            return Err(RenderError::Backend("histogram has no bins".to_string()));
        };

        let mut chart = Self::cartesian(root, title, x_range.clone(), y_range.clone())?;
        chart
            .configure_mesh()
            .disable_mesh()
            .y_desc("Frequency")
            .draw()
            .map_err(backend_err)?;
        Self::draw_grid(&mut chart, &x_range, &y_range)?;

        // Legend heading.
        chart
            .draw_series(std::iter::empty::<EmptyElement<(f64, f64), DB>>())
            .map_err(backend_err)?
            .label("Columns");

        let edge = BLACK.stroke_width(1);
        for series in &hist.series {
            let fill = series.color.mix(HISTOGRAM_ALPHA).filled();
            let bins = hist.edges.windows(2).zip(&series.counts);
            chart
                .draw_series(bins.clone().filter(|(_, c)| **c > 0).map(|(e, &c)| {
                    Rectangle::new([(e[0], 0.0), (e[1], c as f64)], fill)
                }))
                .map_err(backend_err)?
                .label(series.name.clone())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], fill));
            chart
                .draw_series(bins.filter(|(_, c)| **c > 0).map(|(e, &c)| {
                    Rectangle::new([(e[0], 0.0), (e[1], c as f64)], edge)
                }))
                .map_err(backend_err)?;
        }

        Self::draw_legend(&mut chart)
    }

    fn cartesian<'a, DB: DrawingBackend>(
        root: &'a DrawingArea<DB, Shift>,
        title: &str,
        x_range: Range<f64>,
        y_range: Range<f64>,
    ) -> Result<Chart<'a, DB>, RenderError> {
        ChartBuilder::on(root)
            .caption(title, (FONT, TITLE_SIZE))
            .margin(15)
            .x_label_area_size(45)
            .y_label_area_size(65)
            .build_cartesian_2d(x_range, y_range)
            .map_err(backend_err)
    }

    /// Dashed, semi-transparent gridlines at "nice" tick positions.
    fn draw_grid<DB: DrawingBackend>(
        chart: &mut Chart<'_, DB>,
        x_range: &Range<f64>,
        y_range: &Range<f64>,
    ) -> Result<(), RenderError> {
        let style = GRID_COLOR.mix(GRID_ALPHA).stroke_width(1);

        let horizontal = ticks(y_range, GRID_Y_STEPS)
            .into_iter()
            .map(|y| vec![(x_range.start, y), (x_range.end, y)]);
        let vertical = ticks(x_range, GRID_X_STEPS)
            .into_iter()
            .map(|x| vec![(x, y_range.start), (x, y_range.end)]);

        chart
            .draw_series(
                horizontal
                    .chain(vertical)
                    .map(|points| DashedPathElement::new(points, 6, 4, style)),
            )
            .map_err(backend_err)?;
        Ok(())
    }

    fn draw_legend<'a, DB: DrawingBackend + 'a>(chart: &mut Chart<'a, DB>) -> Result<(), RenderError> {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(backend_err)
    }
}

fn backend_err<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Backend(e.to_string())
}

fn draw_markers<DB: DrawingBackend>(
    chart: &mut Chart<'_, DB>,
    points: &[(f64, f64)],
    marker: MarkerStyle,
    color: RGBColor,
    edge: RGBColor,
) -> Result<(), RenderError> {
    let fill = color.filled();
    let outline = edge.stroke_width(1);
    let s = MARKER_SIZE;
    let points = points.iter().copied();

    let drawn = match marker {
        MarkerStyle::Circle => chart.draw_series(points.map(|p| {
            EmptyElement::at(p) + Circle::new((0, 0), s, fill) + Circle::new((0, 0), s, outline)
        })),
        MarkerStyle::Square => chart.draw_series(points.map(|p| {
            EmptyElement::at(p)
                + Rectangle::new([(-s, -s), (s, s)], fill)
                + Rectangle::new([(-s, -s), (s, s)], outline)
        })),
        MarkerStyle::Cross => chart.draw_series(points.map(|p| {
            EmptyElement::at(p) + Cross::new((0, 0), s + 1, color.stroke_width(2))
        })),
        MarkerStyle::Triangle | MarkerStyle::Star | MarkerStyle::Diamond => {
            let shape = marker_polygon(marker, s);
            let mut closed = shape.clone();
            closed.push(shape[0]);
            chart.draw_series(points.map(|p| {
                EmptyElement::at(p)
                    + Polygon::new(shape.clone(), fill)
                    + PathElement::new(closed.clone(), outline)
            }))
        }
    };
    drawn.map_err(backend_err)?;

    Ok(())
}

/// Pixel offsets of a polygonal marker centred on the origin (y grows downward).
fn marker_polygon(marker: MarkerStyle, size: i32) -> Vec<(i32, i32)> {
    let s = size as f64 * 1.3;
    let vertices: Vec<(f64, f64)> = match marker {
        MarkerStyle::Triangle => vec![(0.0, -s), (s * 0.87, s * 0.5), (-s * 0.87, s * 0.5)],
        MarkerStyle::Diamond => vec![(0.0, -s), (s * 0.7, 0.0), (0.0, s), (-s * 0.7, 0.0)],
        MarkerStyle::Star => (0..10)
            .map(|i| {
                let r = if i % 2 == 0 { s } else { s * 0.45 };
                let a = -std::f64::consts::FRAC_PI_2 + i as f64 * std::f64::consts::PI / 5.0;
                (r * a.cos(), r * a.sin())
            })
            .collect(),
        MarkerStyle::Circle | MarkerStyle::Square | MarkerStyle::Cross => {
            vec![(-s, -s), (s, -s), (s, s), (-s, s)]
        }
    };

    vertices
        .into_iter()
        .map(|(x, y)| (x.round() as i32, y.round() as i32))
        .collect()
}

/// Column name for an integer x position, empty between bars.
fn category_label(names: &[String], x: f64) -> String {
    let i = x.round();
    if (x - i).abs() > 1e-6 || i < 0.0 {
        return String::new();
    }
    names.get(i as usize).cloned().unwrap_or_default()
}

/// Axis ranges a figure is drawn over; the interactive plotter lays its grid over the same ranges.
pub(crate) fn axis_ranges(figure: &Figure) -> (Range<f64>, Range<f64>) {
    match figure {
        Figure::Bar(bar) => bar_ranges(bar),
        Figure::Line(line) => line_ranges(line),
        Figure::Pie(_) => (PIE_RANGE, PIE_RANGE),
        Figure::Scatter(scatter) => scatter_ranges(scatter),
        Figure::Histogram(hist) => histogram_ranges(hist).unwrap_or((0.0..1.0, 0.0..1.0)),
    }
}

fn bar_ranges(bar: &BarFigure) -> (Range<f64>, Range<f64>) {
    let x_range = -0.5..(bar.bars.len() as f64 - 0.5);
    (x_range, bar_value_range(bar.bars.iter().map(|b| b.sum)))
}

fn line_ranges(line: &LineFigure) -> (Range<f64>, Range<f64>) {
    let longest = line
        .series
        .iter()
        .flat_map(|s| s.points.iter().map(|p| p.0))
        .fold(0.0f64, f64::max);
    let x_range = padded_range(std::iter::once(0.0).chain(std::iter::once(longest)), 0.03);
    let y_range = padded_range(
        line.series.iter().flat_map(|s| s.points.iter().map(|p| p.1)),
        0.08,
    );
    (x_range, y_range)
}

fn scatter_ranges(scatter: &ScatterFigure) -> (Range<f64>, Range<f64>) {
    (
        padded_range(scatter.points.iter().map(|p| p.0), 0.05),
        padded_range(scatter.points.iter().map(|p| p.1), 0.05),
    )
}

fn histogram_ranges(hist: &HistogramFigure) -> Option<(Range<f64>, Range<f64>)> {
    let (&lo, &hi) = (hist.edges.first()?, hist.edges.last()?);
    Some((lo..hi, 0.0..(hist.max_count().max(1) as f64 * 1.05)))
}

/// Value range spanning zero and every bar, with headroom for annotations.
fn bar_value_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (lo, hi) = values.fold((0.0f64, 0.0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let span = if hi - lo > 0.0 { hi - lo } else { 1.0 };
    let lo = if lo < 0.0 { lo - span * 0.1 } else { lo };
    lo..(hi + span * 0.1)
}

/// Data range with fractional padding; empty or degenerate input still yields a usable range.
fn padded_range(values: impl Iterator<Item = f64>, pad: f64) -> Range<f64> {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    if lo > hi {
        return 0.0..1.0;
    }
    if lo == hi {
        let half = if lo == 0.0 { 0.5 } else { lo.abs() * 0.1 };
        return (lo - half)..(hi + half);
    }

    let margin = (hi - lo) * pad;
    (lo - margin)..(hi + margin)
}

fn nice_step(range: f64, target_steps: usize) -> f64 {
    let raw_step = range / target_steps as f64;
    let magnitude = 10f64.powf(raw_step.log10().floor());
    let normalized = raw_step / magnitude;

    let nice = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };

    nice * magnitude
}

/// Tick positions inside `range` on a nice step.
pub(crate) fn ticks(range: &Range<f64>, target_steps: usize) -> Vec<f64> {
    let span = range.end - range.start;
    if !span.is_finite() || span <= 0.0 {
        return Vec::new();
    }

    let step = nice_step(span, target_steps);
    let mut value = (range.start / step).ceil() * step;
    let mut ticks = Vec::new();
    while value <= range.end + step * 1e-9 {
        ticks.push(value);
        value += step;
    }
    ticks
}
