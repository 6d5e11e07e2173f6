//! Figure Module
//! Backend-independent chart descriptions built from a table and a chart request.
//!
//! A [`Figure`] carries everything a renderer needs: title, axis labels and the
//! per-kind geometry (bar sums, line series, pie slices, scatter points,
//! histogram bins). The static renderer and the interactive plotter only draw.

use crate::charts::request::{ChartKind, ChartRequest, MarkerColor, MarkerStyle, ValidationError};
use crate::data::{ColumnError, Table};
use plotters::style::RGBColor;
use rayon::prelude::*;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// Number of named pie slices before the rest is folded into "Others".
pub const PIE_TOP_N: usize = 10;

/// Label of the synthetic pie slice holding the long tail.
pub const OTHERS_LABEL: &str = "Others";

/// Number of shared histogram bins.
pub const HISTOGRAM_BINS: usize = 30;

/// Histogram bar opacity.
pub const HISTOGRAM_ALPHA: f64 = 0.7;

/// Gridline opacity; gridlines are dashed on every chart kind.
pub const GRID_ALPHA: f64 = 0.6;

pub const GRID_COLOR: RGBColor = RGBColor(176, 176, 176);

/// Bar fill ("skyblue").
pub const BAR_COLOR: RGBColor = RGBColor(135, 206, 235);

/// Tab10 palette for line series, histogram series and pie wedges.
pub const PALETTE: [RGBColor; 10] = [
    RGBColor(31, 119, 180),  // Blue
    RGBColor(255, 127, 14),  // Orange
    RGBColor(44, 160, 44),   // Green
    RGBColor(214, 39, 40),   // Red
    RGBColor(148, 103, 189), // Purple
    RGBColor(140, 86, 75),   // Brown
    RGBColor(227, 119, 194), // Pink
    RGBColor(127, 127, 127), // Gray
    RGBColor(188, 189, 34),  // Olive
    RGBColor(23, 190, 207),  // Cyan
];

/// Palette color for the series at `index`, cycling past the palette size.
pub fn palette_color(index: usize) -> RGBColor {
    PALETTE[index % PALETTE.len()]
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("{0}")]
    Column(#[from] ColumnError),
    #[error("Column '{0}' has no values to plot")]
    NoValues(String),
    #[error("Drawing failed: {0}")]
    Backend(String),
    #[error("Failed to write image: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarEntry {
    pub column: String,
    pub sum: f64,
}

impl BarEntry {
    /// Text drawn above the bar.
    pub fn annotation(&self) -> String {
        format!("{:.2}", self.sum)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarFigure {
    pub bars: Vec<BarEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineSeries {
    pub name: String,
    pub color: RGBColor,
    /// (row index, value); null cells are skipped.
    pub points: Vec<(f64, f64)>,
}

impl LineSeries {
    /// Runs of consecutive rows. The line is broken wherever a row was skipped.
    pub fn segments(&self) -> Vec<&[(f64, f64)]> {
        let mut segments = Vec::new();
        let mut start = 0;
        for i in 1..self.points.len() {
            if self.points[i].0 - self.points[i - 1].0 > 1.0 {
                segments.push(&self.points[start..i]);
                start = i;
            }
        }
        if start < self.points.len() {
            segments.push(&self.points[start..]);
        }
        segments
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineFigure {
    pub series: Vec<LineSeries>,
    pub marker: MarkerStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: String,
    pub count: u64,
    pub color: RGBColor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieFigure {
    pub column: String,
    pub slices: Vec<PieSlice>,
}

impl PieFigure {
    pub fn total(&self) -> u64 {
        self.slices.iter().map(|s| s.count).sum()
    }

    /// Share of each slice in percent, in slice order.
    pub fn percentages(&self) -> Vec<f64> {
        let total = self.total() as f64;
        self.slices
            .iter()
            .map(|s| {
                if total > 0.0 {
                    s.count as f64 * 100.0 / total
                } else {
                    0.0
                }
            })
            .collect()
    }

    /// Wedge label text, e.g. "66.7%".
    pub fn percent_labels(&self) -> Vec<String> {
        self.percentages()
            .into_iter()
            .map(|p| format!("{:.1}%", p))
            .collect()
    }

    /// Start and end angle (radians) of every wedge, counter-clockwise from the positive x axis.
    pub fn wedge_angles(&self) -> Vec<(f64, f64)> {
        let mut start = 0.0;
        self.percentages()
            .into_iter()
            .map(|p| {
                let end = start + p / 100.0 * std::f64::consts::TAU;
                let span = (start, end);
                start = end;
                span
            })
            .collect()
    }

    /// Closed polygon approximating a wedge of the unit-centred pie.
    pub fn wedge_polygon(start: f64, end: f64, radius: f64) -> Vec<(f64, f64)> {
        let steps = (((end - start) / std::f64::consts::TAU) * 120.0).ceil().max(2.0) as usize;
        let mut points = Vec::with_capacity(steps + 2);
        points.push((0.0, 0.0));
        for i in 0..=steps {
            let a = start + (end - start) * i as f64 / steps as f64;
            points.push((radius * a.cos(), radius * a.sin()));
        }
        points
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterFigure {
    pub x_column: String,
    pub y_column: String,
    pub points: Vec<(f64, f64)>,
    pub marker: MarkerStyle,
    pub color: MarkerColor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSeries {
    pub name: String,
    pub color: RGBColor,
    pub counts: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramFigure {
    /// `HISTOGRAM_BINS + 1` ascending bin edges shared by every series.
    pub edges: Vec<f64>,
    pub series: Vec<HistogramSeries>,
}

impl HistogramFigure {
    pub fn max_count(&self) -> u64 {
        self.series
            .iter()
            .flat_map(|s| s.counts.iter().copied())
            .max()
            .unwrap_or(0)
    }
}

/// A rendered chart, ready to be drawn by any backend.
#[derive(Debug, Clone, PartialEq)]
pub enum Figure {
    Bar(BarFigure),
    Line(LineFigure),
    Pie(PieFigure),
    Scatter(ScatterFigure),
    Histogram(HistogramFigure),
}

impl Figure {
    /// Dispatch on the request's chart kind.
    pub fn build(table: &Table, request: &ChartRequest) -> Result<Figure, RenderError> {
        request.validate()?;
        debug!(kind = %request.kind, columns = ?request.columns, "building figure");

        let figure = match request.kind {
            ChartKind::Bar => Figure::Bar(build_bar(table, &request.columns)?),
            ChartKind::Line => {
                Figure::Line(build_line(table, &request.columns, request.marker_style)?)
            }
            ChartKind::Pie => Figure::Pie(build_pie(table, &request.columns[0])?),
            ChartKind::Scatter => Figure::Scatter(build_scatter(
                table,
                &request.columns[0],
                &request.columns[1],
                request.marker_style,
                request.marker_color,
            )?),
            ChartKind::Histogram => Figure::Histogram(build_histogram(table, &request.columns)?),
        };

        Ok(figure)
    }

    pub fn kind(&self) -> ChartKind {
        match self {
            Figure::Bar(_) => ChartKind::Bar,
            Figure::Line(_) => ChartKind::Line,
            Figure::Pie(_) => ChartKind::Pie,
            Figure::Scatter(_) => ChartKind::Scatter,
            Figure::Histogram(_) => ChartKind::Histogram,
        }
    }

    pub fn title(&self) -> String {
        match self {
            Figure::Pie(pie) => format!("Pie Chart of {}", pie.column),
            other => other.kind().label().to_string(),
        }
    }

    pub fn x_label(&self) -> Option<&str> {
        match self {
            Figure::Scatter(s) => Some(&s.x_column),
            _ => None,
        }
    }

    pub fn y_label(&self) -> Option<&str> {
        match self {
            Figure::Bar(_) => Some("Sum"),
            Figure::Scatter(s) => Some(&s.y_column),
            _ => None,
        }
    }
}

fn build_bar(table: &Table, columns: &[String]) -> Result<BarFigure, RenderError> {
    let bars = columns
        .par_iter()
        .map(|name| -> Result<BarEntry, RenderError> {
            let sum = table
                .numeric_values(name)?
                .into_iter()
                .filter_map(finite)
                .sum::<f64>();
            Ok(BarEntry {
                column: name.clone(),
                sum,
            })
        })
        .collect::<Result<Vec<_>, RenderError>>()?;

    Ok(BarFigure { bars })
}

fn build_line(
    table: &Table,
    columns: &[String],
    marker: MarkerStyle,
) -> Result<LineFigure, RenderError> {
    let series = columns
        .iter()
        .enumerate()
        .map(|(i, name)| -> Result<LineSeries, RenderError> {
            let points = table
                .numeric_values(name)?
                .into_iter()
                .enumerate()
                .filter_map(|(row, v)| finite(v).map(|v| (row as f64, v)))
                .collect();
            Ok(LineSeries {
                name: name.clone(),
                color: palette_color(i),
                points,
            })
        })
        .collect::<Result<Vec<_>, RenderError>>()?;

    Ok(LineFigure { series, marker })
}

/// Drops nulls and NaN/infinite values, which no chart can place.
fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Frequency of every non-null value, most frequent first; ties keep first-appearance order.
pub fn value_counts(values: &[Option<String>]) -> Vec<(String, u64)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(String, u64)> = Vec::new();

    for value in values.iter().flatten() {
        match index.get(value.as_str()) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(value.as_str(), counts.len());
                counts.push((value.clone(), 1));
            }
        }
    }

    // Stable sort keeps first-appearance order among equal counts.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

fn build_pie(table: &Table, column: &str) -> Result<PieFigure, RenderError> {
    let counts = value_counts(&table.category_values(column)?);
    if counts.is_empty() {
        return Err(RenderError::NoValues(column.to_string()));
    }

    let others: u64 = counts.iter().skip(PIE_TOP_N).map(|(_, c)| c).sum();
    let mut slices: Vec<PieSlice> = counts
        .into_iter()
        .take(PIE_TOP_N)
        .enumerate()
        .map(|(i, (label, count))| PieSlice {
            label,
            count,
            color: palette_color(i),
        })
        .collect();

    if others > 0 {
        slices.push(PieSlice {
            label: OTHERS_LABEL.to_string(),
            count: others,
            color: palette_color(slices.len()),
        });
    }

    Ok(PieFigure {
        column: column.to_string(),
        slices,
    })
}

fn build_scatter(
    table: &Table,
    x: &str,
    y: &str,
    marker: MarkerStyle,
    color: MarkerColor,
) -> Result<ScatterFigure, RenderError> {
    let xs = table.numeric_values(x)?;
    let ys = table.numeric_values(y)?;
    let points = xs
        .into_iter()
        .zip(ys)
        .filter_map(|(x, y)| Some((finite(x)?, finite(y)?)))
        .collect();

    Ok(ScatterFigure {
        x_column: x.to_string(),
        y_column: y.to_string(),
        points,
        marker,
        color,
    })
}

/// Equal-width bin edges over `min..=max`; a zero-width range is widened by 0.5 on each side.
pub fn bin_edges(min: f64, max: f64, bins: usize) -> Vec<f64> {
    let (lo, hi) = if min == max {
        (min - 0.5, max + 0.5)
    } else {
        (min, max)
    };
    // Divide before subtracting: hi - lo overflows near f64::MAX.
    let width = hi / bins as f64 - lo / bins as f64;
    (0..=bins)
        .map(|i| if i == bins { hi } else { lo + width * i as f64 })
        .collect()
}

/// Count values into the bins described by `edges`. The last bin includes its right edge.
pub fn bin_counts(values: &[f64], edges: &[f64]) -> Vec<u64> {
    let bins = edges.len().saturating_sub(1);
    let mut counts = vec![0u64; bins];
    if bins == 0 {
        return counts;
    }

    let n = bins as f64;
    let lo = edges[0];
    let hi = edges[bins];
    let span = hi / n - lo / n;
    for &v in values {
        if v < lo || v > hi {
            continue;
        }
        let idx = ((v / n - lo / n) / span * n).floor() as usize;
        counts[idx.min(bins - 1)] += 1;
    }
    counts
}

fn build_histogram(table: &Table, columns: &[String]) -> Result<HistogramFigure, RenderError> {
    let values = columns
        .par_iter()
        .map(|name| -> Result<(String, Vec<f64>), RenderError> {
            let values: Vec<f64> = table
                .numeric_values(name)?
                .into_iter()
                .flatten()
                .filter(|v| v.is_finite())
                .collect();
            Ok((name.clone(), values))
        })
        .collect::<Result<Vec<_>, RenderError>>()?;

    let (min, max) = values
        .iter()
        .flat_map(|(_, v)| v.iter().copied())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if min > max {
        return Err(RenderError::NoValues(columns.join(", ")));
    }

    let edges = bin_edges(min, max, HISTOGRAM_BINS);
    let series = values
        .into_iter()
        .enumerate()
        .map(|(i, (name, values))| HistogramSeries {
            counts: bin_counts(&values, &edges),
            name,
            color: palette_color(i),
        })
        .collect();

    Ok(HistogramFigure { edges, series })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_counts_orders_by_frequency_then_first_seen() {
        let values: Vec<Option<String>> = ["b", "a", "a", "c", "b", "d"]
            .iter()
            .map(|s| Some(s.to_string()))
            .chain(std::iter::once(None))
            .collect();

        let counts = value_counts(&values);
        assert_eq!(
            counts,
            vec![
                ("b".to_string(), 2),
                ("a".to_string(), 2),
                ("c".to_string(), 1),
                ("d".to_string(), 1),
            ]
        );
    }

    #[test]
    fn degenerate_range_is_widened() {
        let edges = bin_edges(3.0, 3.0, 4);
        assert_eq!(edges, vec![2.5, 2.75, 3.0, 3.25, 3.5]);
        assert_eq!(bin_counts(&[3.0, 3.0], &edges), vec![0, 0, 2, 0]);
    }

    #[test]
    fn max_value_falls_in_last_bin() {
        let edges = bin_edges(0.0, 10.0, 5);
        assert_eq!(bin_counts(&[0.0, 1.9, 2.0, 10.0], &edges), vec![2, 1, 0, 0, 1]);
    }

    #[test]
    fn huge_span_keeps_edges_finite() {
        let edges = bin_edges(-1e308, 1e308, 30);
        assert!(edges.iter().all(|e| e.is_finite()));
        assert!(edges.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(edges[0], -1e308);
        assert_eq!(edges[30], 1e308);

        let counts = bin_counts(&[-1e308, 0.0, 1e308], &edges);
        assert_eq!(counts.iter().sum::<u64>(), 3);
        assert_eq!(counts[0], 1);
        assert_eq!(counts[15], 1);
        assert_eq!(counts[29], 1);
    }

    #[test]
    fn line_breaks_at_skipped_rows() {
        let series = LineSeries {
            name: "a".into(),
            color: palette_color(0),
            points: vec![(0.0, 1.0), (1.0, 2.0), (3.0, 4.0), (5.0, 6.0), (6.0, 7.0)],
        };
        let segments = series.segments();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0], &[(0.0, 1.0), (1.0, 2.0)][..]);
        assert_eq!(segments[1], &[(3.0, 4.0)][..]);
        assert_eq!(segments[2], &[(5.0, 6.0), (6.0, 7.0)][..]);

        let empty = LineSeries { points: Vec::new(), ..series };
        assert!(empty.segments().is_empty());
    }

    #[test]
    fn wedge_angles_cover_full_circle() {
        let pie = PieFigure {
            column: "c".into(),
            slices: vec![
                PieSlice { label: "x".into(), count: 1, color: palette_color(0) },
                PieSlice { label: "y".into(), count: 3, color: palette_color(1) },
            ],
        };
        let angles = pie.wedge_angles();
        assert_eq!(angles[0].0, 0.0);
        assert!((angles[1].1 - std::f64::consts::TAU).abs() < 1e-12);
        assert!((angles[0].1 - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }
}
