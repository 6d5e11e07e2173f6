//! Chart Request Module
//! User selections for one render action and their arity validation.

use plotters::style::RGBColor;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Why a chart request cannot be rendered.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please select at least one column.")]
    NoColumnsSelected,
    #[error("Scatter plot needs exactly 2 numeric columns.")]
    WrongArityForScatter,
    #[error("Pie chart needs exactly 1 column.")]
    WrongArityForPie,
}

/// A selector value that matches none of the known options.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown {kind}: '{value}'")]
pub struct UnknownOptionError {
    pub kind: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChartKind {
    #[default]
    Bar,
    Line,
    Pie,
    Scatter,
    Histogram,
}

impl ChartKind {
    pub const ALL: [ChartKind; 5] = [
        ChartKind::Bar,
        ChartKind::Line,
        ChartKind::Pie,
        ChartKind::Scatter,
        ChartKind::Histogram,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ChartKind::Bar => "Bar Chart",
            ChartKind::Line => "Line Plot",
            ChartKind::Pie => "Pie Chart",
            ChartKind::Scatter => "Scatter Plot",
            ChartKind::Histogram => "Histogram",
        }
    }

    /// Short identifier used in form values.
    pub fn code(self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
            ChartKind::Pie => "pie",
            ChartKind::Scatter => "scatter",
            ChartKind::Histogram => "histogram",
        }
    }

    /// Check a column count against this kind's arity rule.
    pub fn check_arity(self, count: usize) -> Result<(), ValidationError> {
        match self {
            ChartKind::Scatter if count != 2 => Err(ValidationError::WrongArityForScatter),
            ChartKind::Pie if count != 1 => Err(ValidationError::WrongArityForPie),
            ChartKind::Bar | ChartKind::Line | ChartKind::Histogram if count == 0 => {
                Err(ValidationError::NoColumnsSelected)
            }
            _ => Ok(()),
        }
    }

    /// Whether marker style / color selectors affect this kind.
    pub fn uses_markers(self) -> bool {
        matches!(self, ChartKind::Line | ChartKind::Scatter)
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ChartKind {
    type Err = UnknownOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        ChartKind::ALL
            .into_iter()
            .find(|k| k.code().eq_ignore_ascii_case(s) || k.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownOptionError {
                kind: "chart kind",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MarkerStyle {
    #[default]
    Circle,
    Square,
    Triangle,
    Star,
    Cross,
    Diamond,
}

impl MarkerStyle {
    pub const ALL: [MarkerStyle; 6] = [
        MarkerStyle::Circle,
        MarkerStyle::Square,
        MarkerStyle::Triangle,
        MarkerStyle::Star,
        MarkerStyle::Cross,
        MarkerStyle::Diamond,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            MarkerStyle::Circle => "o",
            MarkerStyle::Square => "s",
            MarkerStyle::Triangle => "^",
            MarkerStyle::Star => "*",
            MarkerStyle::Cross => "x",
            MarkerStyle::Diamond => "d",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MarkerStyle::Circle => "Circle",
            MarkerStyle::Square => "Square",
            MarkerStyle::Triangle => "Triangle",
            MarkerStyle::Star => "Star",
            MarkerStyle::Cross => "Cross",
            MarkerStyle::Diamond => "Diamond",
        }
    }
}

impl fmt::Display for MarkerStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.symbol(), self.name())
    }
}

impl FromStr for MarkerStyle {
    type Err = UnknownOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accept "o", "Circle" and "o (Circle)".
        let s = s.trim();
        let head = s.split_whitespace().next().unwrap_or_default();
        MarkerStyle::ALL
            .into_iter()
            .find(|m| m.symbol() == head || m.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownOptionError {
                kind: "marker style",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MarkerColor {
    #[default]
    Blue,
    Red,
    Green,
    Orange,
    Purple,
    Black,
    Brown,
}

impl MarkerColor {
    pub const ALL: [MarkerColor; 7] = [
        MarkerColor::Blue,
        MarkerColor::Red,
        MarkerColor::Green,
        MarkerColor::Orange,
        MarkerColor::Purple,
        MarkerColor::Black,
        MarkerColor::Brown,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MarkerColor::Blue => "blue",
            MarkerColor::Red => "red",
            MarkerColor::Green => "green",
            MarkerColor::Orange => "orange",
            MarkerColor::Purple => "purple",
            MarkerColor::Black => "black",
            MarkerColor::Brown => "brown",
        }
    }

    /// CSS named-color value.
    pub fn rgb(self) -> RGBColor {
        match self {
            MarkerColor::Blue => RGBColor(0, 0, 255),
            MarkerColor::Red => RGBColor(255, 0, 0),
            MarkerColor::Green => RGBColor(0, 128, 0),
            MarkerColor::Orange => RGBColor(255, 165, 0),
            MarkerColor::Purple => RGBColor(128, 0, 128),
            MarkerColor::Black => RGBColor(0, 0, 0),
            MarkerColor::Brown => RGBColor(165, 42, 42),
        }
    }
}

impl fmt::Display for MarkerColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MarkerColor {
    type Err = UnknownOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        MarkerColor::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownOptionError {
                kind: "marker color",
                value: s.to_string(),
            })
    }
}

/// One "generate" action: chart kind, ordered column selection and marker options.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChartRequest {
    pub kind: ChartKind,
    pub columns: Vec<String>,
    pub marker_style: MarkerStyle,
    pub marker_color: MarkerColor,
}

impl ChartRequest {
    pub fn new(kind: ChartKind, columns: Vec<String>) -> Self {
        Self {
            kind,
            columns,
            ..Default::default()
        }
    }

    pub fn with_marker(mut self, style: MarkerStyle, color: MarkerColor) -> Self {
        self.marker_style = style;
        self.marker_color = color;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.kind.check_arity(self.columns.len())
    }
}
