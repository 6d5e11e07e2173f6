//! Charts module - Chart requests, figure building and rendering

pub mod figure;
mod plotter;
mod renderer;
mod request;

pub use figure::{Figure, RenderError};
pub use plotter::ChartPlotter;
pub use renderer::StaticChartRenderer;
pub use request::{
    ChartKind, ChartRequest, MarkerColor, MarkerStyle, UnknownOptionError, ValidationError,
};
