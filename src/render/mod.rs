//! Render module - rasterization for the plots
//!
//! This module provides:
//! - Path, paint and stroke types the plotters build geometry with
//! - `PlotSurface`, the owned pixel buffer they draw into

mod path;
mod surface;

pub use path::{ColorStop, Paint, PathCommand, PlotColor, PlotPath, PlotPoint, StrokeStyle};
pub use surface::{physical_size, PixelFrame, PlotSurface};
pub(crate) use surface::fits_surface;
