//! Plot module - the plotters and how they are composed
//!
//! This module provides:
//! - Scrolling trace plotters (level, gain reduction), each split into a
//!   UI-side plotter and an audio-side feed
//! - Static plots (compressor curve, threshold guide, value series)
//! - `LayerStack` for drawing several plots into one surface

mod compressor;
mod gain_reduction;
mod level;
mod style;
mod threshold;
mod values;

pub use compressor::{CompressorCurveParams, CompressorCurvePlotter, CurveGeometry};
pub use gain_reduction::{GainReductionFeed, GainReductionPlotter};
pub use level::{LevelFeed, LevelPlotter};
pub use style::{
    CurveStyle, GainReductionStyle, LevelStyle, ThresholdStyle, TraceMode, ValueStyle,
    DEFAULT_LINE_WEIGHT,
};
pub use threshold::ThresholdOverlay;
pub use values::ValuePlotter;

use crate::config::{DbRange, PlotConfiguration, Resolution};
use crate::error::ConfigError;
use crate::render::{PlotPath, PlotSurface};

/// A plot that can be drawn into a [`PlotSurface`]
///
/// Configuration changes are cheap: they are validated and stored, and the
/// expensive part (reallocating traces, recomputing geometry) happens in
/// [`ensure_size`](Plotter::ensure_size) on the next render.
pub trait Plotter {
    fn config(&self) -> &PlotConfiguration;

    /// Replace the configuration
    ///
    /// An invalid configuration is rejected and the previous one kept.
    fn set_config(&mut self, config: PlotConfiguration) -> Result<(), ConfigError>;

    /// Bring the surface and any derived state up to date for `dpi_scale`
    fn ensure_size(&mut self, surface: &mut PlotSurface, dpi_scale: f64) -> Result<(), ConfigError>;

    /// Take new compressor readouts; plots that don't show them ignore this
    fn recompute(&mut self, _params: &CompressorCurveParams) -> Result<(), ConfigError> {
        Ok(())
    }

    /// Draw on top of whatever the surface already holds
    fn draw(&mut self, surface: &mut PlotSurface);

    /// Clear the surface and draw this plot alone
    fn render(&mut self, surface: &mut PlotSurface, dpi_scale: f64) -> Result<(), ConfigError> {
        self.ensure_size(surface, dpi_scale)?;
        surface.begin_frame();
        self.draw(surface);
        Ok(())
    }

    fn set_resolution(&mut self, resolution: Resolution) -> Result<(), ConfigError> {
        let mut config = self.config().clone();
        config.resolution = resolution;
        self.set_config(config)
    }

    fn set_db_range(&mut self, db_range: DbRange) -> Result<(), ConfigError> {
        let mut config = self.config().clone();
        config.db_range = db_range;
        self.set_config(config)
    }

    fn set_headroom(&mut self, headroom_db: f64) -> Result<(), ConfigError> {
        let mut config = self.config().clone();
        config.headroom_db = headroom_db;
        self.set_config(config)
    }

    fn set_time_scale(&mut self, seconds: f64) -> Result<(), ConfigError> {
        let mut config = self.config().clone();
        config.time_scale_secs = seconds;
        self.set_config(config)
    }

    fn set_sample_rate(&mut self, sample_rate: f64) -> Result<(), ConfigError> {
        let mut config = self.config().clone();
        config.sample_rate = sample_rate;
        self.set_config(config)
    }
}

/// Any of the plots this crate draws
pub enum PlotLayer {
    Level(LevelPlotter),
    GainReduction(GainReductionPlotter),
    CompressorCurve(CompressorCurvePlotter),
    Threshold(ThresholdOverlay),
    Values(ValuePlotter),
}

impl PlotLayer {
    fn inner(&self) -> &dyn Plotter {
        match self {
            PlotLayer::Level(p) => p,
            PlotLayer::GainReduction(p) => p,
            PlotLayer::CompressorCurve(p) => p,
            PlotLayer::Threshold(p) => p,
            PlotLayer::Values(p) => p,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Plotter {
        match self {
            PlotLayer::Level(p) => p,
            PlotLayer::GainReduction(p) => p,
            PlotLayer::CompressorCurve(p) => p,
            PlotLayer::Threshold(p) => p,
            PlotLayer::Values(p) => p,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PlotLayer::Level(_) => "Level",
            PlotLayer::GainReduction(_) => "Gain Reduction",
            PlotLayer::CompressorCurve(_) => "Compressor Curve",
            PlotLayer::Threshold(_) => "Threshold",
            PlotLayer::Values(_) => "Values",
        }
    }
}

impl Plotter for PlotLayer {
    fn config(&self) -> &PlotConfiguration {
        self.inner().config()
    }

    fn set_config(&mut self, config: PlotConfiguration) -> Result<(), ConfigError> {
        self.inner_mut().set_config(config)
    }

    fn ensure_size(&mut self, surface: &mut PlotSurface, dpi_scale: f64) -> Result<(), ConfigError> {
        self.inner_mut().ensure_size(surface, dpi_scale)
    }

    fn recompute(&mut self, params: &CompressorCurveParams) -> Result<(), ConfigError> {
        self.inner_mut().recompute(params)
    }

    fn draw(&mut self, surface: &mut PlotSurface) {
        self.inner_mut().draw(surface)
    }
}

impl From<LevelPlotter> for PlotLayer {
    fn from(p: LevelPlotter) -> Self {
        PlotLayer::Level(p)
    }
}

impl From<GainReductionPlotter> for PlotLayer {
    fn from(p: GainReductionPlotter) -> Self {
        PlotLayer::GainReduction(p)
    }
}

impl From<CompressorCurvePlotter> for PlotLayer {
    fn from(p: CompressorCurvePlotter) -> Self {
        PlotLayer::CompressorCurve(p)
    }
}

impl From<ThresholdOverlay> for PlotLayer {
    fn from(p: ThresholdOverlay) -> Self {
        PlotLayer::Threshold(p)
    }
}

impl From<ValuePlotter> for PlotLayer {
    fn from(p: ValuePlotter) -> Self {
        PlotLayer::Values(p)
    }
}

/// Several plots drawn into one surface, first layer at the bottom
#[derive(Default)]
pub struct LayerStack {
    layers: Vec<PlotLayer>,
}

impl LayerStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a layer on top of the existing ones
    pub fn push(&mut self, layer: impl Into<PlotLayer>) -> &mut Self {
        self.layers.push(layer.into());
        self
    }

    /// Remove a layer by index
    pub fn remove(&mut self, index: usize) -> Option<PlotLayer> {
        if index < self.layers.len() {
            Some(self.layers.remove(index))
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn layers(&self) -> &[PlotLayer] {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut [PlotLayer] {
        &mut self.layers
    }

    /// Size every layer, clear once, then draw the layers in order
    pub fn render(&mut self, surface: &mut PlotSurface, dpi_scale: f64) -> Result<(), ConfigError> {
        for layer in &mut self.layers {
            layer.ensure_size(surface, dpi_scale)?;
        }
        surface.begin_frame();
        for layer in &mut self.layers {
            layer.draw(surface);
        }
        Ok(())
    }

    /// Forward compressor readouts to every layer
    pub fn recompute(&mut self, params: &CompressorCurveParams) -> Result<(), ConfigError> {
        for layer in &mut self.layers {
            layer.recompute(params)?;
        }
        Ok(())
    }

    /// Give every layer the same configuration
    ///
    /// The configuration is validated once up front, so either every layer
    /// takes it or none does.
    pub fn set_config(&mut self, config: &PlotConfiguration) -> Result<(), ConfigError> {
        config.validate()?;
        for layer in &mut self.layers {
            layer.set_config(config.clone())?;
        }
        Ok(())
    }
}

/// Edge a trace polygon is anchored to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Baseline {
    Bottom,
    Top,
}

impl Baseline {
    /// Off-screen value a fresh trace is filled with
    pub(crate) fn sentinel(self, height: f32) -> f32 {
        match self {
            Baseline::Bottom => height + 2.0,
            Baseline::Top => -2.0,
        }
    }
}

/// Closed polygon through the trace points, anchored off-screen at the baseline
pub(crate) fn trace_polygon(points: &[f32], width: f32, height: f32, baseline: Baseline) -> PlotPath {
    let anchor_y = match baseline {
        Baseline::Bottom => height + 8.0,
        Baseline::Top => -8.0,
    };
    let spacing = width / points.len().max(1) as f32;

    let mut path = PlotPath::with_capacity(points.len() + 4);
    path.move_to(-8.0, anchor_y);
    for (i, &y) in points.iter().enumerate() {
        path.line_to(i as f32 * spacing, y);
    }
    let last_y = points.last().copied().unwrap_or(anchor_y);
    path.line_to(width + 8.0, last_y)
        .line_to(width + 8.0, anchor_y)
        .close();
    path
}
