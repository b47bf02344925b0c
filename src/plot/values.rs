//! Static plot of an arbitrary value series
//!
//! Values are scaled into `[0, 1]` either by a fixed range or by the series
//! maximum, then drawn as a polygon standing on the bottom edge.

use super::style::{TraceMode, ValueStyle};
use super::Plotter;
use crate::config::PlotConfiguration;
use crate::coords::to_vertical_coordinate;
use crate::error::ConfigError;
use crate::render::{Paint, PlotPath, PlotSurface, StrokeStyle};

pub struct ValuePlotter {
    config: PlotConfiguration,
    style: ValueStyle,
    /// Values already divided by the range or the maximum
    values: Vec<f64>,
    range: f64,
}

impl ValuePlotter {
    pub fn new(config: PlotConfiguration, style: ValueStyle) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            style,
            values: Vec::new(),
            range: 1.0,
        })
    }

    /// Value that maps to the top edge when not normalizing
    pub fn set_range(&mut self, range: f64) -> Result<(), ConfigError> {
        if !(range.is_finite() && range > 0.0) {
            return Err(ConfigError::InvalidValueRange(range));
        }
        self.range = range;
        Ok(())
    }

    pub fn range(&self) -> f64 {
        self.range
    }

    /// Replace the plotted series
    ///
    /// With `normalize` the series maximum maps to the top edge; a maximum
    /// that is not positive leaves the values as they are. Non-finite values
    /// are plotted as zero.
    pub fn plot_values(&mut self, values: &[f64], normalize: bool) {
        let finite = |v: f64| if v.is_finite() { v } else { 0.0 };
        let divisor = if normalize {
            let max = values.iter().copied().map(finite).fold(f64::NEG_INFINITY, f64::max);
            if max > 0.0 {
                max
            } else {
                1.0
            }
        } else {
            self.range
        };

        self.values.clear();
        self.values.extend(values.iter().map(|&v| finite(v) / divisor));
    }

    /// The scaled series
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn style(&self) -> &ValueStyle {
        &self.style
    }

    pub fn set_style(&mut self, style: ValueStyle) {
        self.style = style;
    }

    pub fn set_mode(&mut self, mode: TraceMode) {
        self.style.mode = mode;
    }

    fn polygon(&self, width: f32, height: f32) -> PlotPath {
        let spacing = width / self.values.len().max(1) as f32;
        let mut path = PlotPath::with_capacity(self.values.len() + 3);
        path.move_to(0.0, height);
        for (i, &v) in self.values.iter().enumerate() {
            path.line_to(i as f32 * spacing, to_vertical_coordinate(v, height as f64) as f32);
        }
        path.line_to(width, height).close();
        path
    }
}

impl Plotter for ValuePlotter {
    fn config(&self) -> &PlotConfiguration {
        &self.config
    }

    fn set_config(&mut self, config: PlotConfiguration) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    fn ensure_size(&mut self, surface: &mut PlotSurface, dpi_scale: f64) -> Result<(), ConfigError> {
        surface.ensure_size(self.config.width, self.config.height, dpi_scale)?;
        self.config.dpi_scale = dpi_scale;
        Ok(())
    }

    fn draw(&mut self, surface: &mut PlotSurface) {
        if self.values.is_empty() {
            return;
        }
        let path = self.polygon(surface.width() as f32, surface.height() as f32);
        let stroke = StrokeStyle::solid(self.style.line_weight * self.config.dpi_scale as f32);

        surface.set_anti_alias(self.style.anti_alias);
        if self.style.mode.fills() {
            surface.fill_path(&path, &Paint::Solid(self.style.fill_color));
        }
        if self.style.mode.strokes() {
            surface.stroke_path(&path, &Paint::Solid(self.style.line_color), &stroke);
        }
    }
}
