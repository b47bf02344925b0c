//! Compressor transfer curve
//!
//! The curve is drawn in a square-ish dB space: input level along X, output
//! level along Y, both mapped over the plot's dB window. Below the knee it
//! is the unity diagonal, above the knee it rises with slope `1 / ratio`,
//! and the knee itself is a quadratic Bézier through the threshold corner.

use serde::{Deserialize, Serialize};

use super::style::CurveStyle;
use super::Plotter;
use crate::config::PlotConfiguration;
use crate::coords::scale;
use crate::error::ConfigError;
use crate::render::{Paint, PlotPath, PlotPoint, PlotSurface, StrokeStyle};

/// Compressor readouts the curve is built from
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompressorCurveParams {
    pub threshold_db: f64,
    pub ratio: f64,
    pub knee_lower_db: f64,
    pub knee_upper_db: f64,
    /// Knee width; zero or less draws a hard knee
    pub knee_width_db: f64,
}

impl CompressorCurveParams {
    /// Knee centred on the threshold
    pub fn from_knee_width(threshold_db: f64, ratio: f64, knee_width_db: f64) -> Self {
        let half = knee_width_db.max(0.0) / 2.0;
        Self {
            threshold_db,
            ratio,
            knee_lower_db: threshold_db - half,
            knee_upper_db: threshold_db + half,
            knee_width_db: knee_width_db.max(0.0),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let levels = [
            self.threshold_db,
            self.knee_lower_db,
            self.knee_upper_db,
            self.knee_width_db,
        ];
        if let Some(&level) = levels.iter().find(|db| !db.is_finite()) {
            return Err(ConfigError::InvalidLevel(level));
        }
        if !(self.ratio.is_finite() && self.ratio > 0.0) {
            return Err(ConfigError::InvalidRatio(self.ratio));
        }
        Ok(())
    }

    fn has_knee(&self) -> bool {
        self.knee_width_db > 0.0
    }
}

impl Default for CompressorCurveParams {
    fn default() -> Self {
        Self::from_knee_width(-20.0, 4.0, 8.0)
    }
}

/// Key points of a transfer curve on a surface of a given size
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurveGeometry {
    /// Just outside the bottom-left corner
    pub origin: PlotPoint,
    pub knee_start: PlotPoint,
    /// Threshold corner; the Bézier control point
    pub knee_control: PlotPoint,
    pub knee_end: PlotPoint,
    /// Where the curve leaves past the right edge
    pub exit: PlotPoint,
    pub has_knee: bool,
}

impl CurveGeometry {
    pub fn compute(
        params: &CompressorCurveParams,
        width: f64,
        height: f64,
        db_floor: f64,
        headroom_db: f64,
    ) -> Result<Self, ConfigError> {
        params.validate()?;
        let to_x = |db: f64| scale(db, db_floor, headroom_db, 0.0, width);
        let point = |x: f64, y: f64| PlotPoint::new(x as f32, y as f32);

        let t = to_x(params.threshold_db);
        let corner_y = height - t;
        let x1 = to_x(params.knee_lower_db);
        let x2 = to_x(params.knee_upper_db);
        let x3 = width + 2.0;

        Ok(Self {
            origin: point(-1.0, height + 1.0),
            knee_start: point(x1, height - x1),
            knee_control: point(t, corner_y),
            knee_end: point(x2, corner_y - (x2 - t) / params.ratio),
            exit: point(x3, corner_y - (x3 - t) / params.ratio),
            has_knee: params.has_knee(),
        })
    }

    pub fn path(&self) -> PlotPath {
        let mut path = PlotPath::with_capacity(4);
        path.move_to(self.origin.x, self.origin.y);
        if self.has_knee {
            path.line_to(self.knee_start.x, self.knee_start.y)
                .quad_to(self.knee_control, self.knee_end);
        } else {
            path.line_to(self.knee_control.x, self.knee_control.y);
        }
        path.line_to(self.exit.x, self.exit.y);
        path
    }
}

/// Static compressor curve plot
pub struct CompressorCurvePlotter {
    config: PlotConfiguration,
    style: CurveStyle,
    params: CompressorCurveParams,
    geometry: Option<CurveGeometry>,
    /// Surface size and dB window the geometry was computed for
    computed_for: Option<(u32, u32, f64, f64)>,
}

impl CompressorCurvePlotter {
    pub fn new(
        config: PlotConfiguration,
        style: CurveStyle,
        params: CompressorCurveParams,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        params.validate()?;
        Ok(Self {
            config,
            style,
            params,
            geometry: None,
            computed_for: None,
        })
    }

    pub fn params(&self) -> &CompressorCurveParams {
        &self.params
    }

    /// Geometry for the last rendered surface size
    pub fn geometry(&self) -> Option<&CurveGeometry> {
        self.geometry.as_ref()
    }

    pub fn style(&self) -> &CurveStyle {
        &self.style
    }

    pub fn set_style(&mut self, style: CurveStyle) {
        self.style = style;
    }

    fn key(&self, width: u32, height: u32) -> (u32, u32, f64, f64) {
        (width, height, self.config.db_floor(), self.config.headroom_db)
    }

    fn update_geometry(&mut self, width: u32, height: u32) -> Result<(), ConfigError> {
        self.geometry = Some(CurveGeometry::compute(
            &self.params,
            width as f64,
            height as f64,
            self.config.db_floor(),
            self.config.headroom_db,
        )?);
        self.computed_for = Some(self.key(width, height));
        Ok(())
    }
}

impl Plotter for CompressorCurvePlotter {
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

        let (width, height) = surface.size();
        if self.computed_for != Some(self.key(width, height)) {
            self.update_geometry(width, height)?;
        }
        Ok(())
    }

    fn recompute(&mut self, params: &CompressorCurveParams) -> Result<(), ConfigError> {
        params.validate()?;
        self.params = params.clone();
        if let Some((width, height, _, _)) = self.computed_for {
            self.update_geometry(width, height)?;
        }
        Ok(())
    }

    fn draw(&mut self, surface: &mut PlotSurface) {
        surface.set_anti_alias(self.style.anti_alias);
        if let Some(background) = self.style.background {
            surface.fill_rect(
                0.0,
                0.0,
                surface.width() as f32,
                surface.height() as f32,
                &Paint::Solid(background),
            );
        }

        if let Some(geometry) = &self.geometry {
            let weight = self.style.line_weight * self.config.dpi_scale as f32;
            surface.stroke_path(
                &geometry.path(),
                &Paint::Solid(self.style.line_color),
                &StrokeStyle::solid(weight),
            );
        }
    }
}
