//! Threshold guide
//!
//! A dashed crosshair marking the threshold on both axes, plus a shaded
//! band where gain reduction begins.

use super::style::ThresholdStyle;
use super::{CompressorCurveParams, Plotter};
use crate::config::PlotConfiguration;
use crate::coords::scale;
use crate::error::ConfigError;
use crate::render::{ColorStop, Paint, PlotPath, PlotPoint, PlotSurface, StrokeStyle};

/// Dash pattern in logical pixels
const DASH_PATTERN: [f32; 4] = [6.0, 3.0, 6.0, 3.0];

/// Phase into the pattern; 5 px before its start
const DASH_PHASE: f32 = 13.0;

/// Width of the reduction zone fade
const ZONE_FADE: f32 = 5.0;

const ZONE_ALPHA: f32 = 0.4;

pub struct ThresholdOverlay {
    config: PlotConfiguration,
    style: ThresholdStyle,
    threshold_db: f64,
}

impl ThresholdOverlay {
    pub fn new(
        config: PlotConfiguration,
        style: ThresholdStyle,
        threshold_db: f64,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        check_level(threshold_db)?;
        Ok(Self {
            config,
            style,
            threshold_db,
        })
    }

    pub fn threshold_db(&self) -> f64 {
        self.threshold_db
    }

    pub fn set_threshold(&mut self, threshold_db: f64) -> Result<(), ConfigError> {
        check_level(threshold_db)?;
        self.threshold_db = threshold_db;
        Ok(())
    }

    pub fn style(&self) -> &ThresholdStyle {
        &self.style
    }

    pub fn set_style(&mut self, style: ThresholdStyle) {
        self.style = style;
    }

    /// Threshold position in surface pixels, measured along the height
    fn threshold_coordinate(&self, height: f32) -> f32 {
        scale(
            self.threshold_db,
            self.config.db_floor(),
            self.config.headroom_db,
            0.0,
            height as f64,
        ) as f32
    }
}

fn check_level(db: f64) -> Result<(), ConfigError> {
    if db.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::InvalidLevel(db))
    }
}

impl Plotter for ThresholdOverlay {
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

    fn recompute(&mut self, params: &CompressorCurveParams) -> Result<(), ConfigError> {
        self.set_threshold(params.threshold_db)
    }

    fn draw(&mut self, surface: &mut PlotSurface) {
        let width = surface.width() as f32;
        let height = surface.height() as f32;
        let dpi = self.config.dpi_scale as f32;
        let t = self.threshold_coordinate(height);

        let stroke = StrokeStyle::dashed(
            self.style.line_weight * dpi,
            DASH_PATTERN.iter().map(|d| d * dpi).collect(),
            DASH_PHASE * dpi,
        );
        let line = Paint::Solid(self.style.line_color);

        surface.set_anti_alias(self.style.anti_alias);

        let mut vertical = PlotPath::new();
        vertical.move_to(t, 0.0).line_to(t, height);
        surface.stroke_path(&vertical, &line, &stroke);

        let mut horizontal = PlotPath::new();
        horizontal.move_to(0.0, height - t).line_to(width, height - t);
        surface.stroke_path(&horizontal, &line, &stroke);

        let zone = self.style.zone_color;
        let fade = Paint::Linear {
            start: PlotPoint::new(height, 0.0),
            end: PlotPoint::new(height + ZONE_FADE, 0.0),
            stops: [
                ColorStop::new(0.0, zone.with_alpha(ZONE_ALPHA)),
                ColorStop::new(1.0, zone.with_alpha(0.0)),
            ],
        };
        surface.fill_rect(height, 0.0, width, height, &fade);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::PlotColor;

    fn overlay(threshold_db: f64) -> ThresholdOverlay {
        let config = PlotConfiguration::new(200.0, 100.0, 48_000.0).unwrap();
        let style = ThresholdStyle {
            line_color: PlotColor::WHITE,
            anti_alias: false,
            ..ThresholdStyle::default()
        };
        ThresholdOverlay::new(config, style, threshold_db).unwrap()
    }

    #[test]
    fn test_threshold_maps_over_height() {
        let overlay = overlay(-15.0);
        assert!((overlay.threshold_coordinate(100.0) - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_crosshair_is_dashed() {
        let mut overlay = overlay(-15.0);
        let mut surface = PlotSurface::new(200.0, 100.0, 1.0).unwrap();
        overlay.render(&mut surface, 1.0).unwrap();

        let frame = surface.present();
        let column: Vec<bool> = (0..100)
            .map(|y| frame.pixel_argb(50, y).unwrap() >> 24 == 0xff)
            .collect();
        let lit = column.iter().filter(|&&on| on).count();
        assert!(lit > 0 && lit < 100);
    }

    #[test]
    fn test_reduction_zone_fades_out() {
        let mut overlay = overlay(-40.0);
        let mut surface = PlotSurface::new(200.0, 100.0, 1.0).unwrap();
        overlay.render(&mut surface, 1.0).unwrap();

        let frame = surface.present();
        let alpha = |x: u32| frame.pixel_argb(x, 20).unwrap() >> 24;
        assert_eq!(alpha(95), 0);
        assert!(alpha(100) > 80);
        assert!(alpha(100) > alpha(103));
        assert_eq!(alpha(150), 0);
    }

    #[test]
    fn test_recompute_moves_threshold() {
        let mut overlay = overlay(-15.0);
        overlay
            .recompute(&CompressorCurveParams::from_knee_width(-6.0, 2.0, 0.0))
            .unwrap();
        assert_eq!(overlay.threshold_db(), -6.0);
    }

    #[test]
    fn test_refuses_bad_configuration() {
        let mut config = PlotConfiguration::new(200.0, 100.0, 48_000.0).unwrap();
        config.headroom_db = config.db_floor();
        assert!(matches!(
            ThresholdOverlay::new(config.clone(), ThresholdStyle::default(), -15.0),
            Err(ConfigError::DegenerateRange { .. })
        ));

        config.headroom_db = 2.0;
        config.sample_rate = 0.0;
        assert_eq!(
            ThresholdOverlay::new(config, ThresholdStyle::default(), -15.0).err(),
            Some(ConfigError::InvalidSampleRate(0.0))
        );

        let mut overlay = overlay(-15.0);
        let mut bad = overlay.config().clone();
        bad.headroom_db = -40.0;
        assert!(overlay.set_config(bad).is_err());
        assert_eq!(overlay.config().headroom_db, 2.0);
    }

    #[test]
    fn test_rejects_non_finite_threshold() {
        let config = PlotConfiguration::new(200.0, 100.0, 48_000.0).unwrap();
        assert!(ThresholdOverlay::new(config, ThresholdStyle::default(), f64::NAN).is_err());

        let mut overlay = overlay(-15.0);
        assert!(overlay.set_threshold(f64::NAN).is_err());
        assert!(overlay.set_threshold(f64::INFINITY).is_err());

        let mut params = CompressorCurveParams::default();
        params.threshold_db = f64::NEG_INFINITY;
        assert_eq!(
            overlay.recompute(&params),
            Err(ConfigError::InvalidLevel(f64::NEG_INFINITY))
        );
        assert_eq!(overlay.threshold_db(), -15.0);

        let mut surface = PlotSurface::new(200.0, 100.0, 1.0).unwrap();
        overlay.render(&mut surface, 1.0).unwrap();
        assert!(overlay.threshold_coordinate(100.0).is_finite());
    }

    #[test]
    fn test_dash_scales_with_dpi() {
        let mut overlay = overlay(-15.0);
        let mut surface = PlotSurface::new(200.0, 100.0, 1.0).unwrap();
        overlay.render(&mut surface, 2.0).unwrap();
        assert_eq!(surface.size(), (400, 200));
        assert_eq!(overlay.config().dpi_scale, 2.0);
        assert!(!surface.present().is_blank());
    }
}
