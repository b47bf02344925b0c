//! Scrolling level plot
//!
//! One trace of dB values, drawn as a closed polygon anchored to the bottom
//! edge (or the top edge with reverse fill).

use super::style::{fade_to_bottom, LevelStyle, TraceMode};
use super::{trace_polygon, Baseline, Plotter};
use crate::config::PlotConfiguration;
use crate::error::ConfigError;
use crate::render::{physical_size, Paint, PlotSurface, StrokeStyle};
use crate::trace::{trace_channel, TraceReader, TraceWriter};

/// Audio-side half of a [`LevelPlotter`]
pub struct LevelFeed {
    writer: TraceWriter<1>,
}

impl LevelFeed {
    /// Push one level reading in dB
    #[inline]
    pub fn process(&mut self, sample: f64) {
        self.writer.process([sample]);
    }
}

/// UI-side half of a level plot
pub struct LevelPlotter {
    config: PlotConfiguration,
    style: LevelStyle,
    reader: TraceReader<1>,
    /// Set when the traces must be rebuilt on the next render
    rebuild_pending: bool,
}

impl LevelPlotter {
    /// Create a plotter and the feed that goes with it
    pub fn new(config: PlotConfiguration, style: LevelStyle) -> Result<(Self, LevelFeed), ConfigError> {
        config.validate()?;
        let (w, h) = physical_size(config.width, config.height, config.dpi_scale);
        let baseline = baseline(&style);
        let (writer, reader) =
            trace_channel(config.layout(w, h), [baseline.sentinel(h as f32)]);

        let plotter = Self {
            config,
            style,
            reader,
            rebuild_pending: false,
        };
        Ok((plotter, LevelFeed { writer }))
    }

    pub fn style(&self) -> &LevelStyle {
        &self.style
    }

    /// Replace the style; switching the fill direction restarts the trace
    pub fn set_style(&mut self, style: LevelStyle) {
        if style.reverse_fill != self.style.reverse_fill {
            self.rebuild_pending = true;
        }
        self.style = style;
    }

    pub fn set_mode(&mut self, mode: TraceMode) {
        self.style.mode = mode;
    }

    pub fn set_reverse_fill(&mut self, reverse: bool) {
        if reverse != self.style.reverse_fill {
            self.style.reverse_fill = reverse;
            self.rebuild_pending = true;
        }
    }

    pub fn set_gradient_fill(&mut self, enabled: bool) {
        self.style.gradient_fill = enabled;
    }

    pub fn set_line_weight(&mut self, weight: f32) {
        self.style.line_weight = weight;
    }

    /// Whether a layout change is waiting for the next render
    pub fn rebuild_pending(&self) -> bool {
        self.rebuild_pending
    }
}

fn baseline(style: &LevelStyle) -> Baseline {
    if style.reverse_fill {
        Baseline::Top
    } else {
        Baseline::Bottom
    }
}

impl Plotter for LevelPlotter {
    fn config(&self) -> &PlotConfiguration {
        &self.config
    }

    fn set_config(&mut self, config: PlotConfiguration) -> Result<(), ConfigError> {
        config.validate()?;
        // The display scale comes from the host on every render
        let config = PlotConfiguration {
            dpi_scale: self.config.dpi_scale,
            ..config
        };
        if self.config.changes_traces(&config) {
            self.rebuild_pending = true;
        }
        self.config = config;
        Ok(())
    }

    fn ensure_size(&mut self, surface: &mut PlotSurface, dpi_scale: f64) -> Result<(), ConfigError> {
        surface.ensure_size(self.config.width, self.config.height, dpi_scale)?;
        if self.config.dpi_scale != dpi_scale {
            self.config.dpi_scale = dpi_scale;
            self.rebuild_pending = true;
        }

        let layout = self.config.layout(surface.width(), surface.height());
        if self.rebuild_pending || layout != *self.reader.layout() {
            let fill = baseline(&self.style).sentinel(surface.height() as f32);
            // A full queue leaves the flag set and we retry next frame
            self.rebuild_pending = !self.reader.rebuild(layout, [fill]);
        }
        Ok(())
    }

    fn draw(&mut self, surface: &mut PlotSurface) {
        let width = surface.width() as f32;
        let height = surface.height() as f32;
        let path = trace_polygon(&self.reader.snapshot()[0], width, height, baseline(&self.style));

        let style = &self.style;
        let stroke = StrokeStyle::solid(style.line_weight * self.config.dpi_scale as f32);
        let fill = |start: f32| {
            if style.gradient_fill {
                fade_to_bottom(style.fill_color, height, start)
            } else {
                Paint::Solid(style.fill_color)
            }
        };

        surface.set_anti_alias(style.anti_alias);
        match style.mode {
            TraceMode::Stroke => {
                surface.stroke_path(&path, &Paint::Solid(style.line_color), &stroke);
            }
            TraceMode::Fill => {
                surface.fill_path(&path, &fill(0.75));
            }
            TraceMode::FillAndStroke => {
                surface.fill_path(&path, &fill(0.5));
                surface.stroke_path(&path, &Paint::Solid(style.line_color), &stroke);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DbRange, Resolution};
    use crate::render::PlotColor;

    fn config() -> PlotConfiguration {
        PlotConfiguration::new(100.0, 50.0, 1_000.0).unwrap()
    }

    fn frame_bytes(surface: &PlotSurface) -> Vec<u8> {
        surface.present().as_bytes().to_vec()
    }

    #[test]
    fn test_fresh_plot_draws_nothing_inside() {
        let (mut plotter, _feed) = LevelPlotter::new(config(), LevelStyle::default()).unwrap();
        let mut surface = PlotSurface::new(100.0, 50.0, 1.0).unwrap();
        plotter.render(&mut surface, 1.0).unwrap();
        // The sentinel keeps the polygon below the bottom edge
        assert!(surface.present().is_blank());
    }

    #[test]
    fn test_render_is_idempotent() {
        let (mut plotter, mut feed) = LevelPlotter::new(config(), LevelStyle::default()).unwrap();
        let mut surface = PlotSurface::new(100.0, 50.0, 1.0).unwrap();
        plotter.render(&mut surface, 1.0).unwrap();
        for i in 0..5_000 {
            feed.process(-((i % 30) as f64));
        }

        plotter.render(&mut surface, 1.0).unwrap();
        let first = frame_bytes(&surface);
        plotter.render(&mut surface, 1.0).unwrap();
        assert_eq!(first, frame_bytes(&surface));
        assert!(!surface.present().is_blank());
    }

    #[test]
    fn test_signal_fills_from_bottom() {
        let (mut plotter, mut feed) = LevelPlotter::new(config(), LevelStyle::default()).unwrap();
        let mut surface = PlotSurface::new(100.0, 50.0, 1.0).unwrap();
        plotter.render(&mut surface, 1.0).unwrap();

        // 5 s at 1 kHz over 50 points: 100 samples per point
        for _ in 0..50 * 100 {
            feed.process(-15.0);
        }
        plotter.render(&mut surface, 1.0).unwrap();
        let frame = surface.present();
        assert!(frame.pixel_argb(50, 45).unwrap() >> 24 > 0);
        assert_eq!(frame.pixel_argb(50, 5).unwrap() >> 24, 0);
    }

    fn mode_style(mode: TraceMode) -> LevelStyle {
        LevelStyle {
            fill_color: PlotColor::rgba(1.0, 0.0, 0.0, 1.0),
            line_color: PlotColor::WHITE,
            mode,
            anti_alias: false,
            ..LevelStyle::default()
        }
    }

    /// Column 50 after a steady -15 dB signal, which sits at y = 25
    fn steady_column(mode: TraceMode) -> Vec<u32> {
        let (mut plotter, mut feed) = LevelPlotter::new(config(), mode_style(mode)).unwrap();
        let mut surface = PlotSurface::new(100.0, 50.0, 1.0).unwrap();
        for _ in 0..50 * 100 {
            feed.process(-15.0);
        }
        plotter.render(&mut surface, 1.0).unwrap();
        let frame = surface.present();
        (0..50).map(|y| frame.pixel_argb(50, y).unwrap()).collect()
    }

    #[test]
    fn test_stroke_mode_leaves_interior_empty() {
        let column = steady_column(TraceMode::Stroke);
        assert_eq!(column[25], 0xffff_ffff);
        assert_eq!(column[40] >> 24, 0);
        assert_eq!(column[10] >> 24, 0);
        assert!(!column.contains(&0xffff_0000));
    }

    #[test]
    fn test_fill_mode_draws_no_line() {
        let column = steady_column(TraceMode::Fill);
        assert_eq!(column[40], 0xffff_0000);
        assert_eq!(column[10] >> 24, 0);
        assert!(!column.contains(&0xffff_ffff));
    }

    #[test]
    fn test_refuses_oversized_plot() {
        let mut huge = config();
        huge.width = 1e9;
        assert!(matches!(
            LevelPlotter::new(huge, LevelStyle::default()),
            Err(ConfigError::Allocation { .. })
        ));
    }

    #[test]
    fn test_reverse_fill_marks_rebuild() {
        let (mut plotter, _feed) = LevelPlotter::new(config(), LevelStyle::default()).unwrap();
        plotter.set_gradient_fill(true);
        assert!(!plotter.rebuild_pending());
        plotter.set_reverse_fill(true);
        assert!(plotter.rebuild_pending());

        let mut surface = PlotSurface::new(100.0, 50.0, 1.0).unwrap();
        plotter.render(&mut surface, 1.0).unwrap();
        assert!(!plotter.rebuild_pending());
    }

    #[test]
    fn test_config_change_rebuilds_layout() {
        let (mut plotter, mut feed) = LevelPlotter::new(config(), LevelStyle::default()).unwrap();
        let mut surface = PlotSurface::new(100.0, 50.0, 1.0).unwrap();
        plotter.render(&mut surface, 1.0).unwrap();

        plotter.set_resolution(Resolution::Max).unwrap();
        plotter.set_db_range(DbRange::Db16).unwrap();
        assert!(plotter.rebuild_pending());
        plotter.render(&mut surface, 1.0).unwrap();
        feed.process(0.0);

        assert_eq!(plotter.reader.layout().point_count, 100);
        assert_eq!(plotter.reader.layout().db_floor, -16.0);
        assert_eq!(feed.writer.layout().point_count, 100);
    }

    #[test]
    fn test_dpi_change_reallocates_surface_and_traces() {
        let (mut plotter, mut feed) = LevelPlotter::new(config(), LevelStyle::default()).unwrap();
        let mut surface = PlotSurface::new(100.0, 50.0, 1.0).unwrap();
        plotter.render(&mut surface, 1.0).unwrap();
        assert_eq!(plotter.reader.layout().point_count, 50);

        plotter.render(&mut surface, 2.0).unwrap();
        assert_eq!(surface.size(), (200, 100));
        assert_eq!(plotter.reader.layout().point_count, 100);
        assert_eq!(plotter.reader.layout().height, 100.0);

        feed.process(0.0);
        assert_eq!(feed.writer.layout().point_count, 100);
    }

    #[test]
    fn test_refuses_bad_configuration() {
        let mut bad = config();
        bad.time_scale_secs = -1.0;
        assert!(LevelPlotter::new(bad.clone(), LevelStyle::default()).is_err());

        let (mut plotter, _feed) = LevelPlotter::new(config(), LevelStyle::default()).unwrap();
        assert_eq!(plotter.set_config(bad), Err(ConfigError::InvalidTimeScale(-1.0)));
        assert_eq!(plotter.config().time_scale_secs, 5.0);
        assert!(!plotter.rebuild_pending());
    }

    #[test]
    fn test_render_rejects_bad_scale() {
        let (mut plotter, _feed) = LevelPlotter::new(config(), LevelStyle::default()).unwrap();
        let mut surface = PlotSurface::new(100.0, 50.0, 1.0).unwrap();
        assert_eq!(
            plotter.render(&mut surface, 0.0),
            Err(ConfigError::InvalidScale(0.0))
        );
    }
}
