//! Gain reduction plot
//!
//! Three traces sharing one decimation cadence: the input level, the output
//! level and the gain reduction itself. They are drawn in a fixed order:
//! input fill, output fill, output line, then the reduction line on top,
//! hanging from the top edge.

use super::style::{fade_to_bottom, GainReductionStyle};
use super::{trace_polygon, Baseline, Plotter};
use crate::config::PlotConfiguration;
use crate::error::ConfigError;
use crate::render::{physical_size, Paint, PlotSurface, StrokeStyle};
use crate::trace::{trace_channel, TraceReader, TraceWriter};

const PRE: usize = 0;
const POST: usize = 1;
const REDUCTION: usize = 2;

fn fills(height: f32) -> [f32; 3] {
    [
        Baseline::Bottom.sentinel(height),
        Baseline::Bottom.sentinel(height),
        Baseline::Top.sentinel(height),
    ]
}

/// Audio-side half of a [`GainReductionPlotter`]
pub struct GainReductionFeed {
    writer: TraceWriter<3>,
}

impl GainReductionFeed {
    /// Push one frame of readings, all in dB
    ///
    /// `reduction` is plotted on the same dB scale as the levels, so 0 dB
    /// (no reduction) sits near the top edge and deeper reduction hangs lower.
    #[inline]
    pub fn process(&mut self, pre: f64, post: f64, reduction: f64) {
        self.writer.process([pre, post, reduction]);
    }
}

/// UI-side half of a gain reduction plot
pub struct GainReductionPlotter {
    config: PlotConfiguration,
    style: GainReductionStyle,
    reader: TraceReader<3>,
    rebuild_pending: bool,
}

impl GainReductionPlotter {
    /// Create a plotter and the feed that goes with it
    pub fn new(
        config: PlotConfiguration,
        style: GainReductionStyle,
    ) -> Result<(Self, GainReductionFeed), ConfigError> {
        config.validate()?;
        let (w, h) = physical_size(config.width, config.height, config.dpi_scale);
        let (writer, reader) = trace_channel(config.layout(w, h), fills(h as f32));

        let plotter = Self {
            config,
            style,
            reader,
            rebuild_pending: false,
        };
        Ok((plotter, GainReductionFeed { writer }))
    }

    pub fn style(&self) -> &GainReductionStyle {
        &self.style
    }

    pub fn set_style(&mut self, style: GainReductionStyle) {
        self.style = style;
    }

    pub fn set_gradient_fill(&mut self, enabled: bool) {
        self.style.gradient_fill = enabled;
    }

    pub fn set_line_weight(&mut self, weight: f32) {
        self.style.line_weight = weight;
    }

    pub fn rebuild_pending(&self) -> bool {
        self.rebuild_pending
    }
}

impl Plotter for GainReductionPlotter {
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
            self.rebuild_pending = !self.reader.rebuild(layout, fills(surface.height() as f32));
        }
        Ok(())
    }

    fn draw(&mut self, surface: &mut PlotSurface) {
        let width = surface.width() as f32;
        let height = surface.height() as f32;
        let snapshot = self.reader.snapshot();
        let pre = trace_polygon(&snapshot[PRE], width, height, Baseline::Bottom);
        let post = trace_polygon(&snapshot[POST], width, height, Baseline::Bottom);
        let reduction = trace_polygon(&snapshot[REDUCTION], width, height, Baseline::Top);

        let style = &self.style;
        let weight = style.line_weight * self.config.dpi_scale as f32;
        let post_fill = if style.gradient_fill {
            fade_to_bottom(style.post_fill_color, height, 0.5)
        } else {
            Paint::Solid(style.post_fill_color)
        };

        surface.set_anti_alias(style.anti_alias);
        surface.fill_path(&pre, &Paint::Solid(style.pre_fill_color));
        surface.fill_path(&post, &post_fill);
        surface.stroke_path(&post, &Paint::Solid(style.post_line_color), &StrokeStyle::solid(weight));
        surface.stroke_path(
            &reduction,
            &Paint::Solid(style.reduction_line_color),
            &StrokeStyle::solid(weight * 2.0),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::PlotColor;

    fn config() -> PlotConfiguration {
        PlotConfiguration::new(80.0, 40.0, 800.0).unwrap()
    }

    /// Only the reduction line, so its pixels are easy to find
    fn reduction_only() -> GainReductionStyle {
        GainReductionStyle {
            pre_fill_color: PlotColor::TRANSPARENT,
            post_fill_color: PlotColor::TRANSPARENT,
            post_line_color: PlotColor::TRANSPARENT,
            reduction_line_color: PlotColor::WHITE,
            anti_alias: false,
            ..GainReductionStyle::default()
        }
    }

    #[test]
    fn test_defaults_use_gradient() {
        assert!(GainReductionStyle::default().gradient_fill);
    }

    #[test]
    fn test_fresh_plot_is_blank() {
        let (mut plotter, _feed) = GainReductionPlotter::new(config(), GainReductionStyle::default()).unwrap();
        let mut surface = PlotSurface::new(80.0, 40.0, 1.0).unwrap();
        plotter.render(&mut surface, 1.0).unwrap();
        assert!(surface.present().is_blank());
    }

    #[test]
    fn test_lanes_stay_in_step() {
        let (mut plotter, mut feed) = GainReductionPlotter::new(config(), GainReductionStyle::default()).unwrap();
        // 5 s at 800 Hz over 40 points: 100 samples per point
        for _ in 0..100 {
            feed.process(-10.0, -14.0, -4.0);
        }
        let snapshot = plotter.reader.snapshot();
        for lane in snapshot.iter() {
            assert_eq!(lane.len(), 40);
        }
        assert!(snapshot[PRE][39] < snapshot[POST][39]);
        assert!(snapshot[REDUCTION][39] < snapshot[POST][39]);
        assert_eq!(snapshot[REDUCTION][38], -2.0);
        assert_eq!(snapshot[PRE][38], 42.0);
    }

    #[test]
    fn test_reduction_line_is_double_weight() {
        let (mut plotter, mut feed) = GainReductionPlotter::new(config(), reduction_only()).unwrap();
        let mut surface = PlotSurface::new(80.0, 40.0, 1.0).unwrap();
        plotter.render(&mut surface, 1.0).unwrap();

        // Reduction of -15 dB lands halfway down a -32..2 dB window
        for _ in 0..40 * 100 {
            feed.process(-32.0, -32.0, -15.0);
        }
        plotter.render(&mut surface, 1.0).unwrap();

        let frame = surface.present();
        let covered = (0..40)
            .filter(|&y| frame.pixel_argb(40, y).unwrap() >> 24 > 0)
            .count();
        assert_eq!(covered, 4);
        assert!(frame.pixel_argb(40, 20).unwrap() >> 24 > 0);
    }

    #[test]
    fn test_later_layers_cover_earlier_ones() {
        let style = GainReductionStyle {
            pre_fill_color: PlotColor::rgba(1.0, 0.0, 0.0, 1.0),
            post_fill_color: PlotColor::rgba(0.0, 1.0, 0.0, 1.0),
            post_line_color: PlotColor::WHITE,
            reduction_line_color: PlotColor::rgba(0.0, 0.0, 1.0, 1.0),
            gradient_fill: false,
            anti_alias: false,
            ..GainReductionStyle::default()
        };
        let (mut plotter, mut feed) = GainReductionPlotter::new(config(), style).unwrap();
        let mut surface = PlotSurface::new(80.0, 40.0, 1.0).unwrap();

        // Input and output share one polygon at y = 20; reduction sits near y = 31.8
        for _ in 0..40 * 100 {
            feed.process(-15.0, -15.0, -25.0);
        }
        plotter.render(&mut surface, 1.0).unwrap();

        let frame = surface.present();
        assert_eq!(frame.pixel_argb(40, 26), Some(0xff00_ff00));
        assert_eq!(frame.pixel_argb(40, 20), Some(0xffff_ffff));
        assert_eq!(frame.pixel_argb(40, 31), Some(0xff00_00ff));
        assert_eq!(frame.pixel_argb(40, 10).unwrap() >> 24, 0);
        let input_visible = (0..40).any(|y| frame.pixel_argb(40, y) == Some(0xffff_0000));
        assert!(!input_visible);
    }

    #[test]
    fn test_render_is_idempotent() {
        let (mut plotter, mut feed) = GainReductionPlotter::new(config(), GainReductionStyle::default()).unwrap();
        let mut surface = PlotSurface::new(80.0, 40.0, 1.0).unwrap();
        for i in 0..3_000 {
            let level = -((i % 25) as f64);
            feed.process(level, level - 3.0, -3.0);
        }
        plotter.render(&mut surface, 1.0).unwrap();
        let first = surface.present().as_bytes().to_vec();
        plotter.render(&mut surface, 1.0).unwrap();
        assert_eq!(first, surface.present().as_bytes());
    }

    #[test]
    fn test_dpi_change_rebuilds_all_lanes() {
        let (mut plotter, mut feed) = GainReductionPlotter::new(config(), GainReductionStyle::default()).unwrap();
        let mut surface = PlotSurface::new(80.0, 40.0, 1.0).unwrap();
        plotter.render(&mut surface, 2.0).unwrap();
        assert_eq!(surface.size(), (160, 80));

        let snapshot = plotter.reader.snapshot();
        assert_eq!(snapshot[PRE], vec![82.0; 80]);
        assert_eq!(snapshot[REDUCTION], vec![-2.0; 80]);

        feed.process(0.0, 0.0, 0.0);
        assert_eq!(feed.writer.layout().point_count, 80);
    }
}
