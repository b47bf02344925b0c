//! Style settings for each plotter
//!
//! Styles only affect how a frame is drawn, never the trace layout, so they
//! can be swapped on a live plotter without losing history. All of them are
//! serializable so a host can persist them alongside its own settings.

use serde::{Deserialize, Serialize};

use crate::render::{ColorStop, Paint, PlotColor};

/// Default line weight in logical pixels
pub const DEFAULT_LINE_WEIGHT: f32 = 2.0;

/// How a trace polygon is drawn
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraceMode {
    Stroke,
    Fill,
    #[default]
    FillAndStroke,
}

impl TraceMode {
    pub fn all() -> &'static [TraceMode] {
        &[TraceMode::Stroke, TraceMode::Fill, TraceMode::FillAndStroke]
    }

    pub fn name(self) -> &'static str {
        match self {
            TraceMode::Stroke => "Line",
            TraceMode::Fill => "Fill",
            TraceMode::FillAndStroke => "Fill + Line",
        }
    }

    pub fn fills(self) -> bool {
        matches!(self, TraceMode::Fill | TraceMode::FillAndStroke)
    }

    pub fn strokes(self) -> bool {
        matches!(self, TraceMode::Stroke | TraceMode::FillAndStroke)
    }
}

/// Vertical fade from `color` at `start` down to a translucent copy at the bottom edge
pub(crate) fn fade_to_bottom(color: PlotColor, height: f32, start: f32) -> Paint {
    Paint::vertical(
        height,
        ColorStop::new(start, color),
        ColorStop::new(1.0, color.with_alpha(0.3)),
    )
}

/// Display settings for a [`LevelPlotter`](super::LevelPlotter)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelStyle {
    pub fill_color: PlotColor,
    pub line_color: PlotColor,

    /// Line thickness in logical pixels
    pub line_weight: f32,

    pub mode: TraceMode,

    /// Anchor the fill to the top edge instead of the bottom
    pub reverse_fill: bool,

    /// Fade the fill toward the bottom edge
    pub gradient_fill: bool,

    pub anti_alias: bool,
}

impl Default for LevelStyle {
    fn default() -> Self {
        Self {
            fill_color: PlotColor::rgba(0.25, 0.55, 0.9, 0.6),
            line_color: PlotColor::rgba(0.45, 0.75, 1.0, 1.0),
            line_weight: DEFAULT_LINE_WEIGHT,
            mode: TraceMode::FillAndStroke,
            reverse_fill: false,
            gradient_fill: false,
            anti_alias: true,
        }
    }
}

/// Display settings for a [`GainReductionPlotter`](super::GainReductionPlotter)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GainReductionStyle {
    /// Input level fill, drawn first
    pub pre_fill_color: PlotColor,
    /// Output level fill
    pub post_fill_color: PlotColor,
    /// Output level outline
    pub post_line_color: PlotColor,
    /// Gain reduction line, drawn on top
    pub reduction_line_color: PlotColor,

    /// Line thickness in logical pixels; the reduction line is drawn twice as thick
    pub line_weight: f32,

    /// Fade the output fill toward the bottom edge
    pub gradient_fill: bool,

    pub anti_alias: bool,
}

impl Default for GainReductionStyle {
    fn default() -> Self {
        Self {
            pre_fill_color: PlotColor::rgba(0.55, 0.55, 0.6, 0.35),
            post_fill_color: PlotColor::rgba(0.2, 0.6, 0.85, 0.7),
            post_line_color: PlotColor::rgba(0.5, 0.85, 1.0, 1.0),
            reduction_line_color: PlotColor::rgba(1.0, 0.35, 0.25, 1.0),
            line_weight: DEFAULT_LINE_WEIGHT,
            gradient_fill: true,
            anti_alias: true,
        }
    }
}

/// Display settings for a [`CompressorCurvePlotter`](super::CompressorCurvePlotter)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveStyle {
    pub line_color: PlotColor,

    /// Fill painted behind the curve, if any
    pub background: Option<PlotColor>,

    /// Line thickness in logical pixels
    pub line_weight: f32,

    pub anti_alias: bool,
}

impl Default for CurveStyle {
    fn default() -> Self {
        Self {
            line_color: PlotColor::rgba(1.0, 0.8, 0.3, 1.0),
            background: None,
            line_weight: DEFAULT_LINE_WEIGHT,
            anti_alias: true,
        }
    }
}

/// Display settings for a [`ThresholdOverlay`](super::ThresholdOverlay)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdStyle {
    pub line_color: PlotColor,

    /// Color of the reduction zone; its alpha fades from 0.4 to 0
    pub zone_color: PlotColor,

    /// Line thickness in logical pixels
    pub line_weight: f32,

    pub anti_alias: bool,
}

impl Default for ThresholdStyle {
    fn default() -> Self {
        Self {
            line_color: PlotColor::rgba(0.9, 0.9, 0.9, 0.8),
            zone_color: PlotColor::rgba(0.1, 0.1, 0.1, 1.0),
            line_weight: DEFAULT_LINE_WEIGHT,
            anti_alias: true,
        }
    }
}

/// Display settings for a [`ValuePlotter`](super::ValuePlotter)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueStyle {
    pub fill_color: PlotColor,
    pub line_color: PlotColor,
    pub line_weight: f32,
    pub mode: TraceMode,
    pub anti_alias: bool,
}

impl Default for ValueStyle {
    fn default() -> Self {
        Self {
            fill_color: PlotColor::rgba(0.3, 0.8, 0.5, 0.5),
            line_color: PlotColor::rgba(0.4, 1.0, 0.6, 1.0),
            line_weight: DEFAULT_LINE_WEIGHT,
            mode: TraceMode::Stroke,
            anti_alias: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_mode_flags() {
        assert!(TraceMode::Stroke.strokes() && !TraceMode::Stroke.fills());
        assert!(TraceMode::Fill.fills() && !TraceMode::Fill.strokes());
        assert!(TraceMode::FillAndStroke.fills() && TraceMode::FillAndStroke.strokes());
    }

    #[test]
    fn test_style_json_roundtrip_with_missing_fields() {
        let style: LevelStyle = serde_json::from_str(r#"{"reverse_fill": true}"#).unwrap();
        assert!(style.reverse_fill);
        assert_eq!(style.line_weight, DEFAULT_LINE_WEIGHT);

        let style = GainReductionStyle::default();
        let json = serde_json::to_string(&style).unwrap();
        let back: GainReductionStyle = serde_json::from_str(&json).unwrap();
        assert_eq!(style, back);
    }

    #[test]
    fn test_fade_gradient_stops() {
        let color = PlotColor::rgba(1.0, 0.0, 0.0, 0.8);
        match fade_to_bottom(color, 100.0, 0.75) {
            Paint::Linear { end, stops, .. } => {
                assert_eq!(end.y, 100.0);
                assert_eq!(stops[0].offset, 0.75);
                assert_eq!(stops[0].color, color);
                assert_eq!(stops[1].color.a, 0.3);
            }
            other => panic!("expected a gradient, got {other:?}"),
        }
    }
}
