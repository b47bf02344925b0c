//! Geometry and paint types for the plot surface
//!
//! These are thin, plot-oriented wrappers over the rasterizer's own types,
//! so plotters can build and inspect geometry without touching tiny-skia.

use serde::{Deserialize, Serialize};
use tiny_skia::{
    Color, GradientStop, LineCap, LineJoin, LinearGradient, PathBuilder, Point, Shader,
    SpreadMode, Stroke, StrokeDash, Transform,
};

/// A point in surface pixels
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlotPoint {
    pub x: f32,
    pub y: f32,
}

impl PlotPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// RGBA color with straight (non-premultiplied) alpha, components in `[0, 1]`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlotColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl PlotColor {
    pub const TRANSPARENT: PlotColor = PlotColor::rgba(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: PlotColor = PlotColor::rgba(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: PlotColor = PlotColor::rgba(1.0, 1.0, 1.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::rgba(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        )
    }

    /// Same color with a different alpha
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub(crate) fn to_skia(self) -> Color {
        Color::from_rgba(
            self.r.clamp(0.0, 1.0),
            self.g.clamp(0.0, 1.0),
            self.b.clamp(0.0, 1.0),
            self.a.clamp(0.0, 1.0),
        )
        .unwrap_or(Color::TRANSPARENT)
    }
}

/// One drawing command of a [`PlotPath`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCommand {
    MoveTo(PlotPoint),
    LineTo(PlotPoint),
    QuadTo { control: PlotPoint, to: PlotPoint },
    Close,
}

/// An ordered list of path commands
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlotPath {
    commands: Vec<PathCommand>,
}

impl PlotPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            commands: Vec::with_capacity(capacity),
        }
    }

    pub fn move_to(&mut self, x: f32, y: f32) -> &mut Self {
        self.commands.push(PathCommand::MoveTo(PlotPoint::new(x, y)));
        self
    }

    pub fn line_to(&mut self, x: f32, y: f32) -> &mut Self {
        self.commands.push(PathCommand::LineTo(PlotPoint::new(x, y)));
        self
    }

    pub fn quad_to(&mut self, control: PlotPoint, to: PlotPoint) -> &mut Self {
        self.commands.push(PathCommand::QuadTo { control, to });
        self
    }

    pub fn close(&mut self) -> &mut Self {
        self.commands.push(PathCommand::Close);
        self
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Number of line and curve segments
    pub fn segment_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, PathCommand::LineTo(_) | PathCommand::QuadTo { .. }))
            .count()
    }

    /// Whether the path contains a Bézier segment
    pub fn has_curve(&self) -> bool {
        self.commands
            .iter()
            .any(|c| matches!(c, PathCommand::QuadTo { .. }))
    }

    /// Convert for the rasterizer; `None` for empty or degenerate paths
    pub(crate) fn to_skia(&self) -> Option<tiny_skia::Path> {
        let mut builder = PathBuilder::with_capacity(self.commands.len(), self.commands.len());
        for command in &self.commands {
            match *command {
                PathCommand::MoveTo(p) => builder.move_to(p.x, p.y),
                PathCommand::LineTo(p) => builder.line_to(p.x, p.y),
                PathCommand::QuadTo { control, to } => {
                    builder.quad_to(control.x, control.y, to.x, to.y)
                }
                PathCommand::Close => builder.close(),
            }
        }
        builder.finish()
    }
}

/// A gradient color stop; `offset` runs from 0 at the start point to 1 at the end point
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorStop {
    pub offset: f32,
    pub color: PlotColor,
}

impl ColorStop {
    pub fn new(offset: f32, color: PlotColor) -> Self {
        Self { offset, color }
    }
}

/// How a fill or stroke is colored
#[derive(Clone, Debug, PartialEq)]
pub enum Paint {
    Solid(PlotColor),
    /// Two-stop linear gradient between `start` and `end`, padded beyond them
    Linear {
        start: PlotPoint,
        end: PlotPoint,
        stops: [ColorStop; 2],
    },
}

impl Paint {
    /// Gradient running from the top edge (y = 0) down to `height`
    pub fn vertical(height: f32, first: ColorStop, second: ColorStop) -> Self {
        Paint::Linear {
            start: PlotPoint::new(0.0, 0.0),
            end: PlotPoint::new(0.0, height),
            stops: [first, second],
        }
    }

    pub(crate) fn to_skia(&self, anti_alias: bool) -> tiny_skia::Paint<'static> {
        let shader = match self {
            Paint::Solid(color) => Shader::SolidColor(color.to_skia()),
            Paint::Linear { start, end, stops } => LinearGradient::new(
                Point::from_xy(start.x, start.y),
                Point::from_xy(end.x, end.y),
                stops
                    .iter()
                    .map(|s| GradientStop::new(s.offset, s.color.to_skia()))
                    .collect(),
                SpreadMode::Pad,
                Transform::identity(),
            )
            // Degenerate gradients (start == end) fall back to the first stop
            .unwrap_or(Shader::SolidColor(stops[0].color.to_skia())),
        };

        let mut paint = tiny_skia::Paint::default();
        paint.shader = shader;
        paint.anti_alias = anti_alias;
        paint
    }
}

/// Stroke geometry
#[derive(Clone, Debug, PartialEq)]
pub struct StrokeStyle {
    /// Line width in surface pixels
    pub width: f32,
    /// Alternating on/off lengths; must have an even number of entries
    pub dash: Option<Vec<f32>>,
    /// Phase into the dash pattern
    pub dash_offset: f32,
}

impl StrokeStyle {
    pub fn solid(width: f32) -> Self {
        Self {
            width,
            dash: None,
            dash_offset: 0.0,
        }
    }

    pub fn dashed(width: f32, pattern: Vec<f32>, offset: f32) -> Self {
        Self {
            width,
            dash: Some(pattern),
            dash_offset: offset,
        }
    }

    pub(crate) fn to_skia(&self) -> Stroke {
        Stroke {
            width: self.width.max(0.0),
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            dash: self
                .dash
                .as_ref()
                .and_then(|pattern| StrokeDash::new(pattern.clone(), self.dash_offset)),
            ..Stroke::default()
        }
    }
}
