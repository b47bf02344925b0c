//! Pixel surface the plots draw into
//!
//! A [`PlotSurface`] owns a premultiplied RGBA pixel buffer sized to the
//! widget's logical rectangle times the display scale factor.
//!
//! ## Resizing
//!
//! When the physical size changes the old buffer is dropped and a new one
//! allocated. Nothing drawn before survives, so callers re-layout their
//! traces in the same step (the plotters do this in `ensure_size`).

use tiny_skia::{FillRule, Pixmap, PixmapRef, PremultipliedColorU8, Rect, Transform};

use super::path::{Paint, PlotPath, StrokeStyle};
use crate::error::ConfigError;

/// Largest pixel buffer a surface will allocate, in bytes
const MAX_SURFACE_BYTES: u64 = i32::MAX as u64;

/// Whether a `width` x `height` buffer is within the allocation limit
pub(crate) fn fits_surface(width: u32, height: u32) -> bool {
    width as u64 * height as u64 * 4 <= MAX_SURFACE_BYTES
}

/// Physical pixel size of a logical rectangle at a display scale
pub fn physical_size(width: f64, height: f64, scale: f64) -> (u32, u32) {
    let px = |v: f64| {
        let v = (v * scale).ceil();
        if v.is_finite() && v > 0.0 {
            v.min(u32::MAX as f64) as u32
        } else {
            0
        }
    };
    (px(width), px(height))
}

/// Owned drawing target for one plot widget
pub struct PlotSurface {
    pixmap: Pixmap,
    scale: f64,
    anti_alias: bool,
}

impl PlotSurface {
    /// Allocate a surface for a `width` x `height` logical rectangle
    pub fn new(width: f64, height: f64, scale: f64) -> Result<Self, ConfigError> {
        Ok(Self {
            pixmap: allocate(width, height, scale)?,
            scale,
            anti_alias: true,
        })
    }

    /// Make sure the buffer matches the logical size at `scale`
    ///
    /// Returns `true` when the buffer was reallocated. A reallocation
    /// discards everything drawn so far.
    pub fn ensure_size(&mut self, width: f64, height: f64, scale: f64) -> Result<bool, ConfigError> {
        let (w, h) = checked_size(width, height, scale)?;
        self.scale = scale;
        if (w, h) == self.size() {
            return Ok(false);
        }

        self.pixmap = Pixmap::new(w, h).ok_or(ConfigError::Allocation { width: w, height: h })?;
        log::debug!("plot surface reallocated to {}x{} (scale {})", w, h, scale);
        Ok(true)
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Physical size in pixels
    pub fn size(&self) -> (u32, u32) {
        (self.pixmap.width(), self.pixmap.height())
    }

    /// Display scale the buffer was last sized for
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn set_anti_alias(&mut self, enabled: bool) {
        self.anti_alias = enabled;
    }

    pub fn anti_alias(&self) -> bool {
        self.anti_alias
    }

    /// Clear to fully transparent
    pub fn begin_frame(&mut self) {
        self.pixmap.fill(tiny_skia::Color::TRANSPARENT);
    }

    pub fn fill_path(&mut self, path: &PlotPath, paint: &Paint) {
        if let Some(path) = path.to_skia() {
            self.pixmap.fill_path(
                &path,
                &paint.to_skia(self.anti_alias),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    }

    pub fn stroke_path(&mut self, path: &PlotPath, paint: &Paint, stroke: &StrokeStyle) {
        if let Some(path) = path.to_skia() {
            self.pixmap.stroke_path(
                &path,
                &paint.to_skia(self.anti_alias),
                &stroke.to_skia(),
                Transform::identity(),
                None,
            );
        }
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, paint: &Paint) {
        if let Some(rect) = Rect::from_xywh(x, y, width, height) {
            self.pixmap
                .fill_rect(rect, &paint.to_skia(self.anti_alias), Transform::identity(), None);
        }
    }

    /// Read-only view of the finished frame for the host to blit
    pub fn present(&self) -> PixelFrame<'_> {
        PixelFrame {
            pixmap: self.pixmap.as_ref(),
        }
    }
}

fn checked_size(width: f64, height: f64, scale: f64) -> Result<(u32, u32), ConfigError> {
    if !(scale.is_finite() && scale > 0.0) {
        return Err(ConfigError::InvalidScale(scale));
    }
    match physical_size(width, height, scale) {
        (0, _) | (_, 0) => Err(ConfigError::EmptySurface { width, height }),
        (w, h) if !fits_surface(w, h) => Err(ConfigError::Allocation { width: w, height: h }),
        size => Ok(size),
    }
}

fn allocate(width: f64, height: f64, scale: f64) -> Result<Pixmap, ConfigError> {
    let (w, h) = checked_size(width, height, scale)?;
    Pixmap::new(w, h).ok_or(ConfigError::Allocation { width: w, height: h })
}

/// A rendered frame
///
/// Row-major, premultiplied alpha, one 32-bit RGBA word per pixel.
#[derive(Clone, Copy)]
pub struct PixelFrame<'a> {
    pixmap: PixmapRef<'a>,
}

impl<'a> PixelFrame<'a> {
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// One premultiplied RGBA word per pixel
    pub fn pixels(&self) -> &'a [PremultipliedColorU8] {
        self.pixmap.pixels()
    }

    /// Raw premultiplied RGBA bytes, 4 per pixel
    pub fn as_bytes(&self) -> &'a [u8] {
        self.pixmap.data()
    }

    /// Pixel at `(x, y)` packed as premultiplied `0xAARRGGBB`
    pub fn pixel_argb(&self, x: u32, y: u32) -> Option<u32> {
        self.pixmap.pixel(x, y).map(|p| {
            (p.alpha() as u32) << 24 | (p.red() as u32) << 16 | (p.green() as u32) << 8 | p.blue() as u32
        })
    }

    /// Whether every pixel is fully transparent
    pub fn is_blank(&self) -> bool {
        self.pixels().iter().all(|p| p.alpha() == 0)
    }

    /// Straight-alpha copy for saving or further processing
    pub fn to_rgba_image(&self) -> image::RgbaImage {
        let mut data = Vec::with_capacity(self.as_bytes().len());
        for pixel in self.pixels() {
            let c = pixel.demultiply();
            data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        image::RgbaImage::from_raw(self.width(), self.height(), data)
            .unwrap_or_else(|| image::RgbaImage::new(self.width(), self.height()))
    }
}
