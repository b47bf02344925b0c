//! Plot configuration
//!
//! A [`PlotConfiguration`] describes everything that shapes a scrolling
//! trace: the logical widget size, the time span shown, the sample rate of
//! the incoming signal, the horizontal resolution and the dB window.
//!
//! Changing any of these on a live plotter discards the trace history on
//! the next render; the new layout starts blank.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::render::{fits_surface, physical_size};
use crate::trace::TraceLayout;

/// Horizontal resolution: how many surface pixels share one plotted point
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    Low,
    Mid,
    #[default]
    High,
    Max,
}

impl Resolution {
    pub fn all() -> &'static [Resolution] {
        &[Resolution::Low, Resolution::Mid, Resolution::High, Resolution::Max]
    }

    /// Surface pixels per plotted point
    pub fn divisor(self) -> u32 {
        match self {
            Resolution::Low => 8,
            Resolution::Mid => 4,
            Resolution::High => 2,
            Resolution::Max => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Resolution::Low => "Low",
            Resolution::Mid => "Mid",
            Resolution::High => "High",
            Resolution::Max => "Max",
        }
    }
}

/// Lower end of the plotted dB window
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DbRange {
    Db16,
    #[default]
    Db32,
    Db48,
}

impl DbRange {
    pub fn all() -> &'static [DbRange] {
        &[DbRange::Db16, DbRange::Db32, DbRange::Db48]
    }

    /// The dB value mapped to the bottom edge of the plot
    pub fn floor_db(self) -> f64 {
        match self {
            DbRange::Db16 => -16.0,
            DbRange::Db32 => -32.0,
            DbRange::Db48 => -48.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DbRange::Db16 => "-16 dB",
            DbRange::Db32 => "-32 dB",
            DbRange::Db48 => "-48 dB",
        }
    }
}

/// Default time span of a scrolling trace, in seconds
pub const DEFAULT_TIME_SCALE: f64 = 5.0;

/// Default dB shown above 0 dB
pub const DEFAULT_HEADROOM_DB: f64 = 2.0;

/// Shape of a plot and of the traces feeding it
#[derive(Clone, Debug, PartialEq)]
pub struct PlotConfiguration {
    /// Logical widget width (device-independent pixels)
    pub width: f64,
    /// Logical widget height (device-independent pixels)
    pub height: f64,
    /// Seconds of signal visible across the full width
    pub time_scale_secs: f64,
    /// Sample rate of the values pushed into `process`
    pub sample_rate: f64,
    pub resolution: Resolution,
    pub db_range: DbRange,
    pub headroom_db: f64,
    /// Display scale factor (1.0 normal, 2.0 on high-DPI displays)
    pub dpi_scale: f64,
}

impl PlotConfiguration {
    /// Create a configuration with the default time scale, resolution and
    /// dB window
    pub fn new(width: f64, height: f64, sample_rate: f64) -> Result<Self, ConfigError> {
        let config = Self {
            width,
            height,
            time_scale_secs: DEFAULT_TIME_SCALE,
            sample_rate,
            resolution: Resolution::default(),
            db_range: DbRange::default(),
            headroom_db: DEFAULT_HEADROOM_DB,
            dpi_scale: 1.0,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check every field; a plotter refuses configurations that fail here
    pub fn validate(&self) -> Result<(), ConfigError> {
        let empty = |v: f64| !(v.is_finite() && v > 0.0);
        if empty(self.width) || empty(self.height) {
            return Err(ConfigError::EmptySurface {
                width: self.width,
                height: self.height,
            });
        }
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(ConfigError::InvalidSampleRate(self.sample_rate));
        }
        if !(self.time_scale_secs.is_finite() && self.time_scale_secs > 0.0) {
            return Err(ConfigError::InvalidTimeScale(self.time_scale_secs));
        }
        if !(self.dpi_scale.is_finite() && self.dpi_scale > 0.0) {
            return Err(ConfigError::InvalidScale(self.dpi_scale));
        }
        // Traces are sized from this, so refuse before anything is allocated
        let (width, height) = physical_size(self.width, self.height, self.dpi_scale);
        if !fits_surface(width, height) {
            return Err(ConfigError::Allocation { width, height });
        }
        let floor_db = self.db_floor();
        if !(self.headroom_db.is_finite() && self.headroom_db > floor_db) {
            return Err(ConfigError::DegenerateRange {
                floor_db,
                headroom_db: self.headroom_db,
            });
        }
        Ok(())
    }

    pub fn db_floor(&self) -> f64 {
        self.db_range.floor_db()
    }

    /// Number of plotted points for a surface `surface_width_px` pixels wide
    pub fn point_count(&self, surface_width_px: u32) -> usize {
        ((surface_width_px / self.resolution.divisor()) as usize).max(1)
    }

    /// Raw samples averaged into one plotted point
    pub fn decimation_factor(&self, point_count: usize) -> usize {
        let samples = self.time_scale_secs * self.sample_rate / point_count.max(1) as f64;
        (samples.round() as usize).max(1)
    }

    /// Trace layout for a surface of the given physical size
    pub fn layout(&self, surface_width_px: u32, surface_height_px: u32) -> TraceLayout {
        let point_count = self.point_count(surface_width_px);
        TraceLayout {
            point_count,
            decimation: self.decimation_factor(point_count),
            db_floor: self.db_floor(),
            headroom_db: self.headroom_db,
            height: surface_height_px as f64,
        }
    }

    /// Whether switching to `other` invalidates existing traces
    pub(crate) fn changes_traces(&self, other: &PlotConfiguration) -> bool {
        self.width != other.width
            || self.height != other.height
            || self.time_scale_secs != other.time_scale_secs
            || self.sample_rate != other.sample_rate
            || self.resolution != other.resolution
            || self.db_range != other.db_range
            || self.headroom_db != other.headroom_db
            || self.dpi_scale != other.dpi_scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PlotConfiguration::new(400.0, 200.0, 48_000.0).unwrap();
        assert_eq!(config.resolution, Resolution::High);
        assert_eq!(config.db_floor(), -32.0);
        assert_eq!(config.headroom_db, 2.0);
        assert_eq!(config.time_scale_secs, 5.0);
    }

    #[test]
    fn test_rejects_bad_sample_rate() {
        assert_eq!(
            PlotConfiguration::new(400.0, 200.0, 0.0),
            Err(ConfigError::InvalidSampleRate(0.0))
        );
        assert!(PlotConfiguration::new(400.0, 200.0, -44_100.0).is_err());
        assert!(PlotConfiguration::new(400.0, 200.0, f64::NAN).is_err());
    }

    #[test]
    fn test_rejects_empty_surface() {
        assert!(matches!(
            PlotConfiguration::new(0.0, 200.0, 48_000.0),
            Err(ConfigError::EmptySurface { .. })
        ));
    }

    #[test]
    fn test_rejects_degenerate_range() {
        let mut config = PlotConfiguration::new(400.0, 200.0, 48_000.0).unwrap();
        config.headroom_db = -32.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DegenerateRange { .. })
        ));
    }

    #[test]
    fn test_rejects_oversized_surface() {
        assert_eq!(
            PlotConfiguration::new(1e9, 200.0, 48_000.0),
            Err(ConfigError::Allocation {
                width: 1_000_000_000,
                height: 200
            })
        );

        let mut config = PlotConfiguration::new(20_000.0, 20_000.0, 48_000.0).unwrap();
        config.dpi_scale = 2.0;
        assert!(matches!(config.validate(), Err(ConfigError::Allocation { .. })));
    }

    #[test]
    fn test_point_count_per_resolution() {
        let mut config = PlotConfiguration::new(400.0, 200.0, 48_000.0).unwrap();
        let expected = [(Resolution::Low, 50), (Resolution::Mid, 100), (Resolution::High, 200), (Resolution::Max, 400)];
        for (resolution, count) in expected {
            config.resolution = resolution;
            assert_eq!(config.point_count(400), count);
        }
    }

    #[test]
    fn test_point_count_never_zero() {
        let mut config = PlotConfiguration::new(3.0, 3.0, 48_000.0).unwrap();
        config.resolution = Resolution::Low;
        assert_eq!(config.point_count(3), 1);
    }

    #[test]
    fn test_decimation_factor() {
        let mut config = PlotConfiguration::new(400.0, 200.0, 44_100.0).unwrap();
        config.db_range = DbRange::Db48;
        let points = config.point_count(400);
        assert_eq!(points, 200);
        assert_eq!(config.decimation_factor(points), (5.0_f64 * 44_100.0 / 200.0).round() as usize);

        config.time_scale_secs = 1e-9;
        assert_eq!(config.decimation_factor(points), 1);
    }

    #[test]
    fn test_layout() {
        let config = PlotConfiguration::new(400.0, 200.0, 48_000.0).unwrap();
        let layout = config.layout(800, 400);
        assert_eq!(layout.point_count, 400);
        assert_eq!(layout.decimation, 600);
        assert_eq!(layout.height, 400.0);
        assert_eq!(layout.db_floor, -32.0);
    }
}
