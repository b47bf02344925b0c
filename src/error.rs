//! Configuration errors
//!
//! Everything that can go wrong in this crate is caught when a plot is
//! configured or resized. The audio-side `process` calls have no error path.

use thiserror::Error;

/// Errors reported when a plot, surface or curve is configured
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("sample rate must be positive and finite, got {0}")]
    InvalidSampleRate(f64),

    #[error("time scale must be positive and finite, got {0} s")]
    InvalidTimeScale(f64),

    #[error("display scale factor must be positive and finite, got {0}")]
    InvalidScale(f64),

    #[error("plot area must not be empty, got {width}x{height}")]
    EmptySurface { width: f64, height: f64 },

    #[error("dB range is degenerate: floor {floor_db} dB must be below headroom {headroom_db} dB")]
    DegenerateRange { floor_db: f64, headroom_db: f64 },

    #[error("level must be a finite dB value, got {0}")]
    InvalidLevel(f64),

    #[error("compressor ratio must be positive and finite, got {0}")]
    InvalidRatio(f64),

    #[error("value range must be positive and finite, got {0}")]
    InvalidValueRange(f64),

    #[error("could not allocate a {width}x{height} pixel buffer")]
    Allocation { width: u32, height: u32 },
}
