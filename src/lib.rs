//! levelplot - real-time metering plots
//!
//! This crate turns audio-rate scalar readouts (levels, gain reduction)
//! into scrolling traces and rasterizes them, together with static
//! compressor curves and threshold guides, into a pixel buffer that a
//! host UI can blit.
//!
//! ## Threads
//!
//! Every trace plotter comes as a pair:
//! - a *feed*, moved to the audio thread, whose `process` never blocks,
//!   allocates or frees
//! - a *plotter*, kept on the UI thread, which renders the most recently
//!   published snapshot into a [`PlotSurface`]
//!
//! ## Example
//!
//! ```no_run
//! use levelplot::{LevelPlotter, LevelStyle, PlotConfiguration, PlotSurface, Plotter};
//!
//! let config = PlotConfiguration::new(300.0, 150.0, 48_000.0).unwrap();
//! let (mut plotter, mut feed) = LevelPlotter::new(config, LevelStyle::default()).unwrap();
//! let mut surface = PlotSurface::new(300.0, 150.0, 1.0).unwrap();
//!
//! // Audio thread:
//! feed.process(-12.0);
//!
//! // UI thread:
//! plotter.render(&mut surface, 1.0).unwrap();
//! let frame = surface.present();
//! assert_eq!(frame.width(), 300);
//! ```

pub mod config;
pub mod coords;
pub mod error;
pub mod plot;
pub mod render;
pub mod trace;

pub use config::{DbRange, PlotConfiguration, Resolution};
pub use error::ConfigError;
pub use plot::{
    CompressorCurveParams, CompressorCurvePlotter, CurveGeometry, CurveStyle,
    GainReductionFeed, GainReductionPlotter, GainReductionStyle, LayerStack, LevelFeed,
    LevelPlotter, LevelStyle, PlotLayer, Plotter, ThresholdOverlay, ThresholdStyle, TraceMode,
    ValuePlotter, ValueStyle,
};
pub use render::{
    ColorStop, Paint, PathCommand, PixelFrame, PlotColor, PlotPath, PlotPoint, PlotSurface,
    StrokeStyle,
};
pub use trace::{trace_channel, ScrollingTrace, TraceLayout, TraceReader, TraceWriter};
