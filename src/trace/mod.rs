//! Trace module - decimated scrolling traces
//!
//! This module provides:
//! - `ScrollingTrace`, the per-sample decimation buffer
//! - a lock-free writer/reader pair that moves trace snapshots from the
//!   audio thread to the UI thread

mod buffer;
mod handoff;

pub use buffer::{ScrollingTrace, TraceLayout};
pub use handoff::{trace_channel, TraceReader, TraceSnapshot, TraceWriter};
