//! Audio module - handles audio input and level detection
//!
//! This module provides:
//! - Peak detection and a soft-knee gain computer
//! - Audio engine for cpal integration

mod detector;
mod engine;

pub use engine::AudioEngine;
