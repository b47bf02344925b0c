//! Audio engine - handles cpal audio input
//!
//! Opens the default input device and drives a gain reduction plot from
//! it. The plot's feed and the level detector live inside the input
//! callback; the UI only hands over compressor settings through a shared
//! lock that the callback polls without blocking.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};
use std::sync::{Arc, RwLock};
use thiserror::Error;

use levelplot::{
    CompressorCurveParams, ConfigError, GainReductionPlotter, GainReductionStyle, PlotConfiguration,
};

use super::detector::Meter;

/// Errors raised while opening the input stream
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("no input device found")]
    NoInputDevice,

    #[error("could not read the input configuration: {0}")]
    Config(#[from] cpal::DefaultStreamConfigError),

    #[error("could not build the input stream: {0}")]
    Build(#[from] cpal::BuildStreamError),

    #[error("could not start the input stream: {0}")]
    Play(#[from] cpal::PlayStreamError),

    #[error("unsupported sample format: {0:?}")]
    UnsupportedFormat(cpal::SampleFormat),

    #[error("invalid plot configuration: {0}")]
    Plot(#[from] ConfigError),
}

/// Average one interleaved frame down to a single f32 sample
fn mix_to_mono<T>(frame: &[T]) -> f32
where
    T: SizedSample,
    f32: FromSample<T>,
{
    if frame.is_empty() {
        return 0.0;
    }
    let sum: f32 = frame.iter().map(|s| f32::from_sample(*s)).sum();
    sum / frame.len() as f32
}

/// Build an input stream for one sample format
fn build_input_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut meter: Meter,
    params: Arc<RwLock<CompressorCurveParams>>,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let channels = (config.channels as usize).max(1);
    device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            // Keep the previous settings if the UI is writing right now
            if let Ok(params) = params.try_read() {
                meter.set_params(&params);
            }
            for frame in data.chunks(channels) {
                meter.process(mix_to_mono(frame));
            }
        },
        |err| log::error!("Audio stream error: {}", err),
        None,
    )
}

/// Input engine feeding a gain reduction plot
pub struct AudioEngine {
    /// The input stream (kept alive to continue capture)
    stream: Option<cpal::Stream>,

    /// Compressor settings shared with the input callback
    params: Arc<RwLock<CompressorCurveParams>>,

    /// Status message
    pub status: String,

    /// Sample rate of the input device
    sample_rate: f64,
}

impl AudioEngine {
    pub fn new(params: CompressorCurveParams) -> Self {
        Self {
            stream: None,
            params: Arc::new(RwLock::new(params)),
            status: "Ready".to_string(),
            sample_rate: 48_000.0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.stream.is_some()
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Update the compressor settings the meter uses
    pub fn set_params(&self, params: &CompressorCurveParams) {
        if let Ok(mut shared) = self.params.write() {
            *shared = params.clone();
        }
    }

    /// Start capturing
    ///
    /// Returns a plotter whose feed now lives in the input callback. The
    /// plot configuration's sample rate is replaced by the device's.
    pub fn start(
        &mut self,
        plot_config: &PlotConfiguration,
        style: GainReductionStyle,
    ) -> Result<GainReductionPlotter, EngineError> {
        self.stop();
        log::info!("Starting audio engine...");

        let host = cpal::default_host();
        let device = host.default_input_device().ok_or(EngineError::NoInputDevice)?;
        let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());
        log::info!("Using input device: {}", device_name);

        let supported = device.default_input_config()?;
        log::info!("Audio config: {:?}", supported);
        self.sample_rate = supported.sample_rate().0 as f64;

        let mut config = plot_config.clone();
        config.sample_rate = self.sample_rate;
        let (plotter, feed) = GainReductionPlotter::new(config, style)?;

        let initial = self
            .params
            .read()
            .map(|p| p.clone())
            .unwrap_or_default();
        let meter = Meter::new(self.sample_rate as f32, initial, feed);
        let params = Arc::clone(&self.params);

        let sample_format = supported.sample_format();
        let stream_config: cpal::StreamConfig = supported.into();
        let stream = match sample_format {
            cpal::SampleFormat::F32 => {
                build_input_stream::<f32>(&device, &stream_config, meter, params)?
            }
            cpal::SampleFormat::I16 => {
                build_input_stream::<i16>(&device, &stream_config, meter, params)?
            }
            cpal::SampleFormat::U16 => {
                build_input_stream::<u16>(&device, &stream_config, meter, params)?
            }
            format => return Err(EngineError::UnsupportedFormat(format)),
        };
        stream.play()?;

        self.stream = Some(stream);
        self.status = format!("Listening: {} at {} Hz", device_name, self.sample_rate);
        log::info!("Audio started successfully");
        Ok(plotter)
    }

    /// Stop capturing
    pub fn stop(&mut self) {
        if self.stream.take().is_some() {
            self.status = "Stopped".to_string();
            log::info!("Audio stopped");
        }
    }
}
