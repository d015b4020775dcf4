use std::path::Path;

use anyhow::{Result, bail};
use log::debug;

use crate::config::{DeviceConfig, ScreenOptions, SignalOptions};
use crate::data::interp::{hold_previous, resample};
use crate::data::loader::load_device_folder;
use crate::data::model::{DeviceRecording, InterpolationResult, TimeSlice};

// ---------------------------------------------------------------------------
// DeviceInterpolator – per-category resampling strategies
// ---------------------------------------------------------------------------

/// One device's interpolation model, tagged by strategy.
///
/// Signal-like devices (responses, eye tracker, treadmill) share the
/// windowed linear/nearest strategy; screens hold the last frame.
#[derive(Debug, Clone)]
pub enum DeviceInterpolator {
    Signal(SignalInterpolator),
    Screen(ScreenInterpolator),
}

impl DeviceInterpolator {
    /// Parse a device folder and build the strategy its config selects.
    pub fn create(folder: &Path, config: &DeviceConfig) -> Result<Self> {
        let recording = load_device_folder(folder)?;
        debug!(
            "{}: {} samples x {} channels",
            folder.display(),
            recording.len(),
            recording.channel_names.len()
        );

        Ok(match config {
            DeviceConfig::Screen(options) => {
                DeviceInterpolator::Screen(ScreenInterpolator::new(recording, *options))
            }
            DeviceConfig::Responses(options)
            | DeviceConfig::EyeTracker(options)
            | DeviceConfig::Treadmill(options) => {
                DeviceInterpolator::Signal(SignalInterpolator::new(recording, *options)?)
            }
        })
    }

    /// Time of the device's first sample.
    pub fn start_time(&self) -> f64 {
        match self {
            DeviceInterpolator::Signal(s) => s.recording.start_time(),
            DeviceInterpolator::Screen(s) => s.recording.start_time(),
        }
    }

    /// Time of the device's last sample.
    pub fn end_time(&self) -> f64 {
        match self {
            DeviceInterpolator::Signal(s) => s.recording.end_time(),
            DeviceInterpolator::Screen(s) => s.recording.end_time(),
        }
    }

    /// Time span over which this device's output is trustworthy.
    pub fn valid_interval(&self) -> (f64, f64) {
        (self.start_time(), self.end_time())
    }

    /// Resample the device onto the query timeline.
    pub fn interpolate(&self, times: &TimeSlice) -> InterpolationResult {
        match self {
            DeviceInterpolator::Signal(s) => s.interpolate(times),
            DeviceInterpolator::Screen(s) => s.interpolate(times),
        }
    }
}

// ---------------------------------------------------------------------------
// Signal devices – windowed linear / nearest resampling
// ---------------------------------------------------------------------------

/// Resampler for irregularly sampled signals (responses, eye tracker,
/// treadmill).
#[derive(Debug, Clone)]
pub struct SignalInterpolator {
    recording: DeviceRecording,
    options: SignalOptions,
}

impl SignalInterpolator {
    fn new(recording: DeviceRecording, options: SignalOptions) -> Result<Self> {
        let recording = if options.keep_nans {
            recording
        } else {
            recording.without_nan_rows()
        };
        if recording.is_empty() {
            bail!("no finite samples to interpolate");
        }
        Ok(SignalInterpolator { recording, options })
    }

    fn interpolate(&self, times: &TimeSlice) -> InterpolationResult {
        let out = resample(
            &self.recording.timestamps,
            &self.recording.channels,
            &times.times(),
            self.options.interpolation_mode,
            self.options.interp_window,
        );
        InterpolationResult {
            channel_names: self.recording.channel_names.clone(),
            values: out.values,
            valid: out.valid,
        }
    }
}

// ---------------------------------------------------------------------------
// Screen devices – frame hold
// ---------------------------------------------------------------------------

/// Resampler for screen recordings: every query time takes the frame on
/// display at that moment.
#[derive(Debug, Clone)]
pub struct ScreenInterpolator {
    recording: DeviceRecording,
    options: ScreenOptions,
}

impl ScreenInterpolator {
    fn new(recording: DeviceRecording, options: ScreenOptions) -> Self {
        ScreenInterpolator { recording, options }
    }

    fn interpolate(&self, times: &TimeSlice) -> InterpolationResult {
        let mut out = hold_previous(
            &self.recording.timestamps,
            &self.recording.channels,
            &times.times(),
        );
        if self.options.rescale {
            // Stored intensities are 8-bit.
            for row in &mut out.values {
                for v in row {
                    *v /= 255.0;
                }
            }
        }
        InterpolationResult {
            channel_names: self.recording.channel_names.clone(),
            values: out.values,
            valid: out.valid,
        }
    }
}
