use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;
use thiserror::Error;

use crate::config::{InterpConfig, default_interp_config};
use crate::data::model::{InterpolationResult, TimeSlice};
use crate::device::DeviceInterpolator;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Aggregator-level failures. Loader and interpolator errors propagate
/// unchanged as plain error chains.
#[derive(Debug, Error)]
pub enum ExperimentError {
    #[error("no interpolation config entry for device '{0}'")]
    MissingConfig(String),
    #[error("unknown device '{0}'")]
    UnknownDevice(String),
}

// ---------------------------------------------------------------------------
// Experiment – one root folder of per-device recordings
// ---------------------------------------------------------------------------

/// A time-aligned multi-device recording rooted at one folder.
///
/// Each immediate subdirectory of the root is one device; its name keys
/// both the interpolation config and the query interface.
#[derive(Debug)]
pub struct Experiment {
    root_folder: PathBuf,
    devices: BTreeMap<String, DeviceInterpolator>,
    /// Bounds reported by the most recently loaded device, not an aggregate
    /// across devices. Devices load in name order.
    start_time: f64,
    end_time: f64,
    interp_config: InterpConfig,
}

impl Experiment {
    /// Discover device subfolders under `root_folder` and build one
    /// interpolator per device from its config entry.
    ///
    /// Fails if the root cannot be listed, if a discovered device has no
    /// config entry ([`ExperimentError::MissingConfig`]), or if a device
    /// folder fails to parse. On failure no `Experiment` is returned, so
    /// partially loaded state is never observable.
    pub fn new(root_folder: impl Into<PathBuf>, interp_config: InterpConfig) -> Result<Self> {
        let root_folder = root_folder.into();

        let mut device_folders: Vec<PathBuf> = fs::read_dir(&root_folder)
            .with_context(|| format!("reading experiment root {}", root_folder.display()))?
            .collect::<std::io::Result<Vec<_>>>()
            .with_context(|| format!("listing experiment root {}", root_folder.display()))?
            .into_iter()
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect();
        device_folders.sort();

        let mut devices = BTreeMap::new();
        let mut start_time = f64::INFINITY;
        let mut end_time = f64::NEG_INFINITY;

        for folder in &device_folders {
            let name = folder
                .file_name()
                .and_then(|n| n.to_str())
                .with_context(|| {
                    format!("non-UTF-8 device folder name in {}", root_folder.display())
                })?
                .to_string();

            let config = interp_config
                .get(&name)
                .ok_or_else(|| ExperimentError::MissingConfig(name.clone()))?;

            info!("parsing {name} data");
            let device = DeviceInterpolator::create(folder, config)
                .with_context(|| format!("loading device '{name}'"))?;

            start_time = device.start_time();
            end_time = device.end_time();
            devices.insert(name, device);
        }

        Ok(Experiment {
            root_folder,
            devices,
            start_time,
            end_time,
            interp_config,
        })
    }

    /// [`Experiment::new`] with [`default_interp_config`].
    pub fn open(root_folder: impl Into<PathBuf>) -> Result<Self> {
        Self::new(root_folder, default_interp_config())
    }

    /// Registered device names, in registration (name) order.
    pub fn device_names(&self) -> Vec<&str> {
        self.devices.keys().map(String::as_str).collect()
    }

    /// Resample one device onto the query timeline.
    ///
    /// Fails with [`ExperimentError::UnknownDevice`] for unregistered
    /// names; otherwise this is pure dispatch to the device's interpolator.
    pub fn interpolate(&self, times: &TimeSlice, device: &str) -> Result<InterpolationResult> {
        let interp = self
            .devices
            .get(device)
            .ok_or_else(|| ExperimentError::UnknownDevice(device.to_string()))?;
        Ok(interp.interpolate(times))
    }

    /// Resample every registered device onto the query timeline; one entry
    /// per device name.
    pub fn interpolate_all(&self, times: &TimeSlice) -> BTreeMap<String, InterpolationResult> {
        self.devices
            .iter()
            .map(|(name, interp)| (name.clone(), interp.interpolate(times)))
            .collect()
    }

    /// The time span over which a device's output is trustworthy.
    ///
    /// Fails with [`ExperimentError::UnknownDevice`] for unregistered names.
    pub fn get_valid_range(&self, device: &str) -> Result<(f64, f64)> {
        let interp = self
            .devices
            .get(device)
            .ok_or_else(|| ExperimentError::UnknownDevice(device.to_string()))?;
        Ok(interp.valid_interval())
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    pub fn interp_config(&self) -> &InterpConfig {
        &self.interp_config
    }

    /// Start bound reported by the last device loaded (`+inf` when no
    /// device was found).
    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// End bound reported by the last device loaded (`-inf` when no device
    /// was found).
    pub fn end_time(&self) -> f64 {
        self.end_time
    }
}
