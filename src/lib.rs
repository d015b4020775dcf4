//! Time-aligned multi-device recording resampler.
//!
//! An [`Experiment`] discovers one subfolder per device under a root
//! folder, builds an interpolation model per device from its timestamped
//! samples, and resamples any or all devices at arbitrary query times.
//!
//! ```text
//!  <root>/<device>/*.{csv,json,parquet}
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse block files → DeviceRecording
//!   └──────────┘
//!        │
//!        ▼
//!   ┌────────────────────┐
//!   │ DeviceInterpolator  │  per-category resampling strategy
//!   └────────────────────┘
//!        │
//!        ▼
//!   ┌────────────┐
//!   │ Experiment  │  name-keyed dispatch, global bounds
//!   └────────────┘
//! ```

pub mod config;
pub mod data;
pub mod device;
pub mod experiment;

pub use config::{
    DeviceConfig, InterpConfig, InterpolationMode, ScreenOptions, SignalOptions,
    default_interp_config,
};
pub use data::model::{DeviceRecording, InterpolationResult, SampleBlock, TimeSlice};
pub use device::DeviceInterpolator;
pub use experiment::{Experiment, ExperimentError};
