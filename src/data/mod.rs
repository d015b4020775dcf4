/// Data layer: core types, block loading, and resampling kernels.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse block files → DeviceRecording
///   └──────────┘
///        │
///        ▼
///   ┌─────────────────┐
///   │ DeviceRecording  │  merged time axis + channel columns
///   └─────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  interp   │  resample onto query times → values + validity
///   └──────────┘
/// ```

pub mod interp;
pub mod loader;
pub mod model;
