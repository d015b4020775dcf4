use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Per-category interpolation options
// ---------------------------------------------------------------------------

/// Resampling strategy for signal-like devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationMode {
    Linear,
    Nearest,
}

/// Options shared by the signal-like device categories.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalOptions {
    /// Keep non-finite sample rows instead of dropping them up front.
    pub keep_nans: bool,
    pub interpolation_mode: InterpolationMode,
    /// Largest bracketing gap (seconds) a query may interpolate across.
    pub interp_window: f64,
}

/// Options for screen-like devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenOptions {
    /// Rescale stored 8-bit intensities to the 0–1 range.
    pub rescale: bool,
}

// ---------------------------------------------------------------------------
// DeviceConfig – per-device configuration, tagged by category
// ---------------------------------------------------------------------------

/// Interpolation configuration for one device, tagged by its category.
/// The tag selects the resampling strategy; only the options that apply to
/// that category are representable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeviceConfig {
    Screen(ScreenOptions),
    Responses(SignalOptions),
    EyeTracker(SignalOptions),
    Treadmill(SignalOptions),
}

/// Mapping from device (subfolder) name to its interpolation config.
pub type InterpConfig = BTreeMap<String, DeviceConfig>;

/// The conventional four-device configuration: a non-rescaling screen plus
/// linearly interpolated responses, eye tracker and treadmill with a 5 s
/// window.
pub fn default_interp_config() -> InterpConfig {
    let signal = SignalOptions {
        keep_nans: false,
        interpolation_mode: InterpolationMode::Linear,
        interp_window: 5.0,
    };

    let mut config = InterpConfig::new();
    config.insert(
        "screen".to_string(),
        DeviceConfig::Screen(ScreenOptions { rescale: false }),
    );
    config.insert("responses".to_string(), DeviceConfig::Responses(signal));
    config.insert("eye_tracker".to_string(), DeviceConfig::EyeTracker(signal));
    config.insert("treadmill".to_string(), DeviceConfig::Treadmill(signal));
    config
}
