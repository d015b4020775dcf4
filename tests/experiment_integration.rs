//! End-to-end tests over fixture experiment folders.

use std::fs;
use std::path::Path;

use recsync::data::loader::load_device_folder;
use recsync::{
    DeviceConfig, Experiment, ExperimentError, InterpConfig, InterpolationMode, ScreenOptions,
    SignalOptions, TimeSlice,
};
use tempfile::TempDir;

fn signal_options() -> SignalOptions {
    SignalOptions {
        keep_nans: false,
        interpolation_mode: InterpolationMode::Linear,
        interp_window: 5.0,
    }
}

/// Root with `responses/` (rate = 2t) and `eye_tracker/` (pupil_x rising,
/// pupil_y falling), both sampled once per second over 0..=10.
fn fixture_root() -> TempDir {
    let root = TempDir::new().unwrap();

    let responses = root.path().join("responses");
    fs::create_dir(&responses).unwrap();
    let mut csv = String::from("t,rate\n");
    for i in 0..=10 {
        csv.push_str(&format!("{i},{}\n", 2 * i));
    }
    fs::write(responses.join("block_000.csv"), csv).unwrap();

    let eye = root.path().join("eye_tracker");
    fs::create_dir(&eye).unwrap();
    let mut csv = String::from("t,pupil_x,pupil_y\n");
    for i in 0..=10 {
        csv.push_str(&format!("{i},{},{}\n", i as f64 / 10.0, 1.0 - i as f64 / 10.0));
    }
    fs::write(eye.join("block_000.csv"), csv).unwrap();

    root
}

fn fixture_config() -> InterpConfig {
    let mut config = InterpConfig::new();
    config.insert(
        "responses".to_string(),
        DeviceConfig::Responses(signal_options()),
    );
    config.insert(
        "eye_tracker".to_string(),
        DeviceConfig::EyeTracker(signal_options()),
    );
    config
}

#[test]
fn device_names_match_subfolders() {
    let root = fixture_root();
    let experiment = Experiment::new(root.path(), fixture_config()).unwrap();
    assert_eq!(experiment.device_names(), ["eye_tracker", "responses"]);
}

#[test]
fn construction_fails_without_config_entry() {
    let root = fixture_root();
    let unexpected = root.path().join("unexpected_device");
    fs::create_dir(&unexpected).unwrap();
    fs::write(unexpected.join("data.csv"), "t,v\n0,1\n1,2\n").unwrap();

    let err = Experiment::new(root.path(), fixture_config()).unwrap_err();
    match err.downcast_ref::<ExperimentError>() {
        Some(ExperimentError::MissingConfig(name)) => assert_eq!(name, "unexpected_device"),
        other => panic!("expected MissingConfig, got {other:?}"),
    }
}

#[test]
fn unknown_device_queries_fail() {
    let root = fixture_root();
    let experiment = Experiment::new(root.path(), fixture_config()).unwrap();
    let times = TimeSlice::new(0.0, 10.0, 1.0);

    let err = experiment.interpolate(&times, "treadmill").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ExperimentError>(),
        Some(ExperimentError::UnknownDevice(_))
    ));

    let err = experiment.get_valid_range("treadmill").unwrap_err();
    assert!(err.to_string().contains("unknown device 'treadmill'"));
}

#[test]
fn all_devices_key_set_matches_names() {
    let root = fixture_root();
    let experiment = Experiment::new(root.path(), fixture_config()).unwrap();
    let all = experiment.interpolate_all(&TimeSlice::new(0.0, 10.0, 1.0));
    let keys: Vec<&str> = all.keys().map(String::as_str).collect();
    assert_eq!(keys, experiment.device_names());
}

#[test]
fn single_device_dispatch_matches_all_devices_entry() {
    let root = fixture_root();
    let experiment = Experiment::new(root.path(), fixture_config()).unwrap();
    let times = TimeSlice::new(0.0, 10.0, 1.0);

    let single = experiment.interpolate(&times, "responses").unwrap();
    let all = experiment.interpolate_all(&times);
    assert_eq!(Some(&single), all.get("responses"));
}

#[test]
fn interpolate_is_idempotent() {
    let root = fixture_root();
    let experiment = Experiment::new(root.path(), fixture_config()).unwrap();
    let times = TimeSlice::new(0.0, 10.0, 0.5);

    let first = experiment.interpolate(&times, "eye_tracker").unwrap();
    let second = experiment.interpolate(&times, "eye_tracker").unwrap();
    assert_eq!(first, second);
}

#[test]
fn row_counts_follow_the_time_slice() {
    let root = fixture_root();
    let experiment = Experiment::new(root.path(), fixture_config()).unwrap();
    let times = TimeSlice::new(0.0, 10.0, 1.0);
    assert_eq!(times.len(), 10);

    for (name, result) in experiment.interpolate_all(&times) {
        assert_eq!(result.values.len(), 10, "{name} row count");
        assert_eq!(result.valid.len(), 10, "{name} mask length");
        assert!(result.valid.iter().all(|&v| v), "{name} all in range");
    }
}

#[test]
fn linear_values_between_samples() {
    let root = fixture_root();
    let experiment = Experiment::new(root.path(), fixture_config()).unwrap();

    // rate = 2t, so halfway between t=2 and t=3 the rate is 5.
    let result = experiment
        .interpolate(&TimeSlice::new(2.5, 3.5, 1.0), "responses")
        .unwrap();
    assert_eq!(result.values, vec![vec![5.0]]);
    assert_eq!(result.valid, vec![true]);
}

#[test]
fn valid_range_is_ordered() {
    let root = fixture_root();
    let experiment = Experiment::new(root.path(), fixture_config()).unwrap();
    let (lo, hi) = experiment.get_valid_range("responses").unwrap();
    assert!(lo <= hi);
    assert_eq!((lo, hi), (0.0, 10.0));
}

#[test]
fn last_loaded_device_wins_the_global_bounds() {
    let root = fixture_root();
    // Make the two devices disagree on bounds: extend responses to t=20.
    fs::write(
        root.path().join("responses").join("block_001.csv"),
        "t,rate\n20,40\n",
    )
    .unwrap();

    let experiment = Experiment::new(root.path(), fixture_config()).unwrap();
    // Devices load in name order; "responses" is last.
    assert_eq!(experiment.start_time(), 0.0);
    assert_eq!(experiment.end_time(), 20.0);
}

#[test]
fn blocks_merge_across_files_by_start_time() {
    let dir = TempDir::new().unwrap();
    // Later times in the alphabetically earlier file.
    fs::write(dir.path().join("a.csv"), "t,v\n5,50\n6,60\n").unwrap();
    fs::write(dir.path().join("b.csv"), "t,v\n0,0\n1,10\n").unwrap();
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let recording = load_device_folder(dir.path()).unwrap();
    assert_eq!(recording.timestamps, vec![0.0, 1.0, 5.0, 6.0]);
    assert_eq!(recording.channels[0], vec![0.0, 10.0, 50.0, 60.0]);
}

#[test]
fn json_devices_load_and_interpolate() {
    let root = TempDir::new().unwrap();
    let treadmill = root.path().join("treadmill");
    fs::create_dir(&treadmill).unwrap();
    fs::write(
        treadmill.join("speed.json"),
        r#"{ "t": [0.0, 1.0, 2.0], "channels": { "speed": [0.0, 2.0, 4.0] } }"#,
    )
    .unwrap();

    let mut config = InterpConfig::new();
    config.insert(
        "treadmill".to_string(),
        DeviceConfig::Treadmill(signal_options()),
    );

    let experiment = Experiment::new(root.path(), config).unwrap();
    let result = experiment
        .interpolate(&TimeSlice::new(0.5, 2.0, 0.5), "treadmill")
        .unwrap();
    assert_eq!(result.channel_names, ["speed"]);
    assert_eq!(result.values, vec![vec![1.0], vec![2.0], vec![3.0]]);
    assert_eq!(result.valid, vec![true, true, true]);
}

#[test]
fn screen_holds_frames_and_rescales() {
    let root = TempDir::new().unwrap();
    let screen = root.path().join("screen");
    fs::create_dir(&screen).unwrap();
    fs::write(
        screen.join("frames.csv"),
        "t,luminance\n0,0\n1,255\n2,127.5\n",
    )
    .unwrap();

    let mut config = InterpConfig::new();
    config.insert(
        "screen".to_string(),
        DeviceConfig::Screen(ScreenOptions { rescale: true }),
    );

    let experiment = Experiment::new(root.path(), config).unwrap();
    let result = experiment
        .interpolate(&TimeSlice::new(0.5, 3.0, 0.5), "screen")
        .unwrap();

    // Held frames at t = 0.5, 1.0, 1.5, 2.0 then out of range at 2.5.
    assert_eq!(result.values[0], vec![0.0]);
    assert_eq!(result.values[1], vec![1.0]);
    assert_eq!(result.values[2], vec![1.0]);
    assert_eq!(result.values[3], vec![0.5]);
    assert_eq!(result.valid, vec![true, true, true, true, false]);
}

#[test]
fn blink_rows_are_dropped_unless_nans_are_kept() {
    fn blinky_root() -> TempDir {
        let root = TempDir::new().unwrap();
        let eye = root.path().join("eye_tracker");
        fs::create_dir(&eye).unwrap();
        let mut csv = String::from("t,pupil_x\n");
        for i in 0..=10 {
            if i == 5 {
                csv.push_str("5,\n");
            } else {
                csv.push_str(&format!("{i},{i}\n"));
            }
        }
        fs::write(eye.join("gaze.csv"), csv).unwrap();
        root
    }

    let times = TimeSlice::new(5.0, 6.0, 1.0);

    // Dropped blink row: t=5 interpolates across the 4..6 gap.
    let root = blinky_root();
    let mut config = InterpConfig::new();
    config.insert(
        "eye_tracker".to_string(),
        DeviceConfig::EyeTracker(signal_options()),
    );
    let experiment = Experiment::new(root.path(), config).unwrap();
    let result = experiment.interpolate(&times, "eye_tracker").unwrap();
    assert_eq!(result.values, vec![vec![5.0]]);
    assert_eq!(result.valid, vec![true]);

    // Kept blink row: the exact hit at t=5 is NaN and invalid.
    let root = blinky_root();
    let mut config = InterpConfig::new();
    config.insert(
        "eye_tracker".to_string(),
        DeviceConfig::EyeTracker(SignalOptions {
            keep_nans: true,
            ..signal_options()
        }),
    );
    let experiment = Experiment::new(root.path(), config).unwrap();
    let result = experiment.interpolate(&times, "eye_tracker").unwrap();
    assert!(result.values[0][0].is_nan());
    assert_eq!(result.valid, vec![false]);
}

#[test]
fn root_must_be_listable() {
    let missing = Path::new("/definitely/not/a/real/experiment/root");
    let err = Experiment::new(missing, fixture_config()).unwrap_err();
    assert!(err.to_string().contains("reading experiment root"));
}
