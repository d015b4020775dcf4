use std::fs;
use std::path::Path;
use std::sync::Arc;

use arrow::array::Float64Array;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use recsync::TimeSlice;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// 60 s recording window shared by every generated device.
const DURATION: f64 = 60.0;

/// Two CSV blocks of three response channels at 10 Hz, split halfway.
fn write_responses(root: &Path, rng: &mut SimpleRng) {
    let dir = root.join("responses");
    fs::create_dir_all(&dir).expect("creating responses folder");

    for (block_no, (t0, t1)) in [(0.0, DURATION / 2.0), (DURATION / 2.0, DURATION)]
        .into_iter()
        .enumerate()
    {
        let path = dir.join(format!("block_{block_no:03}.csv"));
        let mut writer = csv::Writer::from_path(&path).expect("creating responses CSV");
        writer
            .write_record(["t", "cell_0", "cell_1", "cell_2"])
            .expect("writing CSV header");

        let n = ((t1 - t0) * 10.0) as usize;
        for i in 0..n {
            let t = t0 + i as f64 * 0.1;
            let row: Vec<String> = std::iter::once(format!("{t:.3}"))
                .chain((0..3).map(|c| {
                    let phase = c as f64 * 0.7;
                    let rate = 5.0 + 4.0 * (t * 0.5 + phase).sin() + rng.gauss(0.0, 0.3);
                    format!("{rate:.4}")
                }))
                .collect();
            writer.write_record(&row).expect("writing responses row");
        }
        writer.flush().expect("flushing responses CSV");
    }
}

/// Gaze positions at 20 Hz with blink dropouts written as empty cells.
fn write_eye_tracker(root: &Path, rng: &mut SimpleRng) {
    let dir = root.join("eye_tracker");
    fs::create_dir_all(&dir).expect("creating eye_tracker folder");

    let path = dir.join("gaze.csv");
    let mut writer = csv::Writer::from_path(&path).expect("creating gaze CSV");
    writer
        .write_record(["t", "pupil_x", "pupil_y"])
        .expect("writing CSV header");

    let n = (DURATION * 20.0) as usize;
    let mut blink_left = 0usize;
    for i in 0..n {
        let t = i as f64 * 0.05;
        if blink_left == 0 && rng.next_f64() < 0.005 {
            blink_left = 4; // ~0.2 s blink
        }
        let row = if blink_left > 0 {
            blink_left -= 1;
            vec![format!("{t:.3}"), String::new(), String::new()]
        } else {
            let x = 0.5 + 0.3 * (t * 0.8).sin() + rng.gauss(0.0, 0.02);
            let y = 0.5 + 0.2 * (t * 1.1).cos() + rng.gauss(0.0, 0.02);
            vec![format!("{t:.3}"), format!("{x:.4}"), format!("{y:.4}")]
        };
        writer.write_record(&row).expect("writing gaze row");
    }
    writer.flush().expect("flushing gaze CSV");
}

/// Treadmill speed at 10 Hz as a JSON block: a clipped random walk.
fn write_treadmill(root: &Path, rng: &mut SimpleRng) {
    let dir = root.join("treadmill");
    fs::create_dir_all(&dir).expect("creating treadmill folder");

    let n = (DURATION * 10.0) as usize;
    let mut t_values = Vec::with_capacity(n);
    let mut speeds = Vec::with_capacity(n);
    let mut speed = 0.0f64;
    for i in 0..n {
        t_values.push((i as f64 * 0.1 * 1000.0).round() / 1000.0);
        speed = (speed + rng.gauss(0.0, 0.5)).max(0.0);
        speeds.push((speed * 10000.0).round() / 10000.0);
    }

    let block = serde_json::json!({
        "t": t_values,
        "channels": { "speed": speeds },
    });
    let text = serde_json::to_string_pretty(&block).expect("encoding treadmill JSON");
    fs::write(dir.join("speed.json"), text).expect("writing treadmill JSON");
}

/// Mean screen luminance per frame at 30 Hz as a Parquet block, 0–255.
fn write_screen(root: &Path, rng: &mut SimpleRng) {
    let dir = root.join("screen");
    fs::create_dir_all(&dir).expect("creating screen folder");

    let n = (DURATION * 30.0) as usize;
    let t_values: Vec<f64> = (0..n).map(|i| i as f64 / 30.0).collect();
    let luminance: Vec<f64> = t_values
        .iter()
        .map(|&t| {
            let v = 128.0 + 100.0 * (t * 0.25).sin() + rng.gauss(0.0, 5.0);
            v.clamp(0.0, 255.0).round()
        })
        .collect();

    let schema = Arc::new(Schema::new(vec![
        Field::new("t", DataType::Float64, false),
        Field::new("luminance", DataType::Float64, false),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Float64Array::from(t_values)),
            Arc::new(Float64Array::from(luminance)),
        ],
    )
    .expect("Failed to create RecordBatch");

    let file = fs::File::create(dir.join("frames.parquet")).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");
}

fn main() {
    env_logger::init();

    let mut rng = SimpleRng::new(42);
    let root = Path::new("sample_experiment");

    write_responses(root, &mut rng);
    write_eye_tracker(root, &mut rng);
    write_treadmill(root, &mut rng);
    write_screen(root, &mut rng);

    // Load the freshly written folder back to show the query surface.
    let experiment = recsync::Experiment::open(root).expect("loading generated experiment");

    println!(
        "Wrote {} devices to {}",
        experiment.device_names().len(),
        root.display()
    );
    for name in experiment.device_names() {
        let (lo, hi) = experiment.get_valid_range(name).expect("valid range");
        println!("  {name}: valid over [{lo:.2}, {hi:.2}]");
    }

    let probe = TimeSlice::new(1.0, 2.0, 0.1);
    for (name, result) in experiment.interpolate_all(&probe) {
        println!(
            "  {name} @ t=1.0..2.0: {} rows x {} channels, {} valid",
            result.values.len(),
            result.channel_names.len(),
            result.valid.iter().filter(|&&v| v).count()
        );
    }
}
