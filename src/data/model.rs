use anyhow::{Result, bail};

// ---------------------------------------------------------------------------
// TimeSlice – a strided range of query timestamps
// ---------------------------------------------------------------------------

/// A start/stop/step query timeline. `stop` is exclusive, so
/// `TimeSlice::new(0.0, 10.0, 1.0)` describes the ten query times 0..=9.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSlice {
    pub start: f64,
    pub stop: f64,
    pub step: f64,
}

impl TimeSlice {
    pub fn new(start: f64, stop: f64, step: f64) -> Self {
        TimeSlice { start, stop, step }
    }

    /// Number of query times: `ceil((stop - start) / step)`.
    /// Zero when the range is empty or the step is not positive.
    pub fn len(&self) -> usize {
        if self.step <= 0.0 || self.stop <= self.start {
            return 0;
        }
        ((self.stop - self.start) / self.step).ceil() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Materialise the query timestamps.
    pub fn times(&self) -> Vec<f64> {
        (0..self.len())
            .map(|i| self.start + i as f64 * self.step)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// SampleBlock – one parsed block file
// ---------------------------------------------------------------------------

/// One block file's worth of samples: a shared time axis plus channel
/// columns, all of the same length.
#[derive(Debug, Clone)]
pub struct SampleBlock {
    /// Sample times in seconds, strictly increasing within the block.
    pub timestamps: Vec<f64>,
    /// Channel column names, matching `channels` by position.
    pub channel_names: Vec<String>,
    /// Channel-major samples: `channels[c][i]` is channel `c` at
    /// `timestamps[i]`.
    pub channels: Vec<Vec<f64>>,
}

// ---------------------------------------------------------------------------
// DeviceRecording – all of a device's blocks merged
// ---------------------------------------------------------------------------

/// A device's complete recording: every block concatenated onto one strictly
/// increasing time axis.
#[derive(Debug, Clone)]
pub struct DeviceRecording {
    pub channel_names: Vec<String>,
    pub timestamps: Vec<f64>,
    pub channels: Vec<Vec<f64>>,
}

impl DeviceRecording {
    /// Merge parsed blocks into one recording.
    ///
    /// Blocks are ordered by their first timestamp before concatenation;
    /// all blocks must agree on channel names and the merged time axis must
    /// be strictly increasing. Empty blocks are dropped.
    pub fn from_blocks(mut blocks: Vec<SampleBlock>) -> Result<Self> {
        blocks.retain(|b| !b.timestamps.is_empty());
        if blocks.is_empty() {
            bail!("no samples in any block");
        }
        blocks.sort_by(|a, b| a.timestamps[0].total_cmp(&b.timestamps[0]));

        let channel_names = blocks[0].channel_names.clone();
        let mut timestamps = Vec::new();
        let mut channels = vec![Vec::new(); channel_names.len()];

        for block in &blocks {
            if block.channel_names != channel_names {
                bail!(
                    "blocks disagree on channel names: {:?} vs {:?}",
                    channel_names,
                    block.channel_names
                );
            }
            timestamps.extend_from_slice(&block.timestamps);
            for (c, column) in block.channels.iter().enumerate() {
                channels[c].extend_from_slice(column);
            }
        }

        if let Some(bad) = timestamps.iter().find(|ts| !ts.is_finite()) {
            bail!("non-finite timestamp {bad} in time axis");
        }
        for pair in timestamps.windows(2) {
            if pair[1] <= pair[0] {
                bail!("timestamps are not strictly increasing (at t={})", pair[1]);
            }
        }

        Ok(DeviceRecording {
            channel_names,
            timestamps,
            channels,
        })
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Whether the recording holds no samples.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Time of the first sample (NaN when empty).
    pub fn start_time(&self) -> f64 {
        self.timestamps.first().copied().unwrap_or(f64::NAN)
    }

    /// Time of the last sample (NaN when empty).
    pub fn end_time(&self) -> f64 {
        self.timestamps.last().copied().unwrap_or(f64::NAN)
    }

    /// Drop every sample row containing a non-finite channel value.
    pub fn without_nan_rows(self) -> DeviceRecording {
        let keep: Vec<usize> = (0..self.len())
            .filter(|&i| self.channels.iter().all(|col| col[i].is_finite()))
            .collect();
        DeviceRecording {
            channel_names: self.channel_names,
            timestamps: keep.iter().map(|&i| self.timestamps[i]).collect(),
            channels: self
                .channels
                .iter()
                .map(|col| keep.iter().map(|&i| col[i]).collect())
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// InterpolationResult – resampled output for one device
// ---------------------------------------------------------------------------

/// Resampled output: one row of channel values per query time plus a
/// per-time validity flag (bracketing rule held and the row is finite).
#[derive(Debug, Clone, PartialEq)]
pub struct InterpolationResult {
    pub channel_names: Vec<String>,
    /// One row per query time, one column per channel.
    pub values: Vec<Vec<f64>>,
    /// One flag per query time.
    pub valid: Vec<bool>,
}
