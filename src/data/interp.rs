use crate::config::InterpolationMode;

// ---------------------------------------------------------------------------
// Resampling kernels over a shared timestamp axis
// ---------------------------------------------------------------------------

/// Output of a kernel: one row of channel values per query time plus a
/// per-time validity flag.
#[derive(Debug, Clone, PartialEq)]
pub struct Resampled {
    pub values: Vec<Vec<f64>>,
    pub valid: Vec<bool>,
}

/// Resample channel columns sharing one `timestamps` axis onto `query`
/// times.
///
/// Each query time needs bracketing samples. The result row is valid when
/// the bracketing gap is at most `window` (an exact sample hit is always
/// in-window) and every channel value in the row is finite. Query times
/// outside the sampled range produce NaN rows marked invalid.
pub fn resample(
    timestamps: &[f64],
    channels: &[Vec<f64>],
    query: &[f64],
    mode: InterpolationMode,
    window: f64,
) -> Resampled {
    let mut values = Vec::with_capacity(query.len());
    let mut valid = Vec::with_capacity(query.len());

    for &t in query {
        let Some((lo, hi)) = bracket(timestamps, t) else {
            values.push(vec![f64::NAN; channels.len()]);
            valid.push(false);
            continue;
        };

        let row: Vec<f64> = channels
            .iter()
            .map(|col| match mode {
                InterpolationMode::Linear => {
                    lerp(timestamps[lo], col[lo], timestamps[hi], col[hi], t)
                }
                InterpolationMode::Nearest => {
                    if t - timestamps[lo] <= timestamps[hi] - t {
                        col[lo]
                    } else {
                        col[hi]
                    }
                }
            })
            .collect();

        let in_window = lo == hi || timestamps[hi] - timestamps[lo] <= window;
        let finite = row.iter().all(|v| v.is_finite());
        values.push(row);
        valid.push(in_window && finite);
    }

    Resampled { values, valid }
}

/// Zero-order hold: each query time takes the last sample at or before it.
/// Valid iff the query time lies within the sampled range and the held row
/// is finite.
pub fn hold_previous(timestamps: &[f64], channels: &[Vec<f64>], query: &[f64]) -> Resampled {
    let mut values = Vec::with_capacity(query.len());
    let mut valid = Vec::with_capacity(query.len());

    for &t in query {
        let in_range = match (timestamps.first(), timestamps.last()) {
            (Some(&first), Some(&last)) => t >= first && t <= last,
            _ => false,
        };
        if !in_range {
            values.push(vec![f64::NAN; channels.len()]);
            valid.push(false);
            continue;
        }

        // Last sample at or before t; in-range guarantees it exists.
        let idx = timestamps.partition_point(|&ts| ts <= t) - 1;
        let row: Vec<f64> = channels.iter().map(|col| col[idx]).collect();
        let finite = row.iter().all(|v| v.is_finite());
        values.push(row);
        valid.push(finite);
    }

    Resampled { values, valid }
}

/// Indices of the samples bracketing `t`, or `None` when `t` lies outside
/// the sampled range. An exact hit returns the same index twice.
fn bracket(timestamps: &[f64], t: f64) -> Option<(usize, usize)> {
    let (&first, &last) = (timestamps.first()?, timestamps.last()?);
    if t < first || t > last {
        return None;
    }
    // First index with timestamp >= t.
    let hi = timestamps.partition_point(|&ts| ts < t);
    if timestamps[hi] == t {
        Some((hi, hi))
    } else {
        Some((hi - 1, hi))
    }
}

fn lerp(t0: f64, v0: f64, t1: f64, v1: f64, t: f64) -> f64 {
    if t1 == t0 {
        return v0;
    }
    v0 + (v1 - v0) * (t - t0) / (t1 - t0)
}
