use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::datatypes::DataType;
use log::debug;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{DeviceRecording, SampleBlock};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load every sample block in a device folder and merge them into one
/// recording. Block files are read in name order; dispatch is by extension.
///
/// Supported formats:
/// * `.parquet` – flat numeric columns, `t` plus one per channel
/// * `.json`    – `{ "t": [...], "channels": { "<name>": [...], ... } }`
/// * `.csv`     – header `t,<name>,...`, one row per sample
///
/// Files with other extensions are skipped so device folders can carry
/// notes or metadata alongside the data.
pub fn load_device_folder(path: &Path) -> Result<DeviceRecording> {
    let mut entries: Vec<_> = fs::read_dir(path)
        .with_context(|| format!("reading device folder {}", path.display()))?
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("listing device folder {}", path.display()))?;
    entries.sort_by_key(|e| e.file_name());

    let mut blocks = Vec::new();
    for entry in entries {
        let file = entry.path();
        if !file.is_file() {
            continue;
        }
        let ext = file
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        let block = match ext.as_str() {
            "parquet" | "pq" => load_parquet_block(&file),
            "json" => load_json_block(&file),
            "csv" => load_csv_block(&file),
            _ => {
                debug!("skipping non-block file {}", file.display());
                continue;
            }
        };
        blocks.push(block.with_context(|| format!("loading block {}", file.display()))?);
    }

    if blocks.is_empty() {
        bail!("device folder {} contains no sample blocks", path.display());
    }
    DeviceRecording::from_blocks(blocks)
        .with_context(|| format!("merging blocks in {}", path.display()))
}

// ---------------------------------------------------------------------------
// CSV blocks
// ---------------------------------------------------------------------------

/// CSV layout: header row names the columns; `t` is the time axis, every
/// other column is a channel. Empty cells parse as NaN.
fn load_csv_block(path: &Path) -> Result<SampleBlock> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let t_idx = headers
        .iter()
        .position(|h| h == "t")
        .context("CSV missing 't' column")?;
    let channel_names: Vec<String> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != t_idx)
        .map(|(_, h)| h.clone())
        .collect();
    if channel_names.is_empty() {
        bail!("CSV has no channel columns");
    }

    let mut timestamps = Vec::new();
    let mut channels = vec![Vec::new(); channel_names.len()];

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        timestamps.push(parse_cell(record.get(t_idx).unwrap_or(""), row_no, "t")?);

        let mut c = 0;
        for (col_idx, cell) in record.iter().enumerate() {
            if col_idx == t_idx {
                continue;
            }
            channels[c].push(parse_cell(cell, row_no, &headers[col_idx])?);
            c += 1;
        }
    }

    Ok(SampleBlock {
        timestamps,
        channel_names,
        channels,
    })
}

fn parse_cell(s: &str, row: usize, col: &str) -> Result<f64> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(f64::NAN);
    }
    s.parse::<f64>()
        .with_context(|| format!("row {row}, column '{col}': '{s}' is not a number"))
}

// ---------------------------------------------------------------------------
// JSON blocks
// ---------------------------------------------------------------------------

/// Expected JSON schema:
///
/// ```json
/// {
///   "t": [0.0, 0.1, 0.2],
///   "channels": { "speed": [0.0, 0.4, 0.3] }
/// }
/// ```
///
/// Channels come out ordered by name; `null` entries parse as NaN.
fn load_json_block(path: &Path) -> Result<SampleBlock> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;
    let obj = root.as_object().context("expected top-level JSON object")?;

    let timestamps = json_array_to_f64(obj.get("t"), "t")?;

    let channels_obj = obj
        .get("channels")
        .and_then(|v| v.as_object())
        .context("missing or invalid 'channels' object")?;
    if channels_obj.is_empty() {
        bail!("'channels' object is empty");
    }

    let mut channel_names = Vec::with_capacity(channels_obj.len());
    let mut channels = Vec::with_capacity(channels_obj.len());
    for (name, column) in channels_obj {
        let values = json_array_to_f64(Some(column), name)?;
        if values.len() != timestamps.len() {
            bail!(
                "channel '{name}' has {} values but 't' has {}",
                values.len(),
                timestamps.len()
            );
        }
        channel_names.push(name.clone());
        channels.push(values);
    }

    Ok(SampleBlock {
        timestamps,
        channel_names,
        channels,
    })
}

fn json_array_to_f64(val: Option<&JsonValue>, col: &str) -> Result<Vec<f64>> {
    let arr = val
        .and_then(|v| v.as_array())
        .with_context(|| format!("missing or invalid '{col}' array"))?;

    arr.iter()
        .enumerate()
        .map(|(j, v)| {
            if v.is_null() {
                return Ok(f64::NAN);
            }
            v.as_f64()
                .with_context(|| format!("{col}[{j}]: not a number"))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Parquet blocks
// ---------------------------------------------------------------------------

/// Flat numeric columns: `t` plus one column per channel, each
/// Float64/Float32/Int64/Int32. Works with files written by both **Pandas**
/// (`df.to_parquet()`) and **Polars** (`df.write_parquet()`).
fn load_parquet_block(path: &Path) -> Result<SampleBlock> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut timestamps = Vec::new();
    let mut channel_names: Vec<String> = Vec::new();
    let mut channels: Vec<Vec<f64>> = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let t_idx = schema
            .index_of("t")
            .map_err(|_| anyhow::anyhow!("parquet file missing 't' column"))?;

        if channel_names.is_empty() {
            channel_names = schema
                .fields()
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != t_idx)
                .map(|(_, f)| f.name().clone())
                .collect();
            if channel_names.is_empty() {
                bail!("parquet file has no channel columns");
            }
            channels = vec![Vec::new(); channel_names.len()];
        }

        append_column(batch.column(t_idx), &mut timestamps).context("reading 't' column")?;

        let mut c = 0;
        for (col_idx, field) in schema.fields().iter().enumerate() {
            if col_idx == t_idx {
                continue;
            }
            append_column(batch.column(col_idx), &mut channels[c])
                .with_context(|| format!("reading column '{}'", field.name()))?;
            c += 1;
        }
    }

    Ok(SampleBlock {
        timestamps,
        channel_names,
        channels,
    })
}

/// Append an Arrow numeric column to `out` as f64, nulls becoming NaN.
fn append_column(col: &Arc<dyn Array>, out: &mut Vec<f64>) -> Result<()> {
    match col.data_type() {
        DataType::Float64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float64Array>()
                .context("expected Float64Array")?;
            out.extend(arr.iter().map(|v| v.unwrap_or(f64::NAN)));
        }
        DataType::Float32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float32Array>()
                .context("expected Float32Array")?;
            out.extend(arr.iter().map(|v| v.map(f64::from).unwrap_or(f64::NAN)));
        }
        DataType::Int64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int64Array>()
                .context("expected Int64Array")?;
            out.extend(arr.iter().map(|v| v.map(|i| i as f64).unwrap_or(f64::NAN)));
        }
        DataType::Int32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int32Array>()
                .context("expected Int32Array")?;
            out.extend(arr.iter().map(|v| v.map(f64::from).unwrap_or(f64::NAN)));
        }
        other => bail!("column type {other:?} is not numeric"),
    }
    Ok(())
}
