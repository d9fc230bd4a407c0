use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, AsArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Dataset, MeasurementKind, Sample};

// ---------------------------------------------------------------------------
// Column resolution
// ---------------------------------------------------------------------------

const TIME_COLUMNS: &[&str] = &["time", "index"];
const VALUE_COLUMNS: &[&str] = &["error", "cum_err", "temp", "value"];
const GROUP_COLUMNS: &[&str] = &["gender", "mouse", "subject", "group"];

/// How to read a long-format file. Unset columns are auto-detected from
/// the usual names (`time`/`index`, `error`/`cum_err`/`temp`/`value`,
/// `gender`/`mouse`/`subject`/`group`).
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub kind: Option<MeasurementKind>,
    pub time_column: Option<String>,
    pub value_column: Option<String>,
    pub group_column: Option<String>,
}

/// Resolved positions of the three columns we read.
#[derive(Debug, Clone, PartialEq)]
struct Columns {
    time: usize,
    value: usize,
    group: usize,
    value_name: String,
}

fn find_column(
    headers: &[String],
    explicit: Option<&str>,
    candidates: &[&str],
    role: &str,
) -> Result<usize> {
    if let Some(name) = explicit {
        return headers
            .iter()
            .position(|h| h == name)
            .with_context(|| format!("missing {role} column '{name}'"));
    }
    candidates
        .iter()
        .find_map(|c| headers.iter().position(|h| h.eq_ignore_ascii_case(c)))
        .with_context(|| format!("no {role} column (expected one of {candidates:?})"))
}

fn resolve_columns(headers: &[String], opts: &LoadOptions) -> Result<Columns> {
    let time = find_column(headers, opts.time_column.as_deref(), TIME_COLUMNS, "time")?;
    let value = find_column(headers, opts.value_column.as_deref(), VALUE_COLUMNS, "value")?;
    let group = find_column(headers, opts.group_column.as_deref(), GROUP_COLUMNS, "group")?;
    Ok(Columns {
        time,
        value,
        group,
        value_name: headers[value].clone(),
    })
}

/// Guess what the values mean from the value column's name.
fn infer_kind(value_column: &str) -> MeasurementKind {
    match value_column.to_ascii_lowercase().as_str() {
        "cum_err" => MeasurementKind::CumulativeError,
        "temp" => MeasurementKind::Temperature,
        _ => MeasurementKind::Error,
    }
}

/// Lenient numeric parse: anything unparsable becomes NaN.
fn parse_number(s: &str) -> f64 {
    s.trim().parse::<f64>().unwrap_or(f64::NAN)
}

/// Drop rows whose time is not a number; they cannot be ordered.
fn finish(path: &Path, kind: MeasurementKind, samples: Vec<Sample>) -> Dataset {
    let total = samples.len();
    let samples: Vec<Sample> = samples.into_iter().filter(|s| !s.time.is_nan()).collect();
    if samples.len() < total {
        log::warn!(
            "{}: dropped {} rows without a numeric time",
            path.display(),
            total - samples.len()
        );
    }
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("dataset")
        .to_string();
    Dataset::from_samples(name, kind, samples)
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a dataset from a file.  Dispatch by extension.
///
/// Supported formats (one sample per row):
/// * `.csv`     – header row with time, value and group columns
/// * `.json`    – `[{ "time": 0, "value": 36.4, "group": "f1" }, ...]`
/// * `.parquet` – numeric time/value columns and a string group column
pub fn load_file(path: &Path, opts: &LoadOptions) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path, opts),
        "json" => load_json(path, opts),
        "parquet" | "pq" => load_parquet(path, opts),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path, opts: &LoadOptions) -> Result<Dataset> {
    // Short rows are kept; their missing fields read as empty.
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening CSV {}", path.display()))?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let cols = resolve_columns(&headers, opts)?;
    let kind = opts.kind.unwrap_or_else(|| infer_kind(&cols.value_name));

    let mut samples = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let time = parse_number(record.get(cols.time).unwrap_or(""));
        let value = parse_number(record.get(cols.value).unwrap_or(""));
        let group = record.get(cols.group).unwrap_or("").trim();
        samples.push(Sample::new(time, value, group));
    }

    Ok(finish(path, kind, samples))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "time": 0, "temp": 36.4, "mouse": "f1" },
///   ...
/// ]
/// ```
fn load_json(path: &Path, opts: &LoadOptions) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    if records.is_empty() {
        return Ok(finish(path, opts.kind.unwrap_or(MeasurementKind::Error), Vec::new()));
    }
    // Columns are the union of keys over all records, in first-seen order.
    let mut headers: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }
    let cols = resolve_columns(&headers, opts)?;
    let kind = opts.kind.unwrap_or_else(|| infer_kind(&cols.value_name));
    let (time_key, value_key, group_key) =
        (&headers[cols.time], &headers[cols.value], &headers[cols.group]);

    let mut samples = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        let time = obj.get(time_key).map_or(f64::NAN, json_to_f64);
        let value = obj.get(value_key).map_or(f64::NAN, json_to_f64);
        let group = obj.get(group_key).map(json_to_label).unwrap_or_default();
        samples.push(Sample::new(time, value, group.as_str()));
    }

    Ok(finish(path, kind, samples))
}

fn json_to_f64(val: &JsonValue) -> f64 {
    match val {
        JsonValue::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        JsonValue::String(s) => parse_number(s),
        _ => f64::NAN,
    }
}

fn json_to_label(val: &JsonValue) -> String {
    match val {
        JsonValue::String(s) => s.trim().to_string(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one sample per row.
///
/// Time and value columns may be any of Float64/Float32/Int64/Int32; the
/// group column is Utf8/LargeUtf8 or an integer subject number.
fn load_parquet(path: &Path, opts: &LoadOptions) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let cols = resolve_columns(&headers, opts)?;
    let kind = opts.kind.unwrap_or_else(|| infer_kind(&cols.value_name));
    let reader = builder.build().context("building parquet reader")?;

    let mut samples = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let time_col = batch.column(cols.time);
        let value_col = batch.column(cols.value);
        let group_col = batch.column(cols.group);

        for row in 0..batch.num_rows() {
            let time = extract_f64(time_col, row)
                .with_context(|| format!("Row {row}: failed to read time"))?;
            let value = extract_f64(value_col, row)
                .with_context(|| format!("Row {row}: failed to read value"))?;
            let group = extract_label(group_col, row);
            samples.push(Sample::new(time, value, group.as_str()));
        }
    }

    Ok(finish(path, kind, samples))
}

// -- Parquet / Arrow helpers --

/// Read a numeric cell as `f64`; nulls become NaN.
fn extract_f64(col: &Arc<dyn Array>, row: usize) -> Result<f64> {
    if col.is_null(row) {
        return Ok(f64::NAN);
    }
    let any = col.as_any();
    if let Some(arr) = any.downcast_ref::<Float64Array>() {
        Ok(arr.value(row))
    } else if let Some(arr) = any.downcast_ref::<Float32Array>() {
        Ok(arr.value(row) as f64)
    } else if let Some(arr) = any.downcast_ref::<Int64Array>() {
        Ok(arr.value(row) as f64)
    } else if let Some(arr) = any.downcast_ref::<Int32Array>() {
        Ok(arr.value(row) as f64)
    } else {
        bail!("expected a numeric column, got {:?}", col.data_type())
    }
}

/// Read a group label; integers become their decimal text.
fn extract_label(col: &Arc<dyn Array>, row: usize) -> String {
    if col.is_null(row) {
        return String::new();
    }
    match col.data_type() {
        DataType::Utf8 => col
            .as_any()
            .downcast_ref::<StringArray>()
            .map(|s| s.value(row).trim().to_string())
            .unwrap_or_default(),
        DataType::LargeUtf8 => col.as_string::<i64>().value(row).trim().to_string(),
        DataType::Int32 | DataType::Int64 | DataType::Float32 | DataType::Float64 => {
            extract_f64(col, row).map(|v| v.to_string()).unwrap_or_default()
        }
        other => format!("{other:?}"),
    }
}
