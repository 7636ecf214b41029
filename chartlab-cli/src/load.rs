//! OHLCV CSV loading.
//!
//! Columns are matched by header, case-insensitively:
//! - `date`, `time`, `datetime`, `timestamp`, `x` → x (numeric, or a date parsed to Unix seconds)
//! - `open`, `high`, `low`, `close` (or `price`, `adj close`) → prices
//! - `volume`, `vol` → volume
//!
//! Only a close column is required. Missing open/high/low default to the close,
//! a missing volume to 0, a missing x column to the row index. Empty price and
//! volume cells load as NaN so the sample is treated as void downstream; an x
//! cell must always parse, since x positions every sample on the axis.

use chartlab_core::domain::{Sample, VecSeries};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::ReaderBuilder;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("no close column (expected one of: close, price, adj close)")]
    MissingClose,

    #[error("line {line}: cannot parse '{value}' as a number in column '{column}'")]
    BadNumber {
        line: u64,
        column: String,
        value: String,
    },

    #[error("line {line}: cannot parse '{value}' as a number or date")]
    BadX { line: u64, value: String },

    #[error("file has a header but no rows")]
    Empty,
}

#[derive(Debug, Default)]
struct Columns {
    x: Option<usize>,
    open: Option<usize>,
    high: Option<usize>,
    low: Option<usize>,
    close: Option<usize>,
    volume: Option<usize>,
}

impl Columns {
    fn detect(headers: &csv::StringRecord) -> Self {
        let mut cols = Columns::default();
        for (idx, raw) in headers.iter().enumerate() {
            let slot = match raw.trim().to_lowercase().as_str() {
                "date" | "time" | "datetime" | "timestamp" | "x" => &mut cols.x,
                "open" => &mut cols.open,
                "high" => &mut cols.high,
                "low" => &mut cols.low,
                "close" | "price" | "adj close" | "adj_close" => &mut cols.close,
                "volume" | "vol" => &mut cols.volume,
                _ => continue,
            };
            // First match wins: "close" before "adj close" keeps raw prices.
            slot.get_or_insert(idx);
        }
        cols
    }
}

/// Parse an x cell: a plain number, an RFC 3339 timestamp, `YYYY-MM-DD HH:MM:SS`,
/// or `YYYY-MM-DD` (midnight UTC). Dates become Unix seconds.
pub fn parse_x(value: &str) -> Option<f64> {
    let v = value.trim();
    if let Ok(n) = v.parse::<f64>() {
        return Some(n);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(v) {
        return Some(dt.timestamp() as f64);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(v, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc().timestamp() as f64);
    }
    NaiveDate::parse_from_str(v, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp() as f64)
}

fn parse_number(
    record: &csv::StringRecord,
    idx: usize,
    column: &str,
    line: u64,
) -> Result<f64, LoadError> {
    let raw = record.get(idx).unwrap_or("").trim();
    if raw.is_empty() {
        return Ok(f64::NAN);
    }
    raw.parse::<f64>().map_err(|_| LoadError::BadNumber {
        line,
        column: column.to_string(),
        value: raw.to_string(),
    })
}

/// Load an OHLCV CSV file into a series.
pub fn load_csv(path: &Path) -> Result<VecSeries, LoadError> {
    let mut reader = ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(|source| LoadError::Open {
            path: path.to_path_buf(),
            source,
        })?;

    let cols = Columns::detect(reader.headers()?);
    let close_idx = cols.close.ok_or(LoadError::MissingClose)?;

    let mut samples = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let line = record.position().map_or(row as u64 + 2, |p| p.line());

        let close = parse_number(&record, close_idx, "close", line)?;
        let field = |idx: Option<usize>, name: &str, fallback: f64| match idx {
            Some(i) => parse_number(&record, i, name, line),
            None => Ok(fallback),
        };
        let open = field(cols.open, "open", close)?;
        let high = field(cols.high, "high", close)?;
        let low = field(cols.low, "low", close)?;
        let volume = field(cols.volume, "volume", 0.0)?;

        let x = match cols.x {
            Some(i) => {
                let raw = record.get(i).unwrap_or("");
                parse_x(raw).ok_or_else(|| LoadError::BadX {
                    line,
                    value: raw.to_string(),
                })?
            }
            None => row as f64,
        };

        samples.push(Sample::new(x, open, high, low, close, volume));
    }

    if samples.is_empty() {
        return Err(LoadError::Empty);
    }

    let unsorted = samples.windows(2).filter(|w| w[1].x < w[0].x).count();
    if unsorted > 0 {
        warn!(unsorted, "x column is out of order; every frame will keep the full range");
    }
    let void = samples.iter().filter(|s| s.is_void()).count();
    debug!(rows = samples.len(), void, path = %path.display(), "loaded csv");

    Ok(VecSeries::from_samples(samples))
}
