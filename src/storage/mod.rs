//! Append-only CSV persistence for sampled readings.
//!
//! One row per sampling cycle, in the stable column order
//! `timestamp,pm1_0,pm2_5,pm10,co2,eco2,tvoc,ozone,temperature,humidity`,
//! with absent values as empty fields. The same file backs the
//! dashboard's history queries: the reader side tolerates a partially
//! written last line by skipping rows that fail to parse, since the
//! writer may be mid-append.

use crate::error::{MonitorError, Result};
use crate::sampling::reading::{Reading, PARAMETERS};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

/// The CSV header row.
pub const CSV_HEADER: [&str; 10] = [
    "timestamp",
    "pm1_0",
    "pm2_5",
    "pm10",
    "co2",
    "eco2",
    "tvoc",
    "ozone",
    "temperature",
    "humidity",
];

/// An ordered time series for one metric, shaped for the chart API.
#[derive(Debug, Clone, Serialize)]
pub struct Series {
    pub parameter: String,
    pub timestamps: Vec<String>,
    pub values: Vec<f64>,
    pub count: usize,
}

impl Series {
    fn empty(parameter: &str) -> Self {
        Self {
            parameter: parameter.to_string(),
            timestamps: Vec::new(),
            values: Vec::new(),
            count: 0,
        }
    }
}

/// Append-only store over the CSV data log.
#[derive(Debug, Clone)]
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the underlying data file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one reading as a CSV row, creating the file with its header
    /// row first if it does not exist yet.
    ///
    /// Prior rows are never touched; a failure here loses only the
    /// current cycle's row.
    pub fn append(&self, reading: &Reading) -> Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                MonitorError::persistence_error(format!(
                    "failed to open {}: {}",
                    self.path.display(),
                    e
                ))
            })?;

        let needs_header = file
            .metadata()
            .map(|m| m.len() == 0)
            .map_err(|e| MonitorError::persistence_error(e.to_string()))?;

        let mut writer = csv::Writer::from_writer(file);
        if needs_header {
            writer
                .write_record(CSV_HEADER)
                .map_err(|e| MonitorError::persistence_error(e.to_string()))?;
        }
        writer
            .write_record(reading.csv_record())
            .map_err(|e| MonitorError::persistence_error(e.to_string()))?;
        writer
            .flush()
            .map_err(|e| MonitorError::persistence_error(e.to_string()))?;

        Ok(())
    }

    /// The most recent complete reading in the log, if any.
    pub fn latest(&self) -> Result<Option<Reading>> {
        let mut latest = None;
        self.scan(|reading| latest = Some(reading))?;
        Ok(latest)
    }

    /// The series for one metric over the trailing `hours` hours, in log
    /// (and therefore timestamp) order. Rows where the metric is absent
    /// are left out.
    pub fn series(&self, parameter: &str, hours: i64) -> Result<Series> {
        let mut series = Series::empty(parameter);
        let cutoff = Utc::now() - Duration::hours(hours.max(0));

        self.scan(|reading| {
            if reading.timestamp < cutoff {
                return;
            }
            if let Some(value) = reading.value(parameter) {
                series.timestamps.push(reading.timestamp_string());
                series.values.push(value);
            }
        })?;

        series.count = series.values.len();
        Ok(series)
    }

    /// Walk every parseable data row in log order.
    ///
    /// A missing file reads as an empty log. Rows with an unparsable
    /// timestamp or field count are skipped: the writer may be mid-append
    /// on the last line, and a torn row must not poison a query.
    fn scan(&self, mut visit: impl FnMut(Reading)) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| MonitorError::persistence_error(e.to_string()))?;

        for record in reader.records() {
            let Ok(record) = record else { continue };
            let Some(reading) = parse_row(&record) else {
                continue;
            };
            visit(reading);
        }

        Ok(())
    }
}

/// Parse one CSV data row back into a reading.
///
/// Returns `None` for rows that are not a complete, well-formed cycle
/// record (short rows, bad timestamps). Individual metric fields that are
/// empty or malformed simply stay absent.
fn parse_row(record: &csv::StringRecord) -> Option<Reading> {
    let timestamp: DateTime<Utc> = record
        .get(0)?
        .parse::<DateTime<chrono::FixedOffset>>()
        .ok()?
        .with_timezone(&Utc);

    let mut reading = Reading::new(timestamp);
    for (i, parameter) in PARAMETERS.iter().enumerate() {
        if let Some(field) = record.get(i + 1) {
            if let Ok(value) = field.parse::<f64>() {
                reading.set_value(parameter, value);
            }
        }
    }
    Some(reading)
}
