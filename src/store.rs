//! Append-only JSONL log of station readings.
//!
//! One `StationReading` per line, UTF-8, no header. Lines are only ever
//! appended; nothing here truncates, rewrites or compacts the file.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use crate::logging::{self, Component};
use crate::model::{LoggedReading, ReportError, StationReading};

// ---------------------------------------------------------------------------
// Write side
// ---------------------------------------------------------------------------

/// Append `readings` to the log at `path`, creating the parent directory and
/// the file if needed. Returns the number of lines written.
///
/// Each line goes out in a single `write_all` on an `O_APPEND` handle, so a
/// line is never interleaved with another. A failure part-way through leaves
/// the lines already written in place.
pub fn append_readings(path: &Path, readings: &[StationReading]) -> io::Result<usize> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;

    let mut written = 0;
    for reading in readings {
        let mut line = serde_json::to_string(reading)?;
        line.push('\n');
        file.write_all(line.as_bytes())?;
        written += 1;
    }
    file.flush()?;

    Ok(written)
}

// ---------------------------------------------------------------------------
// Read side
// ---------------------------------------------------------------------------

/// Read every record in the log.
///
/// Fails with `NoData` when the file does not exist and `EmptyData` when it
/// holds no parseable record. Lines that are not JSON objects are skipped
/// with a warning; bad fields inside a record are coerced, never fatal.
pub fn read_log(path: &Path) -> Result<Vec<LoggedReading>, ReportError> {
    if !path.exists() {
        return Err(ReportError::NoData(path.to_path_buf()));
    }

    // a torn multi-byte character must not make the whole log unreadable
    let bytes = fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes);
    let mut readings = Vec::new();
    let mut skipped = 0usize;

    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(line) {
            Some(reading) => readings.push(reading),
            None => {
                skipped += 1;
                logging::debug(Component::Store, &format!("line {} is not a JSON record", i + 1));
            }
        }
    }

    if skipped > 0 {
        logging::warn(
            Component::Store,
            &format!("skipped {} unreadable line(s) in {}", skipped, path.display()),
        );
    }

    if readings.is_empty() {
        return Err(ReportError::EmptyData(path.to_path_buf()));
    }
    Ok(readings)
}

/// Coerce one log line. Returns `None` only if the line is not a JSON object.
pub fn parse_line(line: &str) -> Option<LoggedReading> {
    let value: Value = serde_json::from_str(line).ok()?;
    let record = value.as_object()?;

    Some(LoggedReading {
        fetched_at: record
            .get("fetched_at_utc")
            .and_then(Value::as_str)
            .and_then(parse_timestamp),
        station_id: record.get("station_id").map(display_id).unwrap_or_default(),
        name: record
            .get("name")
            .and_then(Value::as_str)
            .map(String::from),
        bikes_available: record
            .get("bikes_available")
            .and_then(coerce_count)
            .unwrap_or(0.0),
    })
}

/// Parse a stored timestamp. RFC 3339 (with `Z` or an offset) is the normal
/// form; a bare `YYYY-MM-DDTHH:MM:SS[.f]` is read as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn display_id(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn coerce_count(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}
