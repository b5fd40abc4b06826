/// Core data types for the bike-share station monitor.
///
/// This module defines the shared domain model imported by all other modules:
/// the record written once per station per fetch, the tolerant read-side view
/// of a log line, and the error types for each component. It contains no I/O.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Feed field names
// ---------------------------------------------------------------------------

/// Upstream key for the number of bikes currently available at a station.
pub const FEED_BIKES_AVAILABLE: &str = "num_bikes_available";

/// Upstream key for the number of free docks at a station.
pub const FEED_DOCKS_AVAILABLE: &str = "num_docks_available";

// ---------------------------------------------------------------------------
// Reading types
// ---------------------------------------------------------------------------

/// One station's status at one fetch. Serialized as a single JSON line.
///
/// Field order is the order of the log format. Absent optionals are written
/// as `null`, so every line carries all eleven keys. Lines written by the
/// older minimal producer only carry `fetched_at_utc`, `station_id`,
/// `bikes_available` and `docks_available`; they deserialize into the same
/// shape with the remaining fields `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationReading {
    pub fetched_at_utc: String, // "2025-03-01T17:05:00Z"
    pub station_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub capacity: Option<i64>,
    #[serde(default)]
    pub bikes_available: i64,
    #[serde(default)]
    pub docks_available: Option<i64>,
    #[serde(default)]
    pub is_installed: Option<bool>,
    #[serde(default)]
    pub is_renting: Option<bool>,
    #[serde(default)]
    pub last_reported: Option<i64>, // epoch seconds, as reported upstream
}

/// A log line as the reporter sees it after coercion.
///
/// Nothing here can fail: a bad timestamp becomes `None`, a bad bike count
/// becomes 0.0, a missing station id becomes an empty string.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggedReading {
    pub fetched_at: Option<DateTime<Utc>>,
    pub station_id: String,
    pub name: Option<String>,
    pub bikes_available: f64,
}

impl LoggedReading {
    /// Display label for charts: the station name when non-empty,
    /// otherwise the station id.
    pub fn label(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.station_id,
        }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that stop a collector run. Nothing is appended when any of these
/// occur before the write phase.
#[derive(Debug, PartialEq)]
pub enum CollectError {
    /// The request could not be sent or the body could not be read.
    RequestFailed(String),
    /// Non-2xx HTTP response from the feed.
    HttpError(u16),
    /// The response body is not valid JSON.
    ParseError(String),
    /// Neither `data.stations` nor top-level `stations` held a non-empty list.
    MissingData,
    /// The log file or its directory could not be written.
    Io(String),
}

impl CollectError {
    /// True for failures of the request itself (transport or HTTP status).
    pub fn is_network(&self) -> bool {
        matches!(self, CollectError::RequestFailed(_) | CollectError::HttpError(_))
    }
}

impl std::fmt::Display for CollectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectError::RequestFailed(msg) => write!(f, "Request failed: {}", msg),
            CollectError::HttpError(code) => write!(f, "HTTP error: {}", code),
            CollectError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            CollectError::MissingData => write!(f, "No station data found"),
            CollectError::Io(msg) => write!(f, "Log write failed: {}", msg),
        }
    }
}

impl std::error::Error for CollectError {}

/// Errors that stop a reporter run.
#[derive(Debug, PartialEq)]
pub enum ReportError {
    /// The log file does not exist.
    NoData(PathBuf),
    /// The log file exists but holds no records.
    EmptyData(PathBuf),
    Io(String),
    /// The configuration could not be applied (e.g. unknown zone).
    Config(String),
    /// A chart could not be drawn or encoded.
    Render(String),
    /// No font could be loaded for chart text.
    FontUnavailable,
}

impl std::fmt::Display for ReportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportError::NoData(path) => write!(
                f,
                "No data found at {}. Run `bikeshare collect` first.",
                path.display()
            ),
            ReportError::EmptyData(path) => write!(
                f,
                "{} is empty. Run `bikeshare collect` first to gather data.",
                path.display()
            ),
            ReportError::Io(msg) => write!(f, "I/O error: {}", msg),
            ReportError::Config(msg) => write!(f, "{}", msg),
            ReportError::Render(msg) => write!(f, "Chart rendering failed: {}", msg),
            ReportError::FontUnavailable => write!(
                f,
                "No font available for chart text; set report.font_path in the config"
            ),
        }
    }
}

impl std::error::Error for ReportError {}

impl From<std::io::Error> for ReportError {
    fn from(err: std::io::Error) -> Self {
        ReportError::Io(err.to_string())
    }
}
