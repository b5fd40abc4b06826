/// Station-status feed client
///
/// Retrieves the GBFS-style `station_status.json` snapshot, locates the
/// station list inside it and flattens every station into a
/// `StationReading`.
///
/// Two payload shapes are seen in the wild:
///   { "data": { "stations": [ ... ] }, "last_updated": ..., "ttl": ... }
///   { "stations": [ ... ] }
/// The first is tried before the second.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::model::{CollectError, StationReading, FEED_BIKES_AVAILABLE, FEED_DOCKS_AVAILABLE};

// ============================================================================
// Fetch
// ============================================================================

/// GET the feed and parse the body as JSON.
///
/// Transport failures and non-2xx statuses are network errors; a body that
/// is not JSON is a parse error.
pub fn fetch_status(client: &reqwest::blocking::Client, url: &str) -> Result<Value, CollectError> {
    let response = client
        .get(url)
        .header("Accept", "application/json")
        .send()
        .map_err(|e| CollectError::RequestFailed(e.to_string()))?;

    if !response.status().is_success() {
        return Err(CollectError::HttpError(response.status().as_u16()));
    }

    let body = response
        .text()
        .map_err(|e| CollectError::RequestFailed(e.to_string()))?;

    parse_status_body(&body)
}

/// Parse a raw feed body.
pub fn parse_status_body(body: &str) -> Result<Value, CollectError> {
    serde_json::from_str(body).map_err(|e| CollectError::ParseError(e.to_string()))
}

// ============================================================================
// Station list extraction
// ============================================================================

/// Locate the station list: `data.stations` first, then top-level `stations`.
///
/// A path only counts if it holds a non-empty array. Fails with
/// `MissingData` when neither does.
pub fn extract_stations(payload: &Value) -> Result<&[Value], CollectError> {
    let nested = payload.get("data").and_then(|d| d.get("stations"));
    let top_level = payload.get("stations");

    [nested, top_level]
        .into_iter()
        .flatten()
        .filter_map(Value::as_array)
        .find(|stations| !stations.is_empty())
        .map(Vec::as_slice)
        .ok_or(CollectError::MissingData)
}

// ============================================================================
// Normalization
// ============================================================================

/// Format a fetch time the way it is stored: UTC, whole seconds, `Z` suffix.
pub fn format_fetched_at(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Flatten one station object. Returns `None` when the station has no
/// usable `station_id`; every other field is optional.
pub fn normalize_station(station: &Value, fetched_at_utc: &str) -> Option<StationReading> {
    let station_id = coerce_id(station.get("station_id")?)?;

    Some(StationReading {
        fetched_at_utc: fetched_at_utc.to_string(),
        station_id,
        name: station
            .get("name")
            .and_then(Value::as_str)
            .map(String::from),
        lat: station.get("lat").and_then(coerce_float),
        lon: station.get("lon").and_then(coerce_float),
        capacity: station.get("capacity").and_then(coerce_int),
        bikes_available: station
            .get(FEED_BIKES_AVAILABLE)
            .and_then(coerce_int)
            .unwrap_or(0),
        docks_available: station.get(FEED_DOCKS_AVAILABLE).and_then(coerce_int),
        is_installed: station.get("is_installed").and_then(coerce_bool),
        is_renting: station.get("is_renting").and_then(coerce_bool),
        last_reported: station.get("last_reported").and_then(coerce_int),
    })
}

/// Station ids arrive as strings in GBFS 2.x and as numbers in some 1.x feeds.
fn coerce_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Integer from a number or a numeric string. `"4"`, `"4.0"` and `4.0` all
/// give 4; fractional or non-finite values give `None`.
fn coerce_int(value: &Value) -> Option<i64> {
    let integral = |f: f64| (f.is_finite() && f.fract() == 0.0).then_some(f as i64);
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(integral))
        }
        _ => None,
    }
}

fn coerce_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// GBFS 1.x uses 0/1 for flags, 2.x uses booleans.
fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================
