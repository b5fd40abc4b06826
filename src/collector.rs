//! Collector: one fetch of the station-status feed appended to the log.
//!
//! Single attempt per invocation. Repetition and retries belong to whatever
//! schedules the process (cron, systemd timer).

use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::config::Config;
use crate::ingest::feed;
use crate::logging::{self, Component};
use crate::model::CollectError;
use crate::store;

/// Outcome of a successful collector run.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectSummary {
    /// Stations present in the payload.
    pub stations_seen: usize,
    /// Lines appended to the log.
    pub written: usize,
    /// Stations dropped for lacking a `station_id`.
    pub skipped: usize,
    pub fetched_at: String,
}

/// Build the HTTP client used for the feed request.
pub fn build_client(config: &Config) -> Result<reqwest::blocking::Client, CollectError> {
    reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(config.feed.timeout_secs))
        .user_agent(config.feed.user_agent.clone())
        .build()
        .map_err(|e| CollectError::RequestFailed(e.to_string()))
}

/// Fetch once and append, using the real clock.
pub fn run(config: &Config) -> Result<CollectSummary, CollectError> {
    let client = build_client(config)?;
    run_with_client(config, &client, Utc::now())
}

/// Fetch once and append, stamping every reading with `now`.
///
/// Nothing is written unless the request, the JSON parse and the station
/// lookup all succeed.
pub fn run_with_client(
    config: &Config,
    client: &reqwest::blocking::Client,
    now: DateTime<Utc>,
) -> Result<CollectSummary, CollectError> {
    logging::debug(
        Component::Feed,
        &format!("GET {}", config.feed.status_url),
    );

    let payload = feed::fetch_status(client, &config.feed.status_url).inspect_err(|e| {
        logging::log_collect_failure("Station status fetch", e);
    })?;

    let stations = feed::extract_stations(&payload).inspect_err(|e| {
        logging::log_collect_failure("Station list lookup", e);
    })?;

    let fetched_at = feed::format_fetched_at(now);
    let mut readings = Vec::with_capacity(stations.len());
    for (i, station) in stations.iter().enumerate() {
        match feed::normalize_station(station, &fetched_at) {
            Some(reading) => readings.push(reading),
            None => logging::debug(
                Component::Collector,
                &format!("station #{} has no station_id, skipped", i),
            ),
        }
    }

    let written = store::append_readings(&config.storage.log_path, &readings).map_err(|e| {
        let err = CollectError::Io(format!("{}: {}", config.storage.log_path.display(), e));
        logging::log_collect_failure("Log append", &err);
        err
    })?;

    let summary = CollectSummary {
        stations_seen: stations.len(),
        written,
        skipped: stations.len() - readings.len(),
        fetched_at,
    };
    logging::log_run_summary(Component::Collector, summary.stations_seen, summary.written, summary.skipped);

    Ok(summary)
}
