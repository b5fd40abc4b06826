//! Snapshot aggregations over logged readings.
//!
//! A snapshot is every reading that shares one `fetched_at` instant. All
//! functions here are pure; the reference time is passed in so results are
//! deterministic in tests.

use chrono::{DateTime, Duration, TimeZone, Timelike, Utc};
use std::collections::BTreeMap;

use crate::model::LoggedReading;

/// Sum of `bikes_available` across all stations of one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotTotal<Tz: TimeZone> {
    pub at: DateTime<Tz>,
    pub total_bikes: f64,
}

/// Mean snapshot total for one hour of the day (UTC).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourlyAverage {
    pub hour: u32,
    pub mean_total: f64,
}

/// One bar of the top-stations chart.
#[derive(Debug, Clone, PartialEq)]
pub struct StationBar {
    pub label: String,
    pub bikes_available: f64,
}

/// The latest snapshot's busiest stations.
#[derive(Debug, Clone, PartialEq)]
pub struct TopStations {
    pub at: DateTime<Utc>,
    pub bars: Vec<StationBar>,
}

/// Totals per snapshot for snapshots no older than `window` before `now`,
/// ascending by time. Readings without a timestamp are ignored.
pub fn snapshot_totals(
    readings: &[LoggedReading],
    now: DateTime<Utc>,
    window: Duration,
) -> Vec<SnapshotTotal<Utc>> {
    let cutoff = now - window;
    totals_by_instant(
        readings
            .iter()
            .filter_map(|r| r.fetched_at.map(|at| (at, r.bikes_available)))
            .filter(|(at, _)| *at >= cutoff),
    )
}

/// Totals per snapshot over the whole history, with instants shown in `tz`.
pub fn local_snapshot_totals<Tz: TimeZone>(readings: &[LoggedReading], tz: &Tz) -> Vec<SnapshotTotal<Tz>> {
    totals_by_instant(readings.iter().filter_map(|r| r.fetched_at.map(|at| (at, r.bikes_available))))
        .into_iter()
        .map(|t| SnapshotTotal {
            at: t.at.with_timezone(tz),
            total_bikes: t.total_bikes,
        })
        .collect()
}

fn totals_by_instant<I>(points: I) -> Vec<SnapshotTotal<Utc>>
where
    I: Iterator<Item = (DateTime<Utc>, f64)>,
{
    let mut grouped: BTreeMap<DateTime<Utc>, f64> = BTreeMap::new();
    for (at, bikes) in points {
        *grouped.entry(at).or_insert(0.0) += bikes;
    }
    grouped
        .into_iter()
        .map(|(at, total_bikes)| SnapshotTotal { at, total_bikes })
        .collect()
}

/// Mean snapshot total per hour of day (UTC). Only hours that have at least
/// one snapshot appear, in ascending hour order.
pub fn hourly_averages(totals: &[SnapshotTotal<Utc>]) -> Vec<HourlyAverage> {
    let mut sums = [(0.0f64, 0usize); 24];
    for total in totals {
        let slot = &mut sums[total.at.hour() as usize];
        slot.0 += total.total_bikes;
        slot.1 += 1;
    }
    sums.iter()
        .enumerate()
        .filter(|(_, (_, count))| *count > 0)
        .map(|(hour, (sum, count))| HourlyAverage {
            hour: hour as u32,
            mean_total: sum / *count as f64,
        })
        .collect()
}

/// The latest timestamp in the whole log, regardless of any window.
pub fn latest_snapshot(readings: &[LoggedReading]) -> Option<DateTime<Utc>> {
    readings.iter().filter_map(|r| r.fetched_at).max()
}

/// Up to `limit` stations of the latest snapshot, most bikes first.
///
/// Ties keep log order. Returns `None` when no reading has a timestamp.
pub fn top_stations(readings: &[LoggedReading], limit: usize) -> Option<TopStations> {
    let at = latest_snapshot(readings)?;

    let mut bars: Vec<StationBar> = readings
        .iter()
        .filter(|r| r.fetched_at == Some(at))
        .map(|r| StationBar {
            label: r.label().to_string(),
            bikes_available: r.bikes_available,
        })
        .collect();

    // sort_by is stable
    bars.sort_by(|a, b| b.bikes_available.total_cmp(&a.bikes_available));
    bars.truncate(limit);

    Some(TopStations { at, bars })
}
