/// Integration tests for the reporter: log -> aggregate -> charts + page.
///
/// Tests verify:
/// 1. Missing and empty logs fail before any artifact is written
/// 2. Aggregations over a log written by the store match hand-computed values
/// 3. Legacy 4-field lines and malformed lines are tolerated
/// 4. A full run writes all four artifacts (skipped when no chart font exists)
///
/// Run with: cargo test --test reporter_pipeline

use bikeshare_monitor::analysis::snapshots;
use bikeshare_monitor::config::Config;
use bikeshare_monitor::model::{ReportError, StationReading};
use bikeshare_monitor::report::{self, charts};
use bikeshare_monitor::store;

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "bikeshare_report_{}_{}_{}",
        tag,
        std::process::id(),
        DIR_COUNTER.fetch_add(1, Ordering::SeqCst)
    ));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn test_config(dir: &Path) -> Config {
    let mut config = Config::default();
    config.storage.log_path = dir.join("data").join("bikeshare.jsonl");
    config.report.output_dir = dir.join("docs");
    config.clock_view.output_path = dir.join("data").join("total_bikes_over_time.png");
    config
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 20, 12, 0, 0).unwrap()
}

fn reading(at: DateTime<Utc>, id: &str, name: Option<&str>, bikes: i64) -> StationReading {
    StationReading {
        fetched_at_utc: at.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        station_id: id.to_string(),
        name: name.map(String::from),
        lat: Some(48.2),
        lon: Some(16.37),
        capacity: Some(20),
        bikes_available: bikes,
        docks_available: Some(20 - bikes),
        is_installed: Some(true),
        is_renting: Some(true),
        last_reported: None,
    }
}

// ---------------------------------------------------------------------------
// File-level failures
// ---------------------------------------------------------------------------

#[test]
fn test_missing_log_is_no_data_and_writes_nothing() {
    let dir = temp_dir("nodata");
    let config = test_config(&dir);

    let err = report::run(&config, now()).unwrap_err();
    assert_eq!(err, ReportError::NoData(config.storage.log_path.clone()));
    assert!(err.to_string().contains("bikeshare collect"));
    assert!(!config.report.output_dir.exists());

    let err = report::clock_view::run(&config).unwrap_err();
    assert!(matches!(err, ReportError::NoData(_)));
    assert!(!config.clock_view.output_path.exists());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_empty_log_is_empty_data_and_writes_nothing() {
    let dir = temp_dir("empty");
    let config = test_config(&dir);
    std::fs::create_dir_all(config.storage.log_path.parent().unwrap()).unwrap();
    std::fs::write(&config.storage.log_path, "").unwrap();

    let err = report::run(&config, now()).unwrap_err();
    assert_eq!(err, ReportError::EmptyData(config.storage.log_path.clone()));
    assert!(!config.report.output_dir.exists());

    std::fs::write(&config.storage.log_path, "\n  \n").unwrap();
    assert!(matches!(report::run(&config, now()), Err(ReportError::EmptyData(_))));

    let _ = std::fs::remove_dir_all(&dir);
}

// ---------------------------------------------------------------------------
// Aggregation over a stored log
// ---------------------------------------------------------------------------

#[test]
fn test_aggregations_over_stored_log() {
    let dir = temp_dir("aggregate");
    let config = test_config(&dir);

    let t_old = now() - Duration::days(9);
    let t_day1 = Utc.with_ymd_and_hms(2025, 3, 18, 10, 0, 0).unwrap();
    let t_day2 = Utc.with_ymd_and_hms(2025, 3, 19, 10, 15, 0).unwrap();
    let t_latest = Utc.with_ymd_and_hms(2025, 3, 20, 11, 45, 0).unwrap();

    let mut rows = vec![
        reading(t_old, "1", Some("Karlsplatz"), 19),
        reading(t_day1, "1", Some("Karlsplatz"), 3),
        reading(t_day1, "2", Some("Praterstern"), 5),
        reading(t_day2, "1", Some("Karlsplatz"), 7),
        reading(t_day2, "2", Some("Praterstern"), 5),
    ];
    rows.extend((0..20).map(|i| reading(t_latest, &format!("s{}", i), Some(""), i % 4)));
    assert_eq!(store::append_readings(&config.storage.log_path, &rows).unwrap(), rows.len());

    let readings = store::read_log(&config.storage.log_path).unwrap();
    assert_eq!(readings.len(), 25);

    let totals = snapshots::snapshot_totals(&readings, now(), Duration::days(7));
    let instants: Vec<_> = totals.iter().map(|t| t.at).collect();
    assert_eq!(instants, vec![t_day1, t_day2, t_latest]);
    assert_eq!(totals[0].total_bikes, 8.0);
    assert_eq!(totals[1].total_bikes, 12.0);

    let hourly = snapshots::hourly_averages(&totals);
    let ten = hourly.iter().find(|h| h.hour == 10).unwrap();
    assert_eq!(ten.mean_total, 10.0);

    let top = snapshots::top_stations(&readings, config.report.top_n).unwrap();
    assert_eq!(top.at, t_latest);
    assert_eq!(top.bars.len(), 15);
    assert_eq!(top.bars[0].label, "s3"); // first station with 3 bikes in log order
    assert!(top.bars.windows(2).all(|w| w[0].bikes_available >= w[1].bikes_available));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_legacy_and_malformed_lines_are_tolerated() {
    let dir = temp_dir("legacy");
    let config = test_config(&dir);
    std::fs::create_dir_all(config.storage.log_path.parent().unwrap()).unwrap();

    let log = concat!(
        r#"{"fetched_at_utc":"2025-03-19T08:00:00Z","station_id":"12","bikes_available":4,"docks_available":6}"#, "\n",
        "this line was cut off by a full disk\n",
        r#"{"fetched_at_utc":"2025-03-19T08:00:00Z","station_id":42,"name":"","bikes_available":"x"}"#, "\n",
        r#"{"fetched_at_utc":"garbage","station_id":"9","bikes_available":50}"#, "\n",
    );
    std::fs::write(&config.storage.log_path, log).unwrap();

    let readings = store::read_log(&config.storage.log_path).unwrap();
    assert_eq!(readings.len(), 3);

    let totals = snapshots::snapshot_totals(&readings, now(), Duration::days(7));
    assert_eq!(totals.len(), 1);
    assert_eq!(totals[0].total_bikes, 4.0);

    let top = snapshots::top_stations(&readings, 15).unwrap();
    let labels: Vec<_> = top.bars.iter().map(|b| b.label.as_str()).collect();
    assert_eq!(labels, vec!["12", "42"]);

    let _ = std::fs::remove_dir_all(&dir);
}

// ---------------------------------------------------------------------------
// Full render
// ---------------------------------------------------------------------------

#[test]
fn test_full_report_writes_all_artifacts() {
    let dir = temp_dir("full");
    let config = test_config(&dir);
    if charts::find_font(config.report.font_path.as_deref()).is_none() {
        eprintln!("skipping: no chart font found on this system");
        return;
    }

    let rows: Vec<_> = (0..6)
        .flat_map(|h| {
            let at = now() - Duration::hours(h * 3);
            vec![
                reading(at, "1", Some("Westbahnhof"), 3 + h),
                reading(at, "2", Some("Schwedenplatz"), 8 - h),
            ]
        })
        .collect();
    store::append_readings(&config.storage.log_path, &rows).unwrap();

    let artifacts = report::run(&config, now()).unwrap();
    for path in artifacts.paths() {
        let meta = std::fs::metadata(path).unwrap();
        assert!(meta.len() > 0, "{} is empty", path.display());
    }
    let html = std::fs::read_to_string(&artifacts.index_html).unwrap();
    assert!(html.contains("2025-03-20 12:00 UTC"));

    let clock = report::clock_view::run(&config).unwrap();
    assert!(clock.exists());

    let _ = std::fs::remove_dir_all(&dir);
}
