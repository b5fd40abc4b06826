//! PNG chart rendering.
//!
//! All line charts share one drawing routine over an `i64` x axis (epoch
//! seconds for time axes, plain hours for the daily-rhythm chart) with
//! explicit tick positions, so every chart controls its own labels.

use chrono::{DateTime, Offset, Utc};
use plotters::prelude::*;
use plotters::style::{register_font, FontStyle, FontTransform};
use std::error::Error;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::analysis::snapshots::{HourlyAverage, SnapshotTotal, TopStations};
use crate::logging::{self, Component};
use crate::model::ReportError;
use crate::report::labels::Labels;

const LINE_CHART_SIZE: (u32, u32) = (960, 720);
const BAR_CHART_SIZE: (u32, u32) = (1500, 900);
const FONT_FAMILY: &str = "sans-serif";

const HOUR: i64 = 3600;
const DAY: i64 = 24 * HOUR;

/// Searched in order when `report.font_path` is not set.
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

// ---------------------------------------------------------------------------
// Fonts
// ---------------------------------------------------------------------------

static FONT_REGISTERED: OnceLock<bool> = OnceLock::new();

/// The font file chart text will be drawn with: the configured path if it
/// exists, else the first system candidate found.
pub fn find_font(configured: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = configured {
        return path.is_file().then(|| path.to_path_buf());
    }
    FONT_CANDIDATES
        .iter()
        .map(PathBuf::from)
        .find(|p| p.is_file())
}

/// Register the chart font once per process.
pub fn ensure_font(configured: Option<&Path>) -> Result<(), ReportError> {
    let registered = FONT_REGISTERED.get_or_init(|| {
        let Some(path) = find_font(configured) else {
            return false;
        };
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                logging::warn(Component::Report, &format!("cannot read font {}: {}", path.display(), e));
                return false;
            }
        };
        // plotters keeps registered fonts for the life of the process
        let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
        match register_font(FONT_FAMILY, FontStyle::Normal, bytes) {
            Ok(()) => {
                logging::debug(Component::Report, &format!("chart font: {}", path.display()));
                true
            }
            Err(_) => {
                logging::warn(Component::Report, &format!("{} is not a usable font", path.display()));
                false
            }
        }
    });

    if *registered { Ok(()) } else { Err(ReportError::FontUnavailable) }
}

// ---------------------------------------------------------------------------
// Public chart entry points
// ---------------------------------------------------------------------------

/// Line chart of snapshot totals over time (UTC).
pub fn render_snapshot_totals(
    path: &Path,
    totals: &[SnapshotTotal<Utc>],
    labels: &Labels,
    window_days: i64,
) -> Result<(), ReportError> {
    let points: Vec<(i64, f64)> = totals.iter().map(|t| (t.at.timestamp(), t.total_bikes)).collect();
    let x_range = padded_range(&points, HOUR);
    let ticks = time_ticks(x_range.start, x_range.end, 10);
    let title = labels.total_title(window_days);

    draw_line_chart(
        path,
        &ChartText { title: &title, x_desc: labels.total_x, y_desc: labels.total_y },
        &points,
        x_range,
        ticks,
        &|x: &i64| utc_label(*x),
        LineOptions { rotate_x_labels: true, markers: false },
    )
    .map_err(render_error)
}

/// Mean total per hour of day, x axis ticked 0..23 whether or not every
/// hour has data.
pub fn render_hourly_pattern(path: &Path, hourly: &[HourlyAverage], labels: &Labels) -> Result<(), ReportError> {
    let points = hourly_points(hourly);

    draw_line_chart(
        path,
        &ChartText { title: labels.hourly_title, x_desc: labels.hourly_x, y_desc: labels.hourly_y },
        &points,
        0..23,
        hour_of_day_ticks(),
        &|x: &i64| x.to_string(),
        LineOptions { rotate_x_labels: false, markers: false },
    )
    .map_err(render_error)
}

/// Bar chart of the latest snapshot's top stations.
pub fn render_top_stations(
    path: &Path,
    top: Option<&TopStations>,
    labels: &Labels,
    top_n: usize,
) -> Result<(), ReportError> {
    let stamp = top
        .map(|t| t.at.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| labels.no_snapshot.to_string());
    let title = format!("{} {}", labels.top_title(top_n), stamp);
    let bars: Vec<(String, f64)> = top
        .map(|t| t.bars.iter().map(|b| (b.label.clone(), b.bikes_available)).collect())
        .unwrap_or_default();

    draw_bar_chart(path, &ChartText { title: &title, x_desc: labels.top_x, y_desc: labels.top_y }, &bars)
        .map_err(render_error)
}

/// Snapshot totals in a local zone with hourly ticks on a 12-hour clock.
pub fn render_clock_view(
    path: &Path,
    totals: &[SnapshotTotal<chrono_tz::Tz>],
    tz: chrono_tz::Tz,
    labels: &Labels,
) -> Result<(), ReportError> {
    let points: Vec<(i64, f64)> = totals.iter().map(|t| (t.at.timestamp(), t.total_bikes)).collect();
    let x_range = padded_range(&points, HOUR / 2);
    let offset = totals
        .first()
        .map(|t| t.at.offset().fix().local_minus_utc() as i64)
        .unwrap_or(0);
    let ticks = hourly_ticks(x_range.start, x_range.end, offset);
    let x_desc = format!("{} ({})", labels.clock_x, tz.name());

    draw_line_chart(
        path,
        &ChartText { title: labels.clock_title, x_desc: &x_desc, y_desc: labels.clock_y },
        &points,
        x_range,
        ticks,
        &|x: &i64| clock_label(*x, tz),
        LineOptions { rotate_x_labels: true, markers: true },
    )
    .map_err(render_error)
}

// ---------------------------------------------------------------------------
// Drawing
// ---------------------------------------------------------------------------

struct ChartText<'a> {
    title: &'a str,
    x_desc: &'a str,
    y_desc: &'a str,
}

struct LineOptions {
    rotate_x_labels: bool,
    markers: bool,
}

fn render_error(err: Box<dyn Error>) -> ReportError {
    ReportError::Render(err.to_string())
}

fn draw_line_chart(
    path: &Path,
    text: &ChartText,
    points: &[(i64, f64)],
    x_range: Range<i64>,
    x_ticks: Vec<i64>,
    x_label: &dyn Fn(&i64) -> String,
    options: LineOptions,
) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(path, LINE_CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let y_max = y_upper_bound(points.iter().map(|p| p.1));
    let mut chart = ChartBuilder::on(&root)
        .caption(text.title, (FONT_FAMILY, 22))
        .margin(15)
        .x_label_area_size(if options.rotate_x_labels { 90 } else { 40 })
        .y_label_area_size(60)
        .build_cartesian_2d(x_range.with_key_points(x_ticks), 0.0..y_max)?;

    let mut x_font = (FONT_FAMILY, 12).into_font();
    if options.rotate_x_labels {
        x_font = x_font.transform(FontTransform::Rotate90);
    }

    chart
        .configure_mesh()
        .x_desc(text.x_desc)
        .y_desc(text.y_desc)
        .x_label_formatter(x_label)
        .y_label_formatter(&|y: &f64| format!("{:.0}", y))
        .x_label_style(x_font)
        .axis_desc_style((FONT_FAMILY, 15))
        .draw()?;

    chart.draw_series(LineSeries::new(points.iter().copied(), &BLUE))?;
    if options.markers {
        chart.draw_series(points.iter().map(|&(x, y)| Circle::new((x, y), 3, BLUE.filled())))?;
    }

    root.present()?;
    Ok(())
}

fn draw_bar_chart(path: &Path, text: &ChartText, bars: &[(String, f64)]) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(path, BAR_CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let slots = bars.len().max(1) as u32;
    let y_max = y_upper_bound(bars.iter().map(|b| b.1));
    let mut chart = ChartBuilder::on(&root)
        .caption(text.title, (FONT_FAMILY, 22))
        .margin(15)
        .x_label_area_size(220)
        .y_label_area_size(60)
        .build_cartesian_2d((0u32..slots).into_segmented(), 0.0..y_max)?;

    let label_of = |v: &SegmentValue<u32>| match v {
        SegmentValue::CenterOf(i) => bars
            .get(*i as usize)
            .map(|(label, _)| label.clone())
            .unwrap_or_default(),
        _ => String::new(),
    };

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(bars.len().max(1))
        .x_desc(text.x_desc)
        .y_desc(text.y_desc)
        .x_label_formatter(&label_of)
        .y_label_formatter(&|y: &f64| format!("{:.0}", y))
        .x_label_style((FONT_FAMILY, 13).into_font().transform(FontTransform::Rotate90))
        .axis_desc_style((FONT_FAMILY, 15))
        .draw()?;

    chart.draw_series(
        Histogram::vertical(&chart)
            .style(BLUE.filled())
            .margin(8)
            .data(bars.iter().enumerate().map(|(i, (_, bikes))| (i as u32, *bikes))),
    )?;

    root.present()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Axis helpers
// ---------------------------------------------------------------------------

/// `MM-DD HH:MM` in UTC for an epoch-seconds tick.
fn utc_label(secs: i64) -> String {
    DateTime::from_timestamp(secs, 0)
        .map(|t| t.format("%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

/// 12-hour clock label in `tz`, e.g. `10 PM`.
fn clock_label(secs: i64, tz: chrono_tz::Tz) -> String {
    DateTime::from_timestamp(secs, 0)
        .map(|t| t.with_timezone(&tz).format("%I %p").to_string())
        .unwrap_or_default()
}

/// Every hour of the day, whether or not it has data.
fn hour_of_day_ticks() -> Vec<i64> {
    (0..24).collect()
}

/// Only hours with data get a point; the gaps stay open.
fn hourly_points(hourly: &[HourlyAverage]) -> Vec<(i64, f64)> {
    hourly.iter().map(|h| (h.hour as i64, h.mean_total)).collect()
}

/// Headroom above the largest value; never an empty range.
fn y_upper_bound<I: Iterator<Item = f64>>(values: I) -> f64 {
    let max = values.fold(0.0f64, f64::max);
    if max <= 0.0 { 1.0 } else { max * 1.1 }
}

/// x extent of `points`, widened by `pad` on both sides when all points
/// share one x. An empty series gets a unit range.
fn padded_range(points: &[(i64, f64)], pad: i64) -> Range<i64> {
    let min = points.iter().map(|p| p.0).min();
    let max = points.iter().map(|p| p.0).max();
    match (min, max) {
        (Some(lo), Some(hi)) if lo < hi => lo..hi,
        (Some(lo), Some(_)) => (lo - pad)..(lo + pad),
        _ => 0..1,
    }
}

/// Evenly spaced, calendar-aligned ticks (UTC) with at most `max_ticks`.
fn time_ticks(start: i64, end: i64, max_ticks: i64) -> Vec<i64> {
    const STEPS: [i64; 9] = [HOUR, 2 * HOUR, 3 * HOUR, 6 * HOUR, 12 * HOUR, DAY, 2 * DAY, 7 * DAY, 28 * DAY];
    let span = (end - start).max(1);
    let step = STEPS
        .iter()
        .copied()
        .find(|step| span / step < max_ticks)
        .unwrap_or(STEPS[STEPS.len() - 1]);

    let ticks = aligned_ticks(start, end, step, 0);
    if ticks.is_empty() { vec![start, end] } else { ticks }
}

/// One tick per local hour, where local = UTC + `offset_secs`.
fn hourly_ticks(start: i64, end: i64, offset_secs: i64) -> Vec<i64> {
    aligned_ticks(start, end, HOUR, offset_secs)
}

fn aligned_ticks(start: i64, end: i64, step: i64, offset_secs: i64) -> Vec<i64> {
    let mut tick = (start + offset_secs).div_euclid(step) * step - offset_secs;
    if tick < start {
        tick += step;
    }
    let mut ticks = Vec::new();
    while tick <= end {
        ticks.push(tick);
        tick += step;
    }
    ticks
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_y_upper_bound_never_empty() {
        assert_eq!(y_upper_bound(std::iter::empty()), 1.0);
        assert_eq!(y_upper_bound([0.0, 0.0].into_iter()), 1.0);
        assert!((y_upper_bound([10.0, 50.0].into_iter()) - 55.0).abs() < 1e-9);
    }

    #[test]
    fn test_padded_range_single_point() {
        assert_eq!(padded_range(&[(7200, 1.0)], HOUR), 3600..10800);
        assert_eq!(padded_range(&[(10, 1.0), (40, 2.0)], HOUR), 10..40);
        assert_eq!(padded_range(&[], HOUR), 0..1);
    }

    #[test]
    fn test_time_ticks_are_aligned_and_bounded() {
        let start = 1_740_000_000; // not on an hour boundary
        let end = start + 3 * DAY;
        let ticks = time_ticks(start, end, 10);
        assert!(!ticks.is_empty() && ticks.len() <= 10);
        assert!(ticks.iter().all(|t| *t >= start && *t <= end));
        assert!(ticks.iter().all(|t| t % HOUR == 0));
    }

    #[test]
    fn test_time_ticks_short_span_falls_back_to_ends() {
        assert_eq!(time_ticks(100, 200, 10), vec![100, 200]);
    }

    #[test]
    fn test_hourly_ticks_follow_local_offset() {
        // India is UTC+5:30, so local hours start at :30 UTC
        let offset = 5 * HOUR + 30 * 60;
        let ticks = hourly_ticks(0, 3 * HOUR, offset);
        assert_eq!(ticks, vec![30 * 60, HOUR + 30 * 60, 2 * HOUR + 30 * 60]);
    }

    #[test]
    fn test_hour_of_day_axis_ticks_every_hour() {
        let hourly = [
            HourlyAverage { hour: 6, mean_total: 40.0 },
            HourlyAverage { hour: 18, mean_total: 25.0 },
        ];
        assert_eq!(hourly_points(&hourly), vec![(6, 40.0), (18, 25.0)]);
        assert_eq!(hour_of_day_ticks(), (0..=23).collect::<Vec<i64>>());
    }

    #[test]
    fn test_clock_label_uses_local_twelve_hour_time() {
        let vienna = chrono_tz::Europe::Vienna;
        // 2025-03-10 21:00 UTC is 22:00 CET
        let evening = Utc.with_ymd_and_hms(2025, 3, 10, 21, 0, 0).unwrap().timestamp();
        assert_eq!(clock_label(evening, vienna), "10 PM");
        // after the switch to CEST on 2025-03-30
        let morning = Utc.with_ymd_and_hms(2025, 4, 2, 7, 0, 0).unwrap().timestamp();
        assert_eq!(clock_label(morning, vienna), "09 AM");
        assert_eq!(clock_label(evening, chrono_tz::UTC), "09 PM");
    }

    #[test]
    fn test_utc_label_format() {
        let t = Utc.with_ymd_and_hms(2025, 3, 1, 17, 5, 0).unwrap().timestamp();
        assert_eq!(utc_label(t), "03-01 17:05");
    }

    #[test]
    fn test_find_font_respects_configured_path() {
        let missing = Path::new("/definitely/not/a/font.ttf");
        assert_eq!(find_font(Some(missing)), None);
    }
}
