//! Static index page linking the three charts.

use askama::Template;
use chrono::{DateTime, Utc};
use std::path::Path;

use crate::model::ReportError;
use crate::report::labels::Labels;

pub const TOTAL_CHART_FILE: &str = "total_bikes.png";
pub const HOURLY_CHART_FILE: &str = "hourly_pattern.png";
pub const TOP_CHART_FILE: &str = "top_stations_current.png";
pub const INDEX_FILE: &str = "index.html";

pub struct IndexPage<'a> {
    pub labels: &'a Labels,
    pub data_source: &'a Path,
    pub latest_snapshot: Option<DateTime<Utc>>,
    pub window_days: i64,
    pub top_n: usize,
}

/// Template context for `templates/index.html`. askama escapes every
/// interpolated value.
#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate<'a> {
    labels: &'a Labels,
    data_source: String,
    total_title: String,
    top_heading: String,
    latest: String,
    total_file: &'static str,
    hourly_file: &'static str,
    top_file: &'static str,
}

pub fn render_index(page: &IndexPage) -> Result<String, ReportError> {
    let labels = page.labels;
    let latest = page
        .latest_snapshot
        .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| labels.no_snapshot.to_string());

    IndexTemplate {
        labels,
        data_source: page.data_source.display().to_string(),
        total_title: labels.total_title(page.window_days),
        top_heading: labels.top_heading(page.top_n),
        latest,
        total_file: TOTAL_CHART_FILE,
        hourly_file: HOURLY_CHART_FILE,
        top_file: TOP_CHART_FILE,
    }
    .render()
    .map_err(|e| ReportError::Render(format!("{}: {}", INDEX_FILE, e)))
}
