/// Reporter: reads the whole reading log and writes charts plus an index page.
///
/// Submodules:
/// - `charts`: PNG rendering (plotters).
/// - `html`: the static index page.
/// - `labels`: chart and page text per language.
/// - `clock_view`: local-time totals chart on a 12-hour clock.

pub mod charts;
pub mod clock_view;
pub mod html;
pub mod labels;

use chrono::{DateTime, Duration, Utc};
use std::fs;
use std::path::{Path, PathBuf};

use crate::analysis::snapshots;
use crate::config::Config;
use crate::logging::{self, Component};
use crate::model::ReportError;
use crate::store;

/// Every file a reporter run writes, in write order.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportArtifacts {
    pub total_chart: PathBuf,
    pub hourly_chart: PathBuf,
    pub top_chart: PathBuf,
    pub index_html: PathBuf,
}

impl ReportArtifacts {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            total_chart: dir.join(html::TOTAL_CHART_FILE),
            hourly_chart: dir.join(html::HOURLY_CHART_FILE),
            top_chart: dir.join(html::TOP_CHART_FILE),
            index_html: dir.join(html::INDEX_FILE),
        }
    }

    pub fn paths(&self) -> [&Path; 4] {
        [
            self.total_chart.as_path(),
            self.hourly_chart.as_path(),
            self.top_chart.as_path(),
            self.index_html.as_path(),
        ]
    }
}

/// Run the reporter with `now` as the reference time for the window.
///
/// Fails with `NoData`/`EmptyData` before anything is written. The output
/// directory is only created once the log has been read.
pub fn run(config: &Config, now: DateTime<Utc>) -> Result<ReportArtifacts, ReportError> {
    let log_path = &config.storage.log_path;
    let readings = store::read_log(log_path)?;
    logging::info(
        Component::Report,
        &format!("{} reading(s) loaded from {}", readings.len(), log_path.display()),
    );

    let window_days = config.report.window_days;
    let totals = snapshots::snapshot_totals(&readings, now, Duration::days(window_days));
    let hourly = snapshots::hourly_averages(&totals);
    let top = snapshots::top_stations(&readings, config.report.top_n);

    match &top {
        Some(t) => logging::debug(
            Component::Report,
            &format!("latest snapshot {} with {} station(s) shown", t.at, t.bars.len()),
        ),
        None => logging::warn(Component::Report, "no reading has a valid timestamp"),
    }
    if totals.is_empty() {
        logging::warn(
            Component::Report,
            &format!("no snapshots in the last {} day(s)", window_days),
        );
    }

    charts::ensure_font(config.report.font_path.as_deref())?;

    let out_dir = &config.report.output_dir;
    fs::create_dir_all(out_dir)?;
    let artifacts = ReportArtifacts::in_dir(out_dir);
    let labels = labels::for_language(config.report.language);

    charts::render_snapshot_totals(&artifacts.total_chart, &totals, labels, window_days)?;
    charts::render_hourly_pattern(&artifacts.hourly_chart, &hourly, labels)?;
    charts::render_top_stations(&artifacts.top_chart, top.as_ref(), labels, config.report.top_n)?;

    let page = html::render_index(&html::IndexPage {
        labels,
        data_source: log_path,
        latest_snapshot: top.as_ref().map(|t| t.at),
        window_days,
        top_n: config.report.top_n,
    })?;
    fs::write(&artifacts.index_html, page)?;

    Ok(artifacts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_names() {
        let artifacts = ReportArtifacts::in_dir(Path::new("docs"));
        assert_eq!(
            artifacts.paths(),
            [
                Path::new("docs/total_bikes.png"),
                Path::new("docs/hourly_pattern.png"),
                Path::new("docs/top_stations_current.png"),
                Path::new("docs/index.html"),
            ]
        );
    }
}
