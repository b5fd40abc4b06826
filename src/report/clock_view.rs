//! Totals-only chart in local civil time with a 12-hour clock axis.
//!
//! Uses the whole history, no window.

use std::path::PathBuf;

use crate::analysis::snapshots;
use crate::config::Config;
use crate::logging::{self, Component};
use crate::model::ReportError;
use crate::report::{charts, labels};
use crate::store;

/// Render the clock view and return the path written.
pub fn run(config: &Config) -> Result<PathBuf, ReportError> {
    let readings = store::read_log(&config.storage.log_path)?;
    let tz = config
        .display_timezone()
        .map_err(|e| ReportError::Config(e.to_string()))?;

    let totals = snapshots::local_snapshot_totals(&readings, &tz);
    logging::info(
        Component::Report,
        &format!("{} snapshot(s) in {}", totals.len(), tz.name()),
    );

    charts::ensure_font(config.report.font_path.as_deref())?;

    let out = config.clock_view.output_path.clone();
    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let labels = labels::for_language(config.report.language);
    charts::render_clock_view(&out, &totals, tz, labels)?;
    Ok(out)
}
