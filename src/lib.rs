//! Bike-share station monitor.
//!
//! Two independent runs share one append-only log file:
//! - `collector` fetches the station-status feed and appends one line per
//!   station.
//! - `report` reads the whole log and writes charts and an index page.

pub mod analysis;
pub mod collector;
pub mod config;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod report;
pub mod store;
