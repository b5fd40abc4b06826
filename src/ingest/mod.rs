/// Upstream data ingestion.
///
/// Submodules:
/// - `feed`: station-status fetch, station-list lookup and normalization.

pub mod feed;
