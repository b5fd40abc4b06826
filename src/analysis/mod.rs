/// Aggregations over the reading log.
///
/// Submodules:
/// - `snapshots`: per-snapshot totals, hourly averages and the latest
///   snapshot's top stations.

pub mod snapshots;
