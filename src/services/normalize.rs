use std::collections::HashSet;

use crate::models::ChartPoint;

/// Maps raw `[timestamp, price]` pairs into synthetic OHLC points.
///
/// Timestamps are kept in whatever unit the source uses.
pub fn normalize_stats(stats: &[(f64, f64)]) -> Vec<ChartPoint> {
    stats
        .iter()
        .map(|&(timestamp, price)| ChartPoint::from_single_price(timestamp as i64, price))
        .collect()
}

/// Keeps the first point seen for each timestamp, preserving the relative
/// order of the survivors.
pub fn dedupe(points: &[ChartPoint]) -> Vec<ChartPoint> {
    let mut seen = HashSet::with_capacity(points.len());
    points
        .iter()
        .filter(|p| seen.insert(p.timestamp))
        .copied()
        .collect()
}
