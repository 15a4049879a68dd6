use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::external::price_source::PriceSource;
use crate::models::{ChartDataRecord, ChartPoint, SymbolPair, Timeframe};
use crate::services::normalize::dedupe;
use crate::store::PriceStore;

/// Rows written per timeframe. Timeframes whose fetch produced no data are
/// absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncSummary {
    pub symbol: String,
    pub synced: BTreeMap<Timeframe, u64>,
    pub total_rows: u64,
}

impl SyncSummary {
    fn new(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            synced: BTreeMap::new(),
            total_rows: 0,
        }
    }

    fn record(&mut self, timeframe: Timeframe, rows: u64) {
        self.synced.insert(timeframe, rows);
        self.total_rows += rows;
    }
}

/// Dedupes `points` and fully replaces the stored `(symbol, timeframe)` rows.
pub async fn sync(
    store: &dyn PriceStore,
    symbol: &str,
    timeframe: Timeframe,
    points: &[ChartPoint],
) -> Result<u64, AppError> {
    let unique = dedupe(points);
    if unique.len() < points.len() {
        info!(
            "Dropped {} duplicate timestamps for {} {}",
            points.len() - unique.len(),
            symbol,
            timeframe
        );
    }

    let inserted = store
        .replace_chart_data(symbol, timeframe, &unique)
        .await
        .map_err(|e| {
            error!("Failed to sync chart data for {} {}: {}", symbol, timeframe, e);
            AppError::Db(e)
        })?;

    info!("✓ Synced {} chart rows for {} {}", inserted, symbol, timeframe);
    Ok(inserted)
}

/// Runs fetch → dedupe → sync for each timeframe in turn.
///
/// A timeframe the source has no data for is logged and left out of the
/// summary; the remaining timeframes still run. Storage errors abort.
pub async fn sync_from_source(
    store: &dyn PriceStore,
    source: &dyn PriceSource,
    pair: &SymbolPair,
    timeframes: &[Timeframe],
) -> Result<SyncSummary, AppError> {
    let symbol = pair.to_string();
    let mut summary = SyncSummary::new(&symbol);

    for &timeframe in timeframes {
        let Some(points) = source.fetch_series(&pair.base, &pair.quote, timeframe).await else {
            warn!("⚠️ Skipping {} {} - source returned no data", symbol, timeframe);
            continue;
        };

        let inserted = sync(store, &symbol, timeframe, &points).await?;
        summary.record(timeframe, inserted);
    }

    Ok(summary)
}

/// Syncs caller-supplied points into one timeframe, bypassing the source.
pub async fn sync_supplied(
    store: &dyn PriceStore,
    pair: &SymbolPair,
    timeframe: Timeframe,
    points: &[ChartPoint],
) -> Result<SyncSummary, AppError> {
    let symbol = pair.to_string();
    let mut summary = SyncSummary::new(&symbol);
    let inserted = sync(store, &symbol, timeframe, points).await?;
    summary.record(timeframe, inserted);
    Ok(summary)
}

pub async fn get_chart_data(
    store: &dyn PriceStore,
    symbol: &str,
    timeframe: Timeframe,
) -> Result<Vec<ChartDataRecord>, AppError> {
    store.fetch_chart_data(symbol, timeframe).await.map_err(|e| {
        error!("Failed to fetch chart data for {} {}: {}", symbol, timeframe, e);
        AppError::Db(e)
    })
}
