use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::external::price_source::PriceSource;
use crate::models::{RecomputedPriceFeed, SymbolPair, Timeframe};
use crate::services::chart_sync_service::{self, SyncSummary};
use crate::services::price_feed_service;
use crate::store::PriceStore;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceUpdateReport {
    pub sync: SyncSummary,
    pub price_feed: RecomputedPriceFeed,
}

/// Syncs every timeframe of `pair` from the source, then recomputes the
/// `base/target` feed from the fresh `1D` rows.
///
/// Shared by the script endpoint and the scheduled job.
pub async fn update_prices(
    store: &dyn PriceStore,
    source: &dyn PriceSource,
    pair: &SymbolPair,
    base: &str,
    target: &str,
) -> Result<PriceUpdateReport, AppError> {
    info!("💰 Updating prices for {} -> {}/{}", pair, base, target);

    let sync = chart_sync_service::sync_from_source(store, source, pair, &Timeframe::ALL).await?;
    let price_feed = price_feed_service::recompute(store, base, target, &sync.symbol).await?;

    Ok(PriceUpdateReport { sync, price_feed })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChartPoint;
    use crate::store::MemoryPriceStore;
    use async_trait::async_trait;

    struct FixedSource(Option<Vec<ChartPoint>>);

    #[async_trait]
    impl PriceSource for FixedSource {
        async fn fetch_series(&self, _base: &str, _quote: &str, _timeframe: Timeframe) -> Option<Vec<ChartPoint>> {
            self.0.clone()
        }
    }

    #[tokio::test]
    async fn test_update_prices_syncs_all_timeframes_then_recomputes() {
        let store = MemoryPriceStore::new();
        let source = FixedSource(Some(vec![
            ChartPoint::from_single_price(1000, 15000.0),
            ChartPoint::from_single_price(2000, 16000.0),
        ]));

        let report = update_prices(&store, &source, &SymbolPair::new("IDRX", "USD"), "USD", "IDR")
            .await
            .unwrap();

        assert_eq!(report.sync.synced.len(), Timeframe::ALL.len());
        assert_eq!(report.sync.total_rows, 12);
        assert!((report.price_feed.price_feed.rate - 1.0 / 16000.0).abs() < 1e-15);
    }

    #[tokio::test]
    async fn test_update_prices_without_source_data_reports_missing_chart() {
        let store = MemoryPriceStore::new();

        let err = update_prices(&store, &FixedSource(None), &SymbolPair::new("IDRX", "USD"), "USD", "IDR")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NoChartData(_)));
    }
}
