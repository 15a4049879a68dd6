use chrono::Utc;
use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::models::{PriceFeedView, RecomputedPriceFeed, Timeframe, UpsertPriceFeed};
use crate::store::PriceStore;

pub async fn get_price_feed(
    store: &dyn PriceStore,
    base: &str,
    target: &str,
) -> Result<PriceFeedView, AppError> {
    store
        .fetch_price_feed(base, target)
        .await
        .map_err(|e| {
            error!("Failed to fetch price feed {}/{}: {}", base, target, e);
            AppError::Db(e)
        })?
        .map(PriceFeedView::from)
        .ok_or_else(|| AppError::NotFound(format!("No price feed found for {}/{}", base, target)))
}

/// Derives `base -> target` from the latest stored `1D` close of `symbol` and
/// upserts it.
///
/// Reads stored chart rows only, so the `1D` sync for `symbol` must have run.
/// The stored `date` is today's UTC date, not the date of the chart point.
pub async fn recompute(
    store: &dyn PriceStore,
    base: &str,
    target: &str,
    symbol: &str,
) -> Result<RecomputedPriceFeed, AppError> {
    let latest = store
        .fetch_latest_chart_point(symbol, Timeframe::OneDay)
        .await
        .map_err(|e| {
            error!("Failed to read latest 1D close for {}: {}", symbol, e);
            AppError::Db(e)
        })?
        .ok_or_else(|| {
            warn!("No 1D chart data for {}; price feed {}/{} not updated", symbol, base, target);
            AppError::NoChartData(symbol.to_string())
        })?;

    let close = latest.close;
    if close == 0.0 || !close.is_finite() {
        error!("Refusing to derive {}/{} from {} close {}", base, target, symbol, close);
        return Err(AppError::InvalidSourcePrice(format!(
            "latest 1D close for {} at {} is {}",
            symbol, latest.timestamp, close
        )));
    }

    let rate = 1.0 / close;
    let record = store
        .upsert_price_feed(&UpsertPriceFeed {
            base: base.to_string(),
            target: target.to_string(),
            rate,
            date: Utc::now().date_naive(),
        })
        .await
        .map_err(|e| {
            error!("Failed to upsert price feed {}/{}: {}", base, target, e);
            AppError::Db(e)
        })?;

    info!("✓ Price feed {}/{} = {} (from {} close {})", base, target, rate, symbol, close);

    Ok(RecomputedPriceFeed {
        base_to_target: record.rate,
        target_to_base: close,
        source_symbol: symbol.to_string(),
        source_timestamp: latest.timestamp,
        price_feed: record,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChartPoint;
    use crate::store::MemoryPriceStore;

    async fn seeded(closes: &[(i64, f64)]) -> MemoryPriceStore {
        let store = MemoryPriceStore::new();
        let points: Vec<ChartPoint> = closes
            .iter()
            .map(|&(ts, close)| ChartPoint::from_single_price(ts, close))
            .collect();
        store.replace_chart_data("IDRX/USD", Timeframe::OneDay, &points).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_recompute_inverts_latest_close() {
        let store = seeded(&[(1000, 15000.0), (2000, 16000.0)]).await;

        let result = recompute(&store, "USD", "IDR", "IDRX/USD").await.unwrap();

        assert!((result.price_feed.rate - 0.0000625).abs() < 1e-15);
        assert_eq!(result.price_feed.amount, 1);
        assert_eq!(result.price_feed.date, Utc::now().date_naive());
        assert_eq!(result.source_timestamp, 2000);

        let stored = store.fetch_price_feed("USD", "IDR").await.unwrap().unwrap();
        assert_eq!(stored.rate, result.price_feed.rate);
    }

    #[tokio::test]
    async fn test_recompute_response_pins_rate_directions() {
        let store = seeded(&[(1000, 16000.0)]).await;

        let result = recompute(&store, "USD", "IDR", "IDRX/USD").await.unwrap();

        // base_to_target is the stored rate, target_to_base is the raw close
        assert_eq!(result.base_to_target, result.price_feed.rate);
        assert_eq!(result.target_to_base, 16000.0);
    }

    #[tokio::test]
    async fn test_recompute_without_chart_data_is_dependency_error() {
        let store = MemoryPriceStore::new();
        // Non-1D rows do not satisfy the dependency
        store
            .replace_chart_data("IDRX/USD", Timeframe::OneWeek, &[ChartPoint::from_single_price(1, 16000.0)])
            .await
            .unwrap();

        let err = recompute(&store, "USD", "IDR", "IDRX/USD").await.unwrap_err();
        assert!(matches!(err, AppError::NoChartData(ref s) if s == "IDRX/USD"));
        assert!(store.fetch_price_feed("USD", "IDR").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_recompute_rejects_zero_close() {
        let store = seeded(&[(1000, 0.0)]).await;

        let err = recompute(&store, "USD", "IDR", "IDRX/USD").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidSourcePrice(_)));
        assert!(store.fetch_price_feed("USD", "IDR").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_price_feed_view() {
        let store = seeded(&[(1000, 16000.0)]).await;
        assert!(matches!(
            get_price_feed(&store, "USD", "IDR").await.unwrap_err(),
            AppError::NotFound(_)
        ));

        recompute(&store, "USD", "IDR", "IDRX/USD").await.unwrap();
        let view = get_price_feed(&store, "USD", "IDR").await.unwrap();

        assert_eq!(view.base_to_target, view.record.rate);
        assert!((view.target_to_base - 1.0 / view.record.rate).abs() < 1e-9);
    }
}
