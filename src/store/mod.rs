use async_trait::async_trait;

use crate::models::{ChartDataRecord, ChartPoint, PriceFeedRecord, Timeframe, UpsertPriceFeed};

pub mod memory;
pub mod postgres;

pub use memory::MemoryPriceStore;
pub use postgres::PgPriceStore;

/// Persistence for chart rows and price feeds.
#[async_trait]
pub trait PriceStore: Send + Sync {
    /// Drops all rows of `(symbol, timeframe)` and writes `points`, skipping
    /// timestamps that already exist. Returns the number of rows written.
    async fn replace_chart_data(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        points: &[ChartPoint],
    ) -> Result<u64, sqlx::Error>;

    /// Rows of `(symbol, timeframe)` ordered by timestamp ascending.
    async fn fetch_chart_data(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<Vec<ChartDataRecord>, sqlx::Error>;

    async fn fetch_latest_chart_point(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<Option<ChartDataRecord>, sqlx::Error>;

    async fn upsert_price_feed(&self, feed: &UpsertPriceFeed) -> Result<PriceFeedRecord, sqlx::Error>;

    async fn fetch_price_feed(
        &self,
        base: &str,
        target: &str,
    ) -> Result<Option<PriceFeedRecord>, sqlx::Error>;
}
