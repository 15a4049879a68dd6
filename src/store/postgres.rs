use async_trait::async_trait;
use sqlx::PgPool;

use crate::db::{chart_data_queries, price_feed_queries};
use crate::models::{ChartDataRecord, ChartPoint, PriceFeedRecord, Timeframe, UpsertPriceFeed};
use crate::store::PriceStore;

#[derive(Clone)]
pub struct PgPriceStore {
    pool: PgPool,
}

impl PgPriceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PriceStore for PgPriceStore {
    async fn replace_chart_data(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        points: &[ChartPoint],
    ) -> Result<u64, sqlx::Error> {
        chart_data_queries::replace_for_pair(&self.pool, symbol, timeframe, points).await
    }

    async fn fetch_chart_data(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<Vec<ChartDataRecord>, sqlx::Error> {
        chart_data_queries::fetch_for_pair(&self.pool, symbol, timeframe).await
    }

    async fn fetch_latest_chart_point(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<Option<ChartDataRecord>, sqlx::Error> {
        chart_data_queries::fetch_latest(&self.pool, symbol, timeframe).await
    }

    async fn upsert_price_feed(&self, feed: &UpsertPriceFeed) -> Result<PriceFeedRecord, sqlx::Error> {
        price_feed_queries::upsert(&self.pool, feed).await
    }

    async fn fetch_price_feed(
        &self,
        base: &str,
        target: &str,
    ) -> Result<Option<PriceFeedRecord>, sqlx::Error> {
        price_feed_queries::fetch(&self.pool, base, target).await
    }
}
