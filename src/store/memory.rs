use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use crate::models::{ChartDataRecord, ChartPoint, PriceFeedRecord, Timeframe, UpsertPriceFeed};
use crate::store::PriceStore;

/// Process-local store. Each `(symbol, timeframe)` partition is swapped in one
/// map insert, so readers never observe a half-replaced partition.
#[derive(Clone, Default)]
pub struct MemoryPriceStore {
    charts: Arc<DashMap<(String, Timeframe), BTreeMap<i64, ChartDataRecord>>>,
    feeds: Arc<DashMap<(String, String), PriceFeedRecord>>,
}

impl MemoryPriceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PriceStore for MemoryPriceStore {
    async fn replace_chart_data(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        points: &[ChartPoint],
    ) -> Result<u64, sqlx::Error> {
        let mut rows = BTreeMap::new();
        for point in points {
            rows.entry(point.timestamp)
                .or_insert_with(|| ChartDataRecord::from_point(symbol, timeframe, point));
        }
        let inserted = rows.len() as u64;
        self.charts.insert((symbol.to_string(), timeframe), rows);
        Ok(inserted)
    }

    async fn fetch_chart_data(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<Vec<ChartDataRecord>, sqlx::Error> {
        Ok(self
            .charts
            .get(&(symbol.to_string(), timeframe))
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn fetch_latest_chart_point(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<Option<ChartDataRecord>, sqlx::Error> {
        Ok(self
            .charts
            .get(&(symbol.to_string(), timeframe))
            .and_then(|rows| rows.values().next_back().cloned()))
    }

    async fn upsert_price_feed(&self, feed: &UpsertPriceFeed) -> Result<PriceFeedRecord, sqlx::Error> {
        let now = Utc::now();
        let mut entry = self
            .feeds
            .entry((feed.base.clone(), feed.target.clone()))
            .or_insert_with(|| PriceFeedRecord {
                id: Uuid::new_v4(),
                base: feed.base.clone(),
                target: feed.target.clone(),
                rate: feed.rate,
                amount: UpsertPriceFeed::AMOUNT,
                date: feed.date,
                created_at: now,
                updated_at: now,
            });

        let record = entry.value_mut();
        record.rate = feed.rate;
        record.amount = UpsertPriceFeed::AMOUNT;
        record.date = feed.date;
        record.updated_at = now;
        Ok(record.clone())
    }

    async fn fetch_price_feed(
        &self,
        base: &str,
        target: &str,
    ) -> Result<Option<PriceFeedRecord>, sqlx::Error> {
        Ok(self
            .feeds
            .get(&(base.to_string(), target.to_string()))
            .map(|r| r.value().clone()))
    }
}
