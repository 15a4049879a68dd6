use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// Exchange rate for one (base, target) pair. Created on first upsert and
// updated in place afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PriceFeedRecord {
    pub id: Uuid,
    pub base: String,
    pub target: String,
    pub rate: f64,
    pub amount: i32,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values written by a price feed upsert.
#[derive(Debug, Clone)]
pub struct UpsertPriceFeed {
    pub base: String,
    pub target: String,
    pub rate: f64,
    pub date: NaiveDate,
}

impl UpsertPriceFeed {
    pub const AMOUNT: i32 = 1;
}

/// Read view returned by `GET /api/price-feed`.
///
/// `base_to_target` is the stored rate; `target_to_base` is its reciprocal,
/// computed at read time and never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceFeedView {
    #[serde(flatten)]
    pub record: PriceFeedRecord,
    pub base_to_target: f64,
    pub target_to_base: f64,
}

impl From<PriceFeedRecord> for PriceFeedView {
    fn from(record: PriceFeedRecord) -> Self {
        let base_to_target = record.rate;
        Self {
            target_to_base: 1.0 / base_to_target,
            base_to_target,
            record,
        }
    }
}

/// Response of `POST /api/price-feed`.
///
/// `target_to_base` carries the raw `1D` close the rate was derived from,
/// not the reciprocal of the stored rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecomputedPriceFeed {
    pub price_feed: PriceFeedRecord,
    pub source_symbol: String,
    pub source_timestamp: i64,
    pub base_to_target: f64,
    pub target_to_base: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PriceFeedQuery {
    pub base: String,
    pub target: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecomputePriceFeedRequest {
    pub base: Option<String>,
    pub target: Option<String>,
    pub symbol: Option<String>,
}
