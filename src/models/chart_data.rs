use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::Timeframe;

/// One price point as produced by the external source.
///
/// When the source only reports a single price per timestamp, `high` and `low`
/// are synthesized as `price * 1.001` and `price * 0.999`. They are not real
/// OHLC extremes, and `low <= open, close <= high` is not guaranteed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl ChartPoint {
    pub const SYNTHETIC_HIGH_FACTOR: f64 = 1.001;
    pub const SYNTHETIC_LOW_FACTOR: f64 = 0.999;

    /// Approximates an OHLC point from a single price.
    pub fn from_single_price(timestamp: i64, price: f64) -> Self {
        Self {
            timestamp,
            open: price,
            high: price * Self::SYNTHETIC_HIGH_FACTOR,
            low: price * Self::SYNTHETIC_LOW_FACTOR,
            close: price,
        }
    }
}

// Stored chart row, unique per (symbol, timeframe, timestamp).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChartDataRecord {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub created_at: DateTime<Utc>,
}

impl ChartDataRecord {
    pub fn from_point(symbol: &str, timeframe: Timeframe, point: &ChartPoint) -> Self {
        Self {
            symbol: symbol.to_string(),
            timeframe,
            timestamp: point.timestamp,
            open: point.open,
            high: point.high,
            low: point.low,
            close: point.close,
            created_at: Utc::now(),
        }
    }

    pub fn to_point(&self) -> ChartPoint {
        ChartPoint {
            timestamp: self.timestamp,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
        }
    }
}

/// A `BASE/QUOTE` ticker pair such as `IDRX/USD`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SymbolPair {
    pub base: String,
    pub quote: String,
}

impl SymbolPair {
    pub fn new(base: &str, quote: &str) -> Self {
        Self {
            base: base.trim().to_uppercase(),
            quote: quote.trim().to_uppercase(),
        }
    }
}

impl fmt::Display for SymbolPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

impl FromStr for SymbolPair {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split('/').collect::<Vec<_>>().as_slice() {
            [base, quote] if !base.trim().is_empty() && !quote.trim().is_empty() => {
                Ok(SymbolPair::new(base, quote))
            }
            _ => Err(format!("Invalid symbol '{}'. Expected BASE/QUOTE, e.g. IDRX/USD", s)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartDataQuery {
    pub symbol: String,
    pub timeframe: Option<String>,
}

/// Body of `POST /api/chart-data`. `points` overrides the external source.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SyncChartDataRequest {
    pub symbol: Option<String>,
    pub timeframe: Option<String>,
    pub points: Option<Vec<ChartPoint>>,
}
