use async_trait::async_trait;
use thiserror::Error;

use crate::models::{ChartPoint, Timeframe};

#[derive(Debug, Error)]
pub enum PriceSourceError {
    #[error("unsupported symbol: {0}")]
    UnsupportedSymbol(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("bad response: {0}")]
    BadResponse(String),

    #[error("parse error: {0}")]
    Parse(String),
}

/// Read-only access to an external price series.
///
/// Failures are not faults here: an unknown symbol, an error status or a
/// malformed payload all come back as `None`, so a multi-timeframe sync can
/// move on to the next timeframe.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch_series(
        &self,
        base: &str,
        quote: &str,
        timeframe: Timeframe,
    ) -> Option<Vec<ChartPoint>>;
}
