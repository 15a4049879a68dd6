use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::PriceSourceConfig;
use crate::external::price_source::{PriceSource, PriceSourceError};
use crate::models::{ChartPoint, Timeframe};
use crate::services::normalize::normalize_stats;

/// Client for the CoinGecko price chart endpoint
/// (`{base_url}/{coin_id}/{quote}/{period}.json`).
///
/// The endpoint reports one price per timestamp, so every point it yields is a
/// synthetic OHLC approximation (see [`ChartPoint::from_single_price`]).
pub struct CoinGeckoSource {
    client: reqwest::Client,
    config: PriceSourceConfig,
}

impl CoinGeckoSource {
    pub fn new(config: PriceSourceConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn series_url(&self, coin_id: &str, quote: &str, timeframe: Timeframe) -> String {
        format!(
            "{}/{}/{}/{}.json",
            self.config.base_url.trim_end_matches('/'),
            coin_id,
            quote.trim().to_lowercase(),
            self.config.period(timeframe)
        )
    }

    async fn try_fetch_series(
        &self,
        base: &str,
        quote: &str,
        timeframe: Timeframe,
    ) -> Result<Vec<ChartPoint>, PriceSourceError> {
        let coin_id = self
            .config
            .coin_id(base)
            .ok_or_else(|| PriceSourceError::UnsupportedSymbol(base.to_string()))?;

        let url = self.series_url(coin_id, quote, timeframe);
        debug!("Fetching {}/{} {} from {}", base, quote, timeframe, url);

        let resp = self
            .client
            .get(&url)
            .header(http::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| PriceSourceError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(PriceSourceError::BadResponse(format!("HTTP {}", status)));
        }

        let body: PriceChartResponse = resp
            .json()
            .await
            .map_err(|e| PriceSourceError::Parse(e.to_string()))?;

        let stats = body
            .stats
            .ok_or_else(|| PriceSourceError::BadResponse("missing stats in response".into()))?;

        Ok(normalize_stats(&stats))
    }
}

#[derive(Debug, Deserialize)]
struct PriceChartResponse {
    // [timestamp, price] pairs
    stats: Option<Vec<(f64, f64)>>,
}

#[async_trait]
impl PriceSource for CoinGeckoSource {
    async fn fetch_series(
        &self,
        base: &str,
        quote: &str,
        timeframe: Timeframe,
    ) -> Option<Vec<ChartPoint>> {
        match self.try_fetch_series(base, quote, timeframe).await {
            Ok(points) => {
                debug!("Fetched {} points for {}/{} {}", points.len(), base, quote, timeframe);
                Some(points)
            }
            Err(e) => {
                warn!("No price data for {}/{} {}: {}", base, quote, timeframe, e);
                None
            }
        }
    }
}
