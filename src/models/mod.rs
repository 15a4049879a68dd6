mod chart_data;
mod price_feed;
mod timeframe;

pub use chart_data::{ChartDataQuery, ChartDataRecord, ChartPoint, SymbolPair, SyncChartDataRequest};
pub use price_feed::{
    PriceFeedQuery, PriceFeedRecord, PriceFeedView, RecomputePriceFeedRequest,
    RecomputedPriceFeed, UpsertPriceFeed,
};
pub use timeframe::Timeframe;
