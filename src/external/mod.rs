pub mod coingecko;
pub mod price_source;
