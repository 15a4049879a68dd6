pub mod chart_data_queries;
pub mod price_feed_queries;
