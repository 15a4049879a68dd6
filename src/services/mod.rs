pub mod chart_sync_service;
pub mod job_scheduler_service;
pub mod normalize;
pub mod price_feed_service;
pub mod price_update_service;
